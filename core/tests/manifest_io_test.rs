//! Manifest persistence and checklist-file compilation

use flowprompt_core::catalog::a320_checklists;
use flowprompt_core::{
    compile, load_audio_requests, load_checklists, AbbreviationTable, AudioKind,
    AUDIO_MANIFEST_FILE, FLOW_MANIFEST_FILE,
};
use std::fs;
use tempfile::TempDir;

fn create_temp_workspace() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_write_creates_both_manifests() {
    let workspace = create_temp_workspace();
    let out = workspace.path().join("manifests");
    let manifest = compile(&a320_checklists(), &AbbreviationTable::a320().unwrap());

    let (flows_path, audio_path) = manifest.write(&out).unwrap();

    assert_eq!(flows_path, out.join(FLOW_MANIFEST_FILE));
    assert_eq!(audio_path, out.join(AUDIO_MANIFEST_FILE));

    let flows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&flows_path).unwrap()).unwrap();
    assert_eq!(flows.as_array().unwrap().len(), 15);
    assert_eq!(flows[7]["note"], "At acceleration height");

    // Pretty-printed with two-space indentation
    let raw = fs::read_to_string(&audio_path).unwrap();
    assert!(raw.starts_with("[\n  {\n    \"id\": \"cockpit_preparation_flows_start\""));
}

#[test]
fn test_audio_manifest_reloads_as_work_queue() {
    let workspace = create_temp_workspace();
    let manifest = compile(&a320_checklists(), &AbbreviationTable::a320().unwrap());
    let (_, audio_path) = manifest.write(workspace.path()).unwrap();

    let requests = load_audio_requests(&audio_path).unwrap();

    assert_eq!(requests, manifest.audio);
    assert!(matches!(requests[0].kind, AudioKind::FlowStart));
    assert!(matches!(requests[1].kind, AudioKind::FlowComplete));
}

#[test]
fn test_load_audio_requests_missing_file() {
    let workspace = create_temp_workspace();
    let err = load_audio_requests(&workspace.path().join("audio_files.json")).unwrap_err();
    assert!(err.to_string().contains("audio_files.json"));
}

#[test]
fn test_custom_checklist_file_compiles() {
    let workspace = create_temp_workspace();
    let path = workspace.path().join("flows.toml");
    fs::write(
        &path,
        r#"
[[checklist]]
name = "BEFORE START FLOWS"
items = [["APU", "START"], ["EXT POWER", "OFF"]]

[[checklist]]
name = "AFTER TAKE OFF FLOWS"
note = "At acceleration height"
items = [["PACK 1+2", "ON"]]
"#,
    )
    .unwrap();

    let defs = load_checklists(&path).unwrap();
    let manifest = compile(&defs, &AbbreviationTable::a320().unwrap());
    manifest.validate().unwrap();

    let texts: Vec<_> = manifest.audio.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Before Start Flows",
            "Before Start Flows complete",
            "A P U: START",
            "External POWER: OFF",
            "After Take Off Flows",
            "After Take Off Flows complete",
            "PACK 1 and 2: ON",
        ]
    );
    assert_eq!(manifest.audio[3].filename, "before_start_flows_01_ext_power.wav");
    assert_eq!(manifest.audio[6].id, "after_take_off_flows_0");
}
