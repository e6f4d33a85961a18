//! Flow and audio-request manifests.
//!
//! `compile` walks the checklist definitions once, in declaration order, and
//! produces the two externally visible artifacts:
//! - `flows.json`: one [`Flow`] per definition, items copied verbatim
//! - `audio_files.json`: the [`AudioRequest`] work queue for the TTS stage
//!
//! Every flow contributes a start marker, a completion marker and one request
//! per checklist item, in that order.

use crate::checklist::ChecklistDefinition;
use crate::expand::AbbreviationTable;
use crate::naming;
use crate::{FlowPromptError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

pub const FLOW_MANIFEST_FILE: &str = "flows.json";
pub const AUDIO_MANIFEST_FILE: &str = "audio_files.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowItem {
    pub item: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub trigger_phrase: String,
    pub items: Vec<FlowItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioKind {
    FlowStart,
    FlowComplete,
    /// Original, unexpanded checklist line.
    Item { item: String, response: String },
}

/// One unit of synthesis work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AudioRecord", try_from = "AudioRecord")]
pub struct AudioRequest {
    pub id: String,
    pub text: String,
    pub filename: String,
    pub flow: String,
    pub kind: AudioKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RecordType {
    FlowStart,
    FlowComplete,
    Item,
}

// On-disk shape: markers carry `type`, items carry `item`/`response` instead.
#[derive(Debug, Serialize, Deserialize)]
struct AudioRecord {
    id: String,
    text: String,
    filename: String,
    flow: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<RecordType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<String>,
}

impl From<AudioRequest> for AudioRecord {
    fn from(r: AudioRequest) -> Self {
        let (kind, item, response) = match r.kind {
            AudioKind::FlowStart => (Some(RecordType::FlowStart), None, None),
            AudioKind::FlowComplete => (Some(RecordType::FlowComplete), None, None),
            AudioKind::Item { item, response } => (None, Some(item), Some(response)),
        };
        Self {
            id: r.id,
            text: r.text,
            filename: r.filename,
            flow: r.flow,
            kind,
            item,
            response,
        }
    }
}

impl TryFrom<AudioRecord> for AudioRequest {
    type Error = String;

    fn try_from(r: AudioRecord) -> std::result::Result<Self, Self::Error> {
        let kind = match (r.kind, r.item, r.response) {
            (Some(RecordType::FlowStart), _, _) => AudioKind::FlowStart,
            (Some(RecordType::FlowComplete), _, _) => AudioKind::FlowComplete,
            (None | Some(RecordType::Item), Some(item), Some(response)) => {
                AudioKind::Item { item, response }
            }
            _ => {
                return Err(format!(
                    "audio request '{}' needs a marker type or an item/response pair",
                    r.id
                ))
            }
        };
        Ok(Self {
            id: r.id,
            text: r.text,
            filename: r.filename,
            flow: r.flow,
            kind,
        })
    }
}

/// Both compiler outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub flows: Vec<Flow>,
    pub audio: Vec<AudioRequest>,
}

/// Compile checklist definitions into flows and audio requests.
pub fn compile(defs: &[ChecklistDefinition], table: &AbbreviationTable) -> Manifest {
    let mut manifest = Manifest::default();

    for def in defs {
        let slug = naming::slugify(&def.name);
        let spoken = table.spoken_heading(&def.name);

        manifest.audio.push(AudioRequest {
            id: naming::start_id(&slug),
            text: spoken.clone(),
            filename: naming::start_filename(&slug),
            flow: def.name.clone(),
            kind: AudioKind::FlowStart,
        });
        manifest.audio.push(AudioRequest {
            id: naming::complete_id(&slug),
            text: format!("{spoken} complete"),
            filename: naming::complete_filename(&slug),
            flow: def.name.clone(),
            kind: AudioKind::FlowComplete,
        });

        let mut items = Vec::with_capacity(def.items.len());
        for (i, c) in def.items.iter().enumerate() {
            items.push(FlowItem {
                item: c.item.clone(),
                response: c.response.clone(),
            });
            manifest.audio.push(AudioRequest {
                id: naming::item_id(&def.name, i),
                text: table.expand(&format!("{}: {}", c.item, c.response)),
                filename: naming::item_filename(&slug, i, &c.item),
                flow: def.name.clone(),
                kind: AudioKind::Item {
                    item: c.item.clone(),
                    response: c.response.clone(),
                },
            });
        }

        debug!(target = "compiler", flow = %def.name, items = items.len(), "Compiled flow");
        manifest.flows.push(Flow {
            name: def.name.clone(),
            trigger_phrase: def.name.to_lowercase(),
            items,
            note: def.note.clone(),
        });
    }

    manifest
}

/// Reject duplicate ids or filenames anywhere in the request list, and any
/// filename that is not a single plain path component.
pub fn validate_requests(requests: &[AudioRequest]) -> Result<()> {
    let mut ids = HashSet::with_capacity(requests.len());
    let mut filenames = HashSet::with_capacity(requests.len());
    for r in requests {
        if !is_flat_filename(&r.filename) {
            return Err(FlowPromptError::UnsafeFilename(r.filename.clone()));
        }
        if !ids.insert(r.id.as_str()) {
            return Err(FlowPromptError::DuplicateId(r.id.clone()));
        }
        if !filenames.insert(r.filename.as_str()) {
            return Err(FlowPromptError::DuplicateFilename(r.filename.clone()));
        }
    }
    Ok(())
}

// Audio files live directly in the output directory.
fn is_flat_filename(filename: &str) -> bool {
    let mut parts = Path::new(filename).components();
    matches!((parts.next(), parts.next()), (Some(Component::Normal(_)), None))
}

/// Read `audio_files.json` back.
pub fn load_audio_requests(path: &Path) -> Result<Vec<AudioRequest>> {
    let s = fs::read_to_string(path).map_err(|source| FlowPromptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&s)?)
}

impl Manifest {
    /// Structural checks that must pass before any file is written.
    pub fn validate(&self) -> Result<()> {
        let mut slugs: HashMap<String, &str> = HashMap::new();
        for flow in &self.flows {
            let slug = naming::slugify(&flow.name);
            if slug.is_empty() {
                return Err(FlowPromptError::EmptySlug(flow.name.clone()));
            }
            if let Some(first) = slugs.insert(slug.clone(), &flow.name) {
                return Err(FlowPromptError::DuplicateFlow {
                    first: first.to_string(),
                    second: flow.name.clone(),
                    slug,
                });
            }
        }
        validate_requests(&self.audio)
    }

    pub fn requests_for<'a>(&'a self, flow: &'a str) -> impl Iterator<Item = &'a AudioRequest> {
        self.audio.iter().filter(move |r| r.flow == flow)
    }

    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary {
            flows: self
                .flows
                .iter()
                .map(|f| (f.name.clone(), f.items.len(), f.note.clone()))
                .collect(),
            requests: self.audio.len(),
        }
    }

    /// Write `flows.json` and `audio_files.json` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)?;
        let flows_path = dir.join(FLOW_MANIFEST_FILE);
        let audio_path = dir.join(AUDIO_MANIFEST_FILE);
        fs::write(&flows_path, serde_json::to_string_pretty(&self.flows)?)?;
        fs::write(&audio_path, serde_json::to_string_pretty(&self.audio)?)?;
        info!(
            target = "compiler",
            flows = %flows_path.display(),
            audio = %audio_path.display(),
            "Saved manifests"
        );
        Ok((flows_path, audio_path))
    }
}

/// Totals for the compile report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSummary {
    /// name, item count, note
    pub flows: Vec<(String, usize, Option<String>)>,
    pub requests: usize,
}

impl ManifestSummary {
    pub fn total_items(&self) -> usize {
        self.flows.iter().map(|(_, n, _)| n).sum()
    }
}

impl fmt::Display for ManifestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total flows: {}", self.flows.len())?;
        writeln!(f, "Total items: {}", self.total_items())?;
        writeln!(f, "Audio files needed: {}", self.requests)?;
        for (name, items, note) in &self.flows {
            match note {
                Some(note) => writeln!(f, "  {name}: {items} items ({note})")?,
                None => writeln!(f, "  {name}: {items} items")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::a320_checklists;

    fn a320() -> Manifest {
        compile(&a320_checklists(), &AbbreviationTable::a320().unwrap())
    }

    #[test]
    fn first_item_matches_reference() {
        let m = a320();
        let r = &m.audio[2];
        assert_eq!(r.text, "P F D Light: Bright");
        assert_eq!(r.filename, "cockpit_preparation_flows_00_pfd_lt.wav");
        assert_eq!(r.id, "cockpit_preparation_flows_0");
        assert_eq!(
            r.kind,
            AudioKind::Item {
                item: "PFD LT".into(),
                response: "BRT".into()
            }
        );
    }

    #[test]
    fn flow_markers_match_reference() {
        let m = a320();
        let start = m
            .requests_for("10000 FT CLIMB FLOWS")
            .find(|r| r.kind == AudioKind::FlowStart)
            .unwrap();
        assert_eq!(start.text, "10000 Feet Climb Flows");
        assert_eq!(start.filename, "10000_ft_climb_flows_start.wav");
        assert_eq!(start.id, "10000_ft_climb_flows_start");

        let complete = m
            .requests_for("10000 FT CLIMB FLOWS")
            .find(|r| r.kind == AudioKind::FlowComplete)
            .unwrap();
        assert_eq!(complete.text, "10000 Feet Climb Flows complete");
        assert_eq!(complete.filename, "10000_ft_climb_flows_complete.wav");
    }

    #[test]
    fn manifest_size_and_ordering() {
        let m = a320();
        let items: usize = m.flows.iter().map(|f| f.items.len()).sum();
        assert_eq!(m.audio.len(), 2 * m.flows.len() + items);
        assert_eq!(m.audio.len(), 168);

        for flow in &m.flows {
            let reqs: Vec<_> = m.requests_for(&flow.name).collect();
            assert_eq!(flow.items.len(), reqs.len() - 2);
            assert_eq!(reqs[0].kind, AudioKind::FlowStart);
            assert_eq!(reqs[1].kind, AudioKind::FlowComplete);
        }

        let names: Vec<_> = m.flows.iter().map(|f| f.name.clone()).collect();
        let declared: Vec<_> = a320_checklists().into_iter().map(|d| d.name).collect();
        assert_eq!(names, declared);
    }

    #[test]
    fn ids_and_filenames_are_unique() {
        let m = a320();
        let ids: HashSet<_> = m.audio.iter().map(|r| &r.id).collect();
        let files: HashSet<_> = m.audio.iter().map(|r| &r.filename).collect();
        assert_eq!(ids.len(), m.audio.len());
        assert_eq!(files.len(), m.audio.len());
        m.validate().unwrap();
    }

    #[test]
    fn flows_keep_items_verbatim() {
        let m = a320();
        let taxi = m.flows.iter().find(|f| f.name == "TAXI FLOWS").unwrap();
        assert_eq!(taxi.trigger_phrase, "taxi flows");
        assert_eq!(taxi.items[3].item, "TO CONFIG");
        assert_eq!(taxi.items[3].response, "PRESS");
        let landing = m.flows.iter().find(|f| f.name == "LANDING FLOWS").unwrap();
        assert_eq!(
            landing.note.as_deref(),
            Some("When fully configured and established on approach")
        );
    }

    #[test]
    fn colliding_flow_slugs_are_rejected() {
        let defs = vec![
            ChecklistDefinition::new("TAXI FLOWS").item("PARK BRAKE", "RELEASED"),
            ChecklistDefinition::new("TAXI-FLOWS").item("AUTO BRAKE", "MAX"),
        ];
        let m = compile(&defs, &AbbreviationTable::a320().unwrap());
        match m.validate() {
            Err(FlowPromptError::DuplicateFlow { slug, .. }) => assert_eq!(slug, "taxi_flows"),
            other => panic!("expected duplicate flow, got {other:?}"),
        }
    }

    #[test]
    fn empty_slug_is_rejected() {
        let defs = vec![ChecklistDefinition::new("&&").item("A", "B")];
        let m = compile(&defs, &AbbreviationTable::a320().unwrap());
        assert!(matches!(m.validate(), Err(FlowPromptError::EmptySlug(_))));
    }

    #[test]
    fn duplicate_requests_are_rejected() {
        let mut audio = a320().audio;
        let mut dup = audio[5].clone();
        dup.id = "fresh_id".into();
        audio.push(dup);
        assert!(matches!(
            validate_requests(&audio),
            Err(FlowPromptError::DuplicateFilename(f)) if f == "cockpit_preparation_flows_03_ecam_lower_display.wav"
        ));

        let mut audio = a320().audio;
        audio.push(audio[0].clone());
        assert!(matches!(validate_requests(&audio), Err(FlowPromptError::DuplicateId(_))));
    }

    #[test]
    fn filenames_must_stay_in_the_audio_dir() {
        for bad in ["../escaped.wav", "/tmp/abs.wav", "sub/dir.wav", "", ".", ".."] {
            let mut audio = a320().audio;
            audio[3].filename = bad.to_string();
            assert!(
                matches!(validate_requests(&audio), Err(FlowPromptError::UnsafeFilename(f)) if f == bad),
                "accepted {bad:?}"
            );
        }
        assert!(validate_requests(&a320().audio).is_ok());
    }

    #[test]
    fn json_shape_matches_consumers() {
        let m = a320();
        let start = serde_json::to_value(&m.audio[0]).unwrap();
        assert_eq!(start["type"], "flow_start");
        assert!(start.get("item").is_none());

        let item = serde_json::to_value(&m.audio[2]).unwrap();
        assert!(item.get("type").is_none());
        assert_eq!(item["item"], "PFD LT");
        assert_eq!(item["response"], "BRT");
        assert_eq!(item["flow"], "COCKPIT PREPARATION FLOWS");

        let flow = serde_json::to_value(&m.flows[0]).unwrap();
        assert!(flow.get("note").is_none());
        assert_eq!(flow["items"][0]["item"], "PFD LT");
    }

    #[test]
    fn record_without_type_or_item_is_rejected() {
        let json = r#"{"id":"x","text":"t","filename":"x.wav","flow":"F"}"#;
        assert!(serde_json::from_str::<AudioRequest>(json).is_err());
    }

    #[test]
    fn summary_report() {
        let s = a320().summary();
        assert_eq!(s.total_items(), 138);
        let text = s.to_string();
        assert!(text.starts_with("Total flows: 15\nTotal items: 138\nAudio files needed: 168\n"));
        assert!(text.contains("  AFTER TAKE OFF FLOWS: 5 items (At acceleration height)\n"));
    }
}
