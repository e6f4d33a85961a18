// Flowprompt Core Library
// Cockpit flow checklists -> speakable audio request manifests

pub mod catalog;
pub mod checklist;
pub mod expand;
pub mod manifest;
pub mod naming;

// Export core types
pub use checklist::{load_checklists, ChecklistDefinition, ChecklistItem};
pub use expand::{AbbreviationTable, ExpansionRule, MatchMode};
pub use manifest::{
    compile, load_audio_requests, validate_requests, AudioKind, AudioRequest, Flow, FlowItem,
    Manifest, ManifestSummary, AUDIO_MANIFEST_FILE, FLOW_MANIFEST_FILE,
};

// Error types
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowPromptError {
    #[error("Invalid expansion rule '{pattern}': {reason}")]
    InvalidRule { pattern: String, reason: String },

    #[error("Duplicate audio id: {0}")]
    DuplicateId(String),

    #[error("Duplicate audio filename: {0}")]
    DuplicateFilename(String),

    #[error("Flows '{first}' and '{second}' share the slug '{slug}'")]
    DuplicateFlow {
        first: String,
        second: String,
        slug: String,
    },

    #[error("Audio filename '{0}' is not a plain file name")]
    UnsafeFilename(String),

    #[error("Flow name '{0}' has no filesystem-safe characters")]
    EmptySlug(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowPromptError>;
