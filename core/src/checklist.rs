//! Checklist definitions: the static input of the flow compiler.
//!
//! Definitions come either from the built-in catalog (see [`crate::catalog`])
//! or from a TOML file of the form:
//!
//! ```toml
//! [[checklist]]
//! name = "TAXI FLOWS"
//! note = "optional"
//! items = [["TAXI CLEARANCE", "OBTAIN"], ["PARK BRAKE", "RELEASED"]]
//! ```

use crate::{FlowPromptError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// One checklist line: the control/indicator and its required state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ChecklistItem {
    pub item: String,
    pub response: String,
}

impl ChecklistItem {
    pub fn new(item: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            response: response.into(),
        }
    }
}

impl From<(String, String)> for ChecklistItem {
    fn from((item, response): (String, String)) -> Self {
        Self { item, response }
    }
}

impl From<ChecklistItem> for (String, String) {
    fn from(c: ChecklistItem) -> Self {
        (c.item, c.response)
    }
}

/// A named, ordered checklist recited during one procedure phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

impl ChecklistDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: None,
            items: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn item(mut self, item: impl Into<String>, response: impl Into<String>) -> Self {
        self.items.push(ChecklistItem::new(item, response));
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChecklistFile {
    #[serde(default)]
    checklist: Vec<ChecklistDefinition>,
}

/// Parse checklist definitions from TOML text, keeping declaration order.
pub fn parse_checklists(s: &str) -> Result<Vec<ChecklistDefinition>> {
    let file: ChecklistFile = toml::from_str(s)?;
    Ok(file.checklist)
}

/// Load checklist definitions from a TOML file.
pub fn load_checklists(path: &Path) -> Result<Vec<ChecklistDefinition>> {
    let s = fs::read_to_string(path).map_err(|source| FlowPromptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let defs = parse_checklists(&s)?;
    info!(target = "compiler", path = %path.display(), flows = defs.len(), "Loaded checklist definitions");
    Ok(defs)
}
