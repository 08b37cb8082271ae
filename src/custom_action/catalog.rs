use super::action::CustomAction;
use crate::config::{ConfigError, read_json};
use serde::Deserialize;
use std::path::Path;

/// Custom action metadata as stored in the operator's JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionCatalog {
    #[serde(default)]
    actions: Vec<CustomAction>,
}

impl ActionCatalog {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> { read_json(path) }

    /// Full definition for an id-only request.
    pub fn resolve(&self, id: u32) -> Option<CustomAction> {
        self.actions.iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize { self.actions.len() }

    pub fn is_empty(&self) -> bool { self.actions.is_empty() }
}
