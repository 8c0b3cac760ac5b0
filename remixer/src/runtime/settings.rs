use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::storage;

pub const SETTINGS_VERSION: &str = "1";
const DEFAULT_SNAPSHOT_FILE: &str = "remixer_snapshot.json";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RemixerSettings {
    pub version: String,
    pub storage_dir: String,
    pub snapshot_file: String,
    /// Keep the canonical snapshot on disk between runs
    pub persist: bool,
}

impl Default for RemixerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION.to_string(),
            storage_dir: storage::default_storage_dir(),
            snapshot_file: DEFAULT_SNAPSHOT_FILE.to_string(),
            persist: true,
        }
    }
}

impl RemixerSettings {
    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir).join(&self.snapshot_file)
    }
}
