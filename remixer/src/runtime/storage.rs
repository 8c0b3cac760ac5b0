use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories_next::BaseDirs;
use log::warn;

use super::settings::RemixerSettings;
use crate::error::Result;
use crate::serialization::Snapshot;
use crate::sync::SnapshotStore;

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("Remixer"))
}

pub fn default_storage_dir() -> String {
    config_dir()
        .or_else(|| {
            BaseDirs::new().map(|bd| bd.home_dir().join(".remixer"))
        })
        .unwrap_or_else(|| PathBuf::from(".remixer"))
        .to_string_lossy()
        .into_owned()
}

fn settings_storage_path(storage_dir: &str) -> PathBuf {
    PathBuf::from(storage_dir).join("settings.json")
}

pub fn save_settings(
    storage_dir: &str,
    settings: &RemixerSettings,
) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(settings)?;
    let path = settings_storage_path(storage_dir);
    write_creating_parent(&path, &json)?;
    Ok(path)
}

pub fn load_settings(storage_dir: &str) -> Result<RemixerSettings> {
    let json = fs::read_to_string(settings_storage_path(storage_dir))?;
    Ok(serde_json::from_str::<RemixerSettings>(&json)?)
}

pub fn load_settings_if_exists(
    storage_dir: &str,
) -> Result<Option<RemixerSettings>> {
    match fs::read_to_string(settings_storage_path(storage_dir)) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    write_creating_parent(path, &snapshot.to_json_pretty()?)
}

/// Missing files load as `None`. Records that cannot be read are logged and
/// skipped.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let (snapshot, rejected) = Snapshot::from_json(&json)?;
    for e in rejected {
        warn!("Skipping stored record in {}: {}", path.display(), e);
    }

    Ok(Some(snapshot))
}

fn write_creating_parent(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// A snapshot kept as pretty JSON in a single file
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        load_snapshot(&self.path)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        save_snapshot(&self.path, snapshot)
    }
}
