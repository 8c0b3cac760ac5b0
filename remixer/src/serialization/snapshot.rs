use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StoredVariable;
use crate::error::{RemixerError, Result};

pub const SNAPSHOT_VERSION: &str = "1";

/// Exactly one [`StoredVariable`] per key, in first-recorded order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    records: IndexMap<String, StoredVariable>,
}

#[derive(Deserialize, Serialize)]
struct SerializableSnapshot {
    version: String,
    variables: IndexMap<String, Value>,
}

impl Snapshot {
    /// Inserts or replaces the record for `stored.key`
    pub fn insert(&mut self, stored: StoredVariable) -> Option<StoredVariable> {
        self.records.insert(stored.key.clone(), stored)
    }

    pub fn get(&self, key: &str) -> Option<&StoredVariable> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut StoredVariable> {
        self.records.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<StoredVariable> {
        self.records.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredVariable> {
        self.records.values()
    }

    pub fn to_tree(&self) -> Result<Value> {
        let variables = self
            .records
            .iter()
            .map(|(key, stored)| -> Result<(String, Value)> {
                Ok((key.clone(), stored.to_tree()?))
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(serde_json::to_value(SerializableSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            variables,
        })?)
    }

    /// Records are read independently: one that fails is skipped and its
    /// error returned alongside everything that could be read.
    pub fn from_tree(tree: Value) -> Result<(Self, Vec<RemixerError>)> {
        let serialized = serde_json::from_value::<SerializableSnapshot>(tree)?;

        if serialized.version != SNAPSHOT_VERSION {
            warn!(
                "Snapshot version {} differs from {}; reading anyway",
                serialized.version, SNAPSHOT_VERSION
            );
        }

        let mut snapshot = Snapshot::default();
        let mut rejected = Vec::new();

        for (key, record) in serialized.variables {
            match StoredVariable::from_tree(&record) {
                Ok(stored) if stored.key == key => {
                    snapshot.insert(stored);
                }
                Ok(stored) => rejected.push(RemixerError::malformed(
                    &key,
                    format!("filed under `{}` but keyed `{}`", key, stored.key),
                )),
                Err(e) => rejected.push(e),
            }
        }

        Ok((snapshot, rejected))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_tree()?)?)
    }

    pub fn from_json(json: &str) -> Result<(Self, Vec<RemixerError>)> {
        Self::from_tree(serde_json::from_str(json)?)
    }
}
