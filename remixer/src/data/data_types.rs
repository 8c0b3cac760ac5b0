//! The process-wide set of [`DataType`]s and the [`ValueConverter`] each one
//! serializes with. The built-in types are installed the first time the set
//! is touched, so they always exist before any item is constructed.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;

use super::data_type::{BOOLEAN, COLOR, NUMBER, STRING, TRIGGER};
use super::{DataType, ValueKind};
use crate::error::{RemixerError, Result};
use crate::serialization::{ValueConverter, converters};

struct DataTypeEntry {
    data_type: Arc<DataType>,
    converter: Arc<dyn ValueConverter>,
}

struct DataTypes {
    entries: IndexMap<String, DataTypeEntry>,
}

impl DataTypes {
    fn with_builtins() -> Self {
        let mut data_types = Self {
            entries: IndexMap::new(),
        };
        for data_type in DataType::builtins() {
            let converter = converters::for_kind(data_type.kind());
            data_types.insert(data_type, converter);
        }
        data_types
    }

    fn insert(
        &mut self,
        data_type: DataType,
        converter: Arc<dyn ValueConverter>,
    ) -> bool {
        if self.entries.contains_key(data_type.name()) {
            return false;
        }
        self.entries.insert(
            data_type.name().to_string(),
            DataTypeEntry {
                data_type: Arc::new(data_type),
                converter,
            },
        );
        true
    }
}

static DATA_TYPES: LazyLock<RwLock<DataTypes>> =
    LazyLock::new(|| RwLock::new(DataTypes::with_builtins()));

/// Adds a data type to the process-wide set. Registration is idempotent by
/// name: the first registration wins and later ones return `false`.
pub fn register(
    data_type: DataType,
    converter: Arc<dyn ValueConverter>,
) -> bool {
    let name = data_type.name().to_string();
    let inserted = DATA_TYPES.write().insert(data_type, converter);
    if inserted {
        debug!("Registered data type `{}`", name);
    }
    inserted
}

pub fn lookup(name: &str) -> Result<Arc<DataType>> {
    DATA_TYPES
        .read()
        .entries
        .get(name)
        .map(|entry| entry.data_type.clone())
        .ok_or_else(|| RemixerError::UnknownDataType(name.to_string()))
}

pub fn converter_for(data_type: &DataType) -> Result<Arc<dyn ValueConverter>> {
    converter_named(data_type.name())
}

pub fn converter_named(name: &str) -> Result<Arc<dyn ValueConverter>> {
    DATA_TYPES
        .read()
        .entries
        .get(name)
        .map(|entry| entry.converter.clone())
        .ok_or_else(|| RemixerError::UnknownDataType(name.to_string()))
}

pub fn names() -> Vec<String> {
    DATA_TYPES.read().entries.keys().cloned().collect()
}

/// Test teardown only. Built-in types cannot be removed.
#[doc(hidden)]
pub fn unregister(name: &str) {
    if [BOOLEAN, NUMBER, STRING, COLOR, TRIGGER].contains(&name) {
        return;
    }
    DATA_TYPES.write().entries.shift_remove(name);
}

pub fn boolean() -> Arc<DataType> {
    builtin(BOOLEAN)
}

pub fn number() -> Arc<DataType> {
    builtin(NUMBER)
}

pub fn string() -> Arc<DataType> {
    builtin(STRING)
}

pub fn color() -> Arc<DataType> {
    builtin(COLOR)
}

pub fn trigger() -> Arc<DataType> {
    builtin(TRIGGER)
}

fn builtin(name: &str) -> Arc<DataType> {
    lookup(name).unwrap_or_else(|_| {
        let data_type = DataType::builtins()
            .into_iter()
            .find(|data_type| data_type.name() == name)
            .unwrap_or_else(|| DataType::new(name, ValueKind::None));
        Arc::new(data_type)
    })
}
