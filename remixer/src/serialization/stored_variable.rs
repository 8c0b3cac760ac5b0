use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::DATA_TYPE;
use crate::data::{RemixValue, ValueKind, data_types};
use crate::error::{RemixerError, Result};
use crate::item::{
    Constraint, ItemBuilder, RemixerItem, Trigger, VariableBuilder,
};

/// The serializable projection of one key: its configuration plus the
/// canonical value. Triggers have no `selected_value`.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredVariable {
    pub key: String,
    pub title: String,
    pub data_type: String,
    pub selected_value: Option<RemixValue>,
    pub constraint: Constraint,
}

impl StoredVariable {
    /// Projects `item` through the converter registered for its data type
    pub fn from_item(item: &RemixerItem) -> Result<Self> {
        data_types::converter_for(item.data_type())?.to_stored(item)
    }

    pub fn to_tree(&self) -> Result<Value> {
        data_types::converter_named(&self.data_type)?.to_tree(self)
    }

    /// Reads `dataType` first and hands the rest of the record to that
    /// type's converter. A record whose constraint is malformed, or whose
    /// value that constraint does not allow, is rejected.
    pub fn from_tree(tree: &Value) -> Result<Self> {
        let record = tree.as_object().ok_or_else(|| {
            RemixerError::malformed("", "record is not an object")
        })?;

        let data_type =
            record.get(DATA_TYPE).and_then(Value::as_str).ok_or_else(|| {
                let key = record
                    .get(super::KEY)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                RemixerError::malformed(key, "missing `dataType`")
            })?;

        let stored = data_types::converter_named(data_type)?
            .from_tree(data_type, record)?;
        stored.check_record()?;

        Ok(stored)
    }

    fn check_record(&self) -> Result<()> {
        let kind = data_types::lookup(&self.data_type)?.kind();
        if kind == ValueKind::None {
            return Ok(());
        }

        let reject =
            |e: RemixerError| RemixerError::malformed(&self.key, e.to_string());

        self.constraint
            .validate_structure(&self.key, kind)
            .map_err(reject)?;

        if let Some(value) = &self.selected_value {
            if value.kind() != kind || !value.is_finite() {
                return Err(RemixerError::malformed(
                    &self.key,
                    format!("{} is not a finite {} value", value, kind),
                ));
            }
            self.constraint.check(&self.key, value).map_err(reject)?;
        }

        Ok(())
    }

    /// True when `item` has this record's data type and constraints
    pub fn matches_item(&self, item: &RemixerItem) -> bool {
        self.data_type == item.data_type().name()
            && item.constraint().is_none_or(|c| *c == self.constraint)
    }

    /// Rebuilds the item this record was taken from, minus callbacks
    pub fn to_builder(&self) -> Result<ItemBuilder> {
        let data_type = data_types::lookup(&self.data_type)?;

        if data_type.kind() == ValueKind::None {
            return Ok(Trigger::builder(&self.key).title(&self.title).into());
        }

        let mut builder = VariableBuilder::new(&self.key)
            .title(&self.title)
            .data_type(&self.data_type)
            .constraint(self.constraint.clone());
        if let Some(value) = &self.selected_value {
            builder = builder.default_value(value.clone());
        }

        Ok(builder.into())
    }

    /// Checks `value` against this record's type and constraints
    pub fn validate(&self, value: &RemixValue) -> Result<()> {
        match self.to_builder()?.build()? {
            RemixerItem::Variable(variable) => variable.validate(value),
            RemixerItem::Trigger(trigger) => Err(RemixerError::violation(
                trigger.key(),
                value,
                "triggers carry no value",
            )),
        }
    }
}

impl Serialize for StoredVariable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_tree()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StoredVariable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tree = Value::deserialize(deserializer)?;
        Self::from_tree(&tree).map_err(D::Error::custom)
    }
}
