use std::sync::Arc;

use serde_json::{Map, Value};

use super::{
    DATA_TYPE, INCREMENT, KEY, MAX_VALUE, MIN_VALUE, POSSIBLE_VALUES,
    SELECTED_VALUE, StoredVariable, TITLE,
};
use crate::data::{Color, RemixValue, ValueKind};
use crate::error::{RemixerError, Result};
use crate::item::{Constraint, RemixerItem};

/// Serializes one data type. Implementors supply the value encoding; the
/// record layout (`key`, `title`, `dataType`, `selectedValue` and either
/// `possibleValues` or `minValue`/`maxValue`/`increment`) is shared.
pub trait ValueConverter: Send + Sync {
    /// The value kind this converter reads and writes
    fn kind(&self) -> ValueKind;

    fn encode(&self, key: &str, value: &RemixValue) -> Result<Value>;

    fn decode(&self, key: &str, tree: &Value) -> Result<RemixValue>;

    /// Reads a value typed by a person, e.g. on a command line
    fn parse(&self, key: &str, text: &str) -> Result<RemixValue>;

    fn to_stored(&self, item: &RemixerItem) -> Result<StoredVariable> {
        let selected_value = item.selected_value().cloned();
        if let Some(value) = &selected_value {
            if value.kind() != self.kind() {
                return Err(RemixerError::malformed(
                    item.key(),
                    format!("{} is not a {} value", value, self.kind()),
                ));
            }
        }

        Ok(StoredVariable {
            key: item.key().to_string(),
            title: item.title().to_string(),
            data_type: item.data_type().name().to_string(),
            selected_value,
            constraint: item
                .constraint()
                .cloned()
                .unwrap_or(Constraint::Unconstrained),
        })
    }

    fn to_tree(&self, stored: &StoredVariable) -> Result<Value> {
        let key = stored.key.as_str();
        let mut record = Map::new();
        record.insert(KEY.into(), Value::String(stored.key.clone()));
        record.insert(TITLE.into(), Value::String(stored.title.clone()));
        record.insert(DATA_TYPE.into(), Value::String(stored.data_type.clone()));

        if self.kind() == ValueKind::None {
            return Ok(Value::Object(record));
        }

        if let Some(value) = &stored.selected_value {
            record.insert(SELECTED_VALUE.into(), self.encode(key, value)?);
        }

        match &stored.constraint {
            Constraint::Unconstrained => {}
            Constraint::Options(options) => {
                let encoded = options
                    .iter()
                    .map(|option| self.encode(key, option))
                    .collect::<Result<Vec<_>>>()?;
                record.insert(POSSIBLE_VALUES.into(), Value::Array(encoded));
            }
            Constraint::Range {
                min,
                max,
                increment,
            } => {
                for (field, bound) in
                    [(MIN_VALUE, min), (MAX_VALUE, max), (INCREMENT, increment)]
                {
                    let encoded =
                        self.encode(key, &RemixValue::Number(*bound))?;
                    record.insert(field.into(), encoded);
                }
            }
        }

        Ok(Value::Object(record))
    }

    fn from_tree(
        &self,
        data_type: &str,
        record: &Map<String, Value>,
    ) -> Result<StoredVariable> {
        let key = match record.get(KEY).and_then(Value::as_str) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(RemixerError::malformed("", "missing `key`")),
        };
        let title = record
            .get(TITLE)
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .unwrap_or(key.as_str())
            .to_string();

        if self.kind() == ValueKind::None {
            return Ok(StoredVariable {
                key,
                title,
                data_type: data_type.to_string(),
                selected_value: None,
                constraint: Constraint::Unconstrained,
            });
        }

        let selected_value = record
            .get(SELECTED_VALUE)
            .ok_or_else(|| RemixerError::malformed(&key, "missing `selectedValue`"))
            .and_then(|tree| self.decode(&key, tree))?;

        let has_range = [MIN_VALUE, MAX_VALUE, INCREMENT]
            .iter()
            .filter(|field| record.contains_key(**field))
            .count();

        let constraint = match (record.get(POSSIBLE_VALUES), has_range) {
            (Some(_), n) if n > 0 => {
                return Err(RemixerError::malformed(
                    &key,
                    "has both `possibleValues` and range fields",
                ));
            }
            (Some(Value::Array(options)), _) => Constraint::Options(
                options
                    .iter()
                    .map(|option| self.decode(&key, option))
                    .collect::<Result<Vec<_>>>()?,
            ),
            (Some(_), _) => {
                return Err(RemixerError::malformed(
                    &key,
                    "`possibleValues` is not a list",
                ));
            }
            (None, 0) => Constraint::Unconstrained,
            (None, 3) => {
                let bound = |field: &str| -> Result<f64> {
                    record
                        .get(field)
                        .map(|tree| self.decode(&key, tree))
                        .transpose()?
                        .and_then(|value| value.as_number())
                        .ok_or_else(|| {
                            RemixerError::malformed(
                                &key,
                                format!("`{}` is not a number", field),
                            )
                        })
                };
                Constraint::Range {
                    min: bound(MIN_VALUE)?,
                    max: bound(MAX_VALUE)?,
                    increment: bound(INCREMENT)?,
                }
            }
            (None, _) => {
                return Err(RemixerError::malformed(
                    &key,
                    "`minValue`, `maxValue` and `increment` must appear together",
                ));
            }
        };

        Ok(StoredVariable {
            key,
            title,
            data_type: data_type.to_string(),
            selected_value: Some(selected_value),
            constraint,
        })
    }
}

/// The built-in converter for a value kind
pub fn for_kind(kind: ValueKind) -> Arc<dyn ValueConverter> {
    match kind {
        ValueKind::Boolean => Arc::new(BooleanConverter),
        ValueKind::Number => Arc::new(NumberConverter),
        ValueKind::Text => Arc::new(TextConverter),
        ValueKind::Color => Arc::new(ColorConverter),
        ValueKind::None => Arc::new(TriggerConverter),
    }
}

fn kind_mismatch(key: &str, value: &RemixValue, kind: ValueKind) -> RemixerError {
    RemixerError::malformed(key, format!("{} is not a {} value", value, kind))
}

fn unexpected(key: &str, tree: &Value, kind: ValueKind) -> RemixerError {
    RemixerError::malformed(key, format!("expected a {} value, got {}", kind, tree))
}

fn unparsable(key: &str, text: &str, kind: ValueKind) -> RemixerError {
    RemixerError::violation(key, text, format!("not a {} value", kind))
}

#[derive(Debug)]
pub struct BooleanConverter;

impl ValueConverter for BooleanConverter {
    fn kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn encode(&self, key: &str, value: &RemixValue) -> Result<Value> {
        value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| kind_mismatch(key, value, self.kind()))
    }

    fn decode(&self, key: &str, tree: &Value) -> Result<RemixValue> {
        tree.as_bool()
            .map(RemixValue::Boolean)
            .ok_or_else(|| unexpected(key, tree, self.kind()))
    }

    fn parse(&self, key: &str, text: &str) -> Result<RemixValue> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(RemixValue::Boolean(true)),
            "false" | "0" | "off" | "no" => Ok(RemixValue::Boolean(false)),
            _ => Err(unparsable(key, text, self.kind())),
        }
    }
}

#[derive(Debug)]
pub struct NumberConverter;

impl ValueConverter for NumberConverter {
    fn kind(&self) -> ValueKind {
        ValueKind::Number
    }

    fn encode(&self, key: &str, value: &RemixValue) -> Result<Value> {
        let number = value
            .as_number()
            .ok_or_else(|| kind_mismatch(key, value, self.kind()))?;
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .ok_or_else(|| {
                RemixerError::malformed(key, format!("{} is not finite", number))
            })
    }

    fn decode(&self, key: &str, tree: &Value) -> Result<RemixValue> {
        tree.as_f64()
            .map(RemixValue::Number)
            .ok_or_else(|| unexpected(key, tree, self.kind()))
    }

    fn parse(&self, key: &str, text: &str) -> Result<RemixValue> {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(RemixValue::Number)
            .ok_or_else(|| unparsable(key, text, self.kind()))
    }
}

#[derive(Debug)]
pub struct TextConverter;

impl ValueConverter for TextConverter {
    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn encode(&self, key: &str, value: &RemixValue) -> Result<Value> {
        value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| kind_mismatch(key, value, self.kind()))
    }

    fn decode(&self, key: &str, tree: &Value) -> Result<RemixValue> {
        tree.as_str()
            .map(RemixValue::from)
            .ok_or_else(|| unexpected(key, tree, self.kind()))
    }

    fn parse(&self, _key: &str, text: &str) -> Result<RemixValue> {
        Ok(RemixValue::from(text))
    }
}

/// Colors travel as `#aarrggbb` strings
#[derive(Debug)]
pub struct ColorConverter;

impl ValueConverter for ColorConverter {
    fn kind(&self) -> ValueKind {
        ValueKind::Color
    }

    fn encode(&self, key: &str, value: &RemixValue) -> Result<Value> {
        value
            .as_color()
            .map(|color| Value::String(color.to_hex()))
            .ok_or_else(|| kind_mismatch(key, value, self.kind()))
    }

    fn decode(&self, key: &str, tree: &Value) -> Result<RemixValue> {
        tree.as_str()
            .and_then(|s| s.parse::<Color>().ok())
            .map(RemixValue::Color)
            .ok_or_else(|| unexpected(key, tree, self.kind()))
    }

    fn parse(&self, key: &str, text: &str) -> Result<RemixValue> {
        text.parse::<Color>()
            .map(RemixValue::Color)
            .map_err(|_| unparsable(key, text, self.kind()))
    }
}

/// Triggers serialize only `key`, `title` and `dataType`
#[derive(Debug)]
pub struct TriggerConverter;

impl ValueConverter for TriggerConverter {
    fn kind(&self) -> ValueKind {
        ValueKind::None
    }

    fn encode(&self, key: &str, value: &RemixValue) -> Result<Value> {
        Err(kind_mismatch(key, value, self.kind()))
    }

    fn decode(&self, key: &str, tree: &Value) -> Result<RemixValue> {
        Err(unexpected(key, tree, self.kind()))
    }

    fn parse(&self, key: &str, text: &str) -> Result<RemixValue> {
        Err(unparsable(key, text, self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse() {
        let boolean = for_kind(ValueKind::Boolean);
        assert_eq!(boolean.parse("k", "on").unwrap(), true.into());
        assert!(boolean.parse("k", "maybe").is_err());

        let number = for_kind(ValueKind::Number);
        assert_eq!(number.parse("k", " 2.5 ").unwrap(), 2.5.into());
        assert!(number.parse("k", "NaN").is_err());
        assert!(number.parse("k", "ten").is_err());

        let color = for_kind(ValueKind::Color);
        assert_eq!(
            color.parse("k", "#00ff00").unwrap(),
            Color::rgb(0, 255, 0).into()
        );

        assert!(for_kind(ValueKind::None).parse("k", "x").is_err());
    }

    #[test]
    fn test_encode_rejects_wrong_kind() {
        assert!(for_kind(ValueKind::Number).encode("k", &"1".into()).is_err());
        assert!(for_kind(ValueKind::Text).encode("k", &1.into()).is_err());
    }

    #[test]
    fn test_color_encodes_as_hex_string() {
        let encoded = for_kind(ValueKind::Color)
            .encode("k", &Color::rgb(255, 0, 0).into())
            .unwrap();
        assert_eq!(encoded, json!("#ffff0000"));
    }

    #[test]
    fn test_from_tree_rejects_partial_range() {
        let record = json!({
            "key": "vol",
            "dataType": "number",
            "selectedValue": 1.0,
            "minValue": 0.0,
            "maxValue": 4.0,
        });
        let err = for_kind(ValueKind::Number)
            .from_tree("number", record.as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, RemixerError::MalformedRecord { .. }));
    }

    #[test]
    fn test_from_tree_rejects_both_constraint_forms() {
        let record = json!({
            "key": "vol",
            "dataType": "number",
            "selectedValue": 1.0,
            "possibleValues": [1.0, 2.0],
            "minValue": 0.0,
            "maxValue": 4.0,
            "increment": 1.0,
        });
        let err = for_kind(ValueKind::Number)
            .from_tree("number", record.as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, RemixerError::MalformedRecord { .. }));
    }

    #[test]
    fn test_from_tree_title_defaults_to_key() {
        let record = json!({
            "key": "flag",
            "dataType": "boolean",
            "selectedValue": true,
        });
        let stored = for_kind(ValueKind::Boolean)
            .from_tree("boolean", record.as_object().unwrap())
            .unwrap();
        assert_eq!(stored.title, "flag");
        assert_eq!(stored.constraint, Constraint::Unconstrained);
    }
}
