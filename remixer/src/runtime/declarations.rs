//! Declares variables and triggers in a YAML file instead of code. YAML merge
//! keys are supported, so shared settings can be anchored once and merged
//! into several entries.
//!
//! ```yaml
//! volume:
//!   type: range
//!   title: Volume
//!   range: [0, 20]
//!   step: 5
//!   default: 15
//! mode:
//!   type: list
//!   options: [red, blue]
//! reset:
//!   type: trigger
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde_yml::{Mapping, Value};
use yaml_merge_keys::merge_keys_serde_yml;

use crate::data::{Color, RemixValue, ValueKind, data_types};
use crate::error::{RemixerError, Result};
use crate::item::{
    Constraint, ItemBuilder, RemixerItem, Trigger, Variable, VariableBuilder,
};

/// One declared item, waiting for an optional callback or action before it
/// is built
pub struct Declaration {
    builder: ItemBuilder,
}

impl Declaration {
    pub fn key(&self) -> &str {
        self.builder.key()
    }

    pub fn callback<F>(self, callback: F) -> Self
    where
        F: FnMut(&RemixValue) + 'static,
    {
        Self {
            builder: self.builder.callback(callback),
        }
    }

    pub fn action<F>(self, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            builder: self.builder.action(action),
        }
    }

    pub fn into_builder(self) -> ItemBuilder {
        self.builder
    }

    pub fn build(self) -> Result<RemixerItem> {
        self.builder.build()
    }
}

pub fn load_declarations(path: &Path) -> Result<Vec<Declaration>> {
    let source = fs::read_to_string(path)?;
    debug!("Loading declarations from {}", path.display());
    parse_declarations(&source)
}

pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>> {
    let raw: Value = serde_yml::from_str(source)?;
    let merged = merge_keys_serde_yml(raw)?;

    let mapping = merged.as_mapping().ok_or_else(|| {
        RemixerError::InvalidDeclarations(
            "top-level YAML must be a mapping".to_string(),
        )
    })?;

    let mut declarations = Vec::new();

    for (key, entry) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        let Some(entry) = entry.as_mapping() else {
            continue;
        };
        let Some(item_type) = get_string(entry, "type").map(str::to_lowercase)
        else {
            debug!("Skipping `{}`; it has no `type`", key);
            continue;
        };

        declarations.push(Declaration {
            builder: declare(key, &item_type, entry)?,
        });
    }

    Ok(declarations)
}

fn declare(key: &str, item_type: &str, entry: &Mapping) -> Result<ItemBuilder> {
    if item_type == "trigger" {
        let mut builder = Trigger::builder(key);
        if let Some(title) = get_string(entry, "title") {
            builder = builder.title(title);
        }
        if let Some(layout) = get_string(entry, "layout") {
            builder = builder.layout(layout);
        }
        return Ok(builder.into());
    }

    let builder = match item_type {
        "boolean" => Variable::boolean(
            key,
            get_bool(entry, "default").unwrap_or(false),
        ),
        "number" => {
            Variable::number(key, get_f64(entry, "default").unwrap_or(0.0))
        }
        "string" => Variable::text(
            key,
            get_string(entry, "default").unwrap_or_default(),
        ),
        "color" => {
            let color = match get_string(entry, "default") {
                Some(hex) => hex.parse::<Color>().map_err(|e| {
                    RemixerError::invalid(key, e.to_string())
                })?,
                None => Color::TRANSPARENT,
            };
            Variable::color(key, color)
        }
        "range" => {
            let range = get_range(entry).ok_or_else(|| {
                RemixerError::invalid(key, "range requires `range: [min, max]`")
            })?;
            Variable::range(
                key,
                get_f64(entry, "default").unwrap_or(0.0),
                range,
                get_f64(entry, "step").unwrap_or(1.0),
            )
        }
        "list" => declare_list(key, entry)?,
        other => {
            return Err(RemixerError::invalid(
                key,
                format!("unknown type `{}`", other),
            ));
        }
    };

    let mut builder = builder;
    if let Some(title) = get_string(entry, "title") {
        builder = builder.title(title);
    }
    if let Some(layout) = get_string(entry, "layout") {
        builder = builder.layout(layout);
    }

    Ok(builder.into())
}

fn declare_list(key: &str, entry: &Mapping) -> Result<VariableBuilder> {
    let options = entry
        .get(Value::String("options".to_string()))
        .and_then(Value::as_sequence)
        .ok_or_else(|| {
            RemixerError::invalid(key, "list requires an `options` sequence")
        })?;

    let data_type = match get_string(entry, "data_type") {
        Some(name) => data_types::lookup(name)?,
        None if options.iter().all(Value::is_number) => data_types::number(),
        None => data_types::string(),
    };
    let kind = data_type.kind();

    let options = options
        .iter()
        .map(|option| {
            to_remix_value(option, kind).ok_or_else(|| {
                RemixerError::invalid(
                    key,
                    format!("option {:?} is not a {} value", option, kind),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut builder = VariableBuilder::new(key)
        .data_type(data_type.name())
        .constraint(Constraint::Options(options));

    if let Some(default) = entry.get(Value::String("default".to_string())) {
        let value = to_remix_value(default, kind).ok_or_else(|| {
            RemixerError::invalid(
                key,
                format!("default {:?} is not a {} value", default, kind),
            )
        })?;
        builder = builder.default_value(value);
    }

    Ok(builder)
}

fn to_remix_value(value: &Value, kind: ValueKind) -> Option<RemixValue> {
    match kind {
        ValueKind::Boolean => value.as_bool().map(RemixValue::Boolean),
        ValueKind::Number => value.as_f64().map(RemixValue::Number),
        ValueKind::Text => match value {
            Value::String(s) => Some(RemixValue::from(s.as_str())),
            Value::Number(n) => Some(RemixValue::Text(n.to_string())),
            Value::Bool(b) => Some(RemixValue::Text(b.to_string())),
            _ => None,
        },
        ValueKind::Color => value
            .as_str()
            .and_then(|s| s.parse::<Color>().ok())
            .map(RemixValue::Color),
        ValueKind::None => None,
    }
}

fn get_string<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a str> {
    mapping
        .get(Value::String(key.to_string()))
        .and_then(Value::as_str)
}

fn get_bool(mapping: &Mapping, key: &str) -> Option<bool> {
    mapping
        .get(Value::String(key.to_string()))
        .and_then(Value::as_bool)
}

fn get_f64(mapping: &Mapping, key: &str) -> Option<f64> {
    match mapping.get(Value::String(key.to_string())) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.parse::<f64>().ok(),
        _ => None,
    }
}

fn get_range(mapping: &Mapping) -> Option<(f64, f64)> {
    let range = mapping
        .get(Value::String("range".to_string()))
        .and_then(Value::as_sequence)?;
    match range.as_slice() {
        [min, max] => Some((min.as_f64()?, max.as_f64()?)),
        _ => None,
    }
}
