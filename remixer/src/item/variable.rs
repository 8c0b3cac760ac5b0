use std::fmt;
use std::sync::Arc;

use super::Constraint;
use crate::core::util::is_valid_key;
use crate::data::{Color, DataType, RemixValue, ValueKind, data_types};
use crate::error::{RemixerError, Result};

/// Invoked with the newly applied value
pub type ValueCallback = Box<dyn FnMut(&RemixValue)>;

/// A named, typed, constrained value. Construct one through the
/// [`VariableBuilder`] returned by [`Variable::boolean`], [`Variable::range`],
/// [`Variable::options`] and friends, then hand it to
/// [`crate::Remixer::add_item`].
///
/// # Example
/// ```rust
/// let volume = Variable::range("volume", 15.0, (0.0, 20.0), 5.0)
///     .title("Volume")
///     .callback(|value| println!("volume: {}", value))
///     .build()?;
/// ```
pub struct Variable {
    key: String,
    title: String,
    data_type: Arc<DataType>,
    layout: Option<String>,
    constraint: Constraint,
    value: RemixValue,
    callback: Option<ValueCallback>,
}

impl Variable {
    pub fn boolean(key: &str, value: bool) -> VariableBuilder {
        VariableBuilder::new(key).default_value(value)
    }

    pub fn number(key: &str, value: f64) -> VariableBuilder {
        VariableBuilder::new(key).default_value(value)
    }

    pub fn text(key: &str, value: impl Into<String>) -> VariableBuilder {
        VariableBuilder::new(key).default_value(value.into())
    }

    pub fn color(key: &str, value: Color) -> VariableBuilder {
        VariableBuilder::new(key).default_value(value)
    }

    /// A number constrained to `min..=max` in steps of `increment`. A `value`
    /// of exactly zero that falls outside the range is replaced by `min`.
    pub fn range(
        key: &str,
        value: f64,
        range: (f64, f64),
        increment: f64,
    ) -> VariableBuilder {
        VariableBuilder::new(key)
            .data_type(crate::data::NUMBER)
            .constraint(Constraint::Range {
                min: range.0,
                max: range.1,
                increment,
            })
            .default_value(value)
    }

    /// A value restricted to `options`. Without an explicit
    /// [`VariableBuilder::default_value`] the type's zero-value is selected
    /// when it is listed, otherwise the first option.
    pub fn options<V>(key: &str, options: Vec<V>) -> VariableBuilder
    where
        V: Into<RemixValue>,
    {
        VariableBuilder::new(key).constraint(Constraint::Options(
            options.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn string_options<S>(key: &str, options: &[S]) -> VariableBuilder
    where
        S: AsRef<str>,
    {
        Self::options(
            key,
            options
                .iter()
                .map(|s| s.as_ref().to_string())
                .collect::<Vec<String>>(),
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn data_type(&self) -> &Arc<DataType> {
        &self.data_type
    }

    /// The explicit presentation hint or the data type's default for this
    /// variable's shape
    pub fn layout_hint(&self) -> Option<&str> {
        self.layout.as_deref().or_else(|| {
            self.data_type.default_layout(self.constraint.shape())
        })
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn selected_value(&self) -> &RemixValue {
        &self.value
    }

    pub fn bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn number_value(&self) -> Option<f64> {
        self.value.as_number()
    }

    pub fn string(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn color_value(&self) -> Option<Color> {
        self.value.as_color()
    }

    /// Checks `value` against this variable's kind and constraint without
    /// applying it
    pub fn validate(&self, value: &RemixValue) -> Result<()> {
        if value.kind() != self.data_type.kind() {
            return Err(RemixerError::violation(
                &self.key,
                value,
                format!("expected a {} value", self.data_type.kind()),
            ));
        }
        if !value.is_finite() {
            return Err(RemixerError::violation(
                &self.key,
                value,
                "numbers must be finite",
            ));
        }
        self.constraint.check(&self.key, value)
    }

    /// Applies `value` and fires this instance's callback only. Other live
    /// instances sharing the key are not told about it; synchronization
    /// mechanisms use this to fan a change out without re-entering
    /// themselves. Hosts should go through [`crate::Remixer::set_value`].
    ///
    /// On rejection the prior value is kept and the callback does not fire.
    pub fn set_value_silently(&mut self, value: RemixValue) -> Result<()> {
        self.validate(&value)?;
        self.value = value;
        self.run_callback();
        Ok(())
    }

    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&RemixValue) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    fn run_callback(&mut self) {
        if let Some(callback) = self.callback.as_mut() {
            callback(&self.value);
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("data_type", &self.data_type.name())
            .field("constraint", &self.constraint)
            .field("value", &self.value)
            .field("callback", &self.callback.as_ref().map(|_| "<function>"))
            .finish()
    }
}

/// Collects a variable's configuration; nothing is validated until
/// [`Self::build`].
#[derive(Default)]
pub struct VariableBuilder {
    key: String,
    title: Option<String>,
    layout: Option<String>,
    data_type: Option<String>,
    constraint: Option<Constraint>,
    default: Option<RemixValue>,
    callback: Option<ValueCallback>,
}

impl VariableBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn layout(mut self, layout: &str) -> Self {
        self.layout = Some(layout.to_string());
        self
    }

    /// Names a registered data type explicitly. When omitted the built-in
    /// type matching the default (or first option) is used.
    pub fn data_type(mut self, name: &str) -> Self {
        self.data_type = Some(name.to_string());
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn default_value(mut self, value: impl Into<RemixValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&RemixValue) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Validates the key, then the constraint, then resolves the default and
    /// fires the callback exactly once with it.
    pub fn build(self) -> Result<Variable> {
        let key = self.key;

        if key.is_empty() {
            return Err(RemixerError::invalid(&key, "key is empty"));
        }
        if !is_valid_key(&key) {
            return Err(RemixerError::invalid(&key, "key is not an identifier"));
        }

        let constraint = self.constraint.unwrap_or(Constraint::Unconstrained);
        let data_type =
            resolve_data_type(&key, self.data_type, &constraint, &self.default)?;
        let kind = data_type.kind();

        if kind == ValueKind::None {
            return Err(RemixerError::invalid(
                &key,
                format!("data type `{}` carries no value", data_type.name()),
            ));
        }

        constraint.validate_structure(&key, kind)?;

        if let Some(default) = &self.default {
            if default.kind() != kind {
                return Err(RemixerError::invalid(
                    &key,
                    format!("default {} is not a {} value", default, kind),
                ));
            }
            if !default.is_finite() {
                return Err(RemixerError::invalid(
                    &key,
                    format!("default {} is not a finite number", default),
                ));
            }
        }

        let value = resolve_default(&key, kind, &constraint, self.default)?;
        let title = self
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| key.clone());

        let mut variable = Variable {
            key,
            title,
            data_type,
            layout: self.layout,
            constraint,
            value,
            callback: self.callback,
        };
        variable.run_callback();

        Ok(variable)
    }
}

fn resolve_data_type(
    key: &str,
    name: Option<String>,
    constraint: &Constraint,
    default: &Option<RemixValue>,
) -> Result<Arc<DataType>> {
    if let Some(name) = name {
        return data_types::lookup(&name);
    }

    let inferred = default.as_ref().map(RemixValue::kind).or_else(|| {
        constraint
            .options()
            .and_then(|options| options.first())
            .map(RemixValue::kind)
    });

    match inferred {
        Some(ValueKind::Boolean) => Ok(data_types::boolean()),
        Some(ValueKind::Number) => Ok(data_types::number()),
        Some(ValueKind::Text) => Ok(data_types::string()),
        Some(ValueKind::Color) => Ok(data_types::color()),
        Some(ValueKind::None) | None => Err(RemixerError::invalid(
            key,
            "no data type given and none can be inferred",
        )),
    }
}

fn resolve_default(
    key: &str,
    kind: ValueKind,
    constraint: &Constraint,
    default: Option<RemixValue>,
) -> Result<RemixValue> {
    let zero = kind
        .zero_value()
        .ok_or_else(|| RemixerError::invalid(key, "no zero value"))?;

    match constraint {
        Constraint::Unconstrained => Ok(default.unwrap_or(zero)),
        Constraint::Range { min, .. } => {
            let value = default.unwrap_or(zero.clone());
            if constraint.check(key, &value).is_ok() {
                Ok(value)
            } else if value == zero {
                Ok(RemixValue::Number(*min))
            } else {
                Err(RemixerError::invalid(
                    key,
                    format!("default {} is outside the range or off-step", value),
                ))
            }
        }
        Constraint::Options(options) => match default {
            Some(value) if options.contains(&value) => Ok(value),
            Some(value) => Err(RemixerError::invalid(
                key,
                format!("default {} is not an allowed value", value),
            )),
            None if options.contains(&zero) => Ok(zero),
            None => options
                .first()
                .cloned()
                .ok_or_else(|| RemixerError::invalid(key, "no options")),
        },
    }
}
