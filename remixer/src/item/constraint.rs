use crate::core::util::is_on_step;
use crate::data::{ItemShape, RemixValue, ValueKind};
use crate::error::{RemixerError, Result};

/// What a variable accepts beyond matching its data type's value kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    Unconstrained,
    /// Inclusive bounds; every accepted value is `min + n * increment`
    Range { min: f64, max: f64, increment: f64 },
    /// Ordered, non-empty, duplicate-free list of allowed values
    Options(Vec<RemixValue>),
}

impl Constraint {
    pub fn shape(&self) -> ItemShape {
        match self {
            Constraint::Unconstrained => ItemShape::Unconstrained,
            Constraint::Range { .. } => ItemShape::Range,
            Constraint::Options(_) => ItemShape::Options,
        }
    }

    pub fn options(&self) -> Option<&[RemixValue]> {
        if let Constraint::Options(options) = self {
            Some(options)
        } else {
            None
        }
    }

    pub fn range(&self) -> Option<(f64, f64, f64)> {
        if let Constraint::Range {
            min,
            max,
            increment,
        } = self
        {
            Some((*min, *max, *increment))
        } else {
            None
        }
    }

    /// Structural checks run once at construction
    pub(crate) fn validate_structure(
        &self,
        key: &str,
        kind: ValueKind,
    ) -> Result<()> {
        match self {
            Constraint::Unconstrained => Ok(()),
            Constraint::Range {
                min,
                max,
                increment,
            } => {
                if kind != ValueKind::Number {
                    return Err(RemixerError::invalid(
                        key,
                        format!("range requires a number type, got {}", kind),
                    ));
                }
                if !(min.is_finite() && max.is_finite()) {
                    return Err(RemixerError::invalid(
                        key,
                        "range bounds must be finite",
                    ));
                }
                if min > max {
                    return Err(RemixerError::invalid(
                        key,
                        format!("min {} is greater than max {}", min, max),
                    ));
                }
                if !(increment.is_finite() && *increment > 0.0) {
                    return Err(RemixerError::invalid(
                        key,
                        format!("increment {} must be positive", increment),
                    ));
                }
                if !is_on_step(*max, *min, *increment) {
                    return Err(RemixerError::invalid(
                        key,
                        format!(
                            "max {} is not reachable from min {} in steps of {}",
                            max, min, increment
                        ),
                    ));
                }
                Ok(())
            }
            Constraint::Options(options) => {
                if options.is_empty() {
                    return Err(RemixerError::invalid(
                        key,
                        "allowed value list is empty",
                    ));
                }
                for (index, option) in options.iter().enumerate() {
                    if option.kind() != kind {
                        return Err(RemixerError::invalid(
                            key,
                            format!(
                                "allowed value {} is a {}, expected {}",
                                option,
                                option.kind(),
                                kind
                            ),
                        ));
                    }
                    if !option.is_finite() {
                        return Err(RemixerError::invalid(
                            key,
                            format!("allowed value {} is not finite", option),
                        ));
                    }
                    if options[..index].contains(option) {
                        return Err(RemixerError::invalid(
                            key,
                            format!("allowed value {} is listed twice", option),
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    /// Value checks run on every set
    pub(crate) fn check(&self, key: &str, value: &RemixValue) -> Result<()> {
        match self {
            Constraint::Unconstrained => Ok(()),
            Constraint::Range {
                min,
                max,
                increment,
            } => {
                let Some(number) = value.as_number() else {
                    return Err(RemixerError::violation(
                        key,
                        value,
                        "range values must be numbers",
                    ));
                };
                if number < *min || number > *max {
                    return Err(RemixerError::violation(
                        key,
                        value,
                        format!("outside [{}, {}]", min, max),
                    ));
                }
                if !is_on_step(number, *min, *increment) {
                    return Err(RemixerError::violation(
                        key,
                        value,
                        format!(
                            "not reachable from {} in steps of {}",
                            min, increment
                        ),
                    ));
                }
                Ok(())
            }
            Constraint::Options(options) => {
                if options.contains(value) {
                    Ok(())
                } else {
                    Err(RemixerError::violation(
                        key,
                        value,
                        "not one of the allowed values",
                    ))
                }
            }
        }
    }
}
