use ahash::RandomState;
use std::collections::HashMap as StdHashMap;

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;

/// Tolerance, in steps, used when deciding if a value sits on an increment
const STEP_EPSILON: f64 = 1e-9;

/// Keys follow identifier rules: a leading letter or underscore followed by
/// letters, digits or underscores.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// True when `value` can be reached from `min` by whole steps of `increment`.
pub fn is_on_step(value: f64, min: f64, increment: f64) -> bool {
    if !(value.is_finite() && min.is_finite() && increment > 0.0) {
        return false;
    }
    let steps = (value - min) / increment;
    (steps - steps.round()).abs() <= STEP_EPSILON * steps.abs().max(1.0)
}
