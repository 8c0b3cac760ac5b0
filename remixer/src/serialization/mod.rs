//! Converts items to and from a transport-neutral JSON tree. Each record
//! names its data type explicitly, and that name alone selects the
//! [`ValueConverter`] used to read it back.

pub mod converters;
mod snapshot;
mod stored_variable;

pub use converters::ValueConverter;
pub use snapshot::*;
pub use stored_variable::*;

pub const KEY: &str = "key";
pub const TITLE: &str = "title";
pub const DATA_TYPE: &str = "dataType";
pub const SELECTED_VALUE: &str = "selectedValue";
pub const POSSIBLE_VALUES: &str = "possibleValues";
pub const MIN_VALUE: &str = "minValue";
pub const MAX_VALUE: &str = "maxValue";
pub const INCREMENT: &str = "increment";
