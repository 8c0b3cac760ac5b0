mod data_type;
pub mod data_types;
mod value;

pub use data_type::*;
pub use value::*;
