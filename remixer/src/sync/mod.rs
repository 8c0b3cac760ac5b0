mod local;
mod mechanism;
mod persistence;

pub use local::*;
pub use mechanism::*;
pub use persistence::*;
