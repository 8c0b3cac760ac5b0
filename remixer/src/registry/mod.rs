mod live_items;
mod remixer;

pub use live_items::*;
pub use remixer::*;
