mod constraint;
mod remixer_item;
mod trigger;
mod variable;

pub use constraint::*;
pub use remixer_item::*;
pub use trigger::*;
pub use variable::*;
