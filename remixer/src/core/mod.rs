pub mod logging;
pub mod util;
