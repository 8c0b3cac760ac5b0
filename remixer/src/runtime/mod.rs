pub mod declarations;
pub mod settings;
pub mod storage;
