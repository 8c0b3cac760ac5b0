pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::data::data_types;
pub use crate::data::{Color, DataType, ItemShape, RemixValue, ValueKind};
pub use crate::error::{RemixerError, Result};
pub use crate::item::{
    Constraint, ItemBuilder, RemixerItem, Trigger, TriggerBuilder, Variable,
    VariableBuilder,
};
pub use crate::registry::{ContextId, ItemHandle, LiveItems, Remixer};
pub use crate::runtime::declarations::{
    Declaration, load_declarations, parse_declarations,
};
pub use crate::runtime::settings::RemixerSettings;
pub use crate::runtime::storage::JsonFileStore;
pub use crate::serialization::{Snapshot, StoredVariable, ValueConverter};
pub use crate::sync::{
    LocalMechanism, MemoryStore, SnapshotStore, SynchronizationMechanism,
};
