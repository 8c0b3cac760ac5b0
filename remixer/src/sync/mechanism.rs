use crate::registry::{ContextId, ItemHandle, LiveItems};
use crate::serialization::Snapshot;

/// The strategy a [`crate::Remixer`] consults to keep every live instance of
/// a key consistent. All hooks run synchronously on the registry's thread.
///
/// Implementations must only ever update siblings through
/// [`LiveItems::set_value_silently`]; it never calls back into the mechanism,
/// which is what keeps a change to one of N instances from bouncing between
/// them.
pub trait SynchronizationMechanism {
    /// `item` has just been inserted into `live`. Reconcile it with any
    /// canonical value for its key.
    fn on_adding_item(&mut self, item: ItemHandle, live: &mut LiveItems);

    /// `item` has accepted a new value. Record it and update the other live
    /// instances sharing its key.
    fn on_value_changed(&mut self, item: ItemHandle, live: &mut LiveItems);

    /// `context` became the foreground context
    fn on_context_changed(&mut self, context: ContextId, live: &LiveItems);

    /// `context` and its items are gone from `live`
    fn on_context_removed(&mut self, context: ContextId, live: &LiveItems);

    /// The canonical state, for mechanisms that keep one
    fn snapshot(&self) -> Option<&Snapshot> {
        None
    }
}
