use log::{debug, error, info, warn};

use super::{PersistenceWorker, SnapshotStore, SynchronizationMechanism};
use crate::error::Result;
use crate::item::RemixerItem;
use crate::registry::{ContextId, ItemHandle, LiveItems};
use crate::serialization::{Snapshot, StoredVariable};

/// Keeps one canonical [`StoredVariable`] per key and fans every change out
/// to the other live instances sharing that key. The snapshot outlives the
/// contexts that populated it, so an instance created later converges to the
/// last known value. Optionally persists the snapshot through a
/// [`SnapshotStore`] on a background thread.
#[derive(Default)]
pub struct LocalMechanism {
    snapshot: Snapshot,
    persistence: Option<PersistenceWorker>,
}

impl LocalMechanism {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the canonical state from `store` and persists every subsequent
    /// change to it
    pub fn with_store<S: SnapshotStore>(store: S) -> Result<Self> {
        let snapshot = store.load()?.unwrap_or_default();
        if !snapshot.is_empty() {
            info!("Loaded {} stored variables", snapshot.len());
        }
        Ok(Self {
            snapshot,
            persistence: Some(PersistenceWorker::spawn(store)),
        })
    }

    pub fn canonical(&self, key: &str) -> Option<&StoredVariable> {
        self.snapshot.get(key)
    }

    /// Blocks until queued snapshot saves are written. No-op without a store.
    pub fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.flush();
        }
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(self.snapshot.clone());
        }
    }

    fn record_item(&mut self, item: &RemixerItem) {
        match StoredVariable::from_item(item) {
            Ok(stored) => {
                self.snapshot.insert(stored);
                self.persist();
            }
            Err(e) => error!("Unable to snapshot `{}`: {}", item.key(), e),
        }
    }
}

impl SynchronizationMechanism for LocalMechanism {
    fn on_adding_item(&mut self, handle: ItemHandle, live: &mut LiveItems) {
        let Some(item) = live.get(handle) else {
            return;
        };

        let canonical = match self.snapshot.get(item.key()) {
            None => None,
            Some(stored) if stored.matches_item(item) => {
                stored.selected_value.clone()
            }
            Some(stored) => {
                warn!(
                    "Stored `{}` ({}) no longer matches its declaration; replacing it",
                    stored.key, stored.data_type
                );
                None
            }
        };

        match canonical {
            Some(value) => {
                debug!("Converging new `{}` to {}", item.key(), value);
                if let Err(e) = live.set_value_silently(handle, value) {
                    warn!("Stored value rejected ({}); replacing it", e);
                    if let Some(item) = live.get(handle) {
                        self.record_item(item);
                    }
                }
            }
            None => {
                let exists = self.snapshot.get(item.key()).is_some_and(
                    |stored| stored.matches_item(item),
                );
                if !exists {
                    self.record_item(item);
                }
            }
        }
    }

    fn on_value_changed(&mut self, handle: ItemHandle, live: &mut LiveItems) {
        let Some(item) = live.get(handle) else {
            return;
        };
        let Some(value) = item.selected_value().cloned() else {
            return;
        };
        let key = item.key().to_string();

        match self.snapshot.get_mut(&key) {
            Some(stored) => {
                stored.selected_value = Some(value.clone());
                self.persist();
            }
            None => self.record_item(item),
        }

        let siblings: Vec<ItemHandle> = live
            .handles_with_key(&key)
            .iter()
            .copied()
            .filter(|sibling| *sibling != handle)
            .collect();

        for sibling in siblings {
            if let Err(e) = live.set_value_silently(sibling, value.clone()) {
                error!("Unable to update {} for `{}`: {}", sibling, key, e);
            }
        }
    }

    fn on_context_changed(&mut self, context: ContextId, _live: &LiveItems) {
        debug!("Foreground context is now {}", context);
    }

    fn on_context_removed(&mut self, context: ContextId, _live: &LiveItems) {
        debug!("{} removed; canonical values retained", context);
    }

    fn snapshot(&self) -> Option<&Snapshot> {
        Some(&self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Trigger, Variable};
    use crate::sync::MemoryStore;

    fn add(
        mechanism: &mut LocalMechanism,
        live: &mut LiveItems,
        context: ContextId,
        item: RemixerItem,
    ) -> ItemHandle {
        let handle = live.insert(context, item).unwrap();
        mechanism.on_adding_item(handle, live);
        handle
    }

    #[test]
    fn test_first_instance_creates_snapshot() {
        let mut mechanism = LocalMechanism::new();
        let mut live = LiveItems::default();
        let context = live.open_context("a");

        add(
            &mut mechanism,
            &mut live,
            context,
            Variable::number("speed", 3.0).build().unwrap().into(),
        );

        let stored = mechanism.canonical("speed").unwrap();
        assert_eq!(stored.selected_value, Some(3.0.into()));
    }

    #[test]
    fn test_new_instance_converges_to_canonical() {
        let mut mechanism = LocalMechanism::new();
        let mut live = LiveItems::default();
        let context = live.open_context("a");

        add(
            &mut mechanism,
            &mut live,
            context,
            Variable::number("speed", 3.0).build().unwrap().into(),
        );
        let second = add(
            &mut mechanism,
            &mut live,
            context,
            Variable::number("speed", 9.0).build().unwrap().into(),
        );

        assert_eq!(
            live.get(second).unwrap().selected_value(),
            Some(&3.0.into())
        );
        assert_eq!(
            mechanism.canonical("speed").unwrap().selected_value,
            Some(3.0.into())
        );
    }

    #[test]
    fn test_stale_record_is_replaced() {
        let mut mechanism = LocalMechanism::new();
        let mut live = LiveItems::default();
        let first = live.open_context("a");

        add(
            &mut mechanism,
            &mut live,
            first,
            Variable::range("level", 8.0, (0.0, 10.0), 2.0)
                .build()
                .unwrap()
                .into(),
        );
        live.remove_context(first);

        let second = live.open_context("b");
        let handle = add(
            &mut mechanism,
            &mut live,
            second,
            Variable::range("level", 3.0, (0.0, 5.0), 1.0)
                .build()
                .unwrap()
                .into(),
        );

        assert_eq!(
            live.get(handle).unwrap().selected_value(),
            Some(&3.0.into())
        );
        let stored = mechanism.canonical("level").unwrap();
        assert_eq!(stored.selected_value, Some(3.0.into()));
        assert_eq!(
            stored.constraint.range(),
            Some((0.0, 5.0, 1.0))
        );
    }

    #[test]
    fn test_rejected_stored_value_is_replaced() {
        let mut seeded = Snapshot::default();
        seeded.insert(StoredVariable {
            key: "vol".to_string(),
            title: "vol".to_string(),
            data_type: crate::data::NUMBER.to_string(),
            selected_value: Some(12.0.into()),
            constraint: crate::item::Constraint::Range {
                min: 0.0,
                max: 20.0,
                increment: 5.0,
            },
        });
        let store = MemoryStore::with_snapshot(seeded);

        let mut mechanism = LocalMechanism::with_store(store.clone()).unwrap();
        let mut live = LiveItems::default();
        let context = live.open_context("a");
        let handle = add(
            &mut mechanism,
            &mut live,
            context,
            Variable::range("vol", 15.0, (0.0, 20.0), 5.0)
                .build()
                .unwrap()
                .into(),
        );

        assert_eq!(
            live.get(handle).unwrap().selected_value(),
            Some(&15.0.into())
        );
        assert_eq!(
            mechanism.canonical("vol").unwrap().selected_value,
            Some(15.0.into())
        );

        mechanism.flush();
        assert_eq!(
            store.current().unwrap().get("vol").unwrap().selected_value,
            Some(15.0.into())
        );
    }

    #[test]
    fn test_each_change_is_saved_once() {
        let store = MemoryStore::new();
        let mut mechanism = LocalMechanism::with_store(store.clone()).unwrap();
        let mut live = LiveItems::default();
        let context = live.open_context("a");

        // inserted without the mechanism seeing it, so no record exists yet
        let handle = live
            .insert(context, Variable::number("x", 1.0).build().unwrap().into())
            .unwrap();
        live.set_value_silently(handle, 2.0.into()).unwrap();
        mechanism.on_value_changed(handle, &mut live);
        mechanism.flush();
        assert_eq!(store.save_count(), 1);

        live.set_value_silently(handle, 3.0.into()).unwrap();
        mechanism.on_value_changed(handle, &mut live);
        mechanism.flush();
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_triggers_are_recorded_without_value() {
        let mut mechanism = LocalMechanism::new();
        let mut live = LiveItems::default();
        let context = live.open_context("a");

        add(
            &mut mechanism,
            &mut live,
            context,
            Trigger::builder("reset").build().unwrap().into(),
        );

        let stored = mechanism.canonical("reset").unwrap();
        assert_eq!(stored.selected_value, None);
    }

    #[test]
    fn test_store_seeds_and_receives_changes() {
        let item: RemixerItem =
            Variable::text("name", "stored").build().unwrap().into();
        let mut seeded = Snapshot::default();
        seeded.insert(StoredVariable::from_item(&item).unwrap());
        let store = MemoryStore::with_snapshot(seeded);

        let mut mechanism = LocalMechanism::with_store(store.clone()).unwrap();
        let mut live = LiveItems::default();
        let context = live.open_context("a");
        let handle = add(
            &mut mechanism,
            &mut live,
            context,
            Variable::text("name", "fresh").build().unwrap().into(),
        );
        assert_eq!(
            live.get(handle).unwrap().selected_value(),
            Some(&"stored".into())
        );

        live.set_value_silently(handle, "changed".into()).unwrap();
        mechanism.on_value_changed(handle, &mut live);
        mechanism.flush();

        let saved = store.current().unwrap();
        assert_eq!(
            saved.get("name").unwrap().selected_value,
            Some("changed".into())
        );
    }
}
