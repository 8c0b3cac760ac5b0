use log::{debug, info};

use super::{ContextId, ItemHandle, LiveItems};
use crate::data::RemixValue;
use crate::error::{RemixerError, Result};
use crate::item::RemixerItem;
use crate::runtime::declarations::Declaration;
use crate::runtime::settings::RemixerSettings;
use crate::runtime::storage::JsonFileStore;
use crate::serialization::Snapshot;
use crate::sync::{LocalMechanism, SynchronizationMechanism};

/// The central keyed store. Owns every live item through its context,
/// rejects incompatible items sharing a key, and routes every change through
/// its [`SynchronizationMechanism`].
///
/// Not thread safe. Confine a `Remixer` to the thread that runs its
/// callbacks.
pub struct Remixer {
    live: LiveItems,
    sync: Box<dyn SynchronizationMechanism>,
    current_context: Option<ContextId>,
}

impl Default for Remixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Remixer {
    /// A registry synchronized in memory by a [`LocalMechanism`]
    pub fn new() -> Self {
        Self::with_mechanism(LocalMechanism::new())
    }

    pub fn with_mechanism<M>(mechanism: M) -> Self
    where
        M: SynchronizationMechanism + 'static,
    {
        Self {
            live: LiveItems::default(),
            sync: Box::new(mechanism),
            current_context: None,
        }
    }

    /// Persists the canonical snapshot to `settings.snapshot_path()` when
    /// `settings.persist` is on, seeding it from whatever is already there
    pub fn from_settings(settings: &RemixerSettings) -> Result<Self> {
        if !settings.persist {
            return Ok(Self::new());
        }
        let path = settings.snapshot_path();
        info!("Persisting variables to {}", path.display());
        let mechanism = LocalMechanism::with_store(JsonFileStore::new(path))?;
        Ok(Self::with_mechanism(mechanism))
    }

    pub fn create_context(&mut self, name: &str) -> ContextId {
        let context = self.live.open_context(name);
        debug!("Created {} ({})", context, name);
        context
    }

    /// Registers `item` under `context`. When other live items already share
    /// its key, the data type and constraints must match theirs; otherwise
    /// nothing is inserted. After insertion the mechanism may overwrite the
    /// item's value with the canonical one.
    pub fn add_item(
        &mut self,
        context: ContextId,
        item: impl Into<RemixerItem>,
    ) -> Result<ItemHandle> {
        let item = item.into();

        if !self.live.contains_context(context) {
            return Err(RemixerError::UnknownContext(context));
        }

        if let Some(existing) = self.live.items_with_key(item.key()).first() {
            existing.check_compatible(&item).map_err(|reason| {
                RemixerError::IncompatibleItemsWithSameKey {
                    key: item.key().to_string(),
                    reason,
                }
            })?;
        }

        let handle = self.live.insert(context, item)?;
        self.sync.on_adding_item(handle, &mut self.live);

        Ok(handle)
    }

    /// Builds and registers every declaration in order, stopping at the first
    /// failure. Items registered before the failure stay live.
    pub fn add_declarations(
        &mut self,
        context: ContextId,
        declarations: Vec<Declaration>,
    ) -> Result<Vec<ItemHandle>> {
        declarations
            .into_iter()
            .map(|declaration| {
                let item = declaration.build()?;
                self.add_item(context, item)
            })
            .collect()
    }

    /// Validates `value` against the item, applies it, fires the item's own
    /// callback and then fans it out to every other live instance with the
    /// same key. A rejected value leaves every instance untouched.
    pub fn set_value(
        &mut self,
        handle: ItemHandle,
        value: impl Into<RemixValue>,
    ) -> Result<()> {
        self.live.set_value_silently(handle, value.into())?;
        self.sync.on_value_changed(handle, &mut self.live);
        Ok(())
    }

    /// Invokes a trigger's action. Firing a trigger without an action is a
    /// no-op.
    pub fn fire(&mut self, handle: ItemHandle) -> Result<()> {
        match self.live.get_mut(handle) {
            Some(RemixerItem::Trigger(trigger)) => {
                trigger.fire();
                Ok(())
            }
            Some(RemixerItem::Variable(variable)) => {
                Err(RemixerError::invalid(variable.key(), "not a trigger"))
            }
            None => Err(RemixerError::UnknownItem(handle)),
        }
    }

    pub fn set_current_context(&mut self, context: ContextId) -> Result<()> {
        if !self.live.contains_context(context) {
            return Err(RemixerError::UnknownContext(context));
        }
        self.current_context = Some(context);
        self.sync.on_context_changed(context, &self.live);
        Ok(())
    }

    pub fn current_context(&self) -> Option<ContextId> {
        self.current_context
    }

    /// Drops every item owned by `context`. The canonical values stay with
    /// the mechanism, so instances created later still converge to them.
    pub fn on_context_destroyed(&mut self, context: ContextId) -> Result<()> {
        let removed = self
            .live
            .remove_context(context)
            .ok_or(RemixerError::UnknownContext(context))?;

        debug!("Destroyed {} with {} items", context, removed.len());

        if self.current_context == Some(context) {
            self.current_context = None;
        }
        self.sync.on_context_removed(context, &self.live);

        Ok(())
    }

    pub fn item(&self, handle: ItemHandle) -> Option<&RemixerItem> {
        self.live.get(handle)
    }

    pub fn value(&self, handle: ItemHandle) -> Option<&RemixValue> {
        self.live.get(handle).and_then(RemixerItem::selected_value)
    }

    pub fn items_with_key(&self, key: &str) -> Vec<&RemixerItem> {
        self.live.items_with_key(key)
    }

    pub fn items_for_context(&self, context: ContextId) -> Vec<&RemixerItem> {
        self.live.items_for_context(context)
    }

    pub fn live(&self) -> &LiveItems {
        &self.live
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.sync.snapshot()
    }

    pub fn mechanism(&self) -> &dyn SynchronizationMechanism {
        self.sync.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::data::Color;
    use crate::item::{Trigger, Variable};
    use crate::runtime::declarations::parse_declarations;

    fn counter() -> (Rc<Cell<usize>>, impl FnMut(&RemixValue) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move |_: &RemixValue| inner.set(inner.get() + 1))
    }

    #[test]
    fn test_fan_out_to_sibling() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let (a_calls, a_callback) = counter();
        let (b_calls, b_callback) = counter();

        let a = remixer
            .add_item(
                context,
                Variable::number("speed", 1.0)
                    .callback(a_callback)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let b = remixer
            .add_item(
                context,
                Variable::number("speed", 1.0)
                    .callback(b_callback)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let before = b_calls.get();
        remixer.set_value(a, 4.0).unwrap();

        assert_eq!(remixer.value(b), Some(&4.0.into()));
        assert_eq!(b_calls.get(), before + 1);
        assert_eq!(a_calls.get(), 2);
    }

    #[test]
    fn test_new_instance_converges_and_leaves_first_alone() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let (a_calls, a_callback) = counter();
        let a = remixer
            .add_item(
                context,
                Variable::number("speed", 1.0)
                    .callback(a_callback)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        remixer.set_value(a, 7.0).unwrap();
        let a_before = a_calls.get();

        let b = remixer
            .add_item(context, Variable::number("speed", 2.0).build().unwrap())
            .unwrap();

        assert_eq!(remixer.value(b), Some(&7.0.into()));
        assert_eq!(remixer.value(a), Some(&7.0.into()));
        assert_eq!(a_calls.get(), a_before);
    }

    #[test]
    fn test_incompatible_item_rejected() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        remixer
            .add_item(
                context,
                Variable::range("vol", 10.0, (0.0, 20.0), 5.0).build().unwrap(),
            )
            .unwrap();

        let wrong_type = remixer.add_item(
            context,
            Variable::text("vol", "loud").build().unwrap(),
        );
        assert!(matches!(
            wrong_type,
            Err(RemixerError::IncompatibleItemsWithSameKey { .. })
        ));

        let wrong_range = remixer.add_item(
            context,
            Variable::range("vol", 10.0, (0.0, 30.0), 5.0).build().unwrap(),
        );
        assert!(matches!(
            wrong_range,
            Err(RemixerError::IncompatibleItemsWithSameKey { .. })
        ));

        assert_eq!(remixer.items_with_key("vol").len(), 1);
        assert_eq!(remixer.items_for_context(context).len(), 1);
    }

    #[test]
    fn test_three_instances_each_notified_once() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let mut counts = Vec::new();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let (calls, callback) = counter();
            let handle = remixer
                .add_item(
                    context,
                    Variable::boolean("on", false)
                        .callback(callback)
                        .build()
                        .unwrap(),
                )
                .unwrap();
            counts.push(calls);
            handles.push(handle);
        }

        let before: Vec<usize> = counts.iter().map(|c| c.get()).collect();
        remixer.set_value(handles[1], true).unwrap();

        for (count, before) in counts.iter().zip(before) {
            assert_eq!(count.get(), before + 1);
        }
        for handle in handles {
            assert_eq!(remixer.value(handle), Some(&true.into()));
        }
    }

    #[test]
    fn test_name_instances_report_latest() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let first = remixer
            .add_item(context, Variable::text("name", "a").build().unwrap())
            .unwrap();
        let second = remixer
            .add_item(context, Variable::text("name", "b").build().unwrap())
            .unwrap();

        remixer.set_value(first, "z").unwrap();

        assert_eq!(remixer.value(first), Some(&"z".into()));
        assert_eq!(remixer.value(second), Some(&"z".into()));
    }

    #[test]
    fn test_rejected_value_changes_nothing() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let (calls, callback) = counter();
        let a = remixer
            .add_item(
                context,
                Variable::range("vol", 15.0, (0.0, 20.0), 5.0)
                    .callback(callback)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let b = remixer
            .add_item(
                context,
                Variable::range("vol", 15.0, (0.0, 20.0), 5.0).build().unwrap(),
            )
            .unwrap();
        let before = calls.get();

        let result = remixer.set_value(a, 12.0);
        assert!(matches!(
            result,
            Err(RemixerError::ConstraintViolation { .. })
        ));
        assert_eq!(remixer.value(a), Some(&15.0.into()));
        assert_eq!(remixer.value(b), Some(&15.0.into()));
        assert_eq!(calls.get(), before);
    }

    #[test]
    fn test_non_finite_value_keeps_snapshot_serializable() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let speed = remixer
            .add_item(context, Variable::number("speed", 1.0).build().unwrap())
            .unwrap();
        remixer
            .add_item(context, Variable::boolean("on", true).build().unwrap())
            .unwrap();

        assert!(matches!(
            remixer.set_value(speed, f64::INFINITY),
            Err(RemixerError::ConstraintViolation { .. })
        ));
        assert!(matches!(
            remixer.set_value(speed, f64::NAN),
            Err(RemixerError::ConstraintViolation { .. })
        ));
        assert_eq!(remixer.value(speed), Some(&1.0.into()));

        let json = remixer.snapshot().unwrap().to_json_pretty().unwrap();
        let (restored, rejected) = Snapshot::from_json(&json).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_destroyed_context_keeps_canonical_value() {
        let mut remixer = Remixer::new();
        let first = remixer.create_context("first");

        let a = remixer
            .add_item(first, Variable::color("tint", Color::BLACK).build().unwrap())
            .unwrap();
        remixer.set_value(a, Color::WHITE).unwrap();
        remixer.on_context_destroyed(first).unwrap();

        assert!(remixer.items_with_key("tint").is_empty());
        assert!(remixer.item(a).is_none());
        assert!(matches!(
            remixer.set_value(a, Color::BLACK),
            Err(RemixerError::UnknownItem(_))
        ));
        assert!(matches!(
            remixer.on_context_destroyed(first),
            Err(RemixerError::UnknownContext(_))
        ));

        let second = remixer.create_context("second");
        let b = remixer
            .add_item(second, Variable::color("tint", Color::BLACK).build().unwrap())
            .unwrap();
        assert_eq!(remixer.value(b), Some(&Color::WHITE.into()));
        assert!(remixer.snapshot().unwrap().get("tint").is_some());
    }

    #[test]
    fn test_destroy_only_touches_own_context() {
        let mut remixer = Remixer::new();
        let a = remixer.create_context("a");
        let b = remixer.create_context("b");

        remixer
            .add_item(a, Variable::number("x", 1.0).build().unwrap())
            .unwrap();
        let kept = remixer
            .add_item(b, Variable::number("x", 1.0).build().unwrap())
            .unwrap();

        remixer.set_current_context(a).unwrap();
        remixer.on_context_destroyed(a).unwrap();

        assert_eq!(remixer.current_context(), None);
        assert_eq!(remixer.items_with_key("x").len(), 1);
        assert!(remixer.item(kept).is_some());
    }

    #[test]
    fn test_triggers() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let fired = Rc::new(Cell::new(0));
        let inner = fired.clone();
        let trigger = remixer
            .add_item(
                context,
                Trigger::builder("reset")
                    .action(move || inner.set(inner.get() + 1))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let variable = remixer
            .add_item(context, Variable::number("x", 0.0).build().unwrap())
            .unwrap();

        remixer.fire(trigger).unwrap();
        remixer.fire(trigger).unwrap();
        assert_eq!(fired.get(), 2);

        assert!(remixer.set_value(trigger, 1.0).is_err());
        assert!(remixer.fire(variable).is_err());
    }

    #[test]
    fn test_unknown_context() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("gone");
        remixer.on_context_destroyed(context).unwrap();

        assert!(matches!(
            remixer.add_item(context, Variable::number("x", 0.0).build().unwrap()),
            Err(RemixerError::UnknownContext(_))
        ));
        assert!(remixer.set_current_context(context).is_err());
    }

    #[test]
    fn test_add_declarations() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let inner = seen.clone();
        let declarations = parse_declarations(
            "mode:\n  type: list\n  options: [red, blue]\nreset:\n  type: trigger\n",
        )
        .unwrap()
        .into_iter()
        .map(|d| {
            let inner = inner.clone();
            d.callback(move |value| inner.borrow_mut().push(value.clone()))
        })
        .collect();

        let handles = remixer.add_declarations(context, declarations).unwrap();
        assert_eq!(handles.len(), 2);

        remixer.set_value(handles[0], "blue").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![RemixValue::from("red"), RemixValue::from("blue")]
        );
    }

    #[test]
    fn test_current_context() {
        let mut remixer = Remixer::new();
        let context = remixer.create_context("screen");
        assert_eq!(remixer.current_context(), None);
        remixer.set_current_context(context).unwrap();
        assert_eq!(remixer.current_context(), Some(context));
        assert_eq!(remixer.live().context_name(context), Some("screen"));
    }
}
