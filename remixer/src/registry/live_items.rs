use std::fmt;

use indexmap::IndexMap;

use crate::core::util::HashMap;
use crate::data::RemixValue;
use crate::error::{RemixerError, Result};
use crate::item::RemixerItem;

/// Identifies a lifetime scope (one open screen, one document, ...) that
/// owns a set of items
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

/// A non-owning reference to one live item. Goes stale once its context is
/// destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemHandle {
    context: ContextId,
    item: u64,
}

impl ItemHandle {
    pub fn context(&self) -> ContextId {
        self.context
    }
}

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/item#{}", self.context, self.item)
    }
}

#[derive(Debug)]
struct ContextEntry {
    name: String,
    /// Insertion ordered; the context owns its items outright
    items: IndexMap<u64, RemixerItem>,
}

/// Every live item, owned per context, plus an index from key to the
/// handles sharing it in insertion order. Mutated only by [`super::Remixer`];
/// synchronization mechanisms get mutable access for silent sets.
#[derive(Debug, Default)]
pub struct LiveItems {
    contexts: HashMap<ContextId, ContextEntry>,
    by_key: IndexMap<String, Vec<ItemHandle>>,
    next_context: u64,
    next_item: u64,
}

impl LiveItems {
    pub fn get(&self, handle: ItemHandle) -> Option<&RemixerItem> {
        self.contexts
            .get(&handle.context)
            .and_then(|entry| entry.items.get(&handle.item))
    }

    pub fn get_mut(&mut self, handle: ItemHandle) -> Option<&mut RemixerItem> {
        self.contexts
            .get_mut(&handle.context)
            .and_then(|entry| entry.items.get_mut(&handle.item))
    }

    pub fn handles_with_key(&self, key: &str) -> &[ItemHandle] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn items_with_key(&self, key: &str) -> Vec<&RemixerItem> {
        self.handles_with_key(key)
            .iter()
            .filter_map(|handle| self.get(*handle))
            .collect()
    }

    pub fn handles_for_context(&self, context: ContextId) -> Vec<ItemHandle> {
        self.contexts
            .get(&context)
            .map(|entry| {
                entry
                    .items
                    .keys()
                    .map(|item| ItemHandle {
                        context,
                        item: *item,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn items_for_context(&self, context: ContextId) -> Vec<&RemixerItem> {
        self.contexts
            .get(&context)
            .map(|entry| entry.items.values().collect())
            .unwrap_or_default()
    }

    /// Keys with at least one live item, in first-registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn contains_context(&self, context: ContextId) -> bool {
        self.contexts.contains_key(&context)
    }

    pub fn context_name(&self, context: ContextId) -> Option<&str> {
        self.contexts.get(&context).map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.contexts.values().map(|entry| entry.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `value` to one variable and fires only its own callback. See
    /// [`crate::item::Variable::set_value_silently`].
    pub fn set_value_silently(
        &mut self,
        handle: ItemHandle,
        value: RemixValue,
    ) -> Result<()> {
        match self.get_mut(handle) {
            Some(RemixerItem::Variable(variable)) => {
                variable.set_value_silently(value)
            }
            Some(RemixerItem::Trigger(trigger)) => Err(
                RemixerError::violation(trigger.key(), &value, "triggers carry no value"),
            ),
            None => Err(RemixerError::UnknownItem(handle)),
        }
    }

    pub(crate) fn open_context(&mut self, name: &str) -> ContextId {
        let context = ContextId(self.next_context);
        self.next_context += 1;
        self.contexts.insert(
            context,
            ContextEntry {
                name: name.to_string(),
                items: IndexMap::new(),
            },
        );
        context
    }

    pub(crate) fn insert(
        &mut self,
        context: ContextId,
        item: RemixerItem,
    ) -> Result<ItemHandle> {
        let entry = self
            .contexts
            .get_mut(&context)
            .ok_or(RemixerError::UnknownContext(context))?;

        let handle = ItemHandle {
            context,
            item: self.next_item,
        };
        self.next_item += 1;

        self.by_key
            .entry(item.key().to_string())
            .or_default()
            .push(handle);
        entry.items.insert(handle.item, item);

        Ok(handle)
    }

    /// Drops the context along with every item it owns. Key groups left empty
    /// are removed from the index.
    pub(crate) fn remove_context(
        &mut self,
        context: ContextId,
    ) -> Option<Vec<RemixerItem>> {
        let entry = self.contexts.remove(&context)?;

        for item in entry.items.values() {
            if let Some(handles) = self.by_key.get_mut(item.key()) {
                handles.retain(|handle| handle.context != context);
                if handles.is_empty() {
                    self.by_key.shift_remove(item.key());
                }
            }
        }

        Some(entry.items.into_values().collect())
    }
}
