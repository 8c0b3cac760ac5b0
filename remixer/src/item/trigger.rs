use std::fmt;
use std::sync::Arc;

use crate::core::util::is_valid_key;
use crate::data::{DataType, ItemShape, data_types};
use crate::error::{RemixerError, Result};

pub type TriggerAction = Box<dyn FnMut()>;

/// A zero-argument action exposed alongside variables. Carries no value.
pub struct Trigger {
    key: String,
    title: String,
    data_type: Arc<DataType>,
    layout: Option<String>,
    action: Option<TriggerAction>,
}

impl Trigger {
    pub fn builder(key: &str) -> TriggerBuilder {
        TriggerBuilder::new(key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn data_type(&self) -> &Arc<DataType> {
        &self.data_type
    }

    pub fn layout_hint(&self) -> Option<&str> {
        self.layout
            .as_deref()
            .or_else(|| self.data_type.default_layout(ItemShape::Trigger))
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Runs the bound action. A cleared action makes this a no-op.
    pub fn fire(&mut self) {
        if let Some(action) = self.action.as_mut() {
            action();
        }
    }

    pub fn set_action<F>(&mut self, action: F)
    where
        F: FnMut() + 'static,
    {
        self.action = Some(Box::new(action));
    }

    pub fn clear_action(&mut self) {
        self.action = None;
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("action", &self.action.as_ref().map(|_| "<function>"))
            .finish()
    }
}

#[derive(Default)]
pub struct TriggerBuilder {
    key: String,
    title: Option<String>,
    layout: Option<String>,
    action: Option<TriggerAction>,
}

impl TriggerBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn layout(mut self, layout: &str) -> Self {
        self.layout = Some(layout.to_string());
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn build(self) -> Result<Trigger> {
        if self.key.is_empty() {
            return Err(RemixerError::invalid(&self.key, "key is empty"));
        }
        if !is_valid_key(&self.key) {
            return Err(RemixerError::invalid(
                &self.key,
                "key is not an identifier",
            ));
        }

        let title = self
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| self.key.clone());

        Ok(Trigger {
            key: self.key,
            title,
            data_type: data_types::trigger(),
            layout: self.layout,
            action: self.action,
        })
    }
}
