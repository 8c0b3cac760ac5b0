use std::sync::Arc;

use super::{Constraint, Trigger, TriggerBuilder, Variable, VariableBuilder};
use crate::data::{DataType, ItemShape, RemixValue};
use crate::error::Result;

/// Anything a registry can hold
#[derive(Debug)]
pub enum RemixerItem {
    Variable(Variable),
    Trigger(Trigger),
}

impl RemixerItem {
    pub fn key(&self) -> &str {
        match self {
            RemixerItem::Variable(v) => v.key(),
            RemixerItem::Trigger(t) => t.key(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            RemixerItem::Variable(v) => v.title(),
            RemixerItem::Trigger(t) => t.title(),
        }
    }

    pub fn data_type(&self) -> &Arc<DataType> {
        match self {
            RemixerItem::Variable(v) => v.data_type(),
            RemixerItem::Trigger(t) => t.data_type(),
        }
    }

    pub fn layout_hint(&self) -> Option<&str> {
        match self {
            RemixerItem::Variable(v) => v.layout_hint(),
            RemixerItem::Trigger(t) => t.layout_hint(),
        }
    }

    pub fn shape(&self) -> ItemShape {
        match self {
            RemixerItem::Variable(v) => v.constraint().shape(),
            RemixerItem::Trigger(_) => ItemShape::Trigger,
        }
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.as_variable().map(Variable::constraint)
    }

    pub fn selected_value(&self) -> Option<&RemixValue> {
        self.as_variable().map(Variable::selected_value)
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        if let RemixerItem::Variable(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut Variable> {
        if let RemixerItem::Variable(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_trigger_mut(&mut self) -> Option<&mut Trigger> {
        if let RemixerItem::Trigger(t) = self {
            Some(t)
        } else {
            None
        }
    }

    /// Items sharing a key must agree on data type and constraints. Returns
    /// the reason they don't.
    pub fn check_compatible(
        &self,
        other: &RemixerItem,
    ) -> std::result::Result<(), String> {
        if self.data_type() != other.data_type() {
            return Err(format!(
                "data type `{}` differs from `{}`",
                self.data_type().name(),
                other.data_type().name()
            ));
        }
        if self.constraint() != other.constraint() {
            return Err(format!(
                "constraints {:?} differ from {:?}",
                self.constraint(),
                other.constraint()
            ));
        }
        Ok(())
    }
}

impl From<Variable> for RemixerItem {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

impl From<Trigger> for RemixerItem {
    fn from(trigger: Trigger) -> Self {
        Self::Trigger(trigger)
    }
}

/// A not-yet-validated item, as produced by declaration files
pub enum ItemBuilder {
    Variable(VariableBuilder),
    Trigger(TriggerBuilder),
}

impl ItemBuilder {
    pub fn key(&self) -> &str {
        match self {
            ItemBuilder::Variable(b) => b.key(),
            ItemBuilder::Trigger(b) => b.key(),
        }
    }

    /// Attaches a value callback. Ignored for triggers.
    pub fn callback<F>(self, callback: F) -> Self
    where
        F: FnMut(&RemixValue) + 'static,
    {
        match self {
            ItemBuilder::Variable(b) => {
                ItemBuilder::Variable(b.callback(callback))
            }
            trigger => trigger,
        }
    }

    /// Attaches a trigger action. Ignored for variables.
    pub fn action<F>(self, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        match self {
            ItemBuilder::Trigger(b) => ItemBuilder::Trigger(b.action(action)),
            variable => variable,
        }
    }

    pub fn build(self) -> Result<RemixerItem> {
        match self {
            ItemBuilder::Variable(b) => b.build().map(RemixerItem::from),
            ItemBuilder::Trigger(b) => b.build().map(RemixerItem::from),
        }
    }
}

impl From<VariableBuilder> for ItemBuilder {
    fn from(builder: VariableBuilder) -> Self {
        Self::Variable(builder)
    }
}

impl From<TriggerBuilder> for ItemBuilder {
    fn from(builder: TriggerBuilder) -> Self {
        Self::Trigger(builder)
    }
}
