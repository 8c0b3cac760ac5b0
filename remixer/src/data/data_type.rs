use indexmap::IndexMap;

use super::ValueKind;

pub const BOOLEAN: &str = "boolean";
pub const NUMBER: &str = "number";
pub const STRING: &str = "string";
pub const COLOR: &str = "color";
pub const TRIGGER: &str = "trigger";

/// The structural shape of an item, used to pick a default presentation hint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemShape {
    Unconstrained,
    Range,
    Options,
    Trigger,
}

/// A named kind of value along with the presentation hints a UI layer should
/// fall back to for each [`ItemShape`]. Two data types are equal when their
/// names and value kinds match; hints do not take part in equality.
#[derive(Clone, Debug)]
pub struct DataType {
    name: String,
    kind: ValueKind,
    layouts: IndexMap<ItemShape, String>,
}

impl DataType {
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            layouts: IndexMap::new(),
        }
    }

    pub fn with_layout(mut self, shape: ItemShape, layout: &str) -> Self {
        self.layouts.insert(shape, layout.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_layout(&self, shape: ItemShape) -> Option<&str> {
        self.layouts.get(&shape).map(String::as_str)
    }

    pub(crate) fn builtins() -> Vec<DataType> {
        vec![
            DataType::new(BOOLEAN, ValueKind::Boolean)
                .with_layout(ItemShape::Unconstrained, "switch"),
            DataType::new(NUMBER, ValueKind::Number)
                .with_layout(ItemShape::Unconstrained, "number_input")
                .with_layout(ItemShape::Range, "seek_bar")
                .with_layout(ItemShape::Options, "item_list"),
            DataType::new(STRING, ValueKind::Text)
                .with_layout(ItemShape::Unconstrained, "text_input")
                .with_layout(ItemShape::Options, "item_list"),
            DataType::new(COLOR, ValueKind::Color)
                .with_layout(ItemShape::Unconstrained, "color_picker")
                .with_layout(ItemShape::Options, "color_swatches"),
            DataType::new(TRIGGER, ValueKind::None)
                .with_layout(ItemShape::Trigger, "button"),
        ]
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for DataType {}
