use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The semantic kind of value a [`super::DataType`] carries. Triggers carry
/// no value at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Number,
    Text,
    Color,
    None,
}

impl ValueKind {
    /// The value a host gets when it leaves a default "unset": `false`, `0`,
    /// `""` or fully transparent black.
    pub fn zero_value(&self) -> Option<RemixValue> {
        match self {
            ValueKind::Boolean => Some(RemixValue::Boolean(false)),
            ValueKind::Number => Some(RemixValue::Number(0.0)),
            ValueKind::Text => Some(RemixValue::Text(String::new())),
            ValueKind::Color => Some(RemixValue::Color(Color::TRANSPARENT)),
            ValueKind::None => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Color => "color",
            ValueKind::None => "none",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RemixValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    Color(Color),
}

impl RemixValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            RemixValue::Boolean(_) => ValueKind::Boolean,
            RemixValue::Number(_) => ValueKind::Number,
            RemixValue::Text(_) => ValueKind::Text,
            RemixValue::Color(_) => ValueKind::Color,
        }
    }

    /// False only for NaN and infinite numbers, which cannot be serialized
    pub fn is_finite(&self) -> bool {
        self.as_number().is_none_or(f64::is_finite)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let RemixValue::Boolean(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        if let RemixValue::Number(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let RemixValue::Text(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        if let RemixValue::Color(v) = self {
            Some(*v)
        } else {
            None
        }
    }
}

impl fmt::Display for RemixValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemixValue::Boolean(v) => write!(f, "{}", v),
            RemixValue::Number(v) => write!(f, "{}", v),
            RemixValue::Text(v) => write!(f, "{:?}", v),
            RemixValue::Color(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for RemixValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for RemixValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for RemixValue {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for RemixValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for RemixValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<String> for RemixValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RemixValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Color> for RemixValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

/// 32-bit ARGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xff00_0000);
    pub const WHITE: Color = Color(0xffff_ffff);

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(
            (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32,
        )
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xff, r, g, b)
    }

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.0 as u8
    }

    /// `#aarrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:08x}", self.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a #rrggbb or #aarrggbb color")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let bits = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        match hex.len() {
            6 => Ok(Color(0xff00_0000 | bits)),
            8 => Ok(Color(bits)),
            _ => Err(err()),
        }
    }
}
