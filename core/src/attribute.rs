//! Typed attribute values shared by properties and components.
//!
//! An [`AttributeValue`] holds exactly one of seven kinds of payload. The
//! active variant *is* the value's [`AttributeType`]; there is no separate
//! type tag that could drift out of sync with the payload.
//!
//! Every type has a canonical default (see [`AttributeValue::default_of`]),
//! which is what a property or component attribute assumes when its type is
//! changed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The kinds of value an [`AttributeValue`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeType {
    String,
    Int,
    Float,
    Bool,
    Color,
    Path,
    Object,
}

impl AttributeType {
    /// All recognized attribute types, in declaration order.
    pub const ALL: [AttributeType; 7] = [
        AttributeType::String,
        AttributeType::Int,
        AttributeType::Float,
        AttributeType::Bool,
        AttributeType::Color,
        AttributeType::Path,
        AttributeType::Object,
    ];

    /// The lowercase name used in settings files and UI labels.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Color => "color",
            Self::Path => "file",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeType {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| AttributeError::InvalidType(s.to_owned()))
    }
}

/// Errors produced by typed attribute access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// The value was read as a type other than its active variant.
    #[error("attribute type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: AttributeType,
        actual: AttributeType,
    },
    /// A type name did not match any of the recognized attribute types.
    #[error("invalid attribute type: {0:?}")]
    InvalidType(String),
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque black, the default color value.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A reference to a map object by its numeric identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef(pub i32);

/// A property or component attribute value.
///
/// Equality and ordering are variant-wise: two values are equal only if they
/// have the same type and the same payload.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum AttributeValue {
    String(String),
    Int(i32),
    Float(f32),
    Bool(bool),
    Color(Color),
    Path(PathBuf),
    Object(ObjectRef),
}

impl Default for AttributeValue {
    /// An empty string.
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl AttributeValue {
    /// Returns the canonical default value of `ty`.
    pub fn default_of(ty: AttributeType) -> Self {
        match ty {
            AttributeType::String => Self::String(String::new()),
            AttributeType::Int => Self::Int(0),
            AttributeType::Float => Self::Float(0.0),
            AttributeType::Bool => Self::Bool(false),
            AttributeType::Color => Self::Color(Color::BLACK),
            AttributeType::Path => Self::Path(PathBuf::new()),
            AttributeType::Object => Self::Object(ObjectRef(0)),
        }
    }

    /// Returns the type of the active variant.
    pub fn ty(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::Int(_) => AttributeType::Int,
            Self::Float(_) => AttributeType::Float,
            Self::Bool(_) => AttributeType::Bool,
            Self::Color(_) => AttributeType::Color,
            Self::Path(_) => AttributeType::Path,
            Self::Object(_) => AttributeType::Object,
        }
    }

    /// Replaces the value, possibly changing its type.
    pub fn set(&mut self, value: impl Into<AttributeValue>) {
        *self = value.into();
    }

    /// Resets the value to the default of `ty`.
    pub fn reset_to_default(&mut self, ty: AttributeType) {
        *self = Self::default_of(ty);
    }

    /// Resets the value to the default of the type named `name`.
    ///
    /// Fails with [`AttributeError::InvalidType`] if the name is not one of
    /// the recognized types; the value is left untouched in that case.
    pub fn reset_to_default_named(&mut self, name: &str) -> Result<(), AttributeError> {
        let ty = name.parse::<AttributeType>()?;
        self.reset_to_default(ty);
        Ok(())
    }

    /// Returns `true` if the value equals the default of its own type.
    pub fn has_default_value(&self) -> bool {
        *self == Self::default_of(self.ty())
    }

    fn mismatch(&self, expected: AttributeType) -> AttributeError {
        AttributeError::TypeMismatch {
            expected,
            actual: self.ty(),
        }
    }

    pub fn as_string(&self) -> Result<&str, AttributeError> {
        self.try_as_string()
            .ok_or_else(|| self.mismatch(AttributeType::String))
    }

    pub fn as_int(&self) -> Result<i32, AttributeError> {
        self.try_as_int()
            .ok_or_else(|| self.mismatch(AttributeType::Int))
    }

    pub fn as_float(&self) -> Result<f32, AttributeError> {
        self.try_as_float()
            .ok_or_else(|| self.mismatch(AttributeType::Float))
    }

    pub fn as_bool(&self) -> Result<bool, AttributeError> {
        self.try_as_bool()
            .ok_or_else(|| self.mismatch(AttributeType::Bool))
    }

    pub fn as_color(&self) -> Result<Color, AttributeError> {
        self.try_as_color()
            .ok_or_else(|| self.mismatch(AttributeType::Color))
    }

    pub fn as_path(&self) -> Result<&Path, AttributeError> {
        self.try_as_path()
            .ok_or_else(|| self.mismatch(AttributeType::Path))
    }

    pub fn as_object(&self) -> Result<ObjectRef, AttributeError> {
        self.try_as_object()
            .ok_or_else(|| self.mismatch(AttributeType::Object))
    }

    pub fn try_as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn try_as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_color(&self) -> Option<Color> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn try_as_object(&self) -> Option<ObjectRef> {
        match self {
            Self::Object(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Color> for AttributeValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<PathBuf> for AttributeValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<ObjectRef> for AttributeValue {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Color(c) => write!(f, "#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Object(o) => write!(f, "object {}", o.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_string() {
        let value = AttributeValue::default();
        assert_eq!(value.ty(), AttributeType::String);
        assert_eq!(value.as_string().unwrap(), "");
        assert!(value.has_default_value());
    }

    #[test]
    fn set_changes_type() {
        let mut value = AttributeValue::default();
        value.set(42);
        assert_eq!(value.ty(), AttributeType::Int);
        assert_eq!(value.as_int().unwrap(), 42);

        value.set(Color::WHITE);
        assert_eq!(value.ty(), AttributeType::Color);
    }

    #[test]
    fn defaults_per_type() {
        assert_eq!(AttributeValue::default_of(AttributeType::Int), AttributeValue::Int(0));
        assert_eq!(
            AttributeValue::default_of(AttributeType::Float),
            AttributeValue::Float(0.0)
        );
        assert_eq!(
            AttributeValue::default_of(AttributeType::Bool),
            AttributeValue::Bool(false)
        );
        assert_eq!(
            AttributeValue::default_of(AttributeType::Color),
            AttributeValue::Color(Color::rgba(0, 0, 0, 255))
        );
        assert_eq!(
            AttributeValue::default_of(AttributeType::Path),
            AttributeValue::Path(PathBuf::new())
        );
        assert_eq!(
            AttributeValue::default_of(AttributeType::Object),
            AttributeValue::Object(ObjectRef(0))
        );
        for ty in AttributeType::ALL {
            assert!(AttributeValue::default_of(ty).has_default_value());
        }
    }

    #[test]
    fn white_is_not_the_default_color() {
        assert!(!AttributeValue::Color(Color::WHITE).has_default_value());
        assert!(AttributeValue::Color(Color::BLACK).has_default_value());
    }

    #[test]
    fn reset_to_default_changes_type() {
        let mut value = AttributeValue::from("hello");
        value.reset_to_default(AttributeType::Bool);
        assert_eq!(value, AttributeValue::Bool(false));
    }

    #[test]
    fn reset_to_unknown_type_name_fails() {
        let mut value = AttributeValue::from(7);
        let err = value.reset_to_default_named("vector").unwrap_err();
        assert_eq!(err, AttributeError::InvalidType("vector".into()));
        assert_eq!(value, AttributeValue::Int(7));

        value.reset_to_default_named("float").unwrap();
        assert_eq!(value, AttributeValue::Float(0.0));
    }

    #[test]
    fn typed_access_mismatch() {
        let value = AttributeValue::from(1.5f32);
        assert_eq!(value.as_float().unwrap(), 1.5);
        assert_eq!(
            value.as_int().unwrap_err(),
            AttributeError::TypeMismatch {
                expected: AttributeType::Int,
                actual: AttributeType::Float,
            }
        );
        assert_eq!(value.try_as_int(), None);
        assert_eq!(value.try_as_float(), Some(1.5));
    }

    #[test]
    fn equality_is_variant_wise() {
        assert_ne!(AttributeValue::Int(0), AttributeValue::Float(0.0));
        assert_ne!(AttributeValue::Int(0), AttributeValue::Object(ObjectRef(0)));
        assert_eq!(AttributeValue::from("a"), AttributeValue::from(String::from("a")));
        assert!(AttributeValue::Int(1) < AttributeValue::Int(2));
        assert!(AttributeValue::String("z".into()) < AttributeValue::Int(0));
    }

    #[test]
    fn type_names_round_trip() {
        for ty in AttributeType::ALL {
            assert_eq!(ty.name().parse::<AttributeType>().unwrap(), ty);
        }
    }

    #[test]
    fn display_formats() {
        assert_eq!(AttributeValue::from("x").to_string(), "\"x\"");
        assert_eq!(AttributeValue::Color(Color::rgb(255, 0, 16)).to_string(), "#ff0010ff");
        assert_eq!(AttributeValue::Object(ObjectRef(3)).to_string(), "object 3");
    }
}
