//! Attribute values carried by scene graph nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value held by a node attribute.
///
/// Mirrors the value shapes the host graph persists: scalars, 3-component
/// vectors (colors, normals, translations) and strings (file paths, color
/// space names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vector([f32; 3]),
    Str(String),
}

impl AttrValue {
    /// Scalar view of the value, if it has one.
    ///
    /// Integers and booleans coerce the way the host graph coerces them
    /// when read through a float plug.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f32),
            AttrValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttrValue::Vector(_) | AttrValue::Str(_) => None,
        }
    }

    /// Vector view of the value, if it has one.
    pub fn as_vector(&self) -> Option<[f32; 3]> {
        match self {
            AttrValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// String view of the value, if it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value is vector shaped.
    ///
    /// Conversion fallbacks route vector-shaped inputs to vector slots and
    /// everything else to scalar slots.
    pub fn is_vector(&self) -> bool {
        matches!(self, AttrValue::Vector(_))
    }

    /// Largest component of a vector, or the scalar itself.
    pub fn max_component(&self) -> f32 {
        match self {
            AttrValue::Vector(v) => v[0].max(v[1]).max(v[2]),
            other => other.as_scalar().unwrap_or(0.0),
        }
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<[f32; 3]> for AttrValue {
    fn from(v: [f32; 3]) -> Self {
        AttrValue::Vector(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Bool(v) => write!(f, "{}", *v as i32),
            AttrValue::Vector(v) => write!(f, "({}, {}, {})", v[0], v[1], v[2]),
            AttrValue::Str(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(AttrValue::Float(2.5).as_scalar(), Some(2.5));
        assert_eq!(AttrValue::Int(3).as_scalar(), Some(3.0));
        assert_eq!(AttrValue::Bool(true).as_scalar(), Some(1.0));
        assert_eq!(AttrValue::Vector([1.0, 0.0, 0.0]).as_scalar(), None);
    }

    #[test]
    fn test_max_component() {
        assert_eq!(AttrValue::Vector([0.2, 0.9, 0.5]).max_component(), 0.9);
        assert_eq!(AttrValue::Float(0.3).max_component(), 0.3);
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(AttrValue::from("a/b.hdr"), AttrValue::Str("a/b.hdr".into()));
        assert_eq!(
            AttrValue::from(String::from("a/b.hdr")),
            AttrValue::Str("a/b.hdr".into())
        );
        assert_eq!(AttrValue::Str("x".into()).as_str(), Some("x"));
    }

    #[test]
    fn test_display_matches_log_format() {
        assert_eq!(AttrValue::Vector([0.0, 1.0, 0.0]).to_string(), "(0, 1, 0)");
        assert_eq!(AttrValue::Float(0.8).to_string(), "0.8");
        assert_eq!(AttrValue::Bool(true).to_string(), "1");
    }
}
