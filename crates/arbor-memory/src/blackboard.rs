//! [`Blackboard`] – keyed scratch memory.
//!
//! One heterogeneous map from a caller-chosen key type to a
//! [`BlackboardValue`].  Each value kind has a strict getter that reports a
//! missing key or a kind mismatch, and a lenient `try_get_*` twin that
//! yields `None` instead.
//!
//! # Example
//!
//! ```rust
//! use arbor_memory::Blackboard;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum Key {
//!     Ammo,
//!     Alert,
//! }
//!
//! let mut board = Blackboard::new();
//! board.set_int(Key::Ammo, 12);
//!
//! assert_eq!(board.get_int(&Key::Ammo).unwrap(), 12);
//! assert!(board.get_bool(&Key::Alert).is_err());
//! assert_eq!(board.try_get_bool_or(&Key::Alert, false), false);
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use arbor_types::{ArborError, ObjectId, Vector3};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised by strict blackboard access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlackboardError {
    #[error("no {kind} value stored for key {key}")]
    MissingKey { key: String, kind: ValueKind },

    #[error("key {key} holds a {found} value, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("generic value under key {key} is not a {expected}")]
    GenericTypeMismatch { key: String, expected: &'static str },

    #[error("blackboard {board} uses key type {existing}, requested {requested}")]
    KeyTypeMismatch {
        board: String,
        existing: &'static str,
        requested: &'static str,
    },
}

impl From<BlackboardError> for ArborError {
    fn from(err: BlackboardError) -> Self {
        ArborError::Blackboard(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Values
// ─────────────────────────────────────────────────────────────────────────────

/// Discriminant of a [`BlackboardValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Text,
    Vector3,
    Object,
    Generic,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
            ValueKind::Vector3 => "vector3",
            ValueKind::Object => "object",
            ValueKind::Generic => "generic",
        };
        f.write_str(label)
    }
}

/// A value stored on a blackboard.
pub enum BlackboardValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(String),
    Vector3(Vector3),
    /// Reference to a world object; `None` records "nothing".
    Object(Option<ObjectId>),
    Generic(Box<dyn Any + Send + Sync>),
}

impl BlackboardValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BlackboardValue::Int(_) => ValueKind::Int,
            BlackboardValue::Float(_) => ValueKind::Float,
            BlackboardValue::Bool(_) => ValueKind::Bool,
            BlackboardValue::Text(_) => ValueKind::Text,
            BlackboardValue::Vector3(_) => ValueKind::Vector3,
            BlackboardValue::Object(_) => ValueKind::Object,
            BlackboardValue::Generic(_) => ValueKind::Generic,
        }
    }
}

impl fmt::Debug for BlackboardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlackboardValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            BlackboardValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            BlackboardValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            BlackboardValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            BlackboardValue::Vector3(v) => f.debug_tuple("Vector3").field(v).finish(),
            BlackboardValue::Object(v) => f.debug_tuple("Object").field(v).finish(),
            BlackboardValue::Generic(_) => f.write_str("Generic(..)"),
        }
    }
}

impl From<i32> for BlackboardValue {
    fn from(value: i32) -> Self {
        BlackboardValue::Int(value)
    }
}

impl From<f32> for BlackboardValue {
    fn from(value: f32) -> Self {
        BlackboardValue::Float(value)
    }
}

impl From<bool> for BlackboardValue {
    fn from(value: bool) -> Self {
        BlackboardValue::Bool(value)
    }
}

impl From<String> for BlackboardValue {
    fn from(value: String) -> Self {
        BlackboardValue::Text(value)
    }
}

impl From<&str> for BlackboardValue {
    fn from(value: &str) -> Self {
        BlackboardValue::Text(value.to_string())
    }
}

impl From<Vector3> for BlackboardValue {
    fn from(value: Vector3) -> Self {
        BlackboardValue::Vector3(value)
    }
}

impl From<Option<ObjectId>> for BlackboardValue {
    fn from(value: Option<ObjectId>) -> Self {
        BlackboardValue::Object(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blackboard
// ─────────────────────────────────────────────────────────────────────────────

/// Keyed scratch memory for one agent or one group of agents.
///
/// Storing a value under a key replaces whatever was there, whatever its
/// kind.
pub struct Blackboard<K> {
    values: HashMap<K, BlackboardValue>,
}

impl<K> Default for Blackboard<K> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

macro_rules! typed_accessors {
    ($($kind:ident: $ty:ty => $set:ident, $get:ident, $try_get:ident, $try_get_or:ident;)*) => {
        $(
            pub fn $set(&mut self, key: K, value: $ty) {
                self.values.insert(key, BlackboardValue::$kind(value));
            }

            pub fn $get(&self, key: &K) -> Result<$ty, BlackboardError> {
                match self.values.get(key) {
                    Some(BlackboardValue::$kind(value)) => Ok(value.clone()),
                    Some(other) => Err(BlackboardError::TypeMismatch {
                        key: format!("{key:?}"),
                        expected: ValueKind::$kind,
                        found: other.kind(),
                    }),
                    None => Err(BlackboardError::MissingKey {
                        key: format!("{key:?}"),
                        kind: ValueKind::$kind,
                    }),
                }
            }

            pub fn $try_get(&self, key: &K) -> Option<$ty> {
                match self.values.get(key) {
                    Some(BlackboardValue::$kind(value)) => Some(value.clone()),
                    _ => None,
                }
            }

            pub fn $try_get_or(&self, key: &K, default: $ty) -> $ty {
                self.$try_get(key).unwrap_or(default)
            }
        )*
    };
}

impl<K: Eq + Hash + fmt::Debug> Blackboard<K> {
    pub fn new() -> Self {
        Self::default()
    }

    typed_accessors! {
        Int: i32 => set_int, get_int, try_get_int, try_get_int_or;
        Float: f32 => set_float, get_float, try_get_float, try_get_float_or;
        Bool: bool => set_bool, get_bool, try_get_bool, try_get_bool_or;
        Text: String => set_text, get_text, try_get_text, try_get_text_or;
        Vector3: Vector3 => set_vector3, get_vector3, try_get_vector3, try_get_vector3_or;
        Object: Option<ObjectId> => set_object, get_object, try_get_object, try_get_object_or;
    }

    /// Store any value convertible into a [`BlackboardValue`].
    pub fn set(&mut self, key: K, value: impl Into<BlackboardValue>) {
        self.values.insert(key, value.into());
    }

    /// Store an arbitrary value.
    pub fn set_generic<T: Any + Send + Sync>(&mut self, key: K, value: T) {
        self.values.insert(key, BlackboardValue::Generic(Box::new(value)));
    }

    /// Borrow a generic value as `T`.
    ///
    /// # Errors
    ///
    /// - [`BlackboardError::MissingKey`] – nothing stored under `key`.
    /// - [`BlackboardError::TypeMismatch`] – `key` holds a non-generic value.
    /// - [`BlackboardError::GenericTypeMismatch`] – the stored value is not a `T`.
    pub fn get_generic<T: Any>(&self, key: &K) -> Result<&T, BlackboardError> {
        match self.values.get(key) {
            Some(BlackboardValue::Generic(value)) => {
                value
                    .downcast_ref::<T>()
                    .ok_or_else(|| BlackboardError::GenericTypeMismatch {
                        key: format!("{key:?}"),
                        expected: type_name::<T>(),
                    })
            }
            Some(other) => Err(BlackboardError::TypeMismatch {
                key: format!("{key:?}"),
                expected: ValueKind::Generic,
                found: other.kind(),
            }),
            None => Err(BlackboardError::MissingKey {
                key: format!("{key:?}"),
                kind: ValueKind::Generic,
            }),
        }
    }

    pub fn try_get_generic<T: Any>(&self, key: &K) -> Option<&T> {
        match self.values.get(key) {
            Some(BlackboardValue::Generic(value)) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Raw access to whatever is stored under `key`.
    pub fn get_value(&self, key: &K) -> Option<&BlackboardValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<BlackboardValue> {
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: fmt::Debug> fmt::Debug for Blackboard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}
