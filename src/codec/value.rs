// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration snapshot value model.
//!
//! A [`Snapshot`] maps field names to [`Value`]s. Collections hold
//! [`Scalar`]s only; nested structure is expressed with [`Value::Blocks`].
//!
//! # Example
//!
//! ```
//! use statuscake_sync::codec::{Snapshot, Value};
//!
//! let group = Snapshot::new()
//!     .with("name", "Ops")
//!     .with("email_addresses", Value::set(["b@x.com", "a@x.com"]));
//!
//! assert_eq!(group.get("name"), Some(&Value::from("Ops")));
//! ```

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::FieldError;

// =============================================================================
// Scalar
// =============================================================================

/// A single string, integer or boolean.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    String(String),
    Int(i64),
    Bool(bool),
}

impl Scalar {
    /// Borrow the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, parsing numeric strings.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::String(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A field value inside a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    /// Ordered list of scalars.
    List(Vec<Scalar>),
    /// Unordered, deduplicated set of scalars.
    Set(BTreeSet<Scalar>),
    /// Nested blocks. Single-instance blocks hold at most one element.
    Blocks(Vec<Snapshot>),
}

impl Value {
    /// Build a set from any iterator of scalars.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build an ordered list from any iterator of scalars.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// A single nested block.
    #[must_use]
    pub fn block(snapshot: Snapshot) -> Self {
        Value::Blocks(vec![snapshot])
    }

    /// Name of the variant, used in type mismatch messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Blocks(_) => "block",
        }
    }

    /// `true` for collections and block lists without elements.
    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::List(items) => items.is_empty(),
            Value::Set(items) => items.is_empty(),
            Value::Blocks(blocks) => blocks.is_empty(),
            _ => false,
        }
    }

    /// Convert a collection of scalars to strings.
    ///
    /// Each element is rendered on its own; blocks are rejected rather than
    /// being joined into one string.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for scalars and blocks
    pub fn to_string_list(&self, field: &str) -> Result<Vec<String>, FieldError> {
        match self {
            Value::List(items) => Ok(items.iter().map(Scalar::to_string).collect()),
            Value::Set(items) => Ok(items.iter().map(Scalar::to_string).collect()),
            other => Err(FieldError::new(
                field,
                format!("expected a list or set of scalars, got {}", other.type_name()),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Snapshot> for Value {
    fn from(value: Snapshot) -> Self {
        Value::block(value)
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::String(s) => Value::String(s),
            Scalar::Int(i) => Value::Int(i),
            Scalar::Bool(b) => Value::Bool(b),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Field name to value mapping describing one resource or nested block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    fields: BTreeMap<String, Value>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Insert only when a value is present.
    pub fn insert_opt<V: Into<Value>>(&mut self, field: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(field, value);
        }
    }

    /// Insert a set, omitting it when absent or empty.
    pub fn insert_set<I, T>(&mut self, field: &str, items: Option<I>)
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        if let Some(items) = items {
            let set = Value::set(items);
            if !set.is_empty_collection() {
                self.insert(field, set);
            }
        }
    }

    /// Insert a single nested block, omitting it when empty.
    pub fn insert_block(&mut self, field: &str, block: Snapshot) {
        if !block.is_empty() {
            self.insert(field, Value::block(block));
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy with empty collections removed, recursively.
    ///
    /// An empty set and an absent set are observationally the same.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let fields = self
            .fields
            .iter()
            .filter_map(|(field, value)| {
                let value = match value {
                    Value::Blocks(blocks) => {
                        Value::Blocks(blocks.iter().map(Snapshot::normalized).collect())
                    }
                    Value::List(items) if !items.is_empty() => {
                        Value::Set(items.iter().cloned().collect())
                    }
                    other => other.clone(),
                };
                (!value.is_empty_collection()).then(|| (field.clone(), value))
            })
            .collect();
        Self { fields }
    }

    /// Keep only the named fields.
    #[must_use]
    pub fn project(&self, fields: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(field, _)| fields.contains(&field.as_str()))
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
