// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed accessors used by the per-kind expand functions.
//!
//! Every accessor names the offending field in its [`FieldError`], so a
//! failed expand can be reported without further context.

use std::collections::BTreeSet;

use super::value::{Scalar, Snapshot, Value};
use crate::error::FieldError;

type FieldResult<T> = Result<T, FieldError>;

/// Reject fields not named in `known`.
///
/// # Errors
///
/// Returns a [`FieldError`] naming the first unknown field
pub fn check_known(snapshot: &Snapshot, known: &[&str]) -> FieldResult<()> {
    match snapshot.keys().find(|field| !known.contains(field)) {
        Some(field) => Err(FieldError::new(
            field,
            format!("unknown field, expected one of {}", render_set(known)),
        )),
        None => Ok(()),
    }
}

fn mismatch(field: &str, expected: &str, got: &Value) -> FieldError {
    FieldError::new(field, format!("expected {expected}, got {}", got.type_name()))
}

fn missing(field: &str) -> FieldError {
    FieldError::new(field, "required field is missing")
}

// =============================================================================
// Scalars
// =============================================================================

/// Read an optional string.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is not a string
pub fn optional_string(snapshot: &Snapshot, field: &str) -> FieldResult<Option<String>> {
    match snapshot.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(field, "a string", other)),
    }
}

/// Read a required, non-empty string.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is missing, empty or not a string
pub fn required_string(snapshot: &Snapshot, field: &str) -> FieldResult<String> {
    match optional_string(snapshot, field)? {
        Some(s) if !s.is_empty() => Ok(s),
        Some(_) => Err(FieldError::new(field, "must not be empty")),
        None => Err(missing(field)),
    }
}

/// Read an optional integer. Numeric strings are accepted.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is not an integer
pub fn optional_int(snapshot: &Snapshot, field: &str) -> FieldResult<Option<i64>> {
    match snapshot.get(field) {
        None => Ok(None),
        Some(Value::Int(i)) => Ok(Some(*i)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| FieldError::new(field, format!("expected an integer, got {s:?}"))),
        Some(other) => Err(mismatch(field, "an integer", other)),
    }
}

/// Read a required integer.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is missing or not an integer
pub fn required_int(snapshot: &Snapshot, field: &str) -> FieldResult<i64> {
    optional_int(snapshot, field)?.ok_or_else(|| missing(field))
}

/// Read an optional boolean. `"true"` and `"false"` strings are accepted.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is not a boolean
pub fn optional_bool(snapshot: &Snapshot, field: &str) -> FieldResult<Option<bool>> {
    match snapshot.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(FieldError::new(field, format!("expected a boolean, got {s:?}"))),
        },
        Some(other) => Err(mismatch(field, "a boolean", other)),
    }
}

/// Narrow an integer to `i32`.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value does not fit
pub fn to_i32(field: &str, value: i64) -> FieldResult<i32> {
    i32::try_from(value).map_err(|_| FieldError::new(field, format!("{value} is out of range")))
}

// =============================================================================
// Collections
// =============================================================================

/// Read an optional set of strings.
///
/// Lists are accepted and deduplicated. The result is sorted, so the payload
/// does not depend on declaration order. A declared empty set yields
/// `Some(vec![])`, which clears the field remotely.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is not a list or set of scalars
pub fn optional_set(snapshot: &Snapshot, field: &str) -> FieldResult<Option<Vec<String>>> {
    let Some(value) = snapshot.get(field) else {
        return Ok(None);
    };
    let items: BTreeSet<String> = value.to_string_list(field)?.into_iter().collect();
    Ok(Some(items.into_iter().collect()))
}

/// Read an optional set of integers, sorted and deduplicated.
///
/// # Errors
///
/// Returns a [`FieldError`] if any element is not an integer
pub fn optional_int_set(snapshot: &Snapshot, field: &str) -> FieldResult<Option<Vec<i64>>> {
    let items: Vec<&Scalar> = match snapshot.get(field) {
        None => return Ok(None),
        Some(Value::List(items)) => items.iter().collect(),
        Some(Value::Set(items)) => items.iter().collect(),
        Some(other) => return Err(mismatch(field, "a set of integers", other)),
    };
    let mut ints = BTreeSet::new();
    for item in items {
        let int = item
            .as_int()
            .ok_or_else(|| FieldError::new(field, format!("expected an integer, got {item:?}")))?;
        ints.insert(int);
    }
    Ok(Some(ints.into_iter().collect()))
}

/// Read a single-instance nested block.
///
/// An empty block list counts as absent.
///
/// # Errors
///
/// Returns a [`FieldError`] if the value is not a block list or holds more
/// than one block
pub fn optional_block<'a>(snapshot: &'a Snapshot, field: &str) -> FieldResult<Option<&'a Snapshot>> {
    match snapshot.get(field) {
        None => Ok(None),
        Some(Value::Blocks(blocks)) => match blocks.as_slice() {
            [] => Ok(None),
            [block] => Ok(Some(block)),
            _ => Err(FieldError::new(
                field,
                format!("at most one block is allowed, got {}", blocks.len()),
            )),
        },
        Some(other) => Err(mismatch(field, "a block", other)),
    }
}

/// Read a required single-instance block.
///
/// # Errors
///
/// Returns a [`FieldError`] if the block is missing or malformed
pub fn required_block<'a>(snapshot: &'a Snapshot, field: &str) -> FieldResult<&'a Snapshot> {
    optional_block(snapshot, field)?.ok_or_else(|| missing(field))
}

/// Run `f` over a nested block, prefixing any error with the block name.
///
/// # Errors
///
/// Returns the nested error with a dotted field path
pub fn within<T>(
    parent: &str,
    block: &Snapshot,
    f: impl FnOnce(&Snapshot) -> FieldResult<T>,
) -> FieldResult<T> {
    f(block).map_err(|e| e.nested(parent))
}

/// Render values as `{a, b, c}` for error messages.
pub fn render_set<T: std::fmt::Display>(values: &[T]) -> String {
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{joined}}}")
}
