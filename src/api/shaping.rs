//
//  devops-client
//  api/shaping.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Response Shaping
//!
//! Raw JSON coming back from the platform carries timestamps as strings and enums as
//! names. A [`TypeDescriptor`] declares, per entity, which fields need converting; the
//! [`shape`] function walks a response and applies those conversions without changing
//! its shape: an object stays an object, an array stays an array of the same length
//! and order.
//!
//! ## Field kinds
//!
//! | Kind | Raw value | Shaped value |
//! |------|-----------|--------------|
//! | `DateTime` | ISO-8601 string | [`ShapedValue::DateTime`] in UTC |
//! | `Enum` | Enum member name | Its numeric value |
//! | `Nested` | Object or array of objects | Recursively shaped |
//!
//! `null`, absent fields and empty strings are left untouched. Anything else that does
//! not fit the declared kind fails the whole call: a silent pass-through would hide a
//! data-contract drift from callers.
//!
//! ## Example
//!
//! ```rust
//! use devops_client::api::shaping::{shape, FieldKind, TypeDescriptor};
//! use serde_json::json;
//!
//! static WIDGET: TypeDescriptor =
//!     TypeDescriptor::new("Widget", &[("createdOn", FieldKind::DateTime)]);
//!
//! let raw = json!({"createdOn": "2024-01-05T10:00:00Z", "id": 7});
//! let shaped = shape(raw, Some(&WIDGET), false).unwrap();
//!
//! assert!(shaped.get("createdOn").unwrap().as_datetime().is_some());
//! assert_eq!(shaped.get("id").unwrap().as_i64(), Some(7));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use super::common::ApiError;

/// How a declared field is converted.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// ISO-8601 timestamp string.
    DateTime,
    /// Enum member name, converted to its numeric value.
    Enum(&'static EnumDescriptor),
    /// Sub-object (or array of sub-objects) described by another descriptor.
    Nested(&'static TypeDescriptor),
}

/// Field-level conversion rules for one entity.
///
/// Descriptors are static data: defined once, read-only, shared by every call.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Entity name, used for registry lookups.
    pub name: &'static str,
    /// Field name to conversion kind.
    pub fields: &'static [(&'static str, FieldKind)],
}

impl TypeDescriptor {
    /// Creates a descriptor. Usable in `static` items.
    pub const fn new(name: &'static str, fields: &'static [(&'static str, FieldKind)]) -> Self {
        Self { name, fields }
    }

    /// The declared kind of `field`, if any.
    pub fn field(&self, field: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
    }
}

/// Member names and numeric values of a platform enum.
#[derive(Debug)]
pub struct EnumDescriptor {
    /// Enum name, used in error messages.
    pub name: &'static str,
    /// Member name to numeric value.
    pub values: &'static [(&'static str, i64)],
}

impl EnumDescriptor {
    /// Creates an enum descriptor. Usable in `static` items.
    pub const fn new(name: &'static str, values: &'static [(&'static str, i64)]) -> Self {
        Self { name, values }
    }

    /// Looks up a member by name, ignoring case.
    pub fn value_of(&self, member: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(member))
            .map(|(_, value)| *value)
    }
}

/// A registry of named type descriptors.
///
/// # Example
///
/// ```rust
/// use devops_client::api::shaping::TypeRegistry;
///
/// let registry = TypeRegistry::builtin();
/// assert!(registry.get("build").is_some());
/// assert!(registry.get("NoSuchType").is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeRegistry {
    descriptors: &'static [&'static TypeDescriptor],
}

impl TypeRegistry {
    /// Creates a registry over a static table.
    pub const fn new(descriptors: &'static [&'static TypeDescriptor]) -> Self {
        Self { descriptors }
    }

    /// The descriptors shipped with this crate.
    pub fn builtin() -> Self {
        super::descriptors::BUILTIN_REGISTRY
    }

    /// Looks up a descriptor by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.descriptors
            .iter()
            .copied()
            .find(|descriptor| descriptor.name.eq_ignore_ascii_case(name))
    }

    /// Names of every registered descriptor.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|descriptor| descriptor.name)
    }
}

/// A JSON value after shaping.
///
/// Isomorphic to [`serde_json::Value`] with one extra leaf for timestamps.
/// Serializes back to JSON with timestamps in RFC 3339, so it can be converted into
/// typed structs with [`ShapedValue::into_typed`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// A parsed timestamp.
    DateTime(DateTime<Utc>),
    /// JSON array.
    Array(Vec<ShapedValue>),
    /// JSON object.
    Object(BTreeMap<String, ShapedValue>),
}

impl ShapedValue {
    /// Looks up a field of an object.
    pub fn get(&self, field: &str) -> Option<&ShapedValue> {
        match self {
            Self::Object(map) => map.get(field),
            _ => None,
        }
    }

    /// The timestamp, if this is one.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&[ShapedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for arrays.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for objects.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Converts back to plain JSON. Timestamps become RFC 3339 strings.
    pub fn into_json(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => Value::Number(n),
            Self::String(s) => Value::String(s),
            Self::DateTime(timestamp) => Value::String(format_timestamp(&timestamp)),
            Self::Array(items) => Value::Array(items.into_iter().map(Self::into_json).collect()),
            Self::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, value.into_json()))
                    .collect(),
            ),
        }
    }

    /// Deserializes the shaped value into a typed struct.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Deserialize`] if the value does not fit `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.into_json())?)
    }
}

impl From<Value> for ShapedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ShapedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(timestamp) => serializer.serialize_str(&format_timestamp(timestamp)),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(map) => map.serialize(serializer),
        }
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an ISO-8601 timestamp.
///
/// Strings with an offset or `Z` designator are converted to UTC. Strings without
/// one (the platform sends `0001-01-01T00:00:00` for unset dates) are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Reshapes a raw response per its declared descriptor.
///
/// - Without a descriptor, `raw` is returned unchanged.
/// - With `is_collection`, `raw` must be an array (a `{count, value}` envelope is
///   unwrapped first) and every element is shaped on its own.
/// - Otherwise `raw` is shaped as one record.
///
/// # Errors
///
/// - [`ApiError::ShapeMismatch`] when `raw` does not have the declared shape
/// - [`ApiError::DateParse`] when a timestamp field is not ISO-8601
/// - [`ApiError::UnknownEnumValue`] when an enum field holds an unknown name
pub fn shape(
    raw: Value,
    descriptor: Option<&TypeDescriptor>,
    is_collection: bool,
) -> Result<ShapedValue, ApiError> {
    let Some(descriptor) = descriptor else {
        return Ok(ShapedValue::from(raw));
    };

    if !is_collection {
        return shape_record(raw, descriptor, "");
    }

    let items = match raw {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("value") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            _ => {
                return Err(ApiError::ShapeMismatch {
                    expected: "an array",
                    found: "an object",
                })
            }
        },
        other => {
            return Err(ApiError::ShapeMismatch {
                expected: "an array",
                found: json_kind(&other),
            })
        }
    };

    items
        .into_iter()
        .map(|item| shape_record(item, descriptor, ""))
        .collect::<Result<Vec<_>, _>>()
        .map(ShapedValue::Array)
}

fn shape_record(
    raw: Value,
    descriptor: &TypeDescriptor,
    path: &str,
) -> Result<ShapedValue, ApiError> {
    let map = match raw {
        Value::Object(map) => map,
        Value::Null => return Ok(ShapedValue::Null),
        other => {
            return Err(ApiError::ShapeMismatch {
                expected: "an object",
                found: json_kind(&other),
            })
        }
    };

    let mut shaped = BTreeMap::new();
    for (key, value) in map {
        let value = match descriptor.field(&key) {
            Some(kind) => shape_field(&field_path(path, &key), value, kind)?,
            None => ShapedValue::from(value),
        };
        shaped.insert(key, value);
    }

    Ok(ShapedValue::Object(shaped))
}

fn shape_field(field: &str, value: Value, kind: FieldKind) -> Result<ShapedValue, ApiError> {
    match (kind, value) {
        (_, Value::Null) => Ok(ShapedValue::Null),

        (FieldKind::DateTime, Value::String(raw)) if raw.is_empty() => Ok(ShapedValue::String(raw)),
        (FieldKind::DateTime, Value::String(raw)) => match parse_timestamp(&raw) {
            Some(timestamp) => Ok(ShapedValue::DateTime(timestamp)),
            None => Err(ApiError::DateParse {
                field: field.to_string(),
                raw,
            }),
        },
        (FieldKind::DateTime, other) => Err(ApiError::DateParse {
            field: field.to_string(),
            raw: other.to_string(),
        }),

        (FieldKind::Enum(_), Value::Number(n)) => Ok(ShapedValue::Number(n)),
        (FieldKind::Enum(descriptor), Value::String(member)) => match descriptor.value_of(&member) {
            Some(value) => Ok(ShapedValue::Number(value.into())),
            None => Err(ApiError::UnknownEnumValue {
                field: field.to_string(),
                enum_name: descriptor.name,
                value: member,
            }),
        },
        (FieldKind::Enum(descriptor), other) => Err(ApiError::UnknownEnumValue {
            field: field.to_string(),
            enum_name: descriptor.name,
            value: other.to_string(),
        }),

        (FieldKind::Nested(descriptor), Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| shape_record(item, descriptor, &format!("{}[{}]", field, index)))
            .collect::<Result<Vec<_>, _>>()
            .map(ShapedValue::Array),
        (FieldKind::Nested(descriptor), object @ Value::Object(_)) => {
            shape_record(object, descriptor, field)
        }
        (FieldKind::Nested(_), other) => Err(ApiError::ShapeMismatch {
            expected: "an object",
            found: json_kind(&other),
        }),
    }
}

fn field_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
