//! Schema descriptors for closed-schema decoding
//!
//! A decode target lists its fields explicitly through [`Schema::FIELDS`].
//! The decoder checks a parsed body against that list before handing it to
//! serde, which is what lets it report the offending field by name.

use crate::error::*;
use crate::runtime::Runtime;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// Declared JSON type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any JSON value, including null
    Any,
    Bool,
    /// Number without a fractional part that fits in i64 or u64
    Integer,
    /// Integer that fits in i32
    Int32,
    /// Integer that fits in i64
    Int64,
    Number,
    String,
    /// String in `"<N> mins"` form, see [`Runtime`]
    Runtime,
    /// Array whose elements all have the given kind
    Array(&'static FieldKind),
    /// Nested record, itself closed
    Object(&'static [Field]),
}

impl FieldKind {
    pub fn is_any(&self) -> bool {
        matches!(self, FieldKind::Any)
    }
}

/// A named, typed field of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Accept `null` in place of a value
    pub nullable: bool,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// Helper to declare a field
pub const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field::new(name, kind)
}

/// A record type usable as a strict decode target.
///
/// `FIELDS` must list every field the serde representation of the type
/// accepts, under its serialized name.
///
/// ```rust
/// use serde::Deserialize;
/// use strict_body::{field, FieldKind, Runtime, Schema};
///
/// #[derive(Deserialize)]
/// struct MovieInput {
///     title: String,
///     runtime: Runtime,
/// }
///
/// impl Schema for MovieInput {
///     const FIELDS: &'static [strict_body::Field] = &[
///         field("title", FieldKind::String),
///         field("runtime", FieldKind::Runtime),
///     ];
/// }
/// ```
pub trait Schema {
    const FIELDS: &'static [Field];
}

/// Validate a descriptor. Failures are defects in the service, not the request.
pub fn check_schema(fields: &[Field]) -> Result<()> {
    check_schema_at(fields, None)
}

fn check_schema_at(fields: &[Field], prefix: Option<&str>) -> Result<()> {
    let mut seen = HashSet::new();
    for f in fields {
        let path = join_path(prefix, f.name);
        if f.name.is_empty() {
            return Err(DecodeError::SchemaDefect {
                reason: format!("empty field name in {}", prefix.unwrap_or("root record")),
            });
        }
        if !seen.insert(f.name) {
            return Err(DecodeError::SchemaDefect {
                reason: format!("duplicate field {path:?}"),
            });
        }
        check_kind(&f.kind, &path)?;
    }
    Ok(())
}

fn check_kind(kind: &FieldKind, path: &str) -> Result<()> {
    match kind {
        FieldKind::Object(fields) => check_schema_at(fields, Some(path)),
        FieldKind::Array(inner) => check_kind(inner, path),
        _ => Ok(()),
    }
}

/// Check a parsed body against a record descriptor.
///
/// `offset` is reported when the root value itself is not an object, since
/// no field name is available then.
pub(crate) fn check_record(fields: &[Field], value: &JsonValue, offset: u64) -> Result<()> {
    match value {
        JsonValue::Object(map) => check_fields(fields, map, None),
        _ => Err(DecodeError::FieldTypeMismatch {
            at: MismatchAt::Offset(offset),
        }),
    }
}

// Type errors on declared fields take precedence over unknown fields; both
// are reported in document order.
fn check_fields(fields: &[Field], map: &Map<String, JsonValue>, prefix: Option<&str>) -> Result<()> {
    for (key, value) in map {
        if let Some(f) = fields.iter().find(|f| f.name == key.as_str()) {
            check_value(&f.kind, f.nullable, value, &join_path(prefix, key))?;
        }
    }

    if let Some(key) = map.keys().find(|key| !fields.iter().any(|f| f.name == key.as_str())) {
        return Err(DecodeError::UnknownField {
            field: join_path(prefix, key),
        });
    }
    Ok(())
}

fn check_value(kind: &FieldKind, nullable: bool, value: &JsonValue, path: &str) -> Result<()> {
    if value.is_null() && (nullable || kind.is_any()) {
        return Ok(());
    }

    let matches = match kind {
        FieldKind::Any => true,
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Integer => value.is_i64() || value.is_u64(),
        FieldKind::Int32 => value
            .as_i64()
            .is_some_and(|n| i32::try_from(n).is_ok()),
        FieldKind::Int64 => value.is_i64(),
        FieldKind::Number => value.is_number(),
        FieldKind::String => value.is_string(),
        FieldKind::Runtime => {
            return Runtime::from_json(value).map(|_| ()).map_err(|_| {
                DecodeError::InvalidRuntimeFormat {
                    field: path.to_string(),
                }
            });
        }
        FieldKind::Array(inner) => {
            let Some(items) = value.as_array() else {
                return Err(DecodeError::type_mismatch(path));
            };
            for item in items {
                check_value(inner, false, item, path)?;
            }
            true
        }
        FieldKind::Object(fields) => {
            let Some(map) = value.as_object() else {
                return Err(DecodeError::type_mismatch(path));
            };
            return check_fields(fields, map, Some(path));
        }
    };

    if matches {
        Ok(())
    } else {
        Err(DecodeError::type_mismatch(path))
    }
}

fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    }
}
