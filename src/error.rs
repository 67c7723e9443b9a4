//! Error types for strict body decoding

use thiserror::Error;

/// Stable tag identifying each class of decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BodyTooLarge,
    MalformedJson,
    EmptyBody,
    TruncatedJson,
    FieldTypeMismatch,
    UnknownField,
    MultipleValues,
    DecodeFailed,
    SchemaDefect,
    InvalidRuntimeFormat,
}

impl ErrorKind {
    /// Whether the failure was caused by the request rather than the service.
    ///
    /// Only `SchemaDefect` is a service fault; it must be reported as an
    /// internal error and never rendered back to the client.
    pub fn is_client_fault(self) -> bool {
        !matches!(self, ErrorKind::SchemaDefect)
    }

    /// Short snake_case label, used as a structured logging field
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BodyTooLarge => "body_too_large",
            ErrorKind::MalformedJson => "malformed_json",
            ErrorKind::EmptyBody => "empty_body",
            ErrorKind::TruncatedJson => "truncated_json",
            ErrorKind::FieldTypeMismatch => "field_type_mismatch",
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::MultipleValues => "multiple_values",
            ErrorKind::DecodeFailed => "decode_failed",
            ErrorKind::SchemaDefect => "schema_defect",
            ErrorKind::InvalidRuntimeFormat => "invalid_runtime_format",
        }
    }
}

/// Where a type mismatch was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchAt {
    /// Dotted path of the declared field
    Field(String),
    /// Byte offset, when no field name applies (e.g. the body is an array
    /// but the schema is a record)
    Offset(u64),
}

/// Classified failure of a strict decode.
///
/// Every variant carries enough detail (field name, byte offset, limit) to
/// render a client-facing message without re-parsing the body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body must not be larger than {} bytes", group_thousands(.limit))]
    BodyTooLarge { limit: u64 },

    #[error("body contains badly-formed JSON (at character {offset})")]
    MalformedJson { offset: u64 },

    #[error("body must not be empty")]
    EmptyBody,

    #[error("body contains badly-formed JSON")]
    TruncatedJson,

    #[error("{}", type_mismatch_message(.at))]
    FieldTypeMismatch { at: MismatchAt },

    #[error("body contains unknown key {field:?}")]
    UnknownField { field: String },

    #[error("body must only contain a single JSON value")]
    MultipleValues,

    #[error("{cause}")]
    DecodeFailed { cause: String },

    #[error("invalid decode target: {reason}")]
    SchemaDefect { reason: String },

    #[error("invalid runtime format")]
    InvalidRuntimeFormat { field: String },
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::BodyTooLarge { .. } => ErrorKind::BodyTooLarge,
            DecodeError::MalformedJson { .. } => ErrorKind::MalformedJson,
            DecodeError::EmptyBody => ErrorKind::EmptyBody,
            DecodeError::TruncatedJson => ErrorKind::TruncatedJson,
            DecodeError::FieldTypeMismatch { .. } => ErrorKind::FieldTypeMismatch,
            DecodeError::UnknownField { .. } => ErrorKind::UnknownField,
            DecodeError::MultipleValues => ErrorKind::MultipleValues,
            DecodeError::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            DecodeError::SchemaDefect { .. } => ErrorKind::SchemaDefect,
            DecodeError::InvalidRuntimeFormat { .. } => ErrorKind::InvalidRuntimeFormat,
        }
    }

    pub fn is_client_fault(&self) -> bool {
        self.kind().is_client_fault()
    }

    pub(crate) fn type_mismatch(field: impl Into<String>) -> Self {
        DecodeError::FieldTypeMismatch {
            at: MismatchAt::Field(field.into()),
        }
    }

    pub(crate) fn decode_failed(cause: impl ToString) -> Self {
        DecodeError::DecodeFailed {
            cause: cause.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

fn type_mismatch_message(at: &MismatchAt) -> String {
    match at {
        MismatchAt::Field(name) => format!("body contains incorrect JSON type for field {name:?}"),
        MismatchAt::Offset(offset) => {
            format!("body contains incorrect JSON type (at character {offset})")
        }
    }
}

/// Format an integer with comma thousands separators: 1048576 -> "1,048,576"
fn group_thousands(n: &u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(&0), "0");
        assert_eq!(group_thousands(&999), "999");
        assert_eq!(group_thousands(&1000), "1,000");
        assert_eq!(group_thousands(&1_048_576), "1,048,576");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DecodeError::BodyTooLarge { limit: 1_048_576 }.to_string(),
            "body must not be larger than 1,048,576 bytes"
        );
        assert_eq!(
            DecodeError::MalformedJson { offset: 9 }.to_string(),
            "body contains badly-formed JSON (at character 9)"
        );
        assert_eq!(
            DecodeError::type_mismatch("year").to_string(),
            "body contains incorrect JSON type for field \"year\""
        );
        assert_eq!(
            DecodeError::FieldTypeMismatch { at: MismatchAt::Offset(2) }.to_string(),
            "body contains incorrect JSON type (at character 2)"
        );
        assert_eq!(
            DecodeError::UnknownField { field: "year".into() }.to_string(),
            "body contains unknown key \"year\""
        );
        assert_eq!(
            DecodeError::decode_failed("missing field `title`").to_string(),
            "missing field `title`"
        );
    }

    #[test]
    fn test_only_schema_defect_is_service_fault() {
        assert!(!ErrorKind::SchemaDefect.is_client_fault());
        assert!(ErrorKind::EmptyBody.is_client_fault());
        assert!(ErrorKind::InvalidRuntimeFormat.is_client_fault());
        assert!(DecodeError::MultipleValues.is_client_fault());
    }
}
