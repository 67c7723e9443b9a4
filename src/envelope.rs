//! JSON response envelopes
//!
//! Every response body is a JSON object keyed by a single envelope name
//! (`{"movie": ...}`, `{"error": ...}`), written with tab indentation and a
//! trailing newline. Also holds the status mapping for decode errors and the
//! path id parser used alongside body decoding.

use crate::error::DecodeError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;

/// Top-level response object, keys in sorted order
pub type Envelope = BTreeMap<String, JsonValue>;

const CONTENT_TYPE: &str = "Content-Type";
const JSON_MIME: &str = "application/json";
const SERVER_ERROR_MESSAGE: &str =
    "The server encountered a problem and could not process your request.";
const NOT_FOUND_MESSAGE: &str = "The requested resource could not be found.";

/// Build a single-key envelope
pub fn envelope(key: impl Into<String>, value: JsonValue) -> Envelope {
    let mut env = Envelope::new();
    env.insert(key.into(), value);
    env
}

/// Serialize an envelope with tab indentation and a trailing newline
pub fn write_json(env: &Envelope) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    env.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Caller headers followed by `Content-Type: application/json`.
/// Any content type the caller supplied is replaced.
pub fn json_headers<I, K, V>(headers: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut out: Vec<(String, String)> = headers
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, _)| !k.eq_ignore_ascii_case(CONTENT_TYPE))
        .collect();
    out.push((CONTENT_TYPE.to_string(), JSON_MIME.to_string()));
    out
}

/// Status code plus `{"error": ...}` body
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub body: Envelope,
}

impl ErrorResponse {
    pub fn new(status: u16, message: JsonValue) -> Self {
        Self {
            status,
            body: envelope("error", message),
        }
    }

    /// 400 for anything the client sent; 500 with a generic message for
    /// schema defects, whose detail must not reach the client.
    pub fn from_decode_error(err: &DecodeError) -> Self {
        if err.is_client_fault() {
            Self::bad_request(err.to_string())
        } else {
            Self::server_error()
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, JsonValue::String(message.into()))
    }

    pub fn not_found() -> Self {
        Self::new(404, JsonValue::String(NOT_FOUND_MESSAGE.to_string()))
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            405,
            JsonValue::String(format!(
                "The {method} method is not supported for this resource."
            )),
        )
    }

    /// 422 with a field -> problem map
    pub fn failed_validation(errors: BTreeMap<String, String>) -> Self {
        let map = errors
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect();
        Self::new(422, JsonValue::Object(map))
    }

    pub fn server_error() -> Self {
        Self::new(500, JsonValue::String(SERVER_ERROR_MESSAGE.to_string()))
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        write_json(&self.body)
    }
}

impl From<&DecodeError> for ErrorResponse {
    fn from(err: &DecodeError) -> Self {
        Self::from_decode_error(err)
    }
}

/// The `:id` path parameter was not a positive integer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid id parameter")]
pub struct InvalidId;

/// Parse a record id path parameter; ids start at 1
pub fn parse_id(raw: &str) -> Result<i64, InvalidId> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(InvalidId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_write_json_uses_tabs() {
        let env = envelope("movie", json!({"id": 1, "title": "Up"}));
        let out = String::from_utf8(write_json(&env).unwrap()).unwrap();
        assert_eq!(out, "{\n\t\"movie\": {\n\t\t\"id\": 1,\n\t\t\"title\": \"Up\"\n\t}\n}\n");
    }

    #[test]
    fn test_json_headers() {
        let headers = json_headers([("Location", "/v1/movies/1"), ("content-type", "text/plain")]);
        assert_eq!(
            headers,
            vec![
                ("Location".to_string(), "/v1/movies/1".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_error_responses() {
        let resp = ErrorResponse::from_decode_error(&DecodeError::EmptyBody);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], json!("body must not be empty"));

        let resp = ErrorResponse::from(&DecodeError::SchemaDefect {
            reason: "duplicate field \"a\"".into(),
        });
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], json!(SERVER_ERROR_MESSAGE));
    }

    #[test]
    fn test_other_responses() {
        assert_eq!(ErrorResponse::not_found().status, 404);
        assert_eq!(
            ErrorResponse::method_not_allowed("PUT").body["error"],
            json!("The PUT method is not supported for this resource.")
        );

        let mut errors = BTreeMap::new();
        errors.insert("title".to_string(), "must be provided".to_string());
        let resp = ErrorResponse::failed_validation(errors);
        assert_eq!(resp.status, 422);
        assert_eq!(resp.body["error"], json!({"title": "must be provided"}));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Ok(42));
        assert_eq!(parse_id("0"), Err(InvalidId));
        assert_eq!(parse_id("-3"), Err(InvalidId));
        assert_eq!(parse_id("abc"), Err(InvalidId));
        assert_eq!(parse_id(""), Err(InvalidId));
        assert_eq!(InvalidId.to_string(), "invalid id parameter");
    }
}
