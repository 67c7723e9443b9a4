//! End-to-end tests for strict body decoding

use crate::*;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct MovieInput {
    title: String,
    runtime: Runtime,
}

impl Schema for MovieInput {
    const FIELDS: &'static [Field] = &[
        field("title", FieldKind::String),
        field("runtime", FieldKind::Runtime),
    ];
}

#[derive(Debug, Deserialize)]
struct TitleOnly {
    #[allow(dead_code)]
    title: String,
}

impl Schema for TitleOnly {
    const FIELDS: &'static [Field] = &[field("title", FieldKind::String)];
}

#[derive(Debug, PartialEq, Deserialize)]
struct Counts {
    a: Option<i64>,
    b: Option<i64>,
}

impl Schema for Counts {
    const FIELDS: &'static [Field] = &[
        field("a", FieldKind::Int64).nullable(),
        field("b", FieldKind::Int64).nullable(),
    ];
}

fn quiet() -> StrictDecoder<NoopObserver> {
    StrictDecoder::new(DecodeOpts::default()).with_observer(NoopObserver)
}

#[test]
fn test_inception_scenario() {
    let movie: MovieInput = quiet()
        .decode(r#"{"title":"Inception","runtime":"148 mins"}"#.as_bytes())
        .unwrap();
    assert_eq!(movie.runtime, Runtime(148));
    assert_eq!(movie.runtime.minutes(), 148);

    let encoded = serde_json::to_value(&movie).unwrap();
    assert_eq!(encoded["runtime"], json!("148 mins"));
}

#[test]
fn test_oversized_body_never_populates() {
    let decoder = StrictDecoder::new(DecodeOpts::with_limit(32)).with_observer(NoopObserver);
    let padded = format!(r#"{{"title":"{}","runtime":"1 mins"}}"#, "a".repeat(64));
    assert_eq!(
        decoder.decode::<MovieInput, _>(padded.as_bytes()),
        Err(DecodeError::BodyTooLarge { limit: 32 })
    );
}

#[test]
fn test_default_limit_message() {
    let body = vec![b' '; DEFAULT_MAX_BYTES as usize + 1];
    let err = quiet().decode::<MovieInput, _>(body.as_slice()).unwrap_err();
    assert_eq!(err.to_string(), "body must not be larger than 1,048,576 bytes");
}

#[test]
fn test_empty_is_not_malformed() {
    let err = quiet().decode_slice::<MovieInput>(b"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyBody);
}

#[test]
fn test_back_to_back_values() {
    assert_eq!(
        quiet().decode_slice::<Counts>(br#"{"a":1}"#),
        Ok(Counts { a: Some(1), b: None })
    );
    let err = quiet().decode_slice::<Counts>(br#"{"a":1}{"b":2}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MultipleValues);
}

#[test]
fn test_first_value_is_classified_before_trailing_content() {
    let err = quiet().decode_slice::<TitleOnly>(br#"{"title":5}{"b":2}"#).unwrap_err();
    assert_eq!(
        err,
        DecodeError::FieldTypeMismatch { at: MismatchAt::Field("title".into()) }
    );

    let err = quiet()
        .decode_slice::<TitleOnly>(br#"{"title":"x","year":5} {}"#)
        .unwrap_err();
    assert_eq!(err, DecodeError::UnknownField { field: "year".into() });
}

#[test]
fn test_unknown_field_is_named() {
    let err = quiet()
        .decode_slice::<TitleOnly>(br#"{"title":"x","year":5}"#)
        .unwrap_err();
    assert_eq!(err, DecodeError::UnknownField { field: "year".into() });
    assert_eq!(err.to_string(), "body contains unknown key \"year\"");
}

#[test]
fn test_runtime_rejection_through_decoder() {
    for runtime in ["90 minutes", "90mins", "ninety mins", "mins 90"] {
        let body = json!({"title": "x", "runtime": runtime}).to_string();
        let err = quiet().decode_slice::<MovieInput>(body.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRuntimeFormat, "{runtime:?}");
        assert_eq!(err.to_string(), "invalid runtime format");
    }
}

#[test]
fn test_bare_number_runtime_rejected() {
    let err = quiet()
        .decode_slice::<MovieInput>(br#"{"title":"x","runtime":148}"#)
        .unwrap_err();
    assert_eq!(err, DecodeError::InvalidRuntimeFormat { field: "runtime".into() });
}

#[test]
fn test_decoding_is_idempotent() {
    let inputs: [&[u8]; 7] = [
        b"",
        b"{",
        br#"{"title": ?}"#,
        br#"[1]"#,
        br#"{"title":1}"#,
        br#"{"title":"x","runtime":"148 mins"} {}"#,
        br#"{"title":"x","runtime":"148 mins"}"#,
    ];
    for input in inputs {
        let first = quiet().decode_slice::<MovieInput>(input);
        let second = quiet().decode_slice::<MovieInput>(input);
        assert_eq!(first, second);
    }
}

#[test]
fn test_error_response_round_trip() {
    let err = quiet()
        .decode_slice::<MovieInput>(br#"{"title":"x","runtime":true}"#)
        .unwrap_err();
    let resp = ErrorResponse::from(&err);
    assert_eq!(resp.status, 400);

    let bytes = resp.to_bytes().unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "{\n\t\"error\": \"invalid runtime format\"\n}\n"
    );
}
