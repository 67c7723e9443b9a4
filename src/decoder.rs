//! Strict request-body decoding
//!
//! Bodies are read under a byte limit, parsed as exactly one JSON value,
//! checked against the target's [`Schema`] descriptor and only then handed to
//! serde. Every failure is reported as a [`DecodeError`].
//!
//! Check order, first failure wins:
//!
//! 1. descriptor validity (`SchemaDefect`)
//! 2. size limit (`BodyTooLarge`)
//! 3. empty body (`EmptyBody`)
//! 4. syntax of the first value (`MalformedJson`, `TruncatedJson`)
//! 5. field types and runtime format (`FieldTypeMismatch`, `InvalidRuntimeFormat`)
//! 6. undeclared fields (`UnknownField`)
//! 7. serde population (`DecodeFailed`)
//! 8. trailing content (`MultipleValues`)
//!
//! Only the first value has to be well formed; whatever follows it is
//! reported as `MultipleValues` once the first value decoded cleanly.

use crate::error::*;
use crate::observe::{DecodeObserver, TracingObserver};
use crate::schema::{check_record, check_schema, Schema};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::error::Category;
use serde_json::Value as JsonValue;
use std::io::Read;

/// Default body limit: 1 MiB
pub const DEFAULT_MAX_BYTES: u64 = 1_048_576;

/// Decoder options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOpts {
    /// Largest accepted body, in bytes
    pub max_bytes: u64,
}

impl Default for DecodeOpts {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl DecodeOpts {
    pub fn with_limit(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

/// Closed-schema JSON body decoder
#[derive(Debug, Clone)]
pub struct StrictDecoder<O = TracingObserver> {
    opts: DecodeOpts,
    observer: O,
}

impl StrictDecoder<TracingObserver> {
    pub fn new(opts: DecodeOpts) -> Self {
        Self {
            opts,
            observer: TracingObserver,
        }
    }
}

impl Default for StrictDecoder<TracingObserver> {
    fn default() -> Self {
        Self::new(DecodeOpts::default())
    }
}

impl<O: DecodeObserver> StrictDecoder<O> {
    /// Replace the observer notified on each failure
    pub fn with_observer<P: DecodeObserver>(self, observer: P) -> StrictDecoder<P> {
        StrictDecoder {
            opts: self.opts,
            observer,
        }
    }

    pub fn opts(&self) -> &DecodeOpts {
        &self.opts
    }

    /// Decode a body from a reader. At most `max_bytes + 1` bytes are read.
    pub fn decode<T, R>(&self, reader: R) -> Result<T>
    where
        T: Schema + DeserializeOwned,
        R: Read,
    {
        self.observe(check_schema(T::FIELDS).and_then(|()| {
            let body = read_bounded(reader, self.opts.max_bytes)?;
            decode_body(&body)
        }))
    }

    /// Decode a body that is already in memory
    pub fn decode_slice<T>(&self, body: &[u8]) -> Result<T>
    where
        T: Schema + DeserializeOwned,
    {
        self.observe(check_schema(T::FIELDS).and_then(|()| {
            if body.len() as u64 > self.opts.max_bytes {
                return Err(DecodeError::BodyTooLarge {
                    limit: self.opts.max_bytes,
                });
            }
            decode_body(body)
        }))
    }

    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.observer.on_error(err);
        }
        result
    }
}

/// Decode from a reader with default options
pub fn decode<T, R>(reader: R) -> Result<T>
where
    T: Schema + DeserializeOwned,
    R: Read,
{
    StrictDecoder::new(DecodeOpts::default()).decode(reader)
}

/// Decode an in-memory body with default options
pub fn decode_slice<T>(body: &[u8]) -> Result<T>
where
    T: Schema + DeserializeOwned,
{
    StrictDecoder::new(DecodeOpts::default()).decode_slice(body)
}

fn read_bounded<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(DecodeError::decode_failed)?;
    if body.len() as u64 > limit {
        return Err(DecodeError::BodyTooLarge { limit });
    }
    Ok(body)
}

fn decode_body<T>(body: &[u8]) -> Result<T>
where
    T: Schema + DeserializeOwned,
{
    if body.iter().all(|b| is_json_whitespace(*b)) {
        return Err(DecodeError::EmptyBody);
    }

    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<JsonValue>();
    let value = match stream.next() {
        Some(Ok(value)) => value,
        Some(Err(err)) => return Err(classify(&err, body)),
        None => return Err(DecodeError::EmptyBody),
    };
    let end = stream.byte_offset() as u64;
    let trailing = stream.next().is_some();

    check_record(T::FIELDS, &value, end)?;
    let target = serde_json::from_value(value).map_err(DecodeError::decode_failed)?;
    if trailing {
        return Err(DecodeError::MultipleValues);
    }
    Ok(target)
}

fn classify(err: &serde_json::Error, body: &[u8]) -> DecodeError {
    match err.classify() {
        Category::Eof => DecodeError::TruncatedJson,
        Category::Syntax => DecodeError::MalformedJson {
            offset: byte_offset(body, err.line(), err.column()),
        },
        Category::Io | Category::Data => DecodeError::decode_failed(err),
    }
}

/// Convert serde_json's 1-based line and byte column into an absolute offset
fn byte_offset(body: &[u8], line: usize, column: usize) -> u64 {
    let line_start = if line <= 1 {
        0
    } else {
        body.iter()
            .enumerate()
            .filter(|&(_, &b)| b == b'\n')
            .map(|(i, _)| i + 1)
            .nth(line - 2)
            .unwrap_or(body.len())
    };
    (line_start + column).min(body.len()) as u64
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
