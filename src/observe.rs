//! Diagnostic hooks for decode failures
//!
//! Observers see every classified error after classification is final; they
//! cannot change the outcome.

use crate::error::DecodeError;

/// Receives each error a decoder is about to return
pub trait DecodeObserver {
    fn on_error(&self, err: &DecodeError);
}

/// Logs through `tracing`: client faults at debug, schema defects at warn
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn on_error(&self, err: &DecodeError) {
        let kind = err.kind().as_str();
        if err.is_client_fault() {
            tracing::debug!(kind, error = %err, "request body rejected");
        } else {
            tracing::warn!(kind, error = %err, "decode target is not valid");
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecodeObserver for NoopObserver {
    fn on_error(&self, _err: &DecodeError) {}
}

impl<F> DecodeObserver for F
where
    F: Fn(&DecodeError),
{
    fn on_error(&self, err: &DecodeError) {
        self(err)
    }
}
