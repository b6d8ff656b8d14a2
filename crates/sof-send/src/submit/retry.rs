//! Stale-blockhash retry classification and attempt accounting.

use super::{RpcTransportError, SubmitError};

/// Message the cluster reports when a transaction references an expired blockhash.
pub const STALE_BLOCKHASH_MESSAGE: &str = "Blockhash not found";

/// Default number of stale-blockhash retries after the first attempt.
pub const DEFAULT_MAX_BLOCKHASH_RETRIES: u32 = 3;

/// Returns true when `error` is worth re-running the whole pipeline with a fresh blockhash.
///
/// Only transport failures and structured RPC errors whose message is exactly
/// [`STALE_BLOCKHASH_MESSAGE`] qualify, whether they came from the blockhash lookup or from
/// dispatch. Simulation execution errors never do.
#[must_use]
pub fn classify_retryable(error: &SubmitError) -> bool {
    match error {
        SubmitError::Blockhash { source } | SubmitError::Rpc { source } => {
            is_stale_blockhash(source)
        }
        SubmitError::InvalidRequest { .. }
        | SubmitError::Sign { .. }
        | SubmitError::Serialize { .. }
        | SubmitError::Simulation { .. } => false,
    }
}

/// Returns true when a transport error reports a stale blockhash.
#[must_use]
pub fn is_stale_blockhash(error: &RpcTransportError) -> bool {
    error.message() == Some(STALE_BLOCKHASH_MESSAGE)
}

/// Per-call retry counter.
///
/// `attempts_made` counts retryable failures seen so far. A retry is granted while
/// `attempts_made <= max_attempts` after recording the failure, so one call runs the
/// pipeline at most `max_attempts + 1` times.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RetryState {
    /// Retryable failures recorded so far.
    attempts_made: u32,
    /// Retry bound.
    max_attempts: u32,
}

impl RetryState {
    /// Creates a fresh counter.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            attempts_made: 0,
            max_attempts,
        }
    }

    /// Records one retryable failure and returns whether another attempt is allowed.
    pub fn record_retryable_failure(&mut self) -> bool {
        self.attempts_made = self.attempts_made.saturating_add(1);
        self.attempts_made <= self.max_attempts
    }

    /// Returns retryable failures recorded so far.
    #[must_use]
    pub const fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// Returns the retry bound.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOCKHASH_RETRIES)
    }
}
