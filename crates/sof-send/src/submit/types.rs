//! Shared submission types, errors, and transport traits.

use async_trait::async_trait;
use solana_message::{Hash, Instruction};
use solana_pubkey::Pubkey;
use thiserror::Error;

use crate::{
    encoding::{SerializeError, SerializedTransaction},
    signing::SigningError,
};

/// Id returned by the simulate path in place of a real on-chain signature.
pub const SIMULATED_TRANSACTION_ID: &str = "<simulated transaction id>";

/// Which endpoint the pipeline dispatches to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubmitMode {
    /// Commit through `sendTransaction`.
    Send,
    /// Dry-run through `simulateTransaction`.
    Simulate,
}

/// `sendTransaction` tuning.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RpcSubmitConfig {
    /// Skip preflight simulation when true.
    pub skip_preflight: bool,
    /// Optional preflight commitment string.
    pub preflight_commitment: Option<String>,
    /// Optional node-side rebroadcast limit.
    pub max_retries: Option<usize>,
}

impl Default for RpcSubmitConfig {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: None,
            max_retries: None,
        }
    }
}

/// `simulateTransaction` tuning.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RpcSimulateConfig {
    /// Optional commitment string.
    pub commitment: Option<String>,
    /// Verify signatures during simulation.
    pub sig_verify: bool,
}

impl Default for RpcSimulateConfig {
    fn default() -> Self {
        Self {
            commitment: None,
            sig_verify: true,
        }
    }
}

/// Outcome of one `simulateTransaction` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResponse {
    /// Execution error reported by the simulator, `None` on success.
    pub err: Option<serde_json::Value>,
    /// Program log lines.
    pub logs: Vec<String>,
    /// Compute units consumed.
    pub units_consumed: Option<u64>,
}

/// Low-level errors surfaced by RPC transports.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RpcTransportError {
    /// Invalid transport configuration.
    #[error("transport configuration invalid: {message}")]
    Config {
        /// Human-readable description.
        message: String,
    },
    /// Network or protocol level failure.
    #[error("transport failure: {message}")]
    Failure {
        /// Human-readable description.
        message: String,
    },
    /// Structured JSON-RPC error payload.
    #[error("rpc error {code}: {message}")]
    InvalidResponse {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },
    /// The RPC result was present but its value was null.
    #[error("rpc method `{method}` returned a null value")]
    NullValue {
        /// Method that returned the null value.
        method: &'static str,
    },
}

impl RpcTransportError {
    /// Returns the node or transport message carried by this error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failure { message } | Self::InvalidResponse { message, .. } => Some(message),
            Self::Config { .. } | Self::NullValue { .. } => None,
        }
    }
}

/// Submission-level errors.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Precondition failed before building.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },
    /// Recent blockhash lookup failed.
    #[error("failed to fetch recent blockhash: {source}")]
    Blockhash {
        /// Transport error from the provider.
        source: RpcTransportError,
    },
    /// Could not sign the built transaction.
    #[error("{source}")]
    Sign {
        /// Signing failure.
        source: SigningError,
    },
    /// Could not encode the signed transaction.
    #[error("{source}")]
    Serialize {
        /// Encoder failure.
        source: SerializeError,
    },
    /// RPC dispatch failed.
    #[error("rpc submit failed: {source}")]
    Rpc {
        /// RPC transport error.
        source: RpcTransportError,
    },
    /// The simulated execution failed.
    #[error("simulation error: {err}")]
    Simulation {
        /// Error payload reported by the simulator.
        err: serde_json::Value,
        /// Program logs captured during simulation.
        logs: Vec<String>,
    },
}

/// One submission request: what to run and which optional overrides to apply.
#[derive(Debug, Clone, Default)]
pub struct TxRequest {
    /// Ordered instructions.
    pub instructions: Vec<Instruction>,
    /// Blockhash to use on the first attempt instead of querying one.
    pub recent_blockhash: Option<Hash>,
    /// Fee payer to use instead of the stored default account.
    pub fee_payer: Option<Pubkey>,
    /// Optional compute unit limit.
    pub compute_unit_limit: Option<u32>,
    /// Optional priority fee in micro-lamports per compute unit.
    pub priority_fee_micro_lamports: Option<u64>,
}

impl TxRequest {
    /// Creates a request for the given instructions.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    /// Pins the blockhash for the first attempt.
    #[must_use]
    pub const fn with_recent_blockhash(mut self, blockhash: Hash) -> Self {
        self.recent_blockhash = Some(blockhash);
        self
    }

    /// Sets an explicit fee payer.
    #[must_use]
    pub const fn with_fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Sets compute unit limit.
    #[must_use]
    pub const fn with_compute_unit_limit(mut self, units: u32) -> Self {
        self.compute_unit_limit = Some(units);
        self
    }

    /// Sets priority fee in micro-lamports.
    #[must_use]
    pub const fn with_priority_fee_micro_lamports(mut self, micro_lamports: u64) -> Self {
        self.priority_fee_micro_lamports = Some(micro_lamports);
        self
    }
}

/// RPC transport interface consumed by the submission pipeline.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Fetches the newest blockhash through `getLatestBlockhash`.
    async fn latest_blockhash(&self) -> Result<Hash, RpcTransportError>;

    /// Submits an encoded transaction and returns its signature string.
    async fn send_transaction(
        &self,
        tx: &SerializedTransaction,
        config: &RpcSubmitConfig,
    ) -> Result<String, RpcTransportError>;

    /// Simulates an encoded transaction.
    async fn simulate_transaction(
        &self,
        tx: &SerializedTransaction,
        config: &RpcSimulateConfig,
    ) -> Result<SimulationResponse, RpcTransportError>;
}
