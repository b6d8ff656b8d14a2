//! Transaction submission client, RPC transport, and stale-blockhash retry.

/// Submission client implementation and retry loop.
mod client;
/// Stale-blockhash classification and retry accounting.
mod retry;
/// JSON-RPC transport implementation.
mod rpc;
/// Shared submission types, errors, and transport traits.
mod types;

pub use client::TxSubmitClient;
pub use retry::{
    DEFAULT_MAX_BLOCKHASH_RETRIES, RetryState, STALE_BLOCKHASH_MESSAGE, classify_retryable,
    is_stale_blockhash,
};
pub use rpc::{DEFAULT_RPC_TIMEOUT, JsonRpcTransport};
pub use types::{
    RpcSimulateConfig, RpcSubmitConfig, RpcTransport, RpcTransportError, SIMULATED_TRANSACTION_ID,
    SimulationResponse, SubmitError, SubmitMode, TxRequest,
};
