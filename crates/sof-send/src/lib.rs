#![forbid(unsafe_code)]
#![cfg_attr(
    test,
    allow(
        clippy::arithmetic_side_effects,
        clippy::expect_used,
        clippy::indexing_slicing,
        clippy::missing_docs_in_private_items,
        clippy::panic,
        missing_docs
    )
)]

//! Transaction SDK for building, signing, and submitting Solana transactions over JSON-RPC,
//! re-running the pipeline from a fresh blockhash when the cluster reports a stale one.

/// Transaction/message builder helpers.
pub mod builder;
/// Environment-driven client configuration.
pub mod config;
/// Base64 wire encoding of signed transactions.
pub mod encoding;
/// Tracing subscriber bootstrap.
pub mod logging;
/// Blockhash and account provider traits with simple adapters.
pub mod providers;
/// Signing boundary types.
pub mod signing;
/// Submission client, RPC transport, and retry policy.
pub mod submit;

pub use builder::{BuilderError, TxBuilder, UnsignedTx, resolve_fee_payer};
pub use config::ClientConfig;
pub use encoding::{
    MAX_TRANSACTION_BYTES, SerializeError, SerializedTransaction, serialize_transaction,
};
pub use providers::{
    AccountStorage, InMemoryAccountStorage, RecentBlockhashProvider, RpcRecentBlockhashProvider,
    SharedSigner, StaticRecentBlockhashProvider,
};
pub use signing::{SignedTransaction, SigningError, sign_transaction};
pub use submit::{
    JsonRpcTransport, RetryState, RpcSimulateConfig, RpcSubmitConfig, RpcTransport,
    RpcTransportError, SIMULATED_TRANSACTION_ID, STALE_BLOCKHASH_MESSAGE, SimulationResponse,
    SubmitError, SubmitMode, TxRequest, TxSubmitClient, classify_retryable,
};
