//! JSON-RPC transport implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use solana_message::Hash;

use super::{
    RpcSimulateConfig, RpcSubmitConfig, RpcTransport, RpcTransportError, SimulationResponse,
    retry::STALE_BLOCKHASH_MESSAGE,
};
use crate::encoding::SerializedTransaction;

/// Default per-request HTTP timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC transport that talks to one cluster endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    /// HTTP client used for RPC calls.
    client: reqwest::Client,
    /// Target JSON-RPC endpoint URL.
    rpc_url: String,
}

impl JsonRpcTransport {
    /// Creates a JSON-RPC transport with [`DEFAULT_RPC_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`RpcTransportError::Config`] when HTTP client creation fails.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcTransportError> {
        Self::with_timeout(rpc_url, DEFAULT_RPC_TIMEOUT)
    }

    /// Creates a JSON-RPC transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RpcTransportError::Config`] when HTTP client creation fails.
    pub fn with_timeout(
        rpc_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RpcTransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| RpcTransportError::Config {
                message: error.to_string(),
            })?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Issues one JSON-RPC call and returns its `result`.
    async fn rpc_call<T>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, RpcTransportError>
    where
        T: DeserializeOwned,
    {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, rpc_url = %self.rpc_url, "rpc request");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|error| RpcTransportError::Failure {
                message: error.to_string(),
            })?;

        let response =
            response
                .error_for_status()
                .map_err(|error| RpcTransportError::Failure {
                    message: error.to_string(),
                })?;

        let parsed: JsonRpcResponse<T> =
            response
                .json()
                .await
                .map_err(|error| RpcTransportError::Failure {
                    message: error.to_string(),
                })?;

        if let Some(result) = parsed.result {
            return Ok(result);
        }
        if let Some(error) = parsed.error {
            tracing::debug!(method, code = error.code, message = %error.message, "rpc error");
            return Err(error.into_transport_error());
        }

        Err(RpcTransportError::Failure {
            message: format!("rpc method `{method}` returned neither result nor error"),
        })
    }
}

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    /// Result value for successful calls.
    result: Option<T>,
    /// Error payload for failed calls.
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// JSON-RPC error code.
    code: i64,
    /// Human-readable message.
    message: String,
    /// Method-specific payload, e.g. preflight simulation details.
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Converts the payload, normalizing preflight stale-blockhash failures.
    fn into_transport_error(self) -> RpcTransportError {
        let preflight_stale = self
            .data
            .as_ref()
            .and_then(|data| data.get("err"))
            .and_then(serde_json::Value::as_str)
            == Some("BlockhashNotFound");
        let message = if preflight_stale {
            STALE_BLOCKHASH_MESSAGE.to_owned()
        } else {
            self.message
        };
        RpcTransportError::InvalidResponse {
            code: self.code,
            message,
        }
    }
}

/// Decodes a base58 blockhash string.
fn parse_blockhash(value: &str) -> Result<Hash, RpcTransportError> {
    let bytes = bs58::decode(value)
        .into_vec()
        .map_err(|error| RpcTransportError::Failure {
            message: format!("invalid blockhash `{value}`: {error}"),
        })?;
    let array =
        <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| RpcTransportError::Failure {
            message: format!(
                "invalid blockhash `{value}`: expected 32 bytes, got {}",
                bytes.len()
            ),
        })?;
    Ok(Hash::new_from_array(array))
}

/// `{ context, value }` wrapper used by most query methods.
#[derive(Debug, Deserialize)]
struct RpcContextual<T> {
    /// Method value; null when the node has nothing to report.
    value: Option<T>,
}

/// `getLatestBlockhash` value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhashValue {
    /// Base58 blockhash.
    blockhash: String,
}

/// `simulateTransaction` value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateValue {
    /// Execution error, null on success.
    err: Option<serde_json::Value>,
    /// Program logs.
    logs: Option<Vec<String>>,
    /// Compute units consumed.
    units_consumed: Option<u64>,
}

#[async_trait]
impl RpcTransport for JsonRpcTransport {
    async fn latest_blockhash(&self) -> Result<Hash, RpcTransportError> {
        const METHOD: &str = "getLatestBlockhash";

        let response: RpcContextual<LatestBlockhashValue> =
            self.rpc_call(METHOD, serde_json::json!([])).await?;
        let value = response
            .value
            .ok_or(RpcTransportError::NullValue { method: METHOD })?;
        parse_blockhash(&value.blockhash)
    }

    async fn send_transaction(
        &self,
        tx: &SerializedTransaction,
        config: &RpcSubmitConfig,
    ) -> Result<String, RpcTransportError> {
        #[derive(Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SendConfig<'config> {
            /// Transaction encoding format.
            encoding: &'config str,
            /// Preflight skip flag.
            skip_preflight: bool,
            /// Optional preflight commitment.
            #[serde(skip_serializing_if = "Option::is_none")]
            preflight_commitment: Option<&'config str>,
            /// Optional node-side rebroadcast limit.
            #[serde(skip_serializing_if = "Option::is_none")]
            max_retries: Option<usize>,
        }

        self.rpc_call(
            "sendTransaction",
            serde_json::json!([
                tx.as_str(),
                SendConfig {
                    encoding: "base64",
                    skip_preflight: config.skip_preflight,
                    preflight_commitment: config.preflight_commitment.as_deref(),
                    max_retries: config.max_retries,
                }
            ]),
        )
        .await
    }

    async fn simulate_transaction(
        &self,
        tx: &SerializedTransaction,
        config: &RpcSimulateConfig,
    ) -> Result<SimulationResponse, RpcTransportError> {
        const METHOD: &str = "simulateTransaction";

        #[derive(Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SimulateConfig<'config> {
            /// Transaction encoding format.
            encoding: &'config str,
            /// Signature verification flag.
            sig_verify: bool,
            /// Optional commitment.
            #[serde(skip_serializing_if = "Option::is_none")]
            commitment: Option<&'config str>,
        }

        let response: RpcContextual<SimulateValue> = self
            .rpc_call(
                METHOD,
                serde_json::json!([
                    tx.as_str(),
                    SimulateConfig {
                        encoding: "base64",
                        sig_verify: config.sig_verify,
                        commitment: config.commitment.as_deref(),
                    }
                ]),
            )
            .await?;
        let value = response
            .value
            .ok_or(RpcTransportError::NullValue { method: METHOD })?;
        Ok(SimulationResponse {
            err: value.err,
            logs: value.logs.unwrap_or_default(),
            units_consumed: value.units_consumed,
        })
    }
}
