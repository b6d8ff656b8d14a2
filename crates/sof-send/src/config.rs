//! Environment-driven client configuration.

use std::{str::FromStr, time::Duration};

use crate::submit::{DEFAULT_MAX_BLOCKHASH_RETRIES, DEFAULT_RPC_TIMEOUT, RpcSubmitConfig};

/// RPC endpoint URL.
pub const ENV_RPC_URL: &str = "SOF_SEND_RPC_URL";
/// Per-request RPC timeout in milliseconds.
pub const ENV_RPC_TIMEOUT_MS: &str = "SOF_SEND_RPC_TIMEOUT_MS";
/// Skip preflight on `sendTransaction`.
pub const ENV_SKIP_PREFLIGHT: &str = "SOF_SEND_SKIP_PREFLIGHT";
/// Preflight commitment on `sendTransaction`.
pub const ENV_PREFLIGHT_COMMITMENT: &str = "SOF_SEND_PREFLIGHT_COMMITMENT";
/// Stale-blockhash retries after the first attempt.
pub const ENV_MAX_BLOCKHASH_RETRIES: &str = "SOF_SEND_MAX_BLOCKHASH_RETRIES";

/// Default local validator endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";

/// Settings used by [`crate::TxSubmitClient::from_config`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Per-request timeout.
    pub rpc_timeout: Duration,
    /// Stale-blockhash retries after the first attempt.
    pub max_blockhash_retries: u32,
    /// `sendTransaction` tuning.
    pub rpc_submit: RpcSubmitConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            max_blockhash_retries: DEFAULT_MAX_BLOCKHASH_RETRIES,
            rpc_submit: RpcSubmitConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Reads configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for unset or invalid
    /// values.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_ms = read_parsed(
            &lookup,
            ENV_RPC_TIMEOUT_MS,
            duration_to_ms_u64(defaults.rpc_timeout),
        );
        Self {
            rpc_url: lookup(ENV_RPC_URL)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.rpc_url),
            rpc_timeout: Duration::from_millis(timeout_ms),
            max_blockhash_retries: read_parsed(
                &lookup,
                ENV_MAX_BLOCKHASH_RETRIES,
                defaults.max_blockhash_retries,
            ),
            rpc_submit: RpcSubmitConfig {
                skip_preflight: lookup(ENV_SKIP_PREFLIGHT)
                    .map_or(defaults.rpc_submit.skip_preflight, |value| {
                        parse_bool(&value)
                    }),
                preflight_commitment: lookup(ENV_PREFLIGHT_COMMITMENT)
                    .filter(|value| !value.trim().is_empty()),
                max_retries: defaults.rpc_submit.max_retries,
            },
        }
    }
}

/// Parses the boolean spellings accepted across `SOF_*` variables.
fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

/// Reads and parses one variable, keeping `default` when unset or unparseable.
fn read_parsed<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(variable = name, value = %raw, "ignoring unparseable setting");
        default
    })
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
fn duration_to_ms_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
