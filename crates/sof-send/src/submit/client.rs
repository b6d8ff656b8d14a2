//! Submission client: build, sign, encode, dispatch, and retry on stale blockhash.

use std::sync::Arc;

use solana_message::Hash;
use solana_signer::{Signer, signers::Signers};

use super::{
    JsonRpcTransport, RpcSimulateConfig, RpcSubmitConfig, RpcTransport, RpcTransportError,
    SIMULATED_TRANSACTION_ID, SubmitError, SubmitMode, TxRequest,
    retry::{DEFAULT_MAX_BLOCKHASH_RETRIES, RetryState, classify_retryable},
};
use crate::{
    builder::{TxBuilder, resolve_fee_payer},
    config::ClientConfig,
    encoding::{SerializedTransaction, serialize_transaction},
    providers::{AccountStorage, RecentBlockhashProvider, RpcRecentBlockhashProvider, SharedSigner},
};

/// Transaction submission client.
///
/// Every call runs the full pipeline (fee payer, blockhash, build, sign, encode, dispatch)
/// and re-runs it from a fresh blockhash when the cluster reports the blockhash as stale.
/// Calls share no mutable state. Dropping a returned future abandons the in-flight request
/// and no further attempt is made.
pub struct TxSubmitClient {
    /// Blockhash source, queried once per attempt unless the caller pinned one.
    blockhash_provider: Arc<dyn RecentBlockhashProvider>,
    /// Transport used for dispatch.
    transport: Arc<dyn RpcTransport>,
    /// Optional default fee payer and signer.
    account_storage: Option<Arc<dyn AccountStorage>>,
    /// `sendTransaction` tuning.
    rpc_config: RpcSubmitConfig,
    /// `simulateTransaction` tuning.
    simulate_config: RpcSimulateConfig,
    /// Stale-blockhash retries allowed after the first attempt.
    max_blockhash_retries: u32,
}

impl TxSubmitClient {
    /// Creates a client that also sources blockhashes from `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            blockhash_provider: Arc::new(RpcRecentBlockhashProvider::new(transport.clone())),
            transport,
            account_storage: None,
            rpc_config: RpcSubmitConfig::default(),
            simulate_config: RpcSimulateConfig::default(),
            max_blockhash_retries: DEFAULT_MAX_BLOCKHASH_RETRIES,
        }
    }

    /// Creates a JSON-RPC backed client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RpcTransportError::Config`] when the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, RpcTransportError> {
        let transport = JsonRpcTransport::with_timeout(config.rpc_url.clone(), config.rpc_timeout)?;
        Ok(Self::new(Arc::new(transport))
            .with_rpc_config(config.rpc_submit.clone())
            .with_max_blockhash_retries(config.max_blockhash_retries))
    }

    /// Replaces the blockhash source.
    #[must_use]
    pub fn with_blockhash_provider(mut self, provider: Arc<dyn RecentBlockhashProvider>) -> Self {
        self.blockhash_provider = provider;
        self
    }

    /// Sets the default fee payer and signer storage.
    #[must_use]
    pub fn with_account_storage(mut self, storage: Arc<dyn AccountStorage>) -> Self {
        self.account_storage = Some(storage);
        self
    }

    /// Sets `sendTransaction` tuning.
    #[must_use]
    pub fn with_rpc_config(mut self, config: RpcSubmitConfig) -> Self {
        self.rpc_config = config;
        self
    }

    /// Sets `simulateTransaction` tuning.
    #[must_use]
    pub fn with_simulate_config(mut self, config: RpcSimulateConfig) -> Self {
        self.simulate_config = config;
        self
    }

    /// Sets how many stale-blockhash retries follow the first attempt.
    #[must_use]
    pub const fn with_max_blockhash_retries(mut self, retries: u32) -> Self {
        self.max_blockhash_retries = retries;
        self
    }

    /// Builds, signs, and sends a transaction, returning its signature.
    ///
    /// # Errors
    ///
    /// Returns the last [`SubmitError`] seen once the error is not a stale blockhash or the
    /// retry bound is reached.
    pub async fn submit_transaction<T>(
        &self,
        request: &TxRequest,
        signers: &T,
    ) -> Result<String, SubmitError>
    where
        T: Signers + ?Sized,
    {
        self.dispatch(request, signers, SubmitMode::Send).await
    }

    /// Builds, signs, and simulates a transaction.
    ///
    /// Returns [`SIMULATED_TRANSACTION_ID`] when the simulated execution succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Simulation`] when the simulator reports an execution error, or
    /// the last pipeline error as for [`Self::submit_transaction`].
    pub async fn simulate_transaction<T>(
        &self,
        request: &TxRequest,
        signers: &T,
    ) -> Result<String, SubmitError>
    where
        T: Signers + ?Sized,
    {
        self.dispatch(request, signers, SubmitMode::Simulate).await
    }

    /// Sends a transaction signed by the stored default account.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::InvalidRequest`] when no account is stored, otherwise as for
    /// [`Self::submit_transaction`].
    pub async fn submit_from_current_account(
        &self,
        request: &TxRequest,
    ) -> Result<String, SubmitError> {
        let account = self.current_account()?;
        let signers: [&dyn Signer; 1] = [account.as_ref()];
        self.dispatch(request, signers.as_slice(), SubmitMode::Send)
            .await
    }

    /// Simulates a transaction signed by the stored default account.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::InvalidRequest`] when no account is stored, otherwise as for
    /// [`Self::simulate_transaction`].
    pub async fn simulate_from_current_account(
        &self,
        request: &TxRequest,
    ) -> Result<String, SubmitError> {
        let account = self.current_account()?;
        let signers: [&dyn Signer; 1] = [account.as_ref()];
        self.dispatch(request, signers.as_slice(), SubmitMode::Simulate)
            .await
    }

    /// Returns the stored default account.
    fn current_account(&self) -> Result<SharedSigner, SubmitError> {
        self.account_storage
            .as_ref()
            .and_then(|storage| storage.current_account())
            .ok_or_else(|| SubmitError::InvalidRequest {
                reason: "no current account to sign with".to_owned(),
            })
    }

    /// Runs the pipeline until success, a non-retryable error, or the retry bound.
    async fn dispatch<T>(
        &self,
        request: &TxRequest,
        signers: &T,
        mode: SubmitMode,
    ) -> Result<String, SubmitError>
    where
        T: Signers + ?Sized,
    {
        let mut retry = RetryState::new(self.max_blockhash_retries);
        let mut pinned_blockhash = request.recent_blockhash;
        loop {
            tracing::debug!(
                ?mode,
                retries = retry.attempts_made(),
                pinned_blockhash = pinned_blockhash.is_some(),
                "running submit pipeline"
            );
            let error = match self
                .run_pipeline(request, pinned_blockhash, signers, mode)
                .await
            {
                Ok(id) => return Ok(id),
                Err(error) => error,
            };
            if !classify_retryable(&error) {
                return Err(error);
            }
            if !retry.record_retryable_failure() {
                tracing::warn!(
                    ?mode,
                    retries = retry.max_attempts(),
                    "stale blockhash retries exhausted"
                );
                return Err(error);
            }
            tracing::warn!(
                ?mode,
                retry = retry.attempts_made(),
                max_retries = retry.max_attempts(),
                %error,
                "stale blockhash; rebuilding with a fresh blockhash"
            );
            pinned_blockhash = None;
        }
    }

    /// Executes one pass of the pipeline.
    async fn run_pipeline<T>(
        &self,
        request: &TxRequest,
        pinned_blockhash: Option<Hash>,
        signers: &T,
        mode: SubmitMode,
    ) -> Result<String, SubmitError>
    where
        T: Signers + ?Sized,
    {
        let payer = resolve_fee_payer(request.fee_payer, self.account_storage.as_deref())
            .map_err(|error| SubmitError::InvalidRequest {
                reason: error.to_string(),
            })?;
        let blockhash = match pinned_blockhash {
            Some(blockhash) => blockhash,
            None => self
                .blockhash_provider
                .latest_blockhash()
                .await
                .map_err(|source| SubmitError::Blockhash { source })?,
        };

        let mut builder = TxBuilder::new(payer).with_instructions(&request.instructions);
        if let Some(units) = request.compute_unit_limit {
            builder = builder.with_compute_unit_limit(units);
        }
        if let Some(micro_lamports) = request.priority_fee_micro_lamports {
            builder = builder.with_priority_fee_micro_lamports(micro_lamports);
        }
        let signed = builder
            .build_and_sign(blockhash, signers)
            .map_err(|source| SubmitError::Sign { source })?;
        let encoded =
            serialize_transaction(&signed).map_err(|source| SubmitError::Serialize { source })?;

        match mode {
            SubmitMode::Send => self.send_encoded(&encoded).await,
            SubmitMode::Simulate => self.simulate_encoded(&encoded).await,
        }
    }

    /// Dispatches through `sendTransaction`.
    async fn send_encoded(&self, encoded: &SerializedTransaction) -> Result<String, SubmitError> {
        self.transport
            .send_transaction(encoded, &self.rpc_config)
            .await
            .map_err(|source| SubmitError::Rpc { source })
    }

    /// Dispatches through `simulateTransaction`; an execution error is a failure even though
    /// the call itself succeeded.
    async fn simulate_encoded(
        &self,
        encoded: &SerializedTransaction,
    ) -> Result<String, SubmitError> {
        let response = self
            .transport
            .simulate_transaction(encoded, &self.simulate_config)
            .await
            .map_err(|source| SubmitError::Rpc { source })?;
        if let Some(err) = response.err {
            return Err(SubmitError::Simulation {
                err,
                logs: response.logs,
            });
        }
        tracing::debug!(units_consumed = ?response.units_consumed, "simulation succeeded");
        Ok(SIMULATED_TRANSACTION_ID.to_owned())
    }
}
