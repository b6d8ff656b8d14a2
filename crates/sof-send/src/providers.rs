//! Provider traits and basic in-memory adapters used by the submission pipeline.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::submit::{RpcTransport, RpcTransportError};

/// Shared signing credential handed out by [`AccountStorage`].
pub type SharedSigner = Arc<dyn Signer + Send + Sync>;

/// Source of recent blockhashes.
///
/// Implementations must not cache across calls: a stale-blockhash retry relies on every call
/// returning the newest value the cluster knows about.
#[async_trait]
pub trait RecentBlockhashProvider: Send + Sync {
    /// Returns the newest blockhash.
    async fn latest_blockhash(&self) -> Result<Hash, RpcTransportError>;
}

/// Read-only lookup of the default fee payer and signer.
pub trait AccountStorage: Send + Sync {
    /// Returns the current default account, if one is stored.
    fn current_account(&self) -> Option<SharedSigner>;

    /// Returns the public key of the current default account.
    fn current_pubkey(&self) -> Option<Pubkey> {
        self.current_account().map(|account| account.pubkey())
    }
}

/// Blockhash provider that queries `getLatestBlockhash` on every call.
#[derive(Clone)]
pub struct RpcRecentBlockhashProvider {
    /// Transport used for the lookup.
    transport: Arc<dyn RpcTransport>,
}

impl RpcRecentBlockhashProvider {
    /// Creates a provider backed by an RPC transport.
    #[must_use]
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl RecentBlockhashProvider for RpcRecentBlockhashProvider {
    async fn latest_blockhash(&self) -> Result<Hash, RpcTransportError> {
        self.transport.latest_blockhash().await
    }
}

/// In-memory blockhash provider for tests and static configurations.
#[derive(Debug, Clone)]
pub struct StaticRecentBlockhashProvider {
    /// Static blockhash returned on every call.
    value: Hash,
}

impl StaticRecentBlockhashProvider {
    /// Creates a provider that always returns `value`.
    #[must_use]
    pub const fn new(value: Hash) -> Self {
        Self { value }
    }
}

#[async_trait]
impl RecentBlockhashProvider for StaticRecentBlockhashProvider {
    async fn latest_blockhash(&self) -> Result<Hash, RpcTransportError> {
        Ok(self.value)
    }
}

/// In-memory account storage holding at most one default account.
#[derive(Default)]
pub struct InMemoryAccountStorage {
    /// Currently stored account.
    account: RwLock<Option<SharedSigner>>,
}

impl InMemoryAccountStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-populated with `account`.
    #[must_use]
    pub fn with_account(account: SharedSigner) -> Self {
        Self {
            account: RwLock::new(Some(account)),
        }
    }

    /// Replaces the stored account.
    pub fn save(&self, account: SharedSigner) {
        *self.account.write().unwrap_or_else(PoisonError::into_inner) = Some(account);
    }

    /// Removes the stored account.
    pub fn clear(&self) {
        *self.account.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AccountStorage for InMemoryAccountStorage {
    fn current_account(&self) -> Option<SharedSigner> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use solana_keypair::Keypair;

    use super::*;

    #[test]
    fn in_memory_storage_saves_and_clears_account() {
        let storage = InMemoryAccountStorage::new();
        assert!(storage.current_account().is_none());

        let keypair = Keypair::new();
        let pubkey = keypair.pubkey();
        storage.save(Arc::new(keypair));
        assert_eq!(storage.current_pubkey(), Some(pubkey));

        storage.clear();
        assert_eq!(storage.current_pubkey(), None);
    }

    #[test]
    fn poisoned_storage_keeps_accepting_writes() {
        let storage = InMemoryAccountStorage::new();
        let panicked = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = storage.account.write();
                    panic!("writer died holding the account lock");
                })
                .join()
                .is_err()
        });
        assert!(panicked);
        assert!(storage.account.is_poisoned());

        let keypair = Keypair::new();
        let pubkey = keypair.pubkey();
        storage.save(Arc::new(keypair));
        assert_eq!(storage.current_pubkey(), Some(pubkey));

        storage.clear();
        assert!(storage.current_account().is_none());
    }

    #[tokio::test]
    async fn static_provider_returns_same_blockhash() {
        let hash = Hash::new_from_array([4_u8; 32]);
        let provider = StaticRecentBlockhashProvider::new(hash);
        assert_eq!(provider.latest_blockhash().await, Ok(hash));
        assert_eq!(provider.latest_blockhash().await, Ok(hash));
    }
}
