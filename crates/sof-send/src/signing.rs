//! Signing boundary between the builder and the wire encoder.

use solana_signature::Signature;
use solana_signer::{SignerError, signers::Signers};
use solana_transaction::versioned::VersionedTransaction;
use thiserror::Error;

use crate::builder::UnsignedTx;

/// Signing-layer errors.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SigningError {
    /// Signing failed with signer-level error.
    #[error("failed to sign transaction: {source}")]
    SignTransaction {
        /// Underlying signer error.
        source: SignerError,
    },
}

/// Fully signed transaction.
///
/// Only [`sign_transaction`] produces this type and it exposes no mutable access, so a
/// signed body can never be patched after the fact. Retrying means building a new one.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignedTransaction {
    /// Signed transaction payload.
    pub(crate) tx: VersionedTransaction,
}

impl SignedTransaction {
    /// Returns the signed transaction.
    #[must_use]
    pub const fn transaction(&self) -> &VersionedTransaction {
        &self.tx
    }

    /// Returns the fee payer signature, which doubles as the transaction id.
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        self.tx.signatures.first()
    }
}

/// Signs an unsigned transaction over its canonical message bytes.
///
/// Signatures are placed in the order of the message's signer account keys.
///
/// # Errors
///
/// Returns [`SigningError::SignTransaction`] when a required signer is missing, an extra
/// signer is not referenced by the message, or a signer fails to produce a signature.
pub fn sign_transaction<T>(
    unsigned: UnsignedTx,
    signers: &T,
) -> Result<SignedTransaction, SigningError>
where
    T: Signers + ?Sized,
{
    VersionedTransaction::try_new(unsigned.into_message(), signers)
        .map(|tx| SignedTransaction { tx })
        .map_err(|source| SigningError::SignTransaction { source })
}
