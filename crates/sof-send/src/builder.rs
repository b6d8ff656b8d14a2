//! Transaction message builder.

use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_message::{Hash, Instruction, Message, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signer::signers::Signers;
use thiserror::Error;

use crate::{
    providers::AccountStorage,
    signing::{SignedTransaction, SigningError, sign_transaction},
};

/// Builder-layer errors.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum BuilderError {
    /// No explicit fee payer was given and no default account is stored.
    #[error("fee payer not found")]
    MissingFeePayer,
}

/// Resolves the fee payer from an explicit key or the stored default account.
///
/// # Errors
///
/// Returns [`BuilderError::MissingFeePayer`] when neither source yields a key.
pub fn resolve_fee_payer(
    explicit: Option<Pubkey>,
    storage: Option<&dyn AccountStorage>,
) -> Result<Pubkey, BuilderError> {
    explicit
        .or_else(|| storage.and_then(|storage| storage.current_pubkey()))
        .ok_or(BuilderError::MissingFeePayer)
}

/// Unsigned transaction wrapper.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    /// Versioned message ready to sign.
    message: VersionedMessage,
}

impl UnsignedTx {
    /// Returns the message payload.
    #[must_use]
    pub const fn message(&self) -> &VersionedMessage {
        &self.message
    }

    /// Returns the fee payer, which is always the first static account key.
    #[must_use]
    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.message.static_account_keys().first()
    }

    /// Returns the blockhash this message was built against.
    #[must_use]
    pub fn recent_blockhash(&self) -> &Hash {
        self.message.recent_blockhash()
    }

    /// Consumes the wrapper and returns the message.
    pub(crate) fn into_message(self) -> VersionedMessage {
        self.message
    }

    /// Signs the message with provided signers.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] when signer validation or signing fails.
    pub fn sign<T>(self, signers: &T) -> Result<SignedTransaction, SigningError>
    where
        T: Signers + ?Sized,
    {
        sign_transaction(self, signers)
    }
}

/// Builder for legacy-versioned transaction messages.
///
/// Borrows the caller's instructions; nothing is copied until the message is compiled.
#[derive(Debug, Clone)]
pub struct TxBuilder<'ix> {
    /// Fee payer and signer.
    payer: Pubkey,
    /// User-provided instructions.
    instructions: &'ix [Instruction],
    /// Optional compute unit limit.
    compute_unit_limit: Option<u32>,
    /// Optional priority fee (micro-lamports per compute unit).
    priority_fee_micro_lamports: Option<u64>,
}

impl<'ix> TxBuilder<'ix> {
    /// Creates a transaction builder for a fee payer.
    #[must_use]
    pub const fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            instructions: &[],
            compute_unit_limit: None,
            priority_fee_micro_lamports: None,
        }
    }

    /// Sets the ordered instruction list.
    #[must_use]
    pub const fn with_instructions(mut self, instructions: &'ix [Instruction]) -> Self {
        self.instructions = instructions;
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

    /// Returns the fee payer.
    #[must_use]
    pub const fn payer(&self) -> &Pubkey {
        &self.payer
    }

    /// Builds an unsigned transaction wrapper.
    #[must_use]
    pub fn build_unsigned(&self, recent_blockhash: Hash) -> UnsignedTx {
        UnsignedTx {
            message: self.build_message(recent_blockhash),
        }
    }

    /// Builds and signs a transaction in one step.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] when signer validation or signing fails.
    pub fn build_and_sign<T>(
        &self,
        recent_blockhash: Hash,
        signers: &T,
    ) -> Result<SignedTransaction, SigningError>
    where
        T: Signers + ?Sized,
    {
        self.build_unsigned(recent_blockhash).sign(signers)
    }

    /// Builds a legacy message wrapped as a versioned message.
    #[must_use]
    pub fn build_message(&self, recent_blockhash: Hash) -> VersionedMessage {
        let mut budget = Vec::new();
        if let Some(units) = self.compute_unit_limit {
            budget.push(ComputeBudgetInstruction::set_compute_unit_limit(units));
        }
        if let Some(micro_lamports) = self.priority_fee_micro_lamports {
            budget.push(ComputeBudgetInstruction::set_compute_unit_price(
                micro_lamports,
            ));
        }
        let message = if budget.is_empty() {
            Message::new_with_blockhash(self.instructions, Some(&self.payer), &recent_blockhash)
        } else {
            budget.extend_from_slice(self.instructions);
            Message::new_with_blockhash(&budget, Some(&self.payer), &recent_blockhash)
        };
        VersionedMessage::Legacy(message)
    }
}
