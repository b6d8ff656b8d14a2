//! Wire encoding of signed transactions for the RPC submission endpoints.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use solana_signature::Signature;
use thiserror::Error;

use crate::signing::SignedTransaction;

/// Largest serialized transaction the cluster accepts (IPv6 MTU minus headers).
pub const MAX_TRANSACTION_BYTES: usize = 1_232;

/// Encoder errors. Every variant reports as "Could not serialize transaction".
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Bincode encoding failed.
    #[error("Could not serialize transaction: {source}")]
    Encode {
        /// Bincode encode error.
        source: Box<bincode::ErrorKind>,
    },
    /// Encoded transaction exceeds the packet limit.
    #[error("Could not serialize transaction: {size} bytes exceeds limit of {max}")]
    TooLarge {
        /// Encoded size in bytes.
        size: usize,
        /// Allowed maximum.
        max: usize,
    },
    /// Signature set does not match the message's required signers.
    #[error(
        "Could not serialize transaction: expected {expected} signatures, found {actual} valid"
    )]
    MalformedSignatures {
        /// Required signature count from the message header.
        expected: usize,
        /// Non-placeholder signatures present.
        actual: usize,
    },
}

/// Base64-encoded wire transaction.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SerializedTransaction(String);

impl SerializedTransaction {
    /// Wraps an arbitrary payload without validating it.
    #[cfg(test)]
    pub(crate) fn from_base64_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the base64 payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the base64 payload.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SerializedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes a signed transaction into the base64 form the RPC endpoints expect.
///
/// # Errors
///
/// Returns [`SerializeError`] when the signature set is incomplete, bincode fails, or the
/// encoded bytes exceed [`MAX_TRANSACTION_BYTES`].
pub fn serialize_transaction(
    signed: &SignedTransaction,
) -> Result<SerializedTransaction, SerializeError> {
    let tx = signed.transaction();
    let expected = usize::from(tx.message.header().num_required_signatures);
    let actual = tx
        .signatures
        .iter()
        .filter(|signature| **signature != Signature::default())
        .count();
    if tx.signatures.len() != expected || actual != expected {
        return Err(SerializeError::MalformedSignatures { expected, actual });
    }

    let bytes = bincode::serialize(tx).map_err(|source| SerializeError::Encode { source })?;
    if bytes.len() > MAX_TRANSACTION_BYTES {
        return Err(SerializeError::TooLarge {
            size: bytes.len(),
            max: MAX_TRANSACTION_BYTES,
        });
    }
    Ok(SerializedTransaction(BASE64_STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use solana_keypair::Keypair;
    use solana_message::{Hash, Instruction};
    use solana_pubkey::Pubkey;
    use solana_signer::Signer;
    use solana_system_interface::instruction as system_instruction;
    use solana_transaction::versioned::VersionedTransaction;

    use super::*;
    use crate::builder::TxBuilder;

    fn signed_transfer(payer: &Keypair, blockhash: Hash) -> Option<SignedTransaction> {
        let instructions = [system_instruction::transfer(
            &payer.pubkey(),
            &Pubkey::new_unique(),
            1,
        )];
        TxBuilder::new(payer.pubkey())
            .with_instructions(&instructions)
            .build_and_sign(blockhash, &[payer])
            .ok()
    }

    #[test]
    fn encodes_wire_bytes_as_base64() {
        let payer = Keypair::new();
        let signed = signed_transfer(&payer, Hash::new_from_array([1_u8; 32]));
        assert!(signed.is_some());
        if let Some(signed) = signed {
            let encoded = serialize_transaction(&signed);
            assert!(encoded.is_ok());
            if let Ok(encoded) = encoded {
                assert!(!encoded.as_str().is_empty());
                let raw = BASE64_STANDARD.decode(encoded.as_str());
                assert!(raw.is_ok());
                if let Ok(raw) = raw {
                    let decoded: Result<VersionedTransaction, _> = bincode::deserialize(&raw);
                    assert_eq!(decoded.ok().as_ref(), Some(signed.transaction()));
                }
            }
        }
    }

    #[test]
    fn same_inputs_serialize_identically() {
        let payer = Keypair::new();
        let recipient = Pubkey::new_unique();
        let instructions = [system_instruction::transfer(&payer.pubkey(), &recipient, 5)];
        let builder = TxBuilder::new(payer.pubkey()).with_instructions(&instructions);
        let blockhash = Hash::new_from_array([2_u8; 32]);

        let first = builder
            .build_and_sign(blockhash, &[&payer])
            .ok()
            .and_then(|signed| serialize_transaction(&signed).ok());
        let second = builder
            .build_and_sign(blockhash, &[&payer])
            .ok()
            .and_then(|signed| serialize_transaction(&signed).ok());
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn placeholder_signature_is_rejected() {
        let payer = Keypair::new();
        let signed = signed_transfer(&payer, Hash::new_from_array([3_u8; 32]));
        assert!(signed.is_some());
        if let Some(mut signed) = signed {
            signed.tx.signatures = vec![Signature::default()];
            let result = serialize_transaction(&signed);
            assert!(matches!(
                result,
                Err(SerializeError::MalformedSignatures {
                    expected: 1,
                    actual: 0
                })
            ));
            if let Err(error) = result {
                assert!(
                    error
                        .to_string()
                        .starts_with("Could not serialize transaction")
                );
            }
        }
    }

    #[test]
    fn oversized_transaction_is_rejected() {
        let payer = Keypair::new();
        let program_id = Pubkey::new_unique();
        let instructions = [Instruction::new_with_bytes(
            program_id,
            &[0_u8; MAX_TRANSACTION_BYTES],
            Vec::new(),
        )];
        let signed = TxBuilder::new(payer.pubkey())
            .with_instructions(&instructions)
            .build_and_sign(Hash::new_from_array([4_u8; 32]), &[&payer]);
        assert!(signed.is_ok());
        if let Ok(signed) = signed {
            assert!(matches!(
                serialize_transaction(&signed),
                Err(SerializeError::TooLarge {
                    max: MAX_TRANSACTION_BYTES,
                    ..
                })
            ));
        }
    }
}
