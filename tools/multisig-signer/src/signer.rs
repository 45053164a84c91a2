//! Co-signer identities and personal-message signing.

use std::fmt;

use alloy_primitives::{Address, B256};
use k256::ecdsa::{SigningKey, VerifyingKey};
use multisig_wallet_types::SIGNATURE_LEN;

use crate::digest::{keccak256_bytes, personal_message_hash};

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("signing key material is missing")]
    MissingKey,
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("digest must be 32 bytes, got {0}")]
    InvalidDigestLength(usize),
    #[error("signing backend rejected digest: {0}")]
    Backend(#[from] k256::ecdsa::Error),
}

/// A co-signer: secp256k1 key plus the account address derived from it.
#[derive(Clone)]
pub struct SignerIdentity {
    key: SigningKey,
    address: Address,
}

impl SignerIdentity {
    pub fn from_signing_key(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    pub fn from_bytes(secret: &[u8]) -> Result<Self, SigningError> {
        if secret.is_empty() {
            return Err(SigningError::MissingKey);
        }
        let key = SigningKey::from_slice(secret).map_err(|err| SigningError::InvalidKey(err.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    /// Parse a hex private key, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, SigningError> {
        let trimmed = secret.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(SigningError::MissingKey);
        }
        let bytes = hex::decode(digits).map_err(|err| SigningError::InvalidKey(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Underlying key, for handing the same identity to a transaction signer.
    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// Sign a 32-byte operation digest under the personal-message scheme.
    ///
    /// Returns `r || s || v` with `v` in `{27, 28}`; `s` is low-order normalised.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<[u8; SIGNATURE_LEN], SigningError> {
        if digest.len() != 32 {
            return Err(SigningError::InvalidDigestLength(digest.len()));
        }
        let prehash = personal_message_hash(&B256::from_slice(digest));
        let (signature, recovery_id) = self.key.sign_prehash_recoverable(prehash.as_slice())?;

        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte() + 27;
        tracing::debug!(signer = %self.address, digest = %B256::from_slice(digest), "signed operation digest");
        Ok(out)
    }
}

impl fmt::Debug for SignerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerIdentity").field("address", &self.address).finish_non_exhaustive()
    }
}

/// Account address of a public key: last 20 bytes of `keccak256(x || y)`.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256_bytes(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
