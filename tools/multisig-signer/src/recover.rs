//! Signer recovery, mirroring what the wallet does with `ecrecover`.
//!
//! Used off-chain to check a signed operation before it is handed to the executor.

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use multisig_wallet_types::{SignedOperation, SIGNATURE_LEN};

use crate::{
    digest::{operation_digest, personal_message_hash},
    signer::address_of,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoverError {
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("unsupported recovery byte {0} (expected 0, 1, 27 or 28)")]
    InvalidRecoveryId(u8),
    #[error("malformed signature scalars")]
    MalformedSignature,
    #[error("no public key recovers from this signature")]
    RecoveryFailed,
}

/// Recover the address that signed `digest` under the personal-message scheme.
///
/// Accepts `v` in `{0, 1, 27, 28}`, the same range the wallet tolerates.
pub fn recover_signer(digest: &B256, signature: &[u8]) -> Result<Address, RecoverError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(RecoverError::InvalidLength(signature.len()));
    }
    let v_raw = signature[64];
    let v = match v_raw {
        27 | 28 => v_raw - 27,
        0 | 1 => v_raw,
        other => return Err(RecoverError::InvalidRecoveryId(other)),
    };
    let recovery_id = RecoveryId::from_byte(v).ok_or(RecoverError::InvalidRecoveryId(v_raw))?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| RecoverError::MalformedSignature)?;

    let prehash = personal_message_hash(digest);
    let key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &sig, recovery_id)
        .map_err(|_| RecoverError::RecoveryFailed)?;
    Ok(address_of(&key))
}

/// Recover the proposer of a signed operation from its own fields.
pub fn recover_operation_signer(signed: &SignedOperation) -> Result<Address, RecoverError> {
    let digest = operation_digest(signed.operation());
    recover_signer(&digest, signed.signature())
}
