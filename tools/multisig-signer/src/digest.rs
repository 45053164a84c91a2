use alloy_primitives::B256;
use multisig_wallet_types::Operation;
use sha3::{Digest, Keccak256};

use crate::encoder::encode_operation;

/// Prefix of the personal-message (EIP-191 version `0x45`) hash for a 32-byte message.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

pub fn keccak256_bytes(bytes: &[u8]) -> B256 {
    let mut h = Keccak256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(out.as_slice());
    B256::from(b)
}

/// Operation hash the wallet recomputes in `sendMultiSig`.
pub fn operation_digest(operation: &Operation) -> B256 {
    keccak256_bytes(&encode_operation(operation))
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || digest)`, the value actually signed.
pub fn personal_message_hash(digest: &B256) -> B256 {
    let mut buf = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    buf.extend_from_slice(digest.as_slice());
    keccak256_bytes(&buf)
}
