use alloy_primitives::{Address, U256};
use multisig_wallet_types::{Operation, OPERATION_TAG};

/// Encode an operation exactly as the wallet does before hashing:
/// `abi.encodePacked("ETHER", toAddress, value, data, expireTime, sequenceId)`.
pub fn encode_operation(operation: &Operation) -> Vec<u8> {
    encode_packed_with_tag(
        OPERATION_TAG,
        operation.target(),
        operation.value(),
        operation.payload(),
        U256::from(operation.expire_at()),
        operation.sequence_id(),
    )
}

/// Packed `(string, address, uint256, bytes, uint256, uint256)` encoding.
///
/// Packed mode writes `string` and `bytes` as their raw contents with no length word,
/// addresses as 20 bytes and every `uint256` as a 32-byte big-endian word.
pub fn encode_packed_with_tag(
    tag: &str,
    target: Address,
    value: U256,
    payload: &[u8],
    expire_at: U256,
    sequence_id: U256,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tag.len() + 20 + 32 + payload.len() + 32 + 32);

    // string tag
    buf.extend_from_slice(tag.as_bytes());

    // address toAddress
    buf.extend_from_slice(target.as_slice());

    // uint256 value
    buf.extend_from_slice(&value.to_be_bytes::<32>());

    // bytes data
    buf.extend_from_slice(payload);

    // uint256 expireTime
    buf.extend_from_slice(&expire_at.to_be_bytes::<32>());

    // uint256 sequenceId
    buf.extend_from_slice(&sequence_id.to_be_bytes::<32>());

    buf
}
