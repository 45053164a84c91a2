use core::str::FromStr;

use alloy_primitives::{Address, Bytes, U256};

/// Domain tag hashed in front of every operation.
///
/// The verifier hard-codes the same string for native-value / call operations, so a
/// signature produced here cannot be replayed against its token-transfer or batch paths.
pub const OPERATION_TAG: &str = "ETHER";

const ADDRESS_LEN: usize = 20;

/// Errors raised while turning untyped caller input into an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("target address must be 20 bytes, got {0}")]
    InvalidAddressLength(usize),
    #[error("invalid target address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },
    #[error("invalid hex payload: {0}")]
    InvalidPayload(String),
    #[error("invalid decimal number {input:?}: {reason}")]
    InvalidNumber { input: String, reason: String },
    #[error("invalid signature: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),
    #[error("expiry window must be at least one second")]
    ZeroExpiry,
    #[error("expiry does not fit in u64 milliseconds")]
    ExpiryOverflow,
}

/// A populated but unsent contract call: where it goes, how much native value it carries,
/// and its call data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseCall {
    pub target: Address,
    /// Defaults to zero when absent.
    pub value: Option<U256>,
    pub payload: Bytes,
}

impl BaseCall {
    pub fn new(target: Address, value: Option<U256>, payload: Bytes) -> Self {
        Self { target, value, payload }
    }

    /// Build a call from raw bytes, rejecting targets that are not exactly 20 bytes.
    pub fn from_slices(target: &[u8], value: Option<U256>, payload: &[u8]) -> Result<Self, EncodingError> {
        if target.len() != ADDRESS_LEN {
            return Err(EncodingError::InvalidAddressLength(target.len()));
        }
        Ok(Self::new(Address::from_slice(target), value, Bytes::copy_from_slice(payload)))
    }

    /// Parse hex / decimal string input (CLI, JSON). Address case is not significant.
    pub fn parse(target: &str, value: Option<&str>, payload: &str) -> Result<Self, EncodingError> {
        let target = parse_address(target)?;
        let value = value.map(parse_u256).transpose()?;
        let payload = parse_bytes(payload)?;
        Ok(Self::new(target, value, payload))
    }

    pub fn value_or_zero(&self) -> U256 {
        self.value.unwrap_or(U256::ZERO)
    }
}

/// A proposed wallet operation plus its replay and expiry metadata.
///
/// Fields are fixed at construction; re-signing requires a new `Operation` with a fresh
/// sequence id and expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    target: Address,
    value: U256,
    payload: Bytes,
    expire_at: u64,
    sequence_id: U256,
}

impl Operation {
    pub fn new(target: Address, value: U256, payload: Bytes, expire_at: u64, sequence_id: U256) -> Self {
        Self { target, value, payload, expire_at, sequence_id }
    }

    pub fn from_call(call: BaseCall, expire_at: u64, sequence_id: U256) -> Self {
        let value = call.value_or_zero();
        Self::new(call.target, value, call.payload, expire_at, sequence_id)
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Unix timestamp in milliseconds.
    pub fn expire_at(&self) -> u64 {
        self.expire_at
    }

    pub fn sequence_id(&self) -> U256 {
        self.sequence_id
    }
}

pub fn parse_address(input: &str) -> Result<Address, EncodingError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed);
    if digits.len() % 2 != 0 {
        return Err(EncodingError::InvalidAddress {
            input: input.to_string(),
            reason: format!("odd number of hex digits ({})", digits.len()),
        });
    }
    if digits.len() != ADDRESS_LEN * 2 {
        return Err(EncodingError::InvalidAddressLength(digits.len() / 2));
    }
    Address::from_str(digits)
        .map_err(|err| EncodingError::InvalidAddress { input: input.to_string(), reason: err.to_string() })
}

pub fn parse_bytes(input: &str) -> Result<Bytes, EncodingError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "0x" {
        return Ok(Bytes::new());
    }
    Bytes::from_str(trimmed).map_err(|err| EncodingError::InvalidPayload(err.to_string()))
}

pub fn parse_u256(input: &str) -> Result<U256, EncodingError> {
    U256::from_str_radix(input.trim(), 10)
        .map_err(|err| EncodingError::InvalidNumber { input: input.to_string(), reason: err.to_string() })
}

/// Lower-case, `0x`-prefixed form used for canonical comparison and transport.
pub fn address_to_lower_hex(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}
