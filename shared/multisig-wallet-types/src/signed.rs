//! Transport form of a co-signed operation.
//!
//! Numbers stay `U256` inside [`SignedOperation`]; they only become decimal strings in
//! [`SignedOperationRecord`], the serde shape handed to the executing co-signer.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::operation::{address_to_lower_hex, parse_address, parse_bytes, parse_u256, EncodingError, Operation};

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LEN: usize = 65;

/// An operation together with the proposer's recoverable signature over its digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SignedOperationRecord", try_from = "SignedOperationRecord")]
pub struct SignedOperation {
    operation: Operation,
    signature: [u8; SIGNATURE_LEN],
}

impl SignedOperation {
    pub fn new(operation: Operation, signature: [u8; SIGNATURE_LEN]) -> Self {
        Self { operation, signature }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }

    pub fn target(&self) -> Address {
        self.operation.target()
    }

    /// Lower-case hex form of the target.
    pub fn to_address(&self) -> String {
        address_to_lower_hex(self.operation.target())
    }

    pub fn value(&self) -> U256 {
        self.operation.value()
    }

    pub fn data(&self) -> &Bytes {
        self.operation.payload()
    }

    pub fn expire_time(&self) -> u64 {
        self.operation.expire_at()
    }

    pub fn sequence_id(&self) -> U256 {
        self.operation.sequence_id()
    }

    pub fn signature_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.signature)
    }

    pub fn to_record(&self) -> SignedOperationRecord {
        SignedOperationRecord::from(self.clone())
    }
}

/// Wire shape of a [`SignedOperation`]: field names follow the wallet's `sendMultiSig`
/// argument names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOperationRecord {
    pub to_address: String,
    pub value: String,
    pub data: String,
    pub expire_time: u64,
    pub sequence_id: String,
    pub signature: String,
}

impl From<SignedOperation> for SignedOperationRecord {
    fn from(signed: SignedOperation) -> Self {
        Self {
            to_address: signed.to_address(),
            value: signed.value().to_string(),
            data: format!("0x{}", hex::encode(signed.data())),
            expire_time: signed.expire_time(),
            sequence_id: signed.sequence_id().to_string(),
            signature: format!("0x{}", hex::encode(signed.signature)),
        }
    }
}

impl TryFrom<SignedOperationRecord> for SignedOperation {
    type Error = EncodingError;

    fn try_from(record: SignedOperationRecord) -> Result<Self, Self::Error> {
        let target = parse_address(&record.to_address)?;
        let value = parse_u256(&record.value)?;
        let payload = parse_bytes(&record.data)?;
        let sequence_id = parse_u256(&record.sequence_id)?;
        let sig = parse_bytes(&record.signature)?;
        if sig.len() != SIGNATURE_LEN {
            return Err(EncodingError::InvalidSignatureLength(sig.len()));
        }
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&sig);

        let operation = Operation::new(target, value, payload, record.expire_time, sequence_id);
        Ok(Self::new(operation, signature))
    }
}
