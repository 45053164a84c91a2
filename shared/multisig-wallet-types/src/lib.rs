//! Shared types for the multisig wallet: operations, signed records and the wallet interface.

pub mod operation;
pub mod signed;
pub mod wallet;

pub use operation::{BaseCall, EncodingError, Operation, OPERATION_TAG};
pub use signed::{SignedOperation, SignedOperationRecord, SIGNATURE_LEN};
pub use wallet::{
    DirectAddress, ExecutorAddressResolver, MultiSigWallet, Rejection, SignerSet, StaticAddressMap,
    TransactionHandle,
};
