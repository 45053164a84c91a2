//! Off-chain co-signer for 2-of-3 multisig wallets.
//!
//! Pipeline: [`encoder`] packs an operation, [`digest`] hashes it, [`signer`] signs the
//! personal-message hash of that digest, [`assembler`] ties them together into a
//! [`SignedOperation`] for the executing co-signer.

pub mod assembler;
pub mod calls;
pub mod config;
pub mod digest;
pub mod encoder;
pub mod flow;
pub mod mock;
pub mod recover;
pub mod signer;

#[cfg(test)]
mod tests;

pub use assembler::{assemble, AssembleError, Clock, FixedClock, SystemClock};
pub use config::{ConfigError, WalletConfig};
pub use digest::{operation_digest, personal_message_hash};
pub use encoder::encode_operation;
pub use flow::{propose_and_execute, FlowError};
pub use mock::{ExecutedCall, MockWallet};
pub use recover::{recover_operation_signer, recover_signer, RecoverError};
pub use signer::{SignerIdentity, SigningError};

pub use multisig_wallet_types::{BaseCall, Operation, SignedOperation, SignedOperationRecord};
