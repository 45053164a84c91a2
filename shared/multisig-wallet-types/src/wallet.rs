use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::{Address, B256, U256};

use crate::signed::SignedOperation;

/// Outcomes with which the on-chain wallet refuses a `sendMultiSig`.
///
/// The signer never raises these itself; they are only observable after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// `expireTime` is already in the past.
    #[error("operation expired")]
    ExpiredOperation,
    /// Sequence id was already used or lies below the wallet's window.
    #[error("sequence id already used")]
    SequenceIdStale,
    /// Recovered signer is not a co-signer, or is the executing caller itself.
    #[error("signer mismatch")]
    SignerMismatch,
    /// The submitting account is not a registered co-signer.
    #[error("caller is not a signer")]
    NotSigner,
    /// Signature bytes could not be recovered to any address.
    #[error("invalid signature")]
    InvalidSignature,
}

/// Receipt of an accepted `sendMultiSig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHandle {
    pub hash: B256,
}

/// The verifier contract, as seen by the off-chain co-signers.
///
/// Implemented by the RPC client against a deployed wallet and by an in-memory mock for
/// off-chain testing. Implementations perform a single attempt per call.
#[allow(async_fn_in_trait)]
pub trait MultiSigWallet {
    type Error;

    /// Next unused sequence id (read-only).
    async fn next_sequence_id(&self) -> Result<U256, Self::Error>;

    /// Submit a co-signed operation; the implementation's bound account is the executor.
    async fn send_multi_sig(&self, operation: &SignedOperation) -> Result<TransactionHandle, Self::Error>;
}

/// Maps a co-signer's raw address to the address the wallet sees when it executes.
///
/// Some execution environments translate the caller address before it reaches the
/// contract; the executor must be registered under the translated form.
pub trait ExecutorAddressResolver {
    fn resolve_executor_address(&self, raw: Address) -> Address;
}

/// Resolver for chains where the executing address is the account address.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAddress;

impl ExecutorAddressResolver for DirectAddress {
    fn resolve_executor_address(&self, raw: Address) -> Address {
        raw
    }
}

/// Resolver backed by a fixed table of known translations; unknown addresses pass through.
#[derive(Debug, Clone, Default)]
pub struct StaticAddressMap {
    overrides: BTreeMap<Address, Address>,
}

impl StaticAddressMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, raw: Address, resolved: Address) -> Self {
        self.overrides.insert(raw, resolved);
        self
    }
}

impl ExecutorAddressResolver for StaticAddressMap {
    fn resolve_executor_address(&self, raw: Address) -> Address {
        self.overrides.get(&raw).copied().unwrap_or(raw)
    }
}

/// The three co-signers a wallet is initialised with: proposer, executor, deployer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerSet {
    signers: [Address; 3],
}

impl SignerSet {
    /// Only the executor (second signer) goes through `resolver`.
    pub fn new<R: ExecutorAddressResolver + ?Sized>(
        signer_one: Address,
        signer_two: Address,
        deployer: Address,
        resolver: &R,
    ) -> Self {
        let executor = resolver.resolve_executor_address(signer_two);
        Self { signers: [signer_one, executor, deployer] }
    }

    pub fn contains(&self, address: Address) -> bool {
        self.signers.contains(&address)
    }

    pub fn addresses(&self) -> [Address; 3] {
        self.signers
    }

    pub fn executor(&self) -> Address {
        self.signers[1]
    }
}

impl fmt::Display for SignerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.signers;
        write!(f, "{a}, {b}, {c}")
    }
}
