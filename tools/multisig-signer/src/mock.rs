//! In-memory wallet for off-chain testing.
//!
//! Applies the checks a deployed wallet applies in `sendMultiSig`, so signed operations
//! can be exercised end to end without a chain.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use alloy_primitives::{Address, Bytes, U256};
use multisig_wallet_types::{MultiSigWallet, Rejection, SignedOperation, SignerSet, TransactionHandle};

use crate::{digest::operation_digest, recover::recover_signer};

/// A call the mock wallet accepted and "executed".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutedCall {
    pub target: Address,
    pub value: U256,
    pub payload: Bytes,
    pub sequence_id: U256,
    pub proposer: Address,
    pub executor: Address,
}

#[derive(Debug, Default)]
struct WalletState {
    next_sequence_id: U256,
    /// Set once `U256::MAX` has been used; no id is acceptable afterwards.
    exhausted: bool,
    executed: Vec<ExecutedCall>,
}

/// Mock wallet; clones share state, each clone has its own calling account.
#[derive(Clone, Debug)]
pub struct MockWallet {
    signers: SignerSet,
    caller: Address,
    now_millis: Arc<AtomicU64>,
    state: Arc<Mutex<WalletState>>,
}

impl MockWallet {
    /// A fresh wallet (next sequence id 0) bound to the deployer as caller.
    pub fn new(signers: SignerSet, now_millis: u64) -> Self {
        let [_, _, deployer] = signers.addresses();
        Self {
            signers,
            caller: deployer,
            now_millis: Arc::new(AtomicU64::new(now_millis)),
            state: Arc::new(Mutex::new(WalletState::default())),
        }
    }

    /// Same wallet, calls sent from `caller`.
    pub fn connect(&self, caller: Address) -> Self {
        Self { caller, ..self.clone() }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn signers(&self) -> SignerSet {
        self.signers
    }

    pub fn set_time(&self, now_millis: u64) {
        self.now_millis.store(now_millis, Ordering::SeqCst);
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis.load(Ordering::SeqCst)
    }

    pub fn current_sequence_id(&self) -> U256 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).next_sequence_id
    }

    pub fn executed(&self) -> Vec<ExecutedCall> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).executed.clone()
    }

    /// Verify and execute `operation` as `self.caller`.
    pub fn execute(&self, operation: &SignedOperation) -> Result<TransactionHandle, Rejection> {
        let outcome = self.try_execute(operation);
        match &outcome {
            Ok(handle) => tracing::info!(
                sequence_id = %operation.sequence_id(),
                executor = %self.caller,
                tx = %handle.hash,
                "mock wallet executed operation"
            ),
            Err(rejection) => tracing::warn!(
                sequence_id = %operation.sequence_id(),
                executor = %self.caller,
                %rejection,
                "mock wallet rejected operation"
            ),
        }
        outcome
    }

    fn try_execute(&self, operation: &SignedOperation) -> Result<TransactionHandle, Rejection> {
        if !self.signers.contains(self.caller) {
            return Err(Rejection::NotSigner);
        }
        if operation.expire_time() < self.now_millis() {
            return Err(Rejection::ExpiredOperation);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.exhausted || operation.sequence_id() < state.next_sequence_id {
            return Err(Rejection::SequenceIdStale);
        }

        let digest = operation_digest(operation.operation());
        let proposer = recover_signer(&digest, operation.signature()).map_err(|_| Rejection::InvalidSignature)?;
        if !self.signers.contains(proposer) || proposer == self.caller {
            return Err(Rejection::SignerMismatch);
        }

        match operation.sequence_id().checked_add(U256::from(1u64)) {
            Some(next) => state.next_sequence_id = next,
            None => {
                state.next_sequence_id = U256::MAX;
                state.exhausted = true;
            }
        }
        state.executed.push(ExecutedCall {
            target: operation.target(),
            value: operation.value(),
            payload: operation.data().clone(),
            sequence_id: operation.sequence_id(),
            proposer,
            executor: self.caller,
        });
        Ok(TransactionHandle { hash: digest })
    }
}

impl MultiSigWallet for MockWallet {
    type Error = Rejection;

    async fn next_sequence_id(&self) -> Result<U256, Self::Error> {
        Ok(self.current_sequence_id())
    }

    async fn send_multi_sig(&self, operation: &SignedOperation) -> Result<TransactionHandle, Self::Error> {
        self.execute(operation)
    }
}
