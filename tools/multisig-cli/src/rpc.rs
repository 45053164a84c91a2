//! JSON-RPC client for a deployed wallet.
//!
//! One attempt per call: no gas overrides, no resubmission, no retry on provider errors.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use ethers::{
    contract::abigen,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address as EthAddress, Bytes as EthBytes, U256 as EthU256, U64},
};
use multisig_signer::SignerIdentity;
use multisig_wallet_types::{MultiSigWallet, SignedOperation, TransactionHandle};

abigen!(
    WalletSimple,
    r#"[
        function getNextSequenceId() external view returns (uint256)
        function sendMultiSig(address toAddress, uint256 value, bytes data, uint256 expireTime, uint256 sequenceId, bytes signature) external
    ]"#
);

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("invalid rpc url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("executor key rejected: {0}")]
    Key(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("contract call failed: {0}")]
    Contract(String),
    #[error("transaction {0} dropped before inclusion")]
    Dropped(B256),
    #[error("transaction {0} reverted")]
    Reverted(B256),
}

/// Wallet contract bound to the executing co-signer's account.
pub struct RpcWallet {
    contract: WalletSimple<Client>,
    executor: Address,
}

impl RpcWallet {
    pub async fn connect(rpc_url: &str, wallet: Address, executor: &SignerIdentity) -> Result<Self, RpcError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|err| RpcError::InvalidUrl { url: rpc_url.to_string(), reason: err.to_string() })?;
        let chain_id = provider.get_chainid().await.map_err(|err| RpcError::Provider(err.to_string()))?;

        let key = executor.signing_key().to_bytes();
        let signer = LocalWallet::from_bytes(key.as_slice())
            .map_err(|err| RpcError::Key(err.to_string()))?
            .with_chain_id(chain_id.as_u64());

        let client = Arc::new(SignerMiddleware::new(provider, signer));
        tracing::debug!(%wallet, executor = %executor.address(), chain_id = chain_id.as_u64(), "connected to wallet");
        Ok(Self { contract: WalletSimple::new(to_eth_address(wallet), client), executor: executor.address() })
    }

    pub fn executor(&self) -> Address {
        self.executor
    }
}

impl MultiSigWallet for RpcWallet {
    type Error = RpcError;

    async fn next_sequence_id(&self) -> Result<U256, Self::Error> {
        let id = self
            .contract
            .get_next_sequence_id()
            .call()
            .await
            .map_err(|err| RpcError::Contract(err.to_string()))?;
        Ok(from_eth_u256(id))
    }

    async fn send_multi_sig(&self, operation: &SignedOperation) -> Result<TransactionHandle, Self::Error> {
        let call = self.contract.send_multi_sig(
            to_eth_address(operation.target()),
            to_eth_u256(operation.value()),
            EthBytes::from(operation.data().to_vec()),
            EthU256::from(operation.expire_time()),
            to_eth_u256(operation.sequence_id()),
            EthBytes::from(operation.signature_bytes().to_vec()),
        );

        let pending = call.send().await.map_err(|err| RpcError::Contract(err.to_string()))?;
        let tx_hash = B256::from(pending.tx_hash().0);
        tracing::info!(tx = %tx_hash, "sendMultiSig broadcast");

        let receipt = pending
            .await
            .map_err(|err| RpcError::Provider(err.to_string()))?
            .ok_or(RpcError::Dropped(tx_hash))?;
        if receipt.status != Some(U64::from(1u64)) {
            return Err(RpcError::Reverted(tx_hash));
        }
        Ok(TransactionHandle { hash: tx_hash })
    }
}

fn to_eth_address(address: Address) -> EthAddress {
    EthAddress::from_slice(address.as_slice())
}

fn to_eth_u256(value: U256) -> EthU256 {
    EthU256::from_big_endian(&value.to_be_bytes::<32>())
}

fn from_eth_u256(value: EthU256) -> U256 {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    U256::from_be_bytes(buf)
}
