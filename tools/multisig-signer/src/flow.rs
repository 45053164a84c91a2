use multisig_wallet_types::{BaseCall, MultiSigWallet, SignedOperation, TransactionHandle};

use crate::{
    assembler::{assemble, AssembleError, Clock},
    signer::SignerIdentity,
};

#[derive(Debug, thiserror::Error)]
pub enum FlowError<E> {
    #[error("failed to assemble operation: {0}")]
    Assemble(#[from] AssembleError),
    #[error("wallet call failed: {0}")]
    Wallet(E),
}

/// Read the next sequence id, sign `base_call` as `proposer`, submit through `executor`.
///
/// `reader` and `executor` are normally the same wallet bound to different accounts; the
/// executor's account must be a co-signer other than `proposer`. A rejection is only
/// visible once the submission returns. No retries.
pub async fn propose_and_execute<R, W, C>(
    reader: &R,
    executor: &W,
    base_call: BaseCall,
    expire_in_seconds: u64,
    proposer: &SignerIdentity,
    clock: &C,
) -> Result<(SignedOperation, TransactionHandle), FlowError<W::Error>>
where
    R: MultiSigWallet<Error = W::Error>,
    W: MultiSigWallet,
    C: Clock + ?Sized,
{
    let sequence_id = reader.next_sequence_id().await.map_err(FlowError::Wallet)?;

    tracing::info!(signer = %proposer.address(), %sequence_id, "signing operation");
    let signed = assemble(sequence_id, base_call, expire_in_seconds, proposer, clock)?;

    let handle = executor.send_multi_sig(&signed).await.map_err(FlowError::Wallet)?;
    tracing::info!(tx = %handle.hash, %sequence_id, "operation submitted");
    Ok((signed, handle))
}
