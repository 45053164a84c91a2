//! Builds transport-ready signed operations.
//!
//! Ordering: the sequence id passed to [`assemble`] must be read from the wallet before
//! signing, and the result must be submitted before any other operation using the same or
//! a lower id. Two proposers assembling against the same fetched id race; the wallet
//! accepts at most one of them. Nothing here serialises proposers.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::U256;
use multisig_wallet_types::{BaseCall, EncodingError, Operation, SignedOperation};
use time::OffsetDateTime;

use crate::{
    digest::operation_digest,
    signer::{SignerIdentity, SigningError},
};

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Wall-clock source in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        unix_millis(OffsetDateTime::now_utc().unix_timestamp_nanos())
    }
}

/// Clamps pre-epoch readings to 0; anything signed against such a reading is already expired.
fn unix_millis(nanos: i128) -> u64 {
    let millis = nanos / 1_000_000;
    u64::try_from(millis).unwrap_or_else(|_| {
        tracing::warn!(%millis, "system clock reads before the unix epoch, using 0");
        0
    })
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now_millis: u64) -> Self {
        Self { now: AtomicU64::new(now_millis) }
    }

    pub fn set(&self, now_millis: u64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.now.fetch_add(secs.saturating_mul(1000), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// `now + expire_in_seconds`, in milliseconds.
pub fn expire_at<C: Clock + ?Sized>(clock: &C, expire_in_seconds: u64) -> Result<u64, EncodingError> {
    if expire_in_seconds == 0 {
        return Err(EncodingError::ZeroExpiry);
    }
    expire_in_seconds
        .checked_mul(1000)
        .and_then(|window| clock.now_millis().checked_add(window))
        .ok_or(EncodingError::ExpiryOverflow)
}

/// Sign `base_call` for execution under `sequence_id`, expiring `expire_in_seconds` from now.
///
/// Calling this twice yields different expiries (and so different signatures) unless the
/// clock has not moved.
pub fn assemble<C: Clock + ?Sized>(
    sequence_id: U256,
    base_call: BaseCall,
    expire_in_seconds: u64,
    signer: &SignerIdentity,
    clock: &C,
) -> Result<SignedOperation, AssembleError> {
    let expire_at = expire_at(clock, expire_in_seconds)?;
    let operation = Operation::from_call(base_call, expire_at, sequence_id);

    let digest = operation_digest(&operation);
    let signature = signer.sign_digest(digest.as_slice())?;

    tracing::debug!(
        %sequence_id,
        target = %operation.target(),
        expire_at,
        %digest,
        "assembled signed operation"
    );
    Ok(SignedOperation::new(operation, signature))
}
