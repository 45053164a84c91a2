//! Typed loading of co-signer key material.
//!
//! Missing or malformed configuration is returned as [`ConfigError`]; deciding whether that
//! ends the process is left to the binary.

use std::{env, sync::OnceLock};

use regex::Regex;

use crate::signer::{SignerIdentity, SigningError};

pub const SIGNER_KEYS_VAR: &str = "SIGNER_PRIVATE_KEYS";
pub const DEPLOYER_KEY_VAR: &str = "DEPLOYER_PRIVATE_KEY";

/// Co-signers configured per wallet (the deployer is the third registered signer).
pub const REQUIRED_SIGNERS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingVar(&'static str),
    #[error("invalid number of signers, required: {expected}, got: {got}")]
    SignerCount { expected: usize, got: usize },
    #[error("private key #{index} is not a 32-byte hex string")]
    MalformedKey { index: usize },
    #[error("private key #{index} is unusable: {source}")]
    InvalidKey {
        index: usize,
        #[source]
        source: SigningError,
    },
}

/// Signing identities for the proposer, the executor and (optionally) the deployer.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    signers: [SignerIdentity; REQUIRED_SIGNERS],
    deployer: Option<SignerIdentity>,
}

impl WalletConfig {
    /// `signer_keys` is a comma-separated list of exactly two hex private keys.
    pub fn from_parts(signer_keys: &str, deployer_key: Option<&str>) -> Result<Self, ConfigError> {
        let raw: Vec<&str> = signer_keys.split(',').map(str::trim).filter(|k| !k.is_empty()).collect();
        if raw.len() != REQUIRED_SIGNERS {
            return Err(ConfigError::SignerCount { expected: REQUIRED_SIGNERS, got: raw.len() });
        }

        let one = parse_key(raw[0], 0)?;
        let two = parse_key(raw[1], 1)?;
        let deployer = deployer_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| parse_key(k, REQUIRED_SIGNERS))
            .transpose()?;

        Ok(Self { signers: [one, two], deployer })
    }

    /// Read [`SIGNER_KEYS_VAR`] (required) and [`DEPLOYER_KEY_VAR`] (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        let signer_keys = env::var(SIGNER_KEYS_VAR).map_err(|_| ConfigError::MissingVar(SIGNER_KEYS_VAR))?;
        let deployer_key = env::var(DEPLOYER_KEY_VAR).ok();
        Self::from_parts(&signer_keys, deployer_key.as_deref())
    }

    /// Proposer: signs operations off-chain.
    pub fn signer_one(&self) -> &SignerIdentity {
        &self.signers[0]
    }

    /// Executor: submits operations on-chain.
    pub fn signer_two(&self) -> &SignerIdentity {
        &self.signers[1]
    }

    pub fn signer(&self, index: usize) -> Option<&SignerIdentity> {
        self.signers.get(index)
    }

    pub fn deployer(&self) -> Result<&SignerIdentity, ConfigError> {
        self.deployer.as_ref().ok_or(ConfigError::MissingVar(DEPLOYER_KEY_VAR))
    }
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(0x)?[0-9a-fA-F]{64}$").expect("static regex"))
}

fn parse_key(raw: &str, index: usize) -> Result<SignerIdentity, ConfigError> {
    if !key_pattern().is_match(raw) {
        return Err(ConfigError::MalformedKey { index });
    }
    SignerIdentity::from_hex(raw).map_err(|source| ConfigError::InvalidKey { index, source })
}
