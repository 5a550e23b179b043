//! Password digest generation and verification.
//!
//! Digests are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so every digest carries its own salt and cost parameters. The salt is drawn
//! fresh from the OS entropy source on every call, which makes two digests of
//! the same password differ.
//!
//! Verification never fails: a malformed digest simply does not match. The
//! final comparison of hash outputs is constant-time.

use crate::config::HasherConfig;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

/// One-way salted password transform
pub trait Hasher: Send + Sync {
    /// Produce a freshly salted digest of `password`
    fn digest(&self, password: &[u8]) -> Result<String, HashError>;

    /// Check `candidate` against `digest`. Malformed digests yield `false`.
    fn verify(&self, digest: &str, candidate: &[u8]) -> bool;
}

/// Argon2id hasher with OS-provided salt
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    rng: SystemRandom,
}

impl Argon2Hasher {
    pub fn new(config: &HasherConfig) -> Result<Self, HashError> {
        let params = Params::new(config.m_cost, config.t_cost, config.p_cost, None)
            .map_err(HashError::Initialization)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            rng: SystemRandom::new(),
        })
    }

    fn make_salt(&self) -> Result<SaltString, HashError> {
        let mut bytes = [0u8; Salt::RECOMMENDED_LENGTH];
        self.rng.fill(&mut bytes).map_err(|_| HashError::Entropy)?;
        SaltString::encode_b64(&bytes).map_err(HashError::Hash)
    }
}

impl Hasher for Argon2Hasher {
    fn digest(&self, password: &[u8]) -> Result<String, HashError> {
        let salt = self.make_salt()?;
        self.argon2
            .hash_password(password, &salt)
            .map(|hash| hash.to_string())
            .map_err(HashError::Hash)
    }

    fn verify(&self, digest: &str, candidate: &[u8]) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        // Cost parameters come from the digest, not from `self`
        self.argon2.verify_password(candidate, &parsed).is_ok()
    }
}

/// Run [`Hasher::digest`] on the blocking pool
pub async fn digest_blocking(
    hasher: Arc<dyn Hasher>,
    password: Vec<u8>,
) -> Result<String, HashError> {
    match tokio::task::spawn_blocking(move || hasher.digest(&password)).await {
        Ok(result) => result,
        Err(e) => Err(HashError::Worker(e.to_string())),
    }
}

/// Run [`Hasher::verify`] on the blocking pool
pub async fn verify_blocking(
    hasher: Arc<dyn Hasher>,
    digest: String,
    candidate: Vec<u8>,
) -> Result<bool, HashError> {
    tokio::task::spawn_blocking(move || hasher.verify(&digest, &candidate))
        .await
        .map_err(|e| HashError::Worker(e.to_string()))
}

/// Hasher errors
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("failed to initialize password hasher: {0}")]
    Initialization(argon2::Error),

    #[error("entropy source unavailable")]
    Entropy,

    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("hashing task failed: {0}")]
    Worker(String),
}
