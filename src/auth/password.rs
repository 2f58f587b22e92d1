use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid hash parameters: {0}")]
    Params(String),

    #[error("argon2 hash_password error: {0}")]
    Hash(String),

    #[error("argon2 parse hash error: {0}")]
    MalformedHash(String),

    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Cost settings for newly written hashes. Verification always reads the
/// parameters embedded in the stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HashParams {
    /// Time cost (passes over memory).
    pub rounds: u32,
    pub memory_kib: u32,
}

impl HashParams {
    pub const DEFAULT_ROUNDS: u32 = 10;
    pub const DEFAULT_MEMORY_KIB: u32 = 19456;

    fn to_argon2(self) -> Result<Argon2<'static>, CredentialError> {
        let params = Params::new(self.memory_kib, self.rounds, 1, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            rounds: Self::DEFAULT_ROUNDS,
            memory_kib: Self::DEFAULT_MEMORY_KIB,
        }
    }
}

pub fn hash_password(plain: &str, params: HashParams) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .to_argon2()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            CredentialError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        CredentialError::MalformedHash(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Verifies on the blocking pool so the executor is not stalled.
pub async fn verify_password_async(plain: &str, hash: &str) -> Result<bool, CredentialError> {
    let plain = plain.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?
}

/// A password on its way into storage.
///
/// Stores refuse `Plain` values, so a payload that skipped the write pipeline
/// cannot persist plaintext.
#[derive(Clone, PartialEq, Eq)]
pub enum Password {
    Plain(String),
    Hashed(String),
}

impl Password {
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Password::Plain(p) => Some(p),
            Password::Hashed(_) => None,
        }
    }

    pub fn as_hash(&self) -> Option<&str> {
        match self {
            Password::Plain(_) => None,
            Password::Hashed(h) => Some(h),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Password::Plain(_) => f.write_str("Password::Plain(<redacted>)"),
            Password::Hashed(_) => f.write_str("Password::Hashed(<redacted>)"),
        }
    }
}

/// Hashes passwords with a fixed cost on the blocking pool.
#[derive(Debug, Clone)]
pub struct Hasher {
    params: HashParams,
}

impl Hasher {
    pub fn new(params: HashParams) -> Result<Self, CredentialError> {
        params.to_argon2()?;
        Ok(Self { params })
    }

    pub async fn hash(&self, plain: String) -> Result<String, CredentialError> {
        let params = self.params;
        tokio::task::spawn_blocking(move || hash_password(&plain, params)).await?
    }

    /// Replaces a plaintext password with its hash in place. Already hashed
    /// values are left alone.
    pub async fn seal(&self, password: &mut Password) -> Result<(), CredentialError> {
        if let Password::Plain(plain) = password {
            let hash = self.hash(std::mem::take(plain)).await?;
            *password = Password::Hashed(hash);
            debug!(rounds = self.params.rounds, "password hashed");
        }
        Ok(())
    }
}
