//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configurable cost parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    min_length: usize,
    /// Verified against when the account does not exist, so both failure paths cost the same.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Create hasher with explicit cost parameters
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hasher = Self {
            argon2,
            min_length: 8,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash("dummy-password-for-timing")?;
        Ok(hasher)
    }

    /// Create hasher from the security section of the config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let mut hasher = Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )?;
        hasher.min_length = config.password_min_length;
        Ok(hasher)
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            AppError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::InvalidCredentials)
    }

    /// Burn one verification against the dummy hash and always fail.
    pub fn verify_dummy(&self, password: &str) -> AppError {
        let _ = self.verify(password, &self.dummy_hash);
        AppError::InvalidCredentials
    }

    /// Hash on the blocking pool
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hash task failed: {}", e)))?
    }

    /// Verify on the blocking pool. `None` means the account does not exist.
    pub async fn verify_blocking(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<(), AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => Err(hasher.verify_dummy(&password)),
        })
        .await
        .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))?
    }

    /// Validate password against policy
    pub fn validate_password_policy(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        Ok(())
    }
}
