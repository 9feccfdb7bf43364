use crate::utils::error_chain_fmt;
use anyhow::Context;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, Secret};
use std::fmt::Debug;

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error("Not logged in")]
    NotAuthenticated,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_password")]
    pub password: Secret<String>,
}

fn empty_password() -> Secret<String> {
    Secret::new(String::new())
}

/// Decides whether a username/password pair belongs to an administrator.
///
/// Implementations are called from the blocking pool and may be slow.
/// On success they return the canonical username of the account.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> Result<String, AuthError>;
}

/// The single administrator account configured for the deployment.
pub struct StaticAccount {
    username: String,
    password_hash: Secret<String>,
}

impl StaticAccount {
    pub fn new(username: String, password: &Secret<String>) -> Result<Self, AuthError> {
        let password_hash = hash_password(password)?;
        Ok(Self {
            username,
            password_hash,
        })
    }
}

impl CredentialVerifier for StaticAccount {
    #[tracing::instrument(name = "Verify administrator credentials", skip_all)]
    fn verify(&self, credentials: &Credentials) -> Result<String, AuthError> {
        // Always verify the hash, even for an unknown username,
        // so the response time does not reveal which part was wrong
        let password_check = verify_password_hash(&credentials.password, &self.password_hash);

        if credentials.username != self.username {
            return Err(AuthError::InvalidCredentials(anyhow::anyhow!(
                "Unknown username"
            )));
        }
        password_check?;
        Ok(self.username.clone())
    }
}

#[tracing::instrument(name = "Verify password hash", skip_all)]
pub fn verify_password_hash(
    password: &Secret<String>,
    expected_password_hash: &Secret<String>,
) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(expected_password_hash.expose_secret())
        .map_err(|e| AuthError::UnexpectedError(anyhow::anyhow!(e)))?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
        .context("Failed to verify password hash")
        .map_err(AuthError::InvalidCredentials)
}

pub fn hash_password(password: &Secret<String>) -> Result<Secret<String>, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(15000, 2, 1, None)
        .map_err(|e| AuthError::UnexpectedError(anyhow::anyhow!(e)))?;
    let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let password_hash = hasher
        .hash_password(password.expose_secret().as_bytes(), salt.as_salt())
        .map_err(|e| AuthError::UnexpectedError(anyhow::anyhow!(e)))?;

    Ok(Secret::new(password_hash.to_string()))
}
