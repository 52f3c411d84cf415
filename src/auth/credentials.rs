//! The single configured admin identity.
//!
//! The password is never held in plaintext: the operator supplies the
//! SHA-256 hex digest and candidates are hashed before comparison. Username
//! and password are both compared with `subtle` so neither check exits early
//! on the first mismatching byte.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("admin password hash must be a 64 character hex SHA-256 digest")]
    MalformedHash,
}

struct AdminIdentity {
    // Hashed so the comparison does not leak the username length.
    username_digest: [u8; 32],
    password_hash: [u8; 32],
}

/// Holds at most one admin identity, loaded once at startup.
pub struct CredentialStore {
    identity: Option<AdminIdentity>,
}

impl CredentialStore {
    /// Builds the store from the two configured values.
    ///
    /// Either value missing or blank leaves the store unconfigured, which
    /// disables the admin surface. A hash that is present but not a valid
    /// digest is rejected so a typo cannot silently lock the operator out.
    pub fn new(
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Self, CredentialError> {
        // Blank means unset; a non-blank username is stored exactly as given.
        let username = username.filter(|u| !u.trim().is_empty());
        let password_hash = password_hash.map(str::trim).filter(|h| !h.is_empty());

        let (Some(username), Some(password_hash)) = (username, password_hash) else {
            return Ok(Self::disabled());
        };

        let mut hash = [0u8; 32];
        hex::decode_to_slice(password_hash, &mut hash)
            .map_err(|_| CredentialError::MalformedHash)?;

        Ok(Self {
            identity: Some(AdminIdentity {
                username_digest: sha256(username.as_bytes()),
                password_hash: hash,
            }),
        })
    }

    /// Store with no identity.
    pub fn disabled() -> Self {
        Self { identity: None }
    }

    pub fn is_configured(&self) -> bool {
        self.identity.is_some()
    }

    /// True only if both the username and the password match.
    pub fn verify(&self, candidate_username: &str, candidate_password: &str) -> bool {
        let Some(identity) = &self.identity else {
            return false;
        };

        let username_digest = sha256(candidate_username.as_bytes());
        let password_digest = sha256(candidate_password.as_bytes());

        let username_ok = username_digest[..].ct_eq(&identity.username_digest[..]);
        let password_ok = password_digest[..].ct_eq(&identity.password_hash[..]);

        bool::from(username_ok & password_ok)
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Hex SHA-256 digest of `password`, in the form `ADMIN_PASSWORD_HASH` expects.
pub fn hash_password(password: &str) -> String {
    hex::encode(sha256(password.as_bytes()))
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}
