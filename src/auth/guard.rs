//! Gate in front of every admin operation.
//!
//! Per presented username the guard moves through
//! `CLEAN -> ACCUMULATING -> LOCKED -> CLEAN`. A key is locked once it has
//! `max_failed_attempts` consecutive failures and stays locked until
//! `lockout_duration` has passed since the last one. While locked the
//! password is not even checked.
//!
//! Keys are whatever username the client sent, so a client that changes the
//! username on every request never accumulates failures on any one key. This
//! is a known limitation of the guard. Such a client also leaves one record
//! per username below the threshold; those never expire, so the table grows
//! with the number of distinct usernames tried.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::attempts::{AttemptStore, FailedAttemptRecord, InMemoryAttemptStore};
use super::clock::{Clock, SystemClock};
use super::credentials::CredentialStore;

pub const MAX_FAILED_ATTEMPTS: u32 = 5;
pub const LOCKOUT_DURATION: Duration = Duration::from_secs(300);

/// Threshold and window for locking a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            lockout_duration: LOCKOUT_DURATION,
        }
    }
}

impl LockoutPolicy {
    fn reached_threshold(&self, record: &FailedAttemptRecord) -> bool {
        record.attempt_count >= self.max_failed_attempts
    }

    fn window_elapsed(&self, record: &FailedAttemptRecord, now: std::time::Instant) -> bool {
        now.saturating_duration_since(record.last_attempt_at) >= self.lockout_duration
    }
}

/// Outcome of one authentication attempt. None of these are errors from the
/// guard's point of view; the caller decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// Carries the verified username for audit logging.
    Authenticated(String),
    /// No admin identity is configured.
    ServiceUnavailable,
    /// The presented username is inside its lockout window.
    RateLimited,
    InvalidCredentials,
}

pub struct AccessGuard<S = InMemoryAttemptStore> {
    credentials: CredentialStore,
    policy: LockoutPolicy,
    attempts: S,
    clock: Arc<dyn Clock>,
}

impl AccessGuard {
    /// Guard with the default policy, a fresh in-memory table and the system clock.
    pub fn new(credentials: CredentialStore) -> Self {
        Self::with_parts(
            credentials,
            LockoutPolicy::default(),
            InMemoryAttemptStore::new(),
            Arc::new(SystemClock),
        )
    }
}

impl<S: AttemptStore> AccessGuard<S> {
    pub fn with_parts(
        credentials: CredentialStore,
        policy: LockoutPolicy,
        attempts: S,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            policy,
            attempts,
            clock,
        }
    }

    /// Whether an admin identity is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_configured()
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn attempts(&self) -> &S {
        &self.attempts
    }

    /// Checks `username`/`password` and updates the failure count for
    /// `username`. The lookup, the lockout check, verification and the write
    /// back all happen under the key's lock.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult {
        if !self.credentials.is_configured() {
            return AuthResult::ServiceUnavailable;
        }

        self.attempts.update(username, |slot| {
            let now = self.clock.now();

            if let Some(record) = *slot {
                if self.policy.reached_threshold(&record) {
                    if !self.policy.window_elapsed(&record, now) {
                        warn!("Admin login refused for {:?}: locked out", username);
                        return AuthResult::RateLimited;
                    }
                    *slot = None;
                }
            }

            if self.credentials.verify(username, password) {
                *slot = None;
                return AuthResult::Authenticated(username.to_string());
            }

            let record = slot.get_or_insert(FailedAttemptRecord {
                attempt_count: 0,
                last_attempt_at: now,
            });
            record.attempt_count = record.attempt_count.saturating_add(1);
            record.last_attempt_at = now;

            if record.attempt_count == self.policy.max_failed_attempts {
                warn!(
                    "Admin login for {:?} locked for {}s after {} failed attempts",
                    username,
                    self.policy.lockout_duration.as_secs(),
                    record.attempt_count
                );
            } else {
                debug!("Admin login failed for {:?}", username);
            }
            AuthResult::InvalidCredentials
        })
    }

    /// Removes records whose lockout window has already elapsed.
    /// `authenticate` would discard them on the next attempt anyway; this only
    /// bounds memory for keys that never come back.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        let policy = &self.policy;
        self.attempts.retain(&mut |record| {
            !(policy.reached_threshold(record) && policy.window_elapsed(record, now))
        });
    }
}
