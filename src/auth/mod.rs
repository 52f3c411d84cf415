//! Admin authentication and brute-force lockout.

pub mod attempts;
pub mod clock;
pub mod credentials;
pub mod guard;

pub use attempts::{AttemptStore, FailedAttemptRecord, InMemoryAttemptStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{CredentialError, CredentialStore, hash_password};
pub use guard::{AccessGuard, AuthResult, LOCKOUT_DURATION, LockoutPolicy, MAX_FAILED_ATTEMPTS};
