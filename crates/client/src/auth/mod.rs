//! Session and credential renewal.
//!
//! The session is an explicit service object: created once at startup,
//! mutated only through its own API, and injected into the HTTP client and
//! the feature stores. The refresh coordinator owns the single-flight
//! renewal state machine that sits between a failed request and its retry.

pub mod refresh;
pub mod session;
pub(crate) mod token;

pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use session::{Session, SessionError, SessionStatus};
