//! Credential storage.
//!
//! The session persists three opaque values - access token, refresh token,
//! and the cached user profile - each under its own expiry window. Stores
//! treat values as opaque strings and own any at-rest encoding; a missing,
//! expired, or corrupted entry always reads as absent, never as an error.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "shop.rfc7519";
/// Well-known key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "shop.rfc7519_refresh_token";
/// Well-known key for the cached user profile (JSON).
pub const USER_KEY: &str = "shop.user";

/// Opaque key-value persistence with per-entry expiry.
///
/// Writes are synchronous with respect to the event that triggers them; the
/// store is the only shared mutable resource between the session and the
/// request path, and every outgoing request reads it fresh.
pub trait CredentialStore: Send + Sync {
    /// Persist `value` under `key` for `ttl_minutes` minutes.
    fn put(&self, key: &str, value: &str, ttl_minutes: i64);

    /// Read the value under `key`, if present and not expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Remove the value under `key`.
    fn erase(&self, key: &str);
}
