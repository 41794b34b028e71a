//! Shopkit client - the storefront's API layer.
//!
//! Everything of consequence (persistence, pricing, inventory, fulfillment)
//! lives in the backend; this crate is the client side of that contract:
//! authenticated HTTP, credential storage, token refresh, and one
//! action/effect pipeline per feature (auth, product, category, cart, order).
//!
//! # Architecture
//!
//! A UI-originated intent enters a feature store as a typed method call. The
//! store flips its state to loading, performs exactly one network call
//! through [`http::ApiClient`] (which transparently renews credentials via
//! [`auth::RefreshCoordinator`] on auth failures), and commits the success or
//! failure transition - but only if the intent has not been superseded by a
//! newer submission of the same type. Presentation re-reads state through
//! `watch` subscriptions; no consumer performs network I/O directly.
//!
//! # Modules
//!
//! - [`config`] - environment-driven configuration
//! - [`error`] - the `ApiError` taxonomy
//! - [`storage`] - credential store contract plus memory/file backends
//! - [`auth`] - session service and single-flight refresh coordinator
//! - [`http`] - authenticated request execution with retry-once-on-renewal
//! - [`pipeline`] - state cells and supersession tickets
//! - [`features`] - the five feature stores
//! - [`shop`] - facade wiring the above together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod http;
pub mod pipeline;
pub mod shop;
pub mod storage;

pub use auth::{Session, SessionStatus};
pub use config::ApiConfig;
pub use error::ApiError;
pub use http::ApiClient;
pub use shop::Shopkit;
pub use storage::{CredentialStore, FileStore, MemoryStore};
