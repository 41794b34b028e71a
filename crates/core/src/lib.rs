//! Shopkit Core - Shared domain types.
//!
//! This crate provides the types exchanged between the Shopkit client and the
//! storefront backend API.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Entity shapes
//! follow the backend's JSON contract (camelCase fields, numeric ids); default
//! filling for optional fields happens here, at the ingestion boundary, rather
//! than ad hoc at call sites.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, statuses, and roles
//! - [`entities`] - Products, categories, cart lines, orders, and user profiles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod types;

pub use entities::*;
pub use types::*;
