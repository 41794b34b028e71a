//! Feature pipelines.
//!
//! One store per feature, all following the same pattern: a request intent
//! flips state to `{loading, error: None}`, the effect performs exactly one
//! network call, and the success or failure transition commits only if the
//! submission is still the latest of its intent type. Stores are cheap to
//! clone and safe to drive from spawned tasks.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

pub use auth::{AuthState, AuthStore};
pub use cart::{CartState, CartStore};
pub use categories::{CategoryPatch, CategoryPayload, CategoryState, CategoryStore};
pub use orders::{OrderDraft, OrderState, OrderStore};
pub use products::{ImageAttachment, ProductFilter, ProductForm, ProductSort, ProductState, ProductStore};
