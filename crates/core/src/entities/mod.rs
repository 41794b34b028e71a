//! Entity definitions mirroring the backend's JSON contract.
//!
//! Field names follow the wire format (camelCase). Optional fields the
//! backend fills lazily (`role`, `address`, denormalized images, cart line
//! ids before first sync) are explicit `Option`s with default-fill at the
//! serde boundary.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartItem;
pub use category::Category;
pub use order::{Order, OrderItem, OrderLine};
pub use product::Product;
pub use user::UserProfile;
