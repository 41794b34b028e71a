//! Top-level client facade wiring the session, transport and feature
//! stores together.

use std::sync::Arc;

use crate::auth::Session;
use crate::config::{ApiConfig, ConfigError};
use crate::error::Result;
use crate::features::auth::AuthStore;
use crate::features::cart::CartStore;
use crate::features::categories::CategoryStore;
use crate::features::orders::OrderStore;
use crate::features::products::ProductStore;
use crate::http::ApiClient;
use crate::storage::{CredentialStore, FileStore, MemoryStore};

/// Assembled storefront client.
///
/// One [`Shopkit`] owns a single [`Session`] and HTTP client; every store
/// shares them, so a credential renewal triggered by any store applies to
/// all of them.
#[derive(Clone)]
pub struct Shopkit {
    session: Session,
    auth: AuthStore,
    products: ProductStore,
    categories: CategoryStore,
    cart: CartStore,
    orders: OrderStore,
}

impl Shopkit {
    /// Build a client over the given credential store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be
    /// constructed from the configuration.
    pub fn new(config: &ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let session = Session::new(store);
        let api = ApiClient::new(config, session.clone())?;
        let cart = CartStore::new(api.clone());
        Ok(Self {
            session,
            auth: AuthStore::new(api.clone()),
            products: ProductStore::new(api.clone()),
            categories: CategoryStore::new(api.clone()),
            orders: OrderStore::new(api, cart.clone()),
            cart,
        })
    }

    /// Build a client from environment configuration. Credentials go to
    /// the configured file path, or stay in memory if none is set.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// malformed, or if the HTTP client cannot be constructed.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let config = ApiConfig::from_env()?;
        let store: Arc<dyn CredentialStore> = match &config.credentials_path {
            Some(path) => Arc::new(FileStore::new(path.clone())),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(&config, store)?)
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    #[must_use]
    pub fn products(&self) -> &ProductStore {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }
}
