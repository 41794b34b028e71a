//! Cart pipeline.
//!
//! Cart mutations are optimistic about shape only: add and update responses
//! are discarded and the local list is patched in place, matching what the
//! server will report on the next fetch.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;
use tracing::instrument;

use shopkit_core::{CartItem, CartLineId, ProductId};

use crate::http::ApiClient;
use crate::pipeline::{IntentSeq, StateCell};

/// Observable cart state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub loading: bool,
    pub error: Option<String>,
}

struct CartStoreInner {
    api: ApiClient,
    state: StateCell<CartState>,
    fetch_seq: IntentSeq,
    add_seq: IntentSeq,
    remove_seq: IntentSeq,
    update_seq: IntentSeq,
}

/// Store driving the cart pipeline.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

impl CartStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                state: StateCell::new(CartState::default()),
                fetch_seq: IntentSeq::new(),
                add_seq: IntentSeq::new(),
                remove_seq: IntentSeq::new(),
                update_seq: IntentSeq::new(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.get()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Fetch the current user's cart, replacing the local list.
    #[instrument(skip(self))]
    pub async fn fetch(&self) {
        let ticket = self.inner.fetch_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.inner.api.get_json::<Vec<CartItem>>("/cart", &[]).await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(items) => s.items = items,
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Add a product to the cart. The response body is discarded; callers
    /// refetch when they need the server-assigned line id.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId, quantity: u32) {
        let ticket = self.inner.add_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .post_json::<serde_json::Value, _>(
                "/cart",
                &json!({ "productId": product_id, "quantity": quantity }),
            )
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            if let Err(err) = result {
                s.error = Some(err.to_string());
            }
        });
    }

    /// Remove a cart line by its server-assigned id.
    #[instrument(skip(self))]
    pub async fn remove(&self, line_id: CartLineId) {
        let ticket = self.inner.remove_seq.begin();
        self.inner.state.update(|s| s.error = None);

        let result = self.inner.api.delete(&format!("/cart/{line_id}")).await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| match result {
            Ok(()) => s.items.retain(|item| item.id != Some(line_id)),
            Err(err) => s.error = Some(err.to_string()),
        });
    }

    /// Set the quantity of the line holding `product_id`. If no such line
    /// exists locally the list is left unchanged; nothing is appended.
    /// Row-level like `remove`: clears the error without toggling `loading`.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) {
        let ticket = self.inner.update_seq.begin();
        self.inner.state.update(|s| s.error = None);

        let result = self
            .inner
            .api
            .put_json::<serde_json::Value, _>(
                &format!("/cart/{product_id}"),
                &json!({ "quantity": quantity }),
            )
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| match result {
            Ok(_) => {
                if let Some(item) = s.items.iter_mut().find(|i| i.product_id == product_id) {
                    item.quantity = quantity;
                }
            }
            Err(err) => s.error = Some(err.to_string()),
        });
    }

    /// Quantity change from the UI: zero removes the line, anything else
    /// updates it. A zero on a line the server never assigned an id to is
    /// a no-op rather than a bogus removal.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn change_quantity(&self, item: &CartItem, quantity: u32) {
        if quantity == 0 {
            if let Some(line_id) = item.id {
                self.remove(line_id).await;
            }
        } else {
            self.update_quantity(item.product_id, quantity).await;
        }
    }
}
