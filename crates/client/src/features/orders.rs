//! Order pipeline.
//!
//! Order creation owns the checkout handoff: once the server accepts the
//! order, the lines that came out of the cart are removed from it one by
//! one. Lines the server never assigned a cart id to are skipped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tracing::instrument;

use shopkit_core::{Order, OrderId, OrderLine, OrderStatus};

use crate::features::cart::CartStore;
use crate::http::ApiClient;
use crate::pipeline::{IntentSeq, StateCell};

/// Checkout payload assembled from the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    order: Order,
}

/// Observable order state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderState {
    pub orders: Vec<Order>,
    pub detail: Option<Order>,
    /// Set to `"success"` after a completed checkout.
    pub status_message: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

struct OrderStoreInner {
    api: ApiClient,
    cart: CartStore,
    state: StateCell<OrderState>,
    fetch_all_seq: IntentSeq,
    fetch_one_seq: IntentSeq,
    create_seq: IntentSeq,
    status_seq: IntentSeq,
    delete_seq: IntentSeq,
}

/// Store driving the order pipeline.
#[derive(Clone)]
pub struct OrderStore {
    inner: Arc<OrderStoreInner>,
}

impl OrderStore {
    #[must_use]
    pub fn new(api: ApiClient, cart: CartStore) -> Self {
        Self {
            inner: Arc::new(OrderStoreInner {
                api,
                cart,
                state: StateCell::new(OrderState::default()),
                fetch_all_seq: IntentSeq::new(),
                fetch_one_seq: IntentSeq::new(),
                create_seq: IntentSeq::new(),
                status_seq: IntentSeq::new(),
                delete_seq: IntentSeq::new(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> OrderState {
        self.inner.state.get()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OrderState> {
        self.inner.state.subscribe()
    }

    /// Fetch the order listing.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) {
        let ticket = self.inner.fetch_all_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.inner.api.get_json::<Vec<Order>>("/order", &[]).await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(orders) => s.orders = orders,
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Fetch one order into `detail`.
    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, id: OrderId) {
        let ticket = self.inner.fetch_one_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .get_json::<Order>(&format!("/order/{id}"), &[])
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(order) => s.detail = Some(order),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Place an order. On success the cart lines that fed the draft are
    /// removed from the cart, one request per line; draft lines without a
    /// cart line id are skipped entirely.
    #[instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn create(&self, draft: &OrderDraft) {
        let ticket = self.inner.create_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.status_message = None;
        });

        let result = self.inner.api.post_json::<Order, _>("/order", draft).await;
        if !ticket.is_current() {
            return;
        }

        match result {
            Ok(order) => {
                self.inner.state.update(|s| {
                    s.loading = false;
                    s.orders.push(order);
                    s.status_message = Some("success".to_string());
                });
                for line in &draft.items {
                    if let Some(line_id) = line.cart_line_id {
                        self.inner.cart.remove(line_id).await;
                    }
                }
            }
            Err(err) => {
                self.inner.state.update(|s| {
                    s.loading = false;
                    s.error = Some(err.to_string());
                });
            }
        }
    }

    /// Move an order to a new status (admin). Only the matching entry's
    /// status is patched; everything else in the listing stays as fetched.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) {
        let ticket = self.inner.status_seq.begin();
        self.inner.state.update(|s| s.error = None);

        let result = self
            .inner
            .api
            .put_json::<StatusEnvelope, _>(
                &format!("/order/{id}/status/{status}"),
                &json!({ "status": status }),
            )
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| match result {
            Ok(envelope) => {
                if let Some(entry) = s.orders.iter_mut().find(|o| o.id == id) {
                    entry.status = envelope.order.status;
                }
                if let Some(detail) = s.detail.as_mut().filter(|o| o.id == id) {
                    detail.status = envelope.order.status;
                }
            }
            Err(err) => s.error = Some(err.to_string()),
        });
    }

    /// Delete an order (admin).
    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) {
        let ticket = self.inner.delete_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.inner.api.delete(&format!("/order/{id}")).await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(()) => s.orders.retain(|o| o.id != id),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Clear the one-shot checkout status message.
    pub fn clear_status_message(&self) {
        self.inner.state.update(|s| s.status_message = None);
    }
}
