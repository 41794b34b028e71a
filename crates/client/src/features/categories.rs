//! Category pipeline: listing plus admin-side CRUD.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::instrument;

use shopkit_core::{Category, CategoryId};

use crate::http::ApiClient;
use crate::pipeline::{IntentSeq, StateCell};

/// Category create payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update; absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Observable category state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryState {
    pub list: Vec<Category>,
    pub selected: Option<Category>,
    pub loading: bool,
    pub error: Option<String>,
}

struct CategoryStoreInner {
    api: ApiClient,
    state: StateCell<CategoryState>,
    fetch_seq: IntentSeq,
    fetch_one_seq: IntentSeq,
    create_seq: IntentSeq,
    update_seq: IntentSeq,
    delete_seq: IntentSeq,
}

/// Store driving the category pipeline.
#[derive(Clone)]
pub struct CategoryStore {
    inner: Arc<CategoryStoreInner>,
}

impl CategoryStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(CategoryStoreInner {
                api,
                state: StateCell::new(CategoryState::default()),
                fetch_seq: IntentSeq::new(),
                fetch_one_seq: IntentSeq::new(),
                create_seq: IntentSeq::new(),
                update_seq: IntentSeq::new(),
                delete_seq: IntentSeq::new(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CategoryState {
        self.inner.state.get()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CategoryState> {
        self.inner.state.subscribe()
    }

    /// Fetch every category.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) {
        let ticket = self.inner.fetch_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .get_json::<Vec<Category>>("/categories", &[])
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(list) => s.list = list,
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Fetch one category into `selected`.
    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, id: CategoryId) {
        let ticket = self.inner.fetch_one_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .get_json::<Category>(&format!("/categories/{id}"), &[])
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(category) => s.selected = Some(category),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Create a category (admin) and append it to the list.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create(&self, payload: &CategoryPayload) {
        let ticket = self.inner.create_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .post_json::<Category, _>("/categories", payload)
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(category) => s.list.push(category),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Update a category (admin); the server's copy replaces the local one.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: CategoryId, patch: &CategoryPatch) {
        let ticket = self.inner.update_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .put_json::<Category, _>(&format!("/categories/{id}"), patch)
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(updated) => {
                    if let Some(slot) = s.list.iter_mut().find(|c| c.id == id) {
                        *slot = updated;
                    }
                }
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Delete a category (admin) and drop it from the list.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) {
        let ticket = self.inner.delete_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.inner.api.delete(&format!("/categories/{id}")).await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(()) => s.list.retain(|c| c.id != id),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }
}
