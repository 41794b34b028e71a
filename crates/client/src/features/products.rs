//! Product pipeline: catalog browsing and admin-side CRUD.

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::instrument;

use shopkit_core::{CategoryId, Product, ProductId};

use crate::http::ApiClient;
use crate::pipeline::{IntentSeq, StateCell};

/// Server-side sort orders for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    const fn as_param(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

/// Listing filter, forwarded verbatim as query parameters. Filtering and
/// sorting happen server-side.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_ids: Vec<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub sort: Option<ProductSort>,
}

impl ProductFilter {
    /// Serialize to query pairs; list filters repeat their key.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(id) = self.category_id {
            pairs.push(("categoryId".to_string(), id.to_string()));
        }
        for id in &self.category_ids {
            pairs.push(("categoryIds".to_string(), id.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice".to_string(), max.to_string()));
        }
        if let Some(in_stock) = self.in_stock {
            pairs.push(("inStock".to_string(), in_stock.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort".to_string(), sort.as_param().to_string()));
        }
        pairs
    }
}

/// Optional binary image carried by a product create/update.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Product create/update payload.
///
/// Sent as multipart form data (named fields plus the optional image)
/// rather than JSON, because of the attachment.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub stock: i64,
    pub category_id: CategoryId,
    pub image: Option<ImageAttachment>,
}

impl ProductForm {
    /// Build the multipart form. Called once per send attempt; the form is
    /// rebuilt from these owned parts if the request is retried after a
    /// credential renewal.
    fn to_form(&self) -> Form {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("price", self.price.to_string())
            .text("stock", self.stock.to_string())
            .text("categoryId", self.category_id.to_string());
        if let Some(description) = &self.description {
            form = form.text("description", description.clone());
        }
        if let Some(discounted) = self.discounted_price {
            form = form.text("discountedPrice", discounted.to_string());
        }
        if let Some(image) = &self.image {
            let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
            let part = part
                .mime_str(&image.mime_type)
                .unwrap_or_else(|_| {
                    Part::bytes(image.bytes.clone()).file_name(image.file_name.clone())
                });
            form = form.part("image", part);
        }
        form
    }
}

/// Observable product state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductState {
    pub list: Vec<Product>,
    pub selected: Option<Product>,
    pub loading: bool,
    pub error: Option<String>,
    /// One-shot create/update success flag; `reset_success` rearms it.
    pub success: Option<bool>,
}

struct ProductStoreInner {
    api: ApiClient,
    state: StateCell<ProductState>,
    fetch_all_seq: IntentSeq,
    fetch_one_seq: IntentSeq,
    create_seq: IntentSeq,
    update_seq: IntentSeq,
    delete_seq: IntentSeq,
}

/// Store driving the product pipeline.
#[derive(Clone)]
pub struct ProductStore {
    inner: Arc<ProductStoreInner>,
}

impl ProductStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(ProductStoreInner {
                api,
                state: StateCell::new(ProductState::default()),
                fetch_all_seq: IntentSeq::new(),
                fetch_one_seq: IntentSeq::new(),
                create_seq: IntentSeq::new(),
                update_seq: IntentSeq::new(),
                delete_seq: IntentSeq::new(),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ProductState {
        self.inner.state.get()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProductState> {
        self.inner.state.subscribe()
    }

    /// Fetch the product listing with a server-side filter.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, filter: &ProductFilter) {
        let ticket = self.inner.fetch_all_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .get_json::<Vec<Product>>("/product", &filter.query_pairs())
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

    /// Fetch one product into `selected`.
    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, id: ProductId) {
        let ticket = self.inner.fetch_one_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .get_json::<Product>(&format!("/product/{id}"), &[])
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(product) => s.selected = Some(product),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Create a product (admin). Multipart because of the optional image.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create(&self, form: &ProductForm) {
        let ticket = self.inner.create_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .send_multipart::<Product, _>(Method::POST, "/product", || form.to_form())
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(product) => {
                    s.list.push(product);
                    s.success = Some(true);
                    s.error = None;
                }
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Update a product (admin).
    #[instrument(skip(self, form), fields(id = %id))]
    pub async fn update(&self, id: ProductId, form: &ProductForm) {
        let ticket = self.inner.update_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self
            .inner
            .api
            .send_multipart::<Product, _>(Method::PUT, &format!("/product/{id}"), || {
                form.to_form()
            })
            .await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(_) => {
                    s.success = Some(true);
                    s.error = None;
                }
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Delete a product (admin).
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) {
        let ticket = self.inner.delete_seq.begin();
        self.inner.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.inner.api.delete(&format!("/product/{id}")).await;
        if !ticket.is_current() {
            return;
        }

        self.inner.state.update(|s| {
            s.loading = false;
            match result {
                Ok(()) => s.list.retain(|p| p.id != id),
                Err(err) => s.error = Some(err.to_string()),
            }
        });
    }

    /// Rearm the one-shot success flag.
    pub fn reset_success(&self) {
        self.inner.state.update(|s| s.success = Some(false));
    }

    /// Drop the selected product.
    pub fn clear_selected(&self) {
        self.inner.state.update(|s| s.selected = None);
    }
}
