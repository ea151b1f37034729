//! Canonical catalog entities
//!
//! The catalog is the normalized, in-memory view of one successful data load.
//! It is replaced wholesale on the next load; it is never merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A product row after normalization.
///
/// Besides the canonical fields, every source column survives sanitized in
/// `facets` so the filter engine can match against arbitrary columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Sanitized, non-empty identifier.
    pub id: String,
    pub name: String,
    /// Unit price; never negative, 0.0 when the source value was unparseable.
    pub price: f64,
    /// References into [`Catalog::services`]; not required to resolve.
    pub service_ids: Vec<String>,
    /// All source columns, sanitized as free text, keyed by trimmed header.
    pub facets: HashMap<String, String>,
}

impl Product {
    /// Facet value for a field; a missing facet reads as the empty string.
    pub fn facet(&self, field: &str) -> &str {
        self.facets.get(field).map_or("", String::as_str)
    }
}

/// A service row after normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// The canonical in-memory catalog produced by a data load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
    services: Vec<Service>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, services: Vec<Service>) -> Self {
        Self {
            products,
            services,
            loaded_at: Utc::now(),
        }
    }

    /// An empty catalog, used before the first successful load.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.services.is_empty()
    }

    pub fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn service_by_id(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}
