//! Session state and the presentation boundary
//!
//! One `CatalogSession` owns the catalog, the filter state, the cart and the
//! selected storage backend. All mutation flows through `&mut self`, so an
//! observer can never see a partially applied load or cart change. Multiple
//! sessions are fully independent; nothing here is global.

use tracing::info;
use uuid::Uuid;

use crate::application::loader::{self, LoadResult, LoadedTables, NamedPayload};
use crate::domain::cart::{Cart, CartTotals};
use crate::domain::catalog::{Catalog, Product, Service};
use crate::domain::filters::{FilterDefinition, FilterState};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::fetch::DataFetcher;
use crate::infrastructure::normalize::{ColumnAliases, Normalizer};
use crate::infrastructure::storage::{select_store, CartStore, KeyValueStore};

pub struct CatalogSession {
    session_id: Uuid,
    config: AppConfig,
    normalizer: Normalizer,
    catalog: Catalog,
    filters: FilterState,
    cart: Cart,
    cart_store: CartStore,
}

impl CatalogSession {
    /// Create a session: probe storage once, select the backend and restore
    /// any persisted cart.
    pub fn new(config: AppConfig) -> Self {
        let store = select_store(&config.storage);
        Self::with_store(config, store)
    }

    /// Create a session over an injected storage backend (tests, embedders).
    pub fn with_store(config: AppConfig, store: Box<dyn KeyValueStore>) -> Self {
        let cart_store = CartStore::new(store, config.storage.cart_key.clone());
        let cart = cart_store.load();
        let normalizer = Normalizer::new(ColumnAliases::default(), config.limits.clone());
        let session = Self {
            session_id: Uuid::new_v4(),
            config,
            normalizer,
            catalog: Catalog::empty(),
            filters: FilterState::default(),
            cart,
            cart_store,
        };
        info!(session_id = %session.session_id, restored_lines = session.cart.line_count(), "session created");
        session
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ---- data loading ----

    /// Apply a candidate load.
    ///
    /// Zero usable products reject the whole candidate and leave the current
    /// catalog in place. On success the catalog is replaced wholesale and the
    /// filter selections start fresh; the search string and the cart survive.
    pub fn apply_tables(&mut self, tables: LoadedTables) -> LoadResult<()> {
        let products = self.normalizer.normalize_products(&tables.products);
        if products.is_empty() {
            return Err(loader::LoadError::NoProductData);
        }
        let services = self.normalizer.normalize_services(&tables.services);
        let definition = self.normalizer.build_filter_definition(&tables.filters);

        let search = self.filters.search().to_string();
        self.catalog = Catalog::new(products, services);
        self.filters = FilterState::from_definition(definition);
        self.filters.set_search(search);
        info!(
            session_id = %self.session_id,
            products = self.catalog.products().len(),
            services = self.catalog.services().len(),
            filter_fields = self.filters.definition().fields().len(),
            "catalog replaced"
        );
        Ok(())
    }

    pub fn load_workbook_bytes(&mut self, bytes: &[u8]) -> LoadResult<()> {
        self.apply_tables(loader::tables_from_workbook(bytes)?)
    }

    pub fn load_file_set(&mut self, files: &[NamedPayload]) -> LoadResult<()> {
        self.apply_tables(loader::tables_from_files(files)?)
    }

    /// Try the configured data locations through the given fetcher.
    pub async fn autoload(&mut self, fetcher: &dyn DataFetcher) -> LoadResult<()> {
        let tables = loader::autoload(fetcher, &self.config.sources).await?;
        self.apply_tables(tables)
    }

    // ---- read accessors for the presentation layer ----

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter_definition(&self) -> &FilterDefinition {
        self.filters.definition()
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    /// Products passing the current selections and search string.
    pub fn filtered_products(&self) -> Vec<&Product> {
        self.filters.query(self.catalog.products())
    }

    pub fn services(&self) -> &[Service] {
        self.catalog.services()
    }

    /// Services attached to one product, in catalog order. An unknown
    /// product id yields no services.
    pub fn services_for(&self, product_id: &str) -> Vec<&Service> {
        let Some(product) = self.catalog.product_by_id(product_id) else {
            return Vec::new();
        };
        self.catalog
            .services()
            .iter()
            .filter(|s| product.service_ids.iter().any(|id| id == &s.id))
            .collect()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Cart lines resolved against the live catalog, with totals.
    pub fn cart_totals(&self) -> CartTotals {
        self.cart.compute_totals(&self.catalog)
    }

    // ---- mutators wired to user gestures ----

    pub fn toggle_filter(&mut self, field: &str, value: &str, on: bool) {
        self.filters.toggle_value(field, value, on);
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filters.set_search(text);
    }

    pub fn adjust_quantity(&mut self, product_id: &str, delta: i64) {
        self.cart.adjust_quantity(product_id, delta);
        self.cart_store.save(&self.cart);
    }

    pub fn remove_cart_line(&mut self, product_id: &str) {
        self.cart.remove_line(product_id);
        self.cart_store.save(&self.cart);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.cart_store.save(&self.cart);
    }
}
