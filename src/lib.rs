//! minishop-core - catalog, filter and cart engine
//!
//! Ingests tabular data (xlsx workbooks or delimited text) describing filter
//! taxonomies, products and services, evaluates faceted filters and free-text
//! search over the resulting catalog, and maintains a quantity-keyed cart
//! with computed totals persisted across reloads.
//!
//! The presentation layer is an external collaborator: it drives
//! [`application::CatalogSession`] through its mutators and reads plain data
//! back; no rendering concern lives in this crate.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the session surface for easier access
pub use application::{CatalogSession, LoadError, LoadedTables, NamedPayload};
pub use domain::{Cart, CartTotals, Catalog, FilterDefinition, Product, Service};
pub use infrastructure::config::AppConfig;
