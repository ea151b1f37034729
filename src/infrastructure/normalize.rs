//! Row normalization into the canonical catalog schema
//!
//! Source files spell their headers in several case and language variants.
//! Resolution is data-driven: each canonical field carries a priority-ordered
//! alias list and the first matching column wins. Everything that enters the
//! catalog passes through the sanitizer on the way.

use std::collections::HashMap;
use tracing::warn;

use crate::domain::catalog::{Product, Service};
use crate::domain::filters::FilterDefinition;
use crate::domain::sanitize::{sanitize_identifier, sanitize_identifier_list, sanitize_text};
use crate::infrastructure::config::LimitsConfig;
use crate::infrastructure::ingest::RawRow;

/// Accepted column headers per canonical field, first match wins.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    pub filter_field: Vec<&'static str>,
    pub filter_value: Vec<&'static str>,
    pub id: Vec<&'static str>,
    pub product_name: Vec<&'static str>,
    pub product_price: Vec<&'static str>,
    pub product_services: Vec<&'static str>,
    pub service_name: Vec<&'static str>,
    pub service_description: Vec<&'static str>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            filter_field: vec!["Field", "field", "Feld"],
            filter_value: vec!["Value", "value", "Wert"],
            id: vec!["id", "ID", "Id"],
            product_name: vec!["name", "Name", "Produkt", "Product"],
            product_price: vec!["price", "Price", "Preis", "preis"],
            product_services: vec!["service_ids", "services", "Service IDs", "ServiceIds"],
            service_name: vec!["name", "Name", "Service"],
            service_description: vec!["description", "beschreibung", "Beschreibung"],
        }
    }
}

/// First value present under any of the aliases, in priority order.
fn resolve<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|alias| row.get(*alias))
        .map(String::as_str)
}

/// Normalizer over raw rows, parameterized by aliases and sanitizer bounds.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    aliases: ColumnAliases,
    limits: LimitsConfig,
}

impl Normalizer {
    pub fn new(aliases: ColumnAliases, limits: LimitsConfig) -> Self {
        Self { aliases, limits }
    }

    /// Accumulate filter rows into a definition.
    ///
    /// Rows blank in field or value after sanitization are skipped; field and
    /// value order is first-seen; duplicate values are suppressed.
    pub fn build_filter_definition(&self, rows: &[RawRow]) -> FilterDefinition {
        let mut definition = FilterDefinition::default();
        for row in rows {
            let field = resolve(row, &self.aliases.filter_field)
                .map(|v| sanitize_text(v, self.limits.max_text_len))
                .unwrap_or_default();
            let value = resolve(row, &self.aliases.filter_value)
                .map(|v| sanitize_text(v, self.limits.max_text_len))
                .unwrap_or_default();
            if field.is_empty() || value.is_empty() {
                continue;
            }
            definition.insert(&field, &value);
        }
        definition
    }

    /// Normalize product rows into canonical products.
    ///
    /// Rows whose id sanitizes to empty are dropped. All columns survive
    /// sanitized in the facet map, including the ones consumed by canonical
    /// fields, so filters may target them.
    pub fn normalize_products(&self, rows: &[RawRow]) -> Vec<Product> {
        let mut products = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;
        for row in rows {
            let id = resolve(row, &self.aliases.id)
                .map(|v| sanitize_identifier(v, self.limits.max_identifier_len))
                .unwrap_or_default();
            if id.is_empty() {
                dropped += 1;
                continue;
            }
            let name = resolve(row, &self.aliases.product_name)
                .map(|v| sanitize_text(v, self.limits.max_text_len))
                .unwrap_or_default();
            let price = resolve(row, &self.aliases.product_price)
                .map(parse_price)
                .unwrap_or(0.0);
            let service_ids = resolve(row, &self.aliases.product_services)
                .map(|v| {
                    sanitize_identifier_list(
                        split_service_ids(v),
                        self.limits.max_identifier_len,
                    )
                })
                .unwrap_or_default();
            products.push(Product {
                id,
                name,
                price,
                service_ids,
                facets: self.facets_of(row),
            });
        }
        if dropped > 0 {
            warn!(dropped, "dropped product rows without a usable id");
        }
        products
    }

    /// Normalize service rows; same empty-id policy as products.
    pub fn normalize_services(&self, rows: &[RawRow]) -> Vec<Service> {
        let mut services = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;
        for row in rows {
            let id = resolve(row, &self.aliases.id)
                .map(|v| sanitize_identifier(v, self.limits.max_identifier_len))
                .unwrap_or_default();
            if id.is_empty() {
                dropped += 1;
                continue;
            }
            services.push(Service {
                id,
                name: resolve(row, &self.aliases.service_name)
                    .map(|v| sanitize_text(v, self.limits.max_text_len))
                    .unwrap_or_default(),
                description: resolve(row, &self.aliases.service_description)
                    .map(|v| sanitize_text(v, self.limits.max_text_len))
                    .unwrap_or_default(),
            });
        }
        if dropped > 0 {
            warn!(dropped, "dropped service rows without a usable id");
        }
        services
    }

    fn facets_of(&self, row: &RawRow) -> HashMap<String, String> {
        row.iter()
            .map(|(key, value)| {
                (
                    sanitize_text(key, self.limits.max_text_len),
                    sanitize_text(value, self.limits.max_text_len),
                )
            })
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }
}

/// Split a service-id cell on `;`, `,` or `|`.
fn split_service_ids(value: &str) -> impl Iterator<Item = &str> {
    value
        .split([';', ',', '|'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Locale-tolerant price coercion.
///
/// Accepts `,` as decimal separator; anything unparseable, non-finite or
/// negative yields 0.0. Never an error.
pub fn parse_price(value: &str) -> f64 {
    let normalized = value.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => price,
        _ => 0.0,
    }
}
