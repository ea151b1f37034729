//! Faceted filter state and product matching
//!
//! Holds the filter definition produced by a data load, the user's current
//! selections and the free-text search string. Matching is a pure function of
//! this state: selected values within one field are alternatives (OR), fields
//! with a selection combine conjunctively (AND).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::catalog::Product;

/// One filterable field and its distinct values, in first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterField {
    pub name: String,
    pub values: Vec<String>,
}

/// Ordered, duplicate-free field → values mapping for one data load.
///
/// Immutable once built; the next load replaces it wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterDefinition {
    fields: Vec<FilterField>,
}

impl FilterDefinition {
    /// Record an observed (field, value) pair, preserving first-seen order of
    /// fields and values and suppressing duplicate values per field.
    pub fn insert(&mut self, field: &str, value: &str) {
        match self.fields.iter_mut().find(|f| f.name == field) {
            Some(existing) => {
                if !existing.values.iter().any(|v| v == value) {
                    existing.values.push(value.to_string());
                }
            }
            None => self.fields.push(FilterField {
                name: field.to_string(),
                values: vec![value.to_string()],
            }),
        }
    }

    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Mutable filter state: the definition, the selection sets and the search
/// string the presentation layer feeds per keystroke.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    definition: FilterDefinition,
    selected: HashMap<String, HashSet<String>>,
    search: String,
}

impl FilterState {
    /// Fresh state for a new definition: one empty selection set per field.
    /// Always fully replaces prior selections; filters never survive a load.
    pub fn from_definition(definition: FilterDefinition) -> Self {
        let selected = definition
            .fields()
            .iter()
            .map(|f| (f.name.clone(), HashSet::new()))
            .collect();
        Self {
            definition,
            selected,
            search: String::new(),
        }
    }

    pub fn definition(&self) -> &FilterDefinition {
        &self.definition
    }

    pub fn selected(&self) -> &HashMap<String, HashSet<String>> {
        &self.selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Add or remove `value` from the field's selection set. Unknown fields
    /// are ignored.
    pub fn toggle_value(&mut self, field: &str, value: &str, on: bool) {
        let Some(set) = self.selected.get_mut(field) else {
            return;
        };
        if on {
            set.insert(value.to_string());
        } else {
            set.remove(value);
        }
    }

    /// Clear every selection set without changing the key set. Idempotent.
    pub fn reset(&mut self) {
        for set in self.selected.values_mut() {
            set.clear();
        }
    }

    /// True when the product satisfies every field that has a selection.
    ///
    /// A field with an empty selection imposes no constraint; a missing facet
    /// value reads as the empty string and only matches if that string was
    /// selected.
    pub fn matches(&self, product: &Product) -> bool {
        self.selected.iter().all(|(field, set)| {
            set.is_empty() || set.contains(product.facet(field))
        })
    }

    /// Products passing [`Self::matches`], further narrowed by the search
    /// string (case-insensitive substring on name or id) when non-empty.
    pub fn query<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let base = products.iter().filter(|p| self.matches(p));
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return base.collect();
        }
        base.filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.id.to_lowercase().contains(&needle)
        })
        .collect()
    }
}
