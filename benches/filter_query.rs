//! Per-keystroke query cost over an interactive-scale catalog.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minishop_core::domain::catalog::Product;
use minishop_core::domain::filters::{FilterDefinition, FilterState};
use std::collections::HashMap;

fn build_products(count: usize) -> Vec<Product> {
    let categories = ["Motor", "Getriebe", "Fahrwerk", "Elektrik"];
    let colors = ["Rot", "Blau", "Grün"];
    (0..count)
        .map(|i| {
            let mut facets = HashMap::new();
            facets.insert(
                "Kategorie".to_string(),
                categories[i % categories.len()].to_string(),
            );
            facets.insert("Farbe".to_string(), colors[i % colors.len()].to_string());
            Product {
                id: format!("p{i}"),
                name: format!("Produkt {i}"),
                price: (i % 100) as f64,
                service_ids: Vec::new(),
                facets,
            }
        })
        .collect()
}

fn build_state() -> FilterState {
    let mut definition = FilterDefinition::default();
    for value in ["Motor", "Getriebe", "Fahrwerk", "Elektrik"] {
        definition.insert("Kategorie", value);
    }
    for value in ["Rot", "Blau", "Grün"] {
        definition.insert("Farbe", value);
    }
    let mut state = FilterState::from_definition(definition);
    state.toggle_value("Kategorie", "Motor", true);
    state.toggle_value("Kategorie", "Getriebe", true);
    state.toggle_value("Farbe", "Rot", true);
    state
}

fn bench_query(c: &mut Criterion) {
    let products = build_products(2_000);

    let mut filtered_only = build_state();
    filtered_only.set_search("");
    c.bench_function("query_2k_products_filters_only", |b| {
        b.iter(|| black_box(filtered_only.query(black_box(&products))))
    });

    let mut with_search = build_state();
    with_search.set_search("produkt 13");
    c.bench_function("query_2k_products_filters_and_search", |b| {
        b.iter(|| black_box(with_search.query(black_box(&products))))
    });
}

criterion_group!(benches, bench_query);
criterion_main!(benches);
