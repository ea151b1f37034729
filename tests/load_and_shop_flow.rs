//! End-to-end flow: ingest delimited data, filter, search, fill the cart.

use minishop_core::application::{CatalogSession, LoadError, NamedPayload};
use minishop_core::infrastructure::config::AppConfig;
use minishop_core::infrastructure::fetch::FileFetcher;
use minishop_core::infrastructure::storage::MemoryStore;

fn payload(name: &str, text: &str) -> NamedPayload {
    NamedPayload::new(name, text.as_bytes().to_vec())
}

fn fresh_session() -> CatalogSession {
    CatalogSession::with_store(AppConfig::default(), Box::new(MemoryStore::new()))
}

#[test]
fn file_set_load_then_filter_search_and_cart() {
    let mut session = fresh_session();
    session
        .load_file_set(&[
            payload(
                "filter.csv",
                "Field,Value\nKategorie,Motor\nKategorie,Getriebe\n",
            ),
            payload(
                "produkte.csv",
                "id,name,price,Kategorie,service_ids\n\
                 p1,Widget,\"12,50\",Motor,s1\n\
                 p2,Gadget,9,Getriebe,\n",
            ),
            payload("services.csv", "id,name,description\ns1,Wartung,Jährlich\n"),
        ])
        .unwrap();

    // faceted narrowing
    session.toggle_filter("Kategorie", "Motor", true);
    let ids: Vec<_> = session
        .filtered_products()
        .iter()
        .map(|p| p.id.clone())
        .collect();
    assert_eq!(ids, vec!["p1"]);

    // free-text search on top
    session.set_search("gad");
    assert!(session.filtered_products().is_empty());
    session.reset_filters();
    let ids: Vec<_> = session
        .filtered_products()
        .iter()
        .map(|p| p.id.clone())
        .collect();
    assert_eq!(ids, vec!["p2"]);
    session.set_search("");

    // services attach to the product that references them
    let services: Vec<_> = session
        .services_for("p1")
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(services, vec!["Wartung"]);

    // cart math on the comma-priced product
    session.adjust_quantity("p1", 2);
    let totals = session.cart_totals();
    assert_eq!(totals.lines.len(), 1);
    assert_eq!(totals.lines[0].quantity, 2);
    assert!((totals.grand_total - 25.0).abs() < f64::EPSILON);
}

#[test]
fn selection_without_products_is_a_blocking_rejection() {
    let mut session = fresh_session();
    let err = session
        .load_file_set(&[payload("filter.csv", "Field,Value\nKategorie,Motor\n")])
        .unwrap_err();
    assert!(matches!(err, LoadError::NoProductData));
    assert!(session.catalog().products().is_empty());
}

#[tokio::test]
async fn autoload_from_a_data_directory() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    tokio::fs::create_dir_all(&data).await.unwrap();
    tokio::fs::write(data.join("produkte.csv"), "id,name,price\np1,Widget,5\n")
        .await
        .unwrap();
    tokio::fs::write(data.join("services.csv"), "id,name\ns1,Wartung\n")
        .await
        .unwrap();
    // no filter.csv: optional, degrades to no filter fields

    let fetcher = FileFetcher::new(dir.path());
    let mut session = fresh_session();
    session.autoload(&fetcher).await.unwrap();

    assert_eq!(session.catalog().products().len(), 1);
    assert_eq!(session.services().len(), 1);
    assert!(session.filter_definition().is_empty());
}

#[tokio::test]
async fn autoload_without_any_sources_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FileFetcher::new(dir.path());
    let mut session = fresh_session();
    let err = session.autoload(&fetcher).await.unwrap_err();
    assert!(matches!(err, LoadError::NoProductData));
}
