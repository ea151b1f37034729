//! Cart persistence
//!
//! A small key-value storage seam, capability-checked once at startup: the
//! file-backed store is probed for writability and the in-memory store takes
//! over for the process lifetime when the probe fails. Persisted payloads are
//! untrusted input and re-validated entry by entry on load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::domain::cart::{Cart, MAX_QUANTITY};
use crate::domain::sanitize::{sanitize_identifier, DEFAULT_IDENTIFIER_LIMIT};
use crate::infrastructure::config::{StorageConfig, StorageScope};

/// Minimal storage interface the cart persists through.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str);
}

/// Process-lifetime fallback store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// One file per key under a directory.
#[derive(Debug)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Capability probe: can we create the directory and write into it?
    pub fn probe(&self) -> bool {
        let marker = self.directory.join(".probe");
        let ok = std::fs::create_dir_all(&self.directory).is_ok()
            && std::fs::write(&marker, b"ok").is_ok();
        let _ = std::fs::remove_file(&marker);
        ok
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // keys are fixed strings from config, but constrain them anyway
        let safe = sanitize_identifier(key, 128);
        self.directory.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create {}", self.directory.display()))?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&mut self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}

/// Resolve the storage directory for a scope.
fn directory_for(config: &StorageConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }
    match config.scope {
        StorageScope::Session => std::env::temp_dir().join("minishop"),
        StorageScope::Durable => dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("minishop"),
    }
}

/// Probe the configured medium once and select a store implementation.
///
/// A failed probe is a resource-availability fallback, not an error: the cart
/// then lives in memory for the rest of the process.
pub fn select_store(config: &StorageConfig) -> Box<dyn KeyValueStore> {
    let directory = directory_for(config);
    let file_store = FileStore::new(&directory);
    if file_store.probe() {
        info!(directory = %directory.display(), "cart storage: file-backed");
        Box::new(file_store)
    } else {
        warn!(
            directory = %directory.display(),
            "cart storage unavailable, falling back to in-memory"
        );
        Box::new(MemoryStore::new())
    }
}

/// Persisted shape of one cart line.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedLine {
    qty: u32,
}

/// Serializes the cart under a fixed key and restores it on construction.
pub struct CartStore {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl CartStore {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Persist the cart. Storage failures are swallowed with a warning; the
    /// in-memory cart stays authoritative, only durability is lost.
    pub fn save(&mut self, cart: &Cart) {
        let payload: BTreeMap<&str, PersistedLine> = cart
            .lines()
            .map(|(id, qty)| (id, PersistedLine { qty }))
            .collect();
        match serde_json::to_string(&payload) {
            Ok(raw) => {
                if let Err(error) = self.store.set(&self.key, &raw) {
                    warn!(%error, "cart persistence failed, continuing in memory");
                }
            }
            Err(error) => warn!(%error, "cart serialization failed"),
        }
    }

    /// Restore the cart; any read or parse failure yields an empty cart.
    pub fn load(&self) -> Cart {
        let Some(raw) = self.store.get(&self.key) else {
            return Cart::new();
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => sanitize_cart(&value),
            Err(error) => {
                debug!(%error, "discarding unparseable cart payload");
                Cart::new()
            }
        }
    }

    pub fn clear(&mut self) {
        self.store.remove(&self.key);
    }
}

/// Re-validate a persisted cart payload entry by entry.
///
/// Ids pass through the identifier sanitizer; quantities must be finite
/// numbers ≥ 1 and are floored and capped at [`MAX_QUANTITY`]. Entries
/// failing either check are dropped; the rest survive.
pub fn sanitize_cart(raw: &serde_json::Value) -> Cart {
    let mut cart = Cart::new();
    let Some(entries) = raw.as_object() else {
        return cart;
    };
    for (key, entry) in entries {
        let id = sanitize_identifier(key, DEFAULT_IDENTIFIER_LIMIT);
        if id.is_empty() {
            continue;
        }
        let Some(qty) = entry.get("qty").and_then(serde_json::Value::as_f64) else {
            continue;
        };
        if !qty.is_finite() || qty < 1.0 {
            continue;
        }
        let quantity = (qty.floor() as u64).min(u64::from(MAX_QUANTITY)) as u32;
        cart.set_quantity(&id, quantity);
    }
    cart
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_cart_store() -> CartStore {
        CartStore::new(Box::new(MemoryStore::new()), "mini_shop_cart_v1")
    }

    #[test]
    fn save_load_round_trip() {
        let mut store = memory_cart_store();
        let mut cart = Cart::new();
        cart.adjust_quantity("p1", 2);
        cart.adjust_quantity("p2", 9_999);

        store.save(&cart);
        assert_eq!(store.load(), cart);
    }

    #[test]
    fn missing_key_loads_empty() {
        assert!(memory_cart_store().load().is_empty());
    }

    #[test]
    fn non_json_payload_loads_empty() {
        let mut inner = MemoryStore::new();
        inner.set("k", "definitely not json").unwrap();
        let store = CartStore::new(Box::new(inner), "k");
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_entries_are_dropped_individually() {
        let raw = json!({
            "x": {"qty": -5},
            "y": {"qty": "abc"},
            "z": {"qty": 3},
            "": {"qty": 1},
            "w": 7
        });
        let cart = sanitize_cart(&raw);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity("z"), Some(3));
    }

    #[test]
    fn entirely_malformed_payload_loads_empty() {
        assert!(sanitize_cart(&json!({"x": {"qty": -5}})).is_empty());
        assert!(sanitize_cart(&json!({"y": {"qty": "abc"}})).is_empty());
        assert!(sanitize_cart(&json!([1, 2, 3])).is_empty());
        assert!(sanitize_cart(&json!("text")).is_empty());
    }

    #[test]
    fn oversized_and_fractional_quantities_are_normalized() {
        let raw = json!({
            "a": {"qty": 123456},
            "b": {"qty": 2.9},
            "c": {"qty": 0.5}
        });
        let cart = sanitize_cart(&raw);
        assert_eq!(cart.quantity("a"), Some(MAX_QUANTITY));
        assert_eq!(cart.quantity("b"), Some(2));
        assert_eq!(cart.quantity("c"), None);
    }

    #[test]
    fn ids_are_sanitized_on_load() {
        let raw = json!({"p<script>1": {"qty": 2}});
        let cart = sanitize_cart(&raw);
        assert_eq!(cart.quantity("pscript1"), Some(2));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("storage"));
        assert!(store.probe());

        store.set("mini_shop_cart_v1", r#"{"p1":{"qty":2}}"#).unwrap();
        let read = store.get("mini_shop_cart_v1").unwrap();
        assert_eq!(read, r#"{"p1":{"qty":2}}"#);

        store.remove("mini_shop_cart_v1");
        assert!(store.get("mini_shop_cart_v1").is_none());
    }

    #[test]
    fn select_store_falls_back_when_unwritable() {
        let config = StorageConfig {
            directory: Some(PathBuf::from("/proc/no-such-place/minishop")),
            ..StorageConfig::default()
        };
        let mut store = select_store(&config);
        // fallback store still works
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
    }
}
