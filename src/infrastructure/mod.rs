//! Infrastructure layer - ingestion, persistence and ambient services
//!
//! Adapters around external capabilities: tabular parsing, source fetching,
//! key-value persistence, configuration and logging.

pub mod config;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod normalize;
pub mod storage;

// Re-export commonly used items
pub use config::{AppConfig, LimitsConfig, SourceConfig, StorageConfig, StorageScope};
pub use fetch::{DataFetcher, FileFetcher, HttpFetcher};
pub use ingest::{delimited_rows, IngestError, RawRow, SectionRole, WorkbookSource};
pub use normalize::{ColumnAliases, Normalizer};
pub use storage::{select_store, CartStore, FileStore, KeyValueStore, MemoryStore};
