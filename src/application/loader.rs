//! Load pipeline policies
//!
//! Turns user-supplied sources (a workbook, a set of picked files, or the
//! well-known data locations) into raw row tables. Whether a table set is
//! actually applied is decided by the session: product data gates the load,
//! filter and service data are individually optional.

use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::fetch::DataFetcher;
use crate::infrastructure::config::SourceConfig;
use crate::infrastructure::ingest::{
    delimited_rows, IngestError, RawRow, SectionRole, WorkbookSource,
};

#[derive(Error, Debug)]
pub enum LoadError {
    /// No usable product rows: the candidate load is rejected wholesale and
    /// any existing catalog stays in place.
    #[error("No usable product data in the selected sources")]
    NoProductData,

    /// The selection holds neither a workbook nor delimited files.
    #[error("Selection contains neither a workbook nor delimited text files")]
    UnsupportedSelection,

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Raw row tables for one candidate load.
#[derive(Debug, Default)]
pub struct LoadedTables {
    pub filters: Vec<RawRow>,
    pub products: Vec<RawRow>,
    pub services: Vec<RawRow>,
}

/// A user-picked file: its name (for role assignment) and contents.
#[derive(Debug, Clone)]
pub struct NamedPayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedPayload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    fn has_extension(&self, extensions: &[&str]) -> bool {
        let lower = self.name.to_lowercase();
        extensions.iter().any(|ext| lower.ends_with(ext))
    }
}

/// Read the three role sheets out of a workbook; each sheet is optional.
pub fn tables_from_workbook(bytes: &[u8]) -> LoadResult<LoadedTables> {
    let mut source = WorkbookSource::open(bytes)?;
    Ok(LoadedTables {
        filters: source.section_rows(SectionRole::Filters)?,
        products: source.section_rows(SectionRole::Products)?,
        services: source.section_rows(SectionRole::Services)?,
    })
}

/// Apply the file-set selection policy.
///
/// Exactly one workbook file takes the workbook path. Otherwise the delimited
/// files are parsed and assigned by filename role, later files of a role
/// winning. A selection with no recognizable product rows is rejected as a
/// whole; nothing is partially applied.
pub fn tables_from_files(files: &[NamedPayload]) -> LoadResult<LoadedTables> {
    if files.len() == 1 && files[0].has_extension(&[".xlsx", ".xls"]) {
        return tables_from_workbook(&files[0].bytes);
    }

    let delimited: Vec<&NamedPayload> = files
        .iter()
        .filter(|f| f.has_extension(&[".csv", ".tsv", ".txt"]))
        .collect();
    if delimited.is_empty() {
        return Err(LoadError::UnsupportedSelection);
    }

    let mut tables = LoadedTables::default();
    for file in delimited {
        let Some(role) = SectionRole::from_filename(&file.name) else {
            debug!(name = %file.name, "file name matches no section role, skipped");
            continue;
        };
        let rows = delimited_rows(&String::from_utf8_lossy(&file.bytes))?;
        match role {
            SectionRole::Filters => tables.filters = rows,
            SectionRole::Products => tables.products = rows,
            SectionRole::Services => tables.services = rows,
        }
    }

    if tables.products.is_empty() {
        return Err(LoadError::NoProductData);
    }
    Ok(tables)
}

/// Try the well-known data locations: the workbook first, then the three
/// delimited files. Product data is required; a failed fetch of filter or
/// service data degrades to an empty contribution instead of aborting.
pub async fn autoload(
    fetcher: &dyn DataFetcher,
    sources: &SourceConfig,
) -> LoadResult<LoadedTables> {
    match fetcher.fetch(&sources.location(&sources.workbook_file)).await {
        Ok(bytes) => match tables_from_workbook(&bytes) {
            Ok(tables) => return Ok(tables),
            Err(error) => {
                warn!(%error, "workbook autoload failed, trying delimited files");
            }
        },
        Err(error) => {
            debug!(%error, "no workbook at data location");
        }
    }

    let filter_location = sources.location(&sources.filter_file);
    let product_location = sources.location(&sources.product_file);
    let service_location = sources.location(&sources.service_file);
    let (filters, products, services) = tokio::join!(
        fetcher.fetch(&filter_location),
        fetcher.fetch(&product_location),
        fetcher.fetch(&service_location),
    );

    let Ok(product_bytes) = products else {
        return Err(LoadError::NoProductData);
    };

    Ok(LoadedTables {
        filters: optional_rows(filters, "filter"),
        products: delimited_rows(&String::from_utf8_lossy(&product_bytes))?,
        services: optional_rows(services, "services"),
    })
}

/// Rows of an optional source: any failure counts as zero rows.
fn optional_rows(fetched: anyhow::Result<Vec<u8>>, label: &str) -> Vec<RawRow> {
    let bytes = match fetched {
        Ok(bytes) => bytes,
        Err(error) => {
            debug!(%error, source = label, "optional source unavailable");
            return Vec::new();
        }
    };
    match delimited_rows(&String::from_utf8_lossy(&bytes)) {
        Ok(rows) => rows,
        Err(error) => {
            warn!(%error, source = label, "optional source unreadable, ignored");
            Vec::new()
        }
    }
}
