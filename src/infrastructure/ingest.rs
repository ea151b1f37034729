//! Tabular ingestion adapter
//!
//! Converts an external tabular source (an xlsx workbook with named sheets, or
//! a block of delimited text) into plain row objects. Cell typing and actual
//! parsing are delegated to calamine and the csv crate; only the contract
//! "bytes/text in, sequence of field→value rows out" lives here.

use calamine::{Data, Reader, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// One ingested row: trimmed header → trimmed cell text. Blank cells are
/// omitted, so an absent key and a blank cell are the same thing downstream.
pub type RawRow = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unreadable workbook: {0}")]
    Workbook(String),

    #[error("Delimited text parse failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Logical role a sheet or file plays in a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    Filters,
    Products,
    Services,
}

impl SectionRole {
    /// Sheet names accepted for this role, in priority order.
    pub fn sheet_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Filters => &["Filter", "Filters"],
            Self::Products => &["Produkte", "Products"],
            Self::Services => &["Services", "Dienste"],
        }
    }

    /// Case-insensitive sheet name match against the alias list.
    pub fn matches_sheet(self, sheet_name: &str) -> bool {
        self.sheet_aliases()
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(sheet_name))
    }

    /// Assign a role to a file by name: case-insensitive substring heuristic,
    /// checked in filter → product → service order.
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.contains("filter") {
            Some(Self::Filters)
        } else if lower.contains("produkt") || lower.contains("product") {
            Some(Self::Products)
        } else if lower.contains("service") {
            Some(Self::Services)
        } else {
            None
        }
    }
}

/// An opened workbook, ready to yield rows per section.
pub struct WorkbookSource {
    workbook: Xlsx<Cursor<Vec<u8>>>,
}

impl WorkbookSource {
    /// Open a workbook from raw bytes.
    pub fn open(bytes: &[u8]) -> IngestResult<Self> {
        let workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| IngestError::Workbook(e.to_string()))?;
        Ok(Self { workbook })
    }

    /// Rows of the sheet filling `role`; an absent sheet yields no rows.
    pub fn section_rows(&mut self, role: SectionRole) -> IngestResult<Vec<RawRow>> {
        let sheet_names = self.workbook.sheet_names();
        let Some(name) = sheet_names.iter().find(|n| role.matches_sheet(n)) else {
            debug!(?role, available = ?sheet_names, "no sheet for section");
            return Ok(Vec::new());
        };
        let name = name.clone();
        let range = self
            .workbook
            .worksheet_range(&name)
            .map_err(|e| IngestError::Workbook(e.to_string()))?;

        let mut rows = Vec::new();
        let mut row_iter = range.rows();
        let Some(header_cells) = row_iter.next() else {
            return Ok(rows);
        };
        let headers: Vec<String> = header_cells.iter().map(cell_text).collect();

        for cells in row_iter {
            let mut row = RawRow::new();
            for (idx, cell) in cells.iter().enumerate() {
                let Some(key) = headers.get(idx) else { break };
                if key.is_empty() || matches!(cell, Data::Empty) {
                    continue;
                }
                let value = cell_text(cell);
                if !value.is_empty() {
                    row.insert(key.clone(), value);
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        debug!(?role, sheet = %name, count = rows.len(), "ingested sheet rows");
        Ok(rows)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Parse one block of delimited text into rows. The first record is the
/// header; the delimiter is sniffed from the first non-empty line.
pub fn delimited_rows(text: &str) -> IngestResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = RawRow::new();
        for (idx, field) in record.iter().enumerate() {
            let Some(key) = headers.get(idx) else { break };
            let value = field.trim();
            if !key.is_empty() && !value.is_empty() {
                row.insert(key.clone(), value.to_string());
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Pick the most frequent of `;`, `,`, tab on the first non-empty line.
fn detect_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };
    let candidates = [b';', b',', b'\t'];
    candidates
        .into_iter()
        .max_by_key(|d| line.bytes().filter(|b| b == d).count())
        .filter(|d| line.bytes().any(|b| b == *d))
        .unwrap_or(b',')
}
