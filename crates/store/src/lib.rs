//! Reference-set and candidate loading.
//!
//! Provides the `ReferenceSource` trait and its CSV implementation, the
//! candidate JSON reader for extraction output, and summary statistics over
//! a loaded reference set. Scoring never touches any of this; it only sees
//! the loaded records.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use markclash_model::{CandidateRecord, ReferenceEntry, TextField, TrademarkStatus};
use serde::Serialize;
use thiserror::Error;

/// Columns every reference CSV must carry.
pub const REFERENCE_COLUMNS: [&str; 7] = [
    "Client / Applicant",
    "Application No.",
    "Trademark",
    "Logo",
    "Class",
    "Status",
    "Validity",
];

/// Errors from loading records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("reference CSV is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("invalid candidate JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("candidate JSON must be an object or an array of objects")]
    CandidateShape,
}

/// Trait for reference stores (CSV today, a database later).
///
/// Scoring only needs the ordered entries, so sources stay swappable.
pub trait ReferenceSource {
    /// Load every entry, in store order.
    fn load(&self) -> Result<Vec<ReferenceEntry>, StoreError>;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// Reference set stored as a CSV file.
#[derive(Debug, Clone)]
pub struct CsvReferenceSource {
    path: PathBuf,
}

impl CsvReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceSource for CsvReferenceSource {
    fn load(&self) -> Result<Vec<ReferenceEntry>, StoreError> {
        let file = open(&self.path)?;
        let entries = read_references(file)?;
        tracing::debug!(path = %self.path.display(), rows = entries.len(), "Loaded reference CSV");
        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

fn open(path: &Path) -> Result<File, StoreError> {
    File::open(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse reference rows from CSV.
///
/// Column order is free and unknown columns are ignored. Short rows read as
/// empty trailing fields, and fields that are not valid UTF-8 read as empty.
pub fn read_references<R: Read>(reader: R) -> Result<Vec<ReferenceEntry>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    let mut indices = [0usize; REFERENCE_COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(REFERENCE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(StoreError::MissingColumn(column))?;
    }
    for extra in headers.iter().filter(|h| !REFERENCE_COLUMNS.contains(&h.as_str())) {
        tracing::debug!(column = %extra, "Ignoring unknown reference column");
    }

    let mut entries = Vec::new();
    for (row, record) in reader.byte_records().enumerate() {
        let record = record?;
        let field = |column: usize| -> TextField {
            let bytes = record.get(indices[column]).unwrap_or_default();
            let text = TextField::from_bytes(bytes);
            if text.as_str().is_empty() && !bytes.is_empty() {
                tracing::warn!(
                    row = row + 1,
                    column = REFERENCE_COLUMNS[column],
                    "Field is not valid UTF-8, treating as empty"
                );
            }
            text
        };

        entries.push(ReferenceEntry {
            applicant: field(0),
            application_no: field(1),
            trademark: field(2),
            logo_description: field(3),
            class: field(4),
            status: field(5),
            validity: field(6),
        });
    }

    Ok(entries)
}

/// Parse extraction output.
///
/// Accepts a single record, an array of records, or the extraction service
/// envelopes `{"trademarks": [...]}` and `{"trademark_data": {...}}`.
pub fn read_candidates<R: Read>(reader: R) -> Result<Vec<CandidateRecord>, StoreError> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => {
            if let Some(serde_json::Value::Array(items)) = map.remove("trademarks") {
                items
            } else if let Some(data @ serde_json::Value::Object(_)) = map.remove("trademark_data") {
                vec![data]
            } else {
                vec![serde_json::Value::Object(map)]
            }
        }
        _ => return Err(StoreError::CandidateShape),
    };

    items
        .into_iter()
        .map(|item| {
            if item.is_object() {
                Ok(serde_json::from_value(item)?)
            } else {
                Err(StoreError::CandidateShape)
            }
        })
        .collect()
}

/// Load candidates from a JSON file, giving each a source id of `<file>#<n>` unless it has one.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateRecord>, StoreError> {
    let mut candidates = read_candidates(open(path)?)?;
    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "candidates".to_string());

    for (i, candidate) in candidates.iter_mut().enumerate() {
        if candidate.source_id.is_none() {
            candidate.source_id = Some(match candidate.page_number {
                Some(page) => format!("{}#p{}", stem, page),
                None => format!("{}#{}", stem, i + 1),
            });
        }
    }
    tracing::debug!(path = %path.display(), count = candidates.len(), "Loaded candidates");
    Ok(candidates)
}

/// Counts of reference entries by derived registration status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub live: usize,
    pub pending: usize,
    pub dead: usize,
    pub unknown: usize,
}

/// Summary statistics over a reference set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceStats {
    pub total_trademarks: usize,
    pub unique_applicants: usize,
    /// Rows that cannot be compared because the trademark is blank
    pub missing_trademark: usize,
    /// Nice class number to row count
    pub classes: BTreeMap<u16, usize>,
    /// Raw status text to row count
    pub statuses: BTreeMap<String, usize>,
    pub registration: StatusCounts,
}

impl ReferenceStats {
    pub fn from_entries(entries: &[ReferenceEntry]) -> Self {
        let mut stats = Self {
            total_trademarks: entries.len(),
            ..Default::default()
        };
        let mut applicants = HashSet::new();

        for entry in entries {
            let applicant = entry.applicant.as_str().trim().to_lowercase();
            if !applicant.is_empty() {
                applicants.insert(applicant);
            }
            if entry.trademark.is_blank() {
                stats.missing_trademark += 1;
            }
            for class in entry.classes() {
                *stats.classes.entry(class).or_default() += 1;
            }
            let status = entry.status.as_str().trim();
            if !status.is_empty() {
                *stats.statuses.entry(status.to_string()).or_default() += 1;
            }
            match entry.registration_status() {
                TrademarkStatus::Live => stats.registration.live += 1,
                TrademarkStatus::Pending => stats.registration.pending += 1,
                TrademarkStatus::Dead => stats.registration.dead += 1,
                TrademarkStatus::Unknown => stats.registration.unknown += 1,
            }
        }

        stats.unique_applicants = applicants.len();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const CSV: &str = "\
Client / Applicant,Application No.,Trademark,Logo,Class,Status,Validity
Kromax Paints Pvt Ltd,APP001,Kromax,red circle,2,Registered,2031-05-01
Cromax Coatings,APP002,Cromax,,2,Opposed,
Blue Water Foods,APP003,,wave,\"29, 30\",Abandoned,
";

    #[test]
    fn test_read_references() {
        let entries = read_references(CSV.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].trademark.as_str(), "Kromax");
        assert_eq!(entries[0].logo_description.as_str(), "red circle");
        assert_eq!(entries[1].application_no.as_str(), "APP002");
        assert!(entries[2].trademark.is_blank());
        assert_eq!(entries[2].classes(), vec![29, 30]);
    }

    #[test]
    fn test_column_order_and_bom() {
        let csv = "\u{feff}Trademark,Validity,Status,Class,Logo,Application No.,Client / Applicant,Notes\n\
                   Kromax,,Registered,2,,APP001,Kromax Paints,ignored\n";
        let entries = read_references(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].trademark.as_str(), "Kromax");
        assert_eq!(entries[0].applicant.as_str(), "Kromax Paints");
    }

    #[test]
    fn test_missing_column() {
        let csv = "Client / Applicant,Application No.,Logo,Class,Status,Validity\nA,1,,,,\n";
        assert!(matches!(
            read_references(csv.as_bytes()),
            Err(StoreError::MissingColumn("Trademark"))
        ));
    }

    #[test]
    fn test_invalid_utf8_field_reads_empty() {
        let mut bytes = b"Client / Applicant,Application No.,Trademark,Logo,Class,Status,Validity\n".to_vec();
        bytes.extend_from_slice(b"Acme,APP9,\xff\xfeBad,,,,\n");
        let entries = read_references(bytes.as_slice()).unwrap();
        assert_eq!(entries[0].trademark, TextField::default());
        assert_eq!(entries[0].applicant.as_str(), "Acme");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Client / Applicant,Application No.,Trademark,Logo,Class,Status,Validity\nAcme,APP1,Acme\n";
        let entries = read_references(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].trademark.as_str(), "Acme");
        assert!(entries[0].validity.is_blank());
    }

    #[test]
    fn test_csv_source_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let source = CsvReferenceSource::new(file.path());
        assert_eq!(source.name(), "csv");
        assert_eq!(source.load().unwrap().len(), 3);

        let missing = CsvReferenceSource::new("/nonexistent/markclash.csv");
        assert!(matches!(missing.load(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_read_candidates_shapes() {
        let single = read_candidates(r#"{"name": "Kromax"}"#.as_bytes()).unwrap();
        assert_eq!(single.len(), 1);

        let array = read_candidates(r#"[{"name": "Kromax"}, {"name": "Cromax", "page_number": 2}]"#.as_bytes()).unwrap();
        assert_eq!(array[1].page_number, Some(2));

        let envelope = read_candidates(
            r#"{"filename": "journal.pdf", "trademarks": [{"name": "A"}, {"name": "B"}], "status": "success"}"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(envelope.len(), 2);

        let text = read_candidates(
            r#"{"document_type": "trademark", "trademark_data": {"name": "Kromax"}}"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(text[0].name(), "Kromax");

        assert!(matches!(
            read_candidates("42".as_bytes()),
            Err(StoreError::CandidateShape)
        ));
        assert!(matches!(
            read_candidates("[1, 2]".as_bytes()),
            Err(StoreError::CandidateShape)
        ));
    }

    #[test]
    fn test_load_candidates_assigns_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted.json");
        std::fs::write(
            &path,
            r#"[{"name": "A"}, {"name": "B", "page_number": 7}, {"name": "C", "source_id": "mine"}]"#,
        )
        .unwrap();
        let candidates = load_candidates(&path).unwrap();
        let ids: Vec<String> = candidates.iter().map(CandidateRecord::id).collect();
        assert_eq!(ids, vec!["extracted.json#1", "extracted.json#p7", "mine"]);
    }

    #[test]
    fn test_reference_stats() {
        let entries = read_references(CSV.as_bytes()).unwrap();
        let stats = ReferenceStats::from_entries(&entries);
        assert_eq!(stats.total_trademarks, 3);
        assert_eq!(stats.unique_applicants, 3);
        assert_eq!(stats.missing_trademark, 1);
        assert_eq!(stats.classes.get(&2), Some(&2));
        assert_eq!(stats.statuses.get("Opposed"), Some(&1));
        assert_eq!(
            stats.registration,
            StatusCounts {
                live: 1,
                pending: 1,
                dead: 1,
                unknown: 0
            }
        );
    }
}
