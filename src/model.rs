// Core structs: Observation, TaxonomyEntry, EnrichedObservation, count series, errors
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub common_name: String,
    pub scientific_name: String,
    pub observation_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub primary_common_name: String,
    pub scientific_name: String,
    pub species_group: String,
}

/// An observation that matched a taxonomy entry. `species_group` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedObservation {
    pub common_name: String,
    pub scientific_name: String,
    pub observation_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub species_group: String,
}

/// The highlighted species resolved against the taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightTarget {
    pub scientific_name: String,
    pub common_name: String,
    pub species_group: String,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<EnrichedObservation>,
    /// Observations without a taxonomy match.
    pub dropped: usize,
}

/// Category counts sorted ascending by count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountSeries {
    entries: Vec<(String, usize)>,
}

impl CountSeries {
    /// Builds a series from grouped counts. The stable sort keeps the
    /// map's lexical order among equal counts.
    pub fn from_counts(counts: BTreeMap<String, usize>) -> Self {
        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        entries.sort_by_key(|(_, count)| *count);
        Self { entries }
    }

    pub(crate) fn from_sorted(entries: Vec<(String, usize)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }
}

/// Counts for every day of one calendar year, zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCountSeries {
    pub start: NaiveDate,
    pub counts: Vec<u32>,
}

impl DailyCountSeries {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

pub type AnnualCountSeries = BTreeMap<i32, usize>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unparseable date '{value}' in {} at row {row}", .path.display())]
    InvalidDate {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("column '{column}' missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnalysisError {
    #[error("highlighted species '{0}' not found in taxonomy")]
    HighlightNotFound(String),
    #[error("key '{0}' not present in count series")]
    KeyNotFound(String),
    #[error("year {0} is outside the supported calendar range")]
    InvalidYear(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("chart drawing failed: {0}")]
    Drawing(String),
    #[error("missing token file: '{}'", .0.display())]
    MissingToken(PathBuf),
    #[error("token file '{}' is empty", .0.display())]
    EmptyToken(PathBuf),
    #[error("cannot encode map figure: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
