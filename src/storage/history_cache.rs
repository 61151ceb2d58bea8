use crate::loader::ArchiveChunks;
use crate::loader::tables::open_table;
use crate::model::LoadError;
use crate::utils::{file_safe, parse_date};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SCIENTIFIC_NAME_COLUMN: &str = "SCIENTIFIC NAME";
pub const OBSERVATION_DATE_COLUMN: &str = "OBSERVATION DATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// The extract already existed; the archive was not read.
    Hit,
    Built { scanned: usize, matched: usize },
}

/// Per-species extract of the historical archive, kept as a CSV file.
///
/// Existence of the file is the only validity check. Deleting it forces a rescan.
pub struct HistoryCache {
    path: PathBuf,
}

impl HistoryCache {
    pub fn for_species(cache_dir: &Path, common_name: &str) -> Self {
        let file_name = format!("eBird Data - {} - All Dates.csv", file_safe(common_name));
        Self {
            path: cache_dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Builds the extract from the archive unless it already exists.
    ///
    /// Rows are appended chunk by chunk to a `.partial` file which is renamed
    /// into place once the scan completes. The header is always written, so a
    /// species with no archive rows still gets a valid, empty extract.
    pub fn ensure(
        &self,
        archive: &Path,
        scientific_name: &str,
        chunk_size: usize,
    ) -> Result<CacheStatus, LoadError> {
        if self.exists() {
            info!("History extract found: {}", self.path.display());
            return Ok(CacheStatus::Hit);
        }

        info!(
            "Scanning archive {} for {} (chunks of {})",
            archive.display(),
            scientific_name,
            chunk_size
        );
        let chunks = ArchiveChunks::open(archive, chunk_size)?;
        let name_idx = chunks.column_index(SCIENTIFIC_NAME_COLUMN)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let partial = self.partial_path();
        let file = File::create(&partial).map_err(|source| LoadError::Io {
            path: partial.clone(),
            source,
        })?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        writer
            .write_record(chunks.headers())
            .map_err(|source| self.csv_error(source))?;

        let mut scanned = 0;
        let mut matched = 0;
        for (i, chunk) in chunks.enumerate() {
            let chunk = chunk?;
            scanned += chunk.len();
            let mut piece = 0;
            for record in chunk
                .iter()
                .filter(|r| r.get(name_idx).map(str::trim) == Some(scientific_name))
            {
                writer
                    .write_record(record)
                    .map_err(|source| self.csv_error(source))?;
                piece += 1;
            }
            matched += piece;
            debug!("Chunk {}: {} matching rows", i, piece);
        }

        writer
            .flush()
            .map_err(|source| LoadError::Io { path: partial.clone(), source })?;
        drop(writer);
        fs::rename(&partial, &self.path).map_err(|source| self.io_error(source))?;

        info!(
            "History extract written: {} ({} of {} rows)",
            self.path.display(),
            matched,
            scanned
        );
        Ok(CacheStatus::Built { scanned, matched })
    }

    /// Parsed `OBSERVATION DATE` values of every extract row.
    pub fn observation_dates(&self) -> Result<Vec<NaiveDate>, LoadError> {
        let mut reader = open_table(&self.path, b',')?;
        let headers = reader.headers().map_err(|source| self.csv_error(source))?;
        let date_idx = headers
            .iter()
            .position(|h| h.trim() == OBSERVATION_DATE_COLUMN)
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column: OBSERVATION_DATE_COLUMN.to_string(),
            })?;

        let mut dates = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|source| self.csv_error(source))?;
            let value = record.get(date_idx).unwrap_or_default();
            let date = parse_date(value).ok_or_else(|| LoadError::InvalidDate {
                path: self.path.clone(),
                row: i + 1,
                value: value.to_string(),
            })?;
            dates.push(date);
        }
        Ok(dates)
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".partial");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> LoadError {
        LoadError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> LoadError {
        LoadError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_archive(dir: &Path) -> PathBuf {
        let path = dir.join("ebd_CA-AB_smp.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "COMMON NAME\tSCIENTIFIC NAME\tOBSERVATION DATE\tLOCALITY").unwrap();
        writeln!(file, "Rusty Blackbird\tEuphagus carolinus\t1985-05-01\tElk Island").unwrap();
        writeln!(file, "Common Raven\tCorvus corax\t1985-05-01\tElk Island").unwrap();
        writeln!(file, "Rusty Blackbird\tEuphagus carolinus\t2001-09-14\tBeaverhill Lake").unwrap();
        writeln!(file, "Common Raven\tCorvus corax\t2010-02-02\tCalgary").unwrap();
        writeln!(file, "Rusty Blackbird\tEuphagus carolinus\t2023-04-20\tEdmonton").unwrap();
        path
    }

    #[test]
    fn test_extract_filters_species_across_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_archive(dir.path());
        let cache = HistoryCache::for_species(dir.path(), "Rusty Blackbird");

        let status = cache.ensure(&archive, "Euphagus carolinus", 2).unwrap();
        assert_eq!(status, CacheStatus::Built { scanned: 5, matched: 3 });
        assert!(cache.exists());
        assert!(!cache.partial_path().exists());

        let content = fs::read_to_string(cache.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "COMMON NAME,SCIENTIFIC NAME,OBSERVATION DATE,LOCALITY");
        assert_eq!(content.matches("COMMON NAME").count(), 1);
        assert!(!content.contains("Corvus corax"));

        let dates = cache.observation_dates().unwrap();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2001, 9, 14).unwrap());
    }

    #[test]
    fn test_existing_extract_short_circuits_scan() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoryCache::for_species(dir.path(), "Rusty Blackbird");
        fs::write(cache.path(), "OBSERVATION DATE\n1999-06-01\n").unwrap();

        // The archive path does not exist; a rescan would fail.
        let status = cache
            .ensure(&dir.path().join("missing.txt"), "Euphagus carolinus", 10)
            .unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(cache.observation_dates().unwrap().len(), 1);
    }

    #[test]
    fn test_no_matches_yields_header_only_extract() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_archive(dir.path());
        let cache = HistoryCache::for_species(dir.path(), "Snowy Owl");

        let status = cache.ensure(&archive, "Bubo scandiacus", 10).unwrap();
        assert_eq!(status, CacheStatus::Built { scanned: 5, matched: 0 });
        assert!(cache.observation_dates().unwrap().is_empty());
    }

    #[test]
    fn test_missing_archive_leaves_no_extract() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoryCache::for_species(dir.path(), "Rusty Blackbird");
        let result = cache.ensure(&dir.path().join("missing.txt"), "Euphagus carolinus", 10);
        assert!(matches!(result, Err(LoadError::Io { .. })));
        assert!(!cache.exists());
    }
}
