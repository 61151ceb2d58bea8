use crate::loader::tables::open_table;
use crate::model::LoadError;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Single-pass iterator over row batches of the tab-delimited historical archive.
///
/// Holds at most one batch in memory. Once the underlying reader is
/// exhausted or fails, the iterator is fused.
pub struct ArchiveChunks {
    path: PathBuf,
    reader: csv::Reader<File>,
    headers: StringRecord,
    chunk_size: usize,
    finished: bool,
}

impl ArchiveChunks {
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, LoadError> {
        let mut reader = open_table(path, b'\t')?;
        let headers = reader
            .headers()
            .map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            chunk_size: chunk_size.max(1),
            finished: false,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn column_index(&self, column: &str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }
}

impl Iterator for ArchiveChunks {
    type Item = Result<Vec<StringRecord>, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.chunk_size);
        let mut record = StringRecord::new();
        while chunk.len() < self.chunk_size {
            match self.reader.read_record(&mut record) {
                Ok(true) => chunk.push(record.clone()),
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(source) => {
                    self.finished = true;
                    return Some(Err(LoadError::Csv {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
        }

        if chunk.is_empty() { None } else { Some(Ok(chunk)) }
    }
}
