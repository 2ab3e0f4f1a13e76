//! Delimited-file I/O shared by the cleaner and the importer.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const CRATE_NAME: &str = "pims-table";

/// Delimiters considered when sniffing an input file, in tie-break order.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),
}

/// Header plus rows of a delimited file. Short rows are padded with empty
/// cells so every row has one cell per header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pick the delimiter with the most unquoted occurrences in the header line.
/// Falls back to a comma when none of the candidates appear.
pub fn sniff_delimiter(sample: &[u8]) -> u8 {
    let header = sample.split(|b| *b == b'\n').next().unwrap_or_default();
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for byte in header {
        if *byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = DELIMITER_CANDIDATES.iter().position(|c| c == byte) {
            counts[idx] += 1;
        }
    }

    let mut best = 0;
    for (idx, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = idx;
        }
    }
    DELIMITER_CANDIDATES[best]
}

pub fn parse_table(bytes: &[u8]) -> Result<DelimitedTable, TableError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect::<Vec<_>>();
    let mut table = DelimitedTable::new(headers);

    for record in reader.byte_records() {
        let record = record?;
        let mut row = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .collect::<Vec<_>>();
        row.resize(table.headers.len(), String::new());
        table.rows.push(row);
    }
    Ok(table)
}

/// A parsed input file with the size and digest of the bytes it came from.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub table: DelimitedTable,
    pub byte_size: usize,
    pub content_hash: String,
}

pub async fn read_table(path: &Path) -> Result<LoadedTable, TableError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(TableError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(TableError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(LoadedTable {
        path: path.to_path_buf(),
        table: parse_table(&bytes)?,
        byte_size: bytes.len(),
        content_hash: sha256_hex(&bytes),
    })
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TableError {
    let path = path.to_path_buf();
    move |source| TableError::Io { path, source }
}

pub fn encode_table(table: &DelimitedTable) -> Result<Vec<u8>, TableError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| TableError::Csv(err.into_error().into()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct WrittenTable {
    pub path: PathBuf,
    pub rows: usize,
    pub byte_size: usize,
    pub content_hash: String,
}

/// Write a table as comma-delimited CSV through a temp file and rename, so a
/// reader never observes a half-written output.
pub async fn write_table_atomic(
    path: &Path,
    table: &DelimitedTable,
) -> Result<WrittenTable, TableError> {
    let bytes = encode_table(table)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).await.map_err(io_error(&parent))?;

    let temp_path = parent.join(format!(".{}.{}.tmp", Uuid::new_v4(), bytes.len()));
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&temp_path)
        .await
        .map_err(io_error(&temp_path))?;
    file.write_all(&bytes).await.map_err(io_error(&temp_path))?;
    file.flush().await.map_err(io_error(&temp_path))?;
    drop(file);

    if let Err(source) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(TableError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(WrittenTable {
        path: path.to_path_buf(),
        rows: table.rows.len(),
        byte_size: bytes.len(),
        content_hash: sha256_hex(&bytes),
    })
}
