//! Reading the raw initiative rows from a local snapshot or the remote
//! database.

use crate::error::{Error, Result};
use crate::state::save_state;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Remote(String),
}

impl From<&str> for DatasetSource {
    fn from(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            DatasetSource::Remote(s.to_string())
        } else {
            DatasetSource::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

impl DatasetSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, DatasetSource::Remote(_))
    }
}

/// A dataset document: either the bare row array of a snapshot or the
/// `{ "data": [...] }` envelope served by the database endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDataset {
    Envelope { data: Vec<Value> },
    Rows(Vec<Value>),
}

impl RawDataset {
    fn into_rows(self) -> Vec<Value> {
        match self {
            RawDataset::Envelope { data } => data,
            RawDataset::Rows(rows) => rows,
        }
    }
}

/// Decode a dataset document into raw rows
pub fn parse_rows(contents: &str) -> Result<Vec<Value>> {
    let dataset: RawDataset = serde_json::from_str(contents)?;
    Ok(dataset.into_rows())
}

/// Read raw rows from a local file
pub fn read_rows(path: &Path) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::InputUnavailable(format!("{}: {}", path.display(), e)))?;
    let rows = parse_rows(&contents)?;
    info!(path = %path.display(), rows = rows.len(), "read dataset");
    Ok(rows)
}

fn http_client() -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .build()?)
}

/// Fetch raw rows from the remote endpoint. Any non-2xx status is fatal.
pub fn fetch_rows(url: &str) -> Result<Vec<Value>> {
    fetch_rows_with(&http_client()?, url)
}

fn fetch_rows_with(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<Value>> {
    info!(url, "fetching dataset");
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::FetchStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let rows = parse_rows(&resp.text()?)?;
    info!(url, rows = rows.len(), "fetched dataset");
    Ok(rows)
}

pub fn load_rows(source: &DatasetSource) -> Result<Vec<Value>> {
    match source {
        DatasetSource::File(path) => read_rows(path),
        DatasetSource::Remote(url) => fetch_rows(url),
    }
}

/// Store fetched rows as a local snapshot, in the bare-array form
pub fn write_snapshot(path: &Path, rows: &[Value]) -> Result<()> {
    save_state(path, &rows)?;
    info!(path = %path.display(), rows = rows.len(), "wrote dataset snapshot");
    Ok(())
}
