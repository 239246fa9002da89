use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DataError;

use super::id::is_detailed_id;
use super::record::{CategoryRecord, LeafRecord};
use super::style::StyleSheet;

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// The three static documents published per language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Document {
    Index,
    Children(String),
    Style,
}

impl Document {
    /// Path relative to the data base, `data/<lang>/<file>.json`.
    pub fn relative_path(&self, lang: &str) -> Result<String, DataError> {
        let lang_is_safe = !lang.is_empty()
            && lang
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'));
        if !lang_is_safe {
            return Err(DataError::InvalidAddress(format!("language code {lang:?}")));
        }

        let file = match self {
            Self::Index => "index.json".to_owned(),
            Self::Style => "style.json".to_owned(),
            Self::Children(node_id) if is_detailed_id(node_id) => format!("{node_id}.json"),
            Self::Children(node_id) => {
                return Err(DataError::InvalidAddress(format!(
                    "child document for non-detailed id {node_id:?}"
                )));
            }
        };

        Ok(format!("data/{lang}/{file}"))
    }
}

/// Read-only access to the published JSON documents.
pub trait DataSource: Send + Sync {
    /// Fetches the raw text of the document at `relative_path`.
    fn fetch_text(&self, relative_path: &str) -> Result<String, DataError>;

    fn describe(&self) -> String;

    fn fetch_index(&self, lang: &str) -> Result<Vec<CategoryRecord>, DataError> {
        fetch_json(self, &Document::Index, lang)
    }

    fn fetch_children(&self, lang: &str, node_id: &str) -> Result<Vec<LeafRecord>, DataError> {
        fetch_json(self, &Document::Children(node_id.to_owned()), lang)
    }

    fn fetch_style(&self, lang: &str) -> Result<StyleSheet, DataError> {
        fetch_json(self, &Document::Style, lang)
    }
}

fn fetch_json<T, S>(source: &S, document: &Document, lang: &str) -> Result<T, DataError>
where
    T: DeserializeOwned,
    S: DataSource + ?Sized,
{
    let path = document.relative_path(lang)?;
    let raw = source.fetch_text(&path)?;
    debug!(path = %path, bytes = raw.len(), "fetched document");
    serde_json::from_str(&raw).map_err(|source| DataError::Malformed {
        address: path,
        source,
    })
}

/// Documents laid out under a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for DirSource {
    fn fetch_text(&self, relative_path: &str) -> Result<String, DataError> {
        let path = self.root.join(relative_path);
        fs::read_to_string(&path).map_err(|error| DataError::Unavailable {
            address: path.display().to_string(),
            status: (error.kind() == ErrorKind::NotFound).then_some(404),
            reason: error.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Documents served over HTTP(S) from a static host.
pub struct HttpSource {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base: base.trim_end_matches('/').to_owned(),
            client,
        })
    }
}

impl DataSource for HttpSource {
    fn fetch_text(&self, relative_path: &str) -> Result<String, DataError> {
        let url = format!("{}/{relative_path}", self.base);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|error| DataError::unavailable(&url, error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Unavailable {
                address: url,
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .text()
            .map_err(|error| DataError::unavailable(&url, error.to_string()))
    }

    fn describe(&self) -> String {
        self.base.clone()
    }
}

/// Picks the HTTP source for `http(s)://` bases and the directory source
/// otherwise.
pub fn open_source(base: &str) -> Result<Arc<dyn DataSource>> {
    if base.starts_with("http://") || base.starts_with("https://") {
        let source = HttpSource::new(base)
            .with_context(|| format!("failed to open HTTP data source {base}"))?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(DirSource::new(base)))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory documents keyed by relative path. Missing paths answer 404.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        documents: Mutex<HashMap<String, String>>,
        fetches: Mutex<Vec<String>>,
    }

    impl MemorySource {
        pub(crate) fn insert(&self, path: &str, body: &str) {
            self.documents
                .lock()
                .unwrap()
                .insert(path.to_owned(), body.to_owned());
        }

        pub(crate) fn fetch_count(&self, path: &str) -> usize {
            self.fetches
                .lock()
                .unwrap()
                .iter()
                .filter(|fetched| fetched.as_str() == path)
                .count()
        }
    }

    impl DataSource for MemorySource {
        fn fetch_text(&self, relative_path: &str) -> Result<String, DataError> {
            self.fetches.lock().unwrap().push(relative_path.to_owned());
            self.documents
                .lock()
                .unwrap()
                .get(relative_path)
                .cloned()
                .ok_or_else(|| DataError::Unavailable {
                    address: relative_path.to_owned(),
                    status: Some(404),
                    reason: "HTTP 404 Not Found".to_owned(),
                })
        }

        fn describe(&self) -> String {
            "memory".to_owned()
        }
    }
}
