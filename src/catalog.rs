//! Lookup lists offered to the user when editing item metadata.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const LANGUAGES_FILE: &str = "languages.json";
pub const BOOKS_FILE: &str = "books.json";
pub const RESOURCE_TYPES_FILE: &str = "resource_types.json";

const DEFAULT_RESOURCE_TYPES: &[&str] = &["ulb", "udb", "reg"];

const DEFAULT_BOOKS: &[&str] = &[
    "gen", "exo", "lev", "num", "deu", "jos", "jdg", "rut", "1sa", "2sa", "1ki", "2ki", "1ch",
    "2ch", "ezr", "neh", "est", "job", "psa", "pro", "ecc", "sng", "isa", "jer", "lam", "ezk",
    "dan", "hos", "jol", "amo", "oba", "jon", "mic", "nam", "hab", "zep", "hag", "zec", "mal",
    "mat", "mrk", "luk", "jhn", "act", "rom", "1co", "2co", "gal", "eph", "php", "col", "1th",
    "2th", "1ti", "2ti", "tit", "phm", "heb", "jas", "1pe", "2pe", "1jn", "2jn", "3jn", "jud",
    "rev",
];

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected catalog format: {0}")]
    Format(String),
}

#[async_trait::async_trait]
pub trait CatalogReader: Send + Sync {
    async fn read(&self) -> Result<Vec<String>, CatalogError>;
}

/// A JSON array of strings, or of objects from which `key` is taken
pub struct JsonCatalog {
    path: PathBuf,
    key: Option<&'static str>,
}

impl JsonCatalog {
    pub fn new(path: PathBuf, key: Option<&'static str>) -> Self {
        Self { path, key }
    }
}

#[async_trait::async_trait]
impl CatalogReader for JsonCatalog {
    async fn read(&self) -> Result<Vec<String>, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let value: Value = serde_json::from_slice(&bytes)?;

        let Value::Array(entries) = value else {
            return Err(CatalogError::Format(format!(
                "{:?} is not a JSON array",
                self.path
            )));
        };

        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            let value = match (&entry, self.key) {
                (Value::String(s), _) => Some(s.clone()),
                (Value::Object(map), Some(key)) => {
                    map.get(key).and_then(|v| v.as_str()).map(str::to_string)
                }
                _ => None,
            };
            match value {
                Some(value) => values.push(value),
                None => {
                    return Err(CatalogError::Format(format!(
                        "unexpected entry in {:?}: {}",
                        self.path, entry
                    )))
                }
            }
        }
        Ok(values)
    }
}

/// Language, book and resource type lists.
///
/// An empty list is a valid, degraded state: validation against it accepts
/// any value.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub languages: Vec<String>,
    pub books: Vec<String>,
    pub resource_types: Vec<String>,
}

async fn read_or(reader: &dyn CatalogReader, name: &str, fallback: &[&str]) -> Vec<String> {
    match reader.read().await {
        Ok(values) => {
            info!("Loaded {} {}", values.len(), name);
            values
        }
        Err(e) => {
            warn!("Failed to load {} catalog, using fallback: {}", name, e);
            fallback.iter().map(|s| s.to_string()).collect()
        }
    }
}

impl Catalogs {
    /// Load all catalogs from `dir` concurrently; failures are not fatal
    pub async fn load(dir: &Path) -> Self {
        let languages = JsonCatalog::new(dir.join(LANGUAGES_FILE), Some("lc"));
        let books = JsonCatalog::new(dir.join(BOOKS_FILE), Some("slug"));
        let resource_types = JsonCatalog::new(dir.join(RESOURCE_TYPES_FILE), Some("slug"));

        Self::load_from(&languages, &books, &resource_types).await
    }

    pub async fn load_from(
        languages: &dyn CatalogReader,
        books: &dyn CatalogReader,
        resource_types: &dyn CatalogReader,
    ) -> Self {
        let (languages, books, resource_types) = tokio::join!(
            read_or(languages, "languages", &[]),
            read_or(books, "books", DEFAULT_BOOKS),
            read_or(resource_types, "resource types", DEFAULT_RESOURCE_TYPES),
        );

        Self {
            languages,
            books,
            resource_types,
        }
    }

    pub fn accepts_language(&self, value: &str) -> bool {
        accepts(&self.languages, value)
    }

    pub fn accepts_book(&self, value: &str) -> bool {
        accepts(&self.books, value)
    }

    pub fn accepts_resource_type(&self, value: &str) -> bool {
        accepts(&self.resource_types, value)
    }
}

fn accepts(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|v| v.eq_ignore_ascii_case(value))
}
