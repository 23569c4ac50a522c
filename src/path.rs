//! Remote path construction for an item.

use crate::model::{Grouping, ImportItem};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("chapter is required for {0} grouping")]
    MissingChapter(Grouping),
    #[error("quality is required for {0} files")]
    MissingQuality(&'static str),
    #[error("file name is not valid UTF-8")]
    InvalidFileName,
}

/// Builds the remote path an item is uploaded to
pub trait PathResolver: Send + Sync {
    fn build(&self, item: &ImportItem) -> Result<String, PathError>;
}

/// Repository layout:
/// `{language}/{resource}/{book}/[{chapter}/]CONTENTS/{ext}/[{quality}/]{grouping}/{file}`
#[derive(Debug, Default, Clone)]
pub struct ContentPathResolver;

impl ContentPathResolver {
    pub fn new() -> Self {
        Self
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, PathError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(PathError::Missing(name))
}

impl PathResolver for ContentPathResolver {
    fn build(&self, item: &ImportItem) -> Result<String, PathError> {
        let language = required(&item.language, "language")?;
        let resource_type = required(&item.resource_type, "resource type")?;
        let book = required(&item.book, "book")?;
        let grouping = item.grouping.ok_or(PathError::Missing("grouping"))?;
        let file_name = item
            .source_path()
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(PathError::InvalidFileName)?;

        let mut segments = vec![language.to_string(), resource_type.to_string(), book.to_string()];

        if grouping != Grouping::Book {
            let chapter = item.chapter.ok_or(PathError::MissingChapter(grouping))?;
            segments.push(chapter.to_string());
        }

        segments.push("CONTENTS".to_string());
        segments.push(item.extension.as_str().to_string());

        if item.extension.is_compressed() || item.extension.is_container() {
            let quality = item
                .quality
                .ok_or(PathError::MissingQuality(item.extension.as_str()))?;
            segments.push(quality.as_str().to_string());
        }

        segments.push(grouping.as_str().to_string());
        segments.push(file_name.to_string());

        Ok(segments.join("/"))
    }
}
