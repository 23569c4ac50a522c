//! File classification: decides whether a dropped file is a recognized media
//! artifact and extracts the attributes encoded in its name.

use crate::model::{ClassifiedFile, MediaExtension, MediaQuality};
use regex::{Captures, Regex};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Batch-level classification failure (per-file rejections are not errors)
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Classification failed: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Accepted,
    Rejected,
}

/// Why a file was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnrecognizedType,
    Empty,
    Unreadable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnrecognizedType => f.write_str("file type not recognized"),
            RejectReason::Empty => f.write_str("file is empty"),
            RejectReason::Unreadable(e) => write!(f, "file could not be read: {}", e),
        }
    }
}

/// Outcome of routing one candidate path
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub status: FileStatus,
    /// Present iff `status` is `Accepted`
    pub data: Option<ClassifiedFile>,
    /// Present iff `status` is `Rejected`
    pub reason: Option<RejectReason>,
    pub requested_file: PathBuf,
}

impl ClassificationResult {
    pub fn accepted(data: ClassifiedFile) -> Self {
        Self {
            status: FileStatus::Accepted,
            requested_file: data.path.clone(),
            data: Some(data),
            reason: None,
        }
    }

    pub fn rejected(requested_file: PathBuf, reason: RejectReason) -> Self {
        Self {
            status: FileStatus::Rejected,
            data: None,
            reason: Some(reason),
            requested_file,
        }
    }

    pub fn requested_file_name(&self) -> String {
        self.requested_file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Classifies a batch of candidate files.
///
/// Blocking; results are returned in the same order as `paths`.
pub trait Classifier: Send + Sync {
    fn handle_files(&self, paths: &[PathBuf]) -> Result<Vec<ClassificationResult>, ClassifyError>;
}

/// `{language}_{resource}_b{NN}_{book}[_c{chapter}[_v{start}[-{end}]]][_t{take}]`
fn convention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^(?P<language>[a-z]{2,3}(?:-[a-z0-9]+)*)_(?P<resource>[a-z]+)_b\d{2}_(?P<book>[1-3]?[a-z]+)(?:_c(?P<chapter>\d{1,3})(?:_v(?P<start>\d{1,3})(?:-(?P<end>\d{1,3}))?)?)?(?:_t\d+)?$",
        )
        .expect("file name convention pattern is valid")
    })
}

fn chapter_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)_c(\d{1,3})").expect("chapter pattern is valid"))
}

fn verse_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)_v(\d{1,3})(?:-(\d{1,3}))?").expect("verse pattern is valid")
    })
}

fn parse_number(captures: &Captures, name: &str) -> Option<u32> {
    captures.name(name).and_then(|m| m.as_str().parse().ok())
}

fn parse_index(captures: &Captures, index: usize) -> Option<u32> {
    captures.get(index).and_then(|m| m.as_str().parse().ok())
}

/// Routes files by extension and parses the naming convention used by the
/// recording tools.
#[derive(Debug, Default, Clone)]
pub struct FileProcessingRouter;

impl FileProcessingRouter {
    pub fn new() -> Self {
        Self
    }

    fn classify(&self, path: &Path) -> ClassificationResult {
        let Some(extension) = MediaExtension::from_path(path) else {
            return ClassificationResult::rejected(
                path.to_path_buf(),
                RejectReason::UnrecognizedType,
            );
        };

        match std::fs::metadata(path) {
            Ok(metadata) if metadata.len() == 0 => {
                return ClassificationResult::rejected(path.to_path_buf(), RejectReason::Empty);
            }
            Ok(_) => {}
            Err(e) => {
                return ClassificationResult::rejected(
                    path.to_path_buf(),
                    RejectReason::Unreadable(e.to_string()),
                );
            }
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let quality = if extension.is_compressed() || extension.is_container() {
            parent_quality(path)
        } else {
            None
        };

        let mut file = ClassifiedFile {
            path: path.to_path_buf(),
            language: None,
            resource_type: None,
            book: None,
            chapter: None,
            verse_start: None,
            verse_end: None,
            extension,
            quality,
        };

        if let Some(captures) = convention_pattern().captures(&stem) {
            file.language = captures.name("language").map(|m| m.as_str().to_lowercase());
            file.resource_type = captures.name("resource").map(|m| m.as_str().to_lowercase());
            file.book = captures.name("book").map(|m| m.as_str().to_lowercase());
            file.chapter = parse_number(&captures, "chapter");
            file.verse_start = parse_number(&captures, "start");
            file.verse_end = parse_number(&captures, "end");
        } else {
            debug!("{:?} does not follow the naming convention", path);
            file.chapter = chapter_token()
                .captures(&stem)
                .and_then(|c| parse_index(&c, 1));
            if let Some(captures) = verse_token().captures(&stem) {
                file.verse_start = parse_index(&captures, 1);
                file.verse_end = parse_index(&captures, 2);
            }
        }

        ClassificationResult::accepted(file)
    }
}

/// Quality is declared by the folder a compressed file sits in (`hi/` or `low/`)
fn parent_quality(path: &Path) -> Option<MediaQuality> {
    path.parent()
        .and_then(|parent| parent.file_name())
        .and_then(|name| name.to_str())
        .and_then(MediaQuality::parse)
}

impl Classifier for FileProcessingRouter {
    fn handle_files(&self, paths: &[PathBuf]) -> Result<Vec<ClassificationResult>, ClassifyError> {
        Ok(paths.iter().map(|path| self.classify(path)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_unrecognized_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let notes = write(dir.path(), "notes.txt", b"hello");

        let results = FileProcessingRouter::new().handle_files(&[notes]).unwrap();

        assert_eq!(results[0].status, FileStatus::Rejected);
        assert!(results[0].data.is_none());
        assert_eq!(results[0].requested_file_name(), "notes.txt");
        assert_eq!(
            results[0].reason.as_ref().unwrap().to_string(),
            "file type not recognized"
        );
    }

    #[test]
    fn test_empty_and_missing_files_are_rejected() {
        let dir = TempDir::new().unwrap();
        let empty = write(dir.path(), "empty.wav", b"");
        let missing = dir.path().join("missing.wav");

        let results = FileProcessingRouter::new()
            .handle_files(&[empty, missing])
            .unwrap();

        assert_eq!(results[0].reason, Some(RejectReason::Empty));
        assert!(matches!(
            results[1].reason,
            Some(RejectReason::Unreadable(_))
        ));
    }

    #[test]
    fn test_convention_name_is_parsed() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "EN_ulb_b19_PSA_c023_v001-006_t02.wav", b"RIFF");

        let results = FileProcessingRouter::new().handle_files(&[path]).unwrap();
        let data = results[0].data.as_ref().unwrap();

        assert_eq!(data.language.as_deref(), Some("en"));
        assert_eq!(data.resource_type.as_deref(), Some("ulb"));
        assert_eq!(data.book.as_deref(), Some("psa"));
        assert_eq!(data.chapter, Some(23));
        assert_eq!(data.verse_start, Some(1));
        assert_eq!(data.verse_end, Some(6));
        assert_eq!(data.extension, MediaExtension::Wav);
    }

    #[test]
    fn test_loose_name_keeps_chapter_and_verse_tokens() {
        let dir = TempDir::new().unwrap();
        let chapter = write(dir.path(), "psalm_c001.wav", b"RIFF");
        let verses = write(dir.path(), "psalm_v001-003.wav", b"RIFF");

        let results = FileProcessingRouter::new()
            .handle_files(&[chapter, verses])
            .unwrap();

        let chapter = results[0].data.as_ref().unwrap();
        assert_eq!(chapter.chapter, Some(1));
        assert_eq!(chapter.language, None);

        let verses = results[1].data.as_ref().unwrap();
        assert_eq!(verses.chapter, None);
        assert_eq!(verses.verse_start, Some(1));
        assert_eq!(verses.verse_end, Some(3));
    }

    #[test]
    fn test_quality_comes_from_parent_folder_for_compressed_media() {
        let dir = TempDir::new().unwrap();
        let mp3 = write(dir.path(), "low/en_ulb_b19_psa_c001.mp3", b"ID3");
        let wav = write(dir.path(), "hi/en_ulb_b19_psa_c001.wav", b"RIFF");

        let results = FileProcessingRouter::new().handle_files(&[mp3, wav]).unwrap();

        assert_eq!(
            results[0].data.as_ref().unwrap().quality,
            Some(MediaQuality::Low)
        );
        assert_eq!(results[1].data.as_ref().unwrap().quality, None);
    }

    #[test]
    fn test_results_preserve_input_order() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write(dir.path(), "b.txt", b"x"),
            write(dir.path(), "a_c002.wav", b"x"),
            write(dir.path(), "c.jpg", b"x"),
        ];

        let results = FileProcessingRouter::new().handle_files(&paths).unwrap();

        let requested: Vec<_> = results.iter().map(|r| r.requested_file.clone()).collect();
        assert_eq!(requested, paths);
    }
}
