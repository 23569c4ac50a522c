//! Core data types shared by the classifier, the grouping advisor and the session.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Organizational granularity of an audio artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grouping {
    Book,
    Chapter,
    Chunk,
    Verse,
}

impl Grouping {
    /// Every grouping, in declaration order
    pub const ALL: [Grouping; 4] = [
        Grouping::Book,
        Grouping::Chapter,
        Grouping::Chunk,
        Grouping::Verse,
    ];

    /// Lowercase name, matching the `mode` value written into WAV metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Grouping::Book => "book",
            Grouping::Chapter => "chapter",
            Grouping::Chunk => "chunk",
            Grouping::Verse => "verse",
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media file types the pipeline recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaExtension {
    Wav,
    Mp3,
    Cue,
    Jpg,
    Tr,
}

impl MediaExtension {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    pub fn parse(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(MediaExtension::Wav),
            "mp3" => Some(MediaExtension::Mp3),
            "cue" => Some(MediaExtension::Cue),
            "jpg" | "jpeg" => Some(MediaExtension::Jpg),
            "tr" => Some(MediaExtension::Tr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaExtension::Wav => "wav",
            MediaExtension::Mp3 => "mp3",
            MediaExtension::Cue => "cue",
            MediaExtension::Jpg => "jpg",
            MediaExtension::Tr => "tr",
        }
    }

    /// Lossy formats are uploaded in hi/low quality variants
    pub fn is_compressed(&self) -> bool {
        matches!(self, MediaExtension::Mp3)
    }

    /// Bundles holding several chapters rather than one audio unit
    pub fn is_container(&self) -> bool {
        matches!(self, MediaExtension::Tr)
    }
}

impl fmt::Display for MediaExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaQuality {
    Hi,
    Low,
}

impl MediaQuality {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "hi" => Some(MediaQuality::Hi),
            "low" => Some(MediaQuality::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaQuality::Hi => "hi",
            MediaQuality::Low => "low",
        }
    }
}

impl fmt::Display for MediaQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes the classifier extracted from an accepted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub language: Option<String>,
    pub resource_type: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub verse_start: Option<u32>,
    pub verse_end: Option<u32>,
    pub extension: MediaExtension,
    pub quality: Option<MediaQuality>,
}

/// One file staged for upload.
///
/// `id` is a handle for UI edits; it is not part of the item's identity.
/// Two items are the same when their resolved metadata tuple matches, see
/// [`ImportItem::same_identity`].
#[derive(Debug, Clone)]
pub struct ImportItem {
    pub id: Uuid,
    source_path: PathBuf,
    pub language: Option<String>,
    pub resource_type: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<u32>,
    pub verse_start: Option<u32>,
    pub verse_end: Option<u32>,
    pub extension: MediaExtension,
    pub quality: Option<MediaQuality>,
    pub grouping: Option<Grouping>,
    pub is_container: bool,
}

impl ImportItem {
    pub fn from_classified(file: ClassifiedFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            is_container: file.extension.is_container(),
            source_path: file.path,
            language: file.language,
            resource_type: file.resource_type,
            book: file.book,
            chapter: file.chapter,
            verse_start: file.verse_start,
            verse_end: file.verse_end,
            extension: file.extension,
            quality: file.quality,
            grouping: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name without its extension
    pub fn file_stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Language, resource type and book are all known
    pub fn is_resolved(&self) -> bool {
        self.language.is_some() && self.resource_type.is_some() && self.book.is_some()
    }

    /// (language, resource type, book, chapter, verse range, extension).
    ///
    /// Only resolved items are compared by that tuple; an unresolved item is
    /// only the same as another item for the same source file.
    pub fn same_identity(&self, other: &ImportItem) -> bool {
        if !self.is_resolved() || !other.is_resolved() {
            return self.source_path == other.source_path;
        }

        self.language == other.language
            && self.resource_type == other.resource_type
            && self.book == other.book
            && self.chapter == other.chapter
            && self.verse_start == other.verse_start
            && self.verse_end == other.verse_end
            && self.extension == other.extension
    }

    /// Display order: language, book, chapter, verse range, then file name
    pub fn display_cmp(&self, other: &ImportItem) -> Ordering {
        self.language
            .cmp(&other.language)
            .then_with(|| self.book.cmp(&other.book))
            .then_with(|| self.chapter.cmp(&other.chapter))
            .then_with(|| self.verse_start.cmp(&other.verse_start))
            .then_with(|| self.verse_end.cmp(&other.verse_end))
            .then_with(|| self.source_path.file_name().cmp(&other.source_path.file_name()))
    }
}

/// A user edit applied to one item before upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEdit {
    Language(String),
    ResourceType(String),
    Book(String),
    Extension(MediaExtension),
    Quality(Option<MediaQuality>),
    Grouping(Grouping),
}
