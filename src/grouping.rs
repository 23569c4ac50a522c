//! Grouping advisory: which groupings a user may pick for an item.

use crate::model::{Grouping, ImportItem};
use crate::wav::AudioMetadataReader;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// `_v001` or `_v001-003`: chunk or verse numbering, ambiguous by name alone
fn chunk_or_verse_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)_v\d{1,3}(?:-\d{1,3})?").expect("chunk/verse pattern is valid")
    })
}

fn chapter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)_c\d{1,3}").expect("chapter pattern is valid"))
}

fn all_except(excluded: Grouping) -> Vec<Grouping> {
    Grouping::ALL
        .into_iter()
        .filter(|g| *g != excluded)
        .collect()
}

/// Computes the allowed grouping set for an item from its file name and,
/// when the name is ambiguous, from the `mode` tag embedded in the file.
#[derive(Clone)]
pub struct GroupingAdvisor {
    reader: Arc<dyn AudioMetadataReader>,
}

impl GroupingAdvisor {
    pub fn new(reader: Arc<dyn AudioMetadataReader>) -> Self {
        Self { reader }
    }

    /// Allowed groupings in declaration order.
    ///
    /// Blocking: verse/chunk-shaped names cause a read of the file's metadata.
    /// An empty result means the grouping cannot be chosen for this item.
    pub fn allowed_groupings(&self, item: &ImportItem) -> Vec<Grouping> {
        if item.is_container {
            return all_except(Grouping::Verse);
        }

        let stem = item.file_stem();
        if chunk_or_verse_pattern().is_match(&stem) {
            let metadata = self.reader.read_bttr(item.source_path());
            let is_chunk = metadata
                .mode
                .as_deref()
                .is_some_and(|mode| mode.eq_ignore_ascii_case(Grouping::Chunk.as_str()));
            debug!(
                "{} declares mode {:?}",
                item.file_name(),
                metadata.mode.as_deref()
            );
            return if is_chunk {
                all_except(Grouping::Chunk)
            } else {
                all_except(Grouping::Verse)
            };
        }

        if chapter_pattern().is_match(&stem) {
            return vec![Grouping::Book];
        }

        // TODO: confirm with product whether unmatched names should allow every grouping
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifiedFile, MediaExtension};
    use crate::wav::BttrMetadata;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed mode and counts reads
    struct FixedModeReader {
        mode: Option<&'static str>,
        reads: AtomicUsize,
    }

    impl FixedModeReader {
        fn new(mode: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                mode,
                reads: AtomicUsize::new(0),
            })
        }
    }

    impl AudioMetadataReader for FixedModeReader {
        fn read_bttr(&self, _path: &Path) -> BttrMetadata {
            self.reads.fetch_add(1, Ordering::SeqCst);
            BttrMetadata {
                mode: self.mode.map(str::to_string),
                ..Default::default()
            }
        }
    }

    fn item(name: &str) -> ImportItem {
        let path = PathBuf::from("/drop").join(name);
        let extension = MediaExtension::from_path(&path).unwrap();
        ImportItem::from_classified(ClassifiedFile {
            path,
            language: None,
            resource_type: None,
            book: None,
            chapter: None,
            verse_start: None,
            verse_end: None,
            extension,
            quality: None,
        })
    }

    #[test]
    fn test_container_excludes_verse() {
        let reader = FixedModeReader::new(Some("chunk"));
        let advisor = GroupingAdvisor::new(reader.clone());

        let allowed = advisor.allowed_groupings(&item("en_ulb_b19_psa_v001.tr"));

        assert_eq!(
            allowed,
            vec![Grouping::Book, Grouping::Chapter, Grouping::Chunk]
        );
        assert_eq!(reader.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chunk_mode_excludes_chunk() {
        let advisor = GroupingAdvisor::new(FixedModeReader::new(Some("CHUNK")));

        let allowed = advisor.allowed_groupings(&item("psalm_v001-003.wav"));

        assert_eq!(
            allowed,
            vec![Grouping::Book, Grouping::Chapter, Grouping::Verse]
        );
    }

    #[test]
    fn test_other_or_missing_mode_excludes_verse() {
        for mode in [Some("verse"), Some("chapter"), None] {
            let advisor = GroupingAdvisor::new(FixedModeReader::new(mode));
            assert_eq!(
                advisor.allowed_groupings(&item("psalm_V12.wav")),
                vec![Grouping::Book, Grouping::Chapter, Grouping::Chunk]
            );
        }
    }

    #[test]
    fn test_chapter_name_allows_only_book() {
        let reader = FixedModeReader::new(Some("chunk"));
        let advisor = GroupingAdvisor::new(reader.clone());

        assert_eq!(
            advisor.allowed_groupings(&item("psalm_c001.wav")),
            vec![Grouping::Book]
        );
        assert_eq!(reader.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_verse_shape_takes_precedence_over_chapter_shape() {
        let reader = FixedModeReader::new(Some("chunk"));
        let advisor = GroupingAdvisor::new(reader.clone());

        let allowed = advisor.allowed_groupings(&item("en_ulb_b19_psa_c001_v001-003.wav"));

        assert!(!allowed.contains(&Grouping::Chunk));
        assert_eq!(reader.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unmatched_name_allows_nothing() {
        let advisor = GroupingAdvisor::new(FixedModeReader::new(Some("chunk")));
        assert!(advisor.allowed_groupings(&item("cover.jpg")).is_empty());
        assert!(advisor.allowed_groupings(&item("psalm_chapter.wav")).is_empty());
    }
}
