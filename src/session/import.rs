use super::state::Session;
use super::types::{ImportError, ImportSummary, SessionEvent};
use crate::classifier::{ClassificationResult, FileStatus};
use crate::model::ImportItem;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Regular files found under the dropped paths, plus the paths that could
/// not be walked
#[derive(Debug, Default)]
pub struct FlattenedPaths {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<ImportError>,
}

/// Flatten dropped paths into the regular files they contain.
///
/// Directories are walked recursively (entries sorted by name for a stable
/// traversal order) and symlinks are followed; files are taken as-is. A path
/// that cannot be read is recorded and skipped, the walk goes on. Duplicates
/// across arguments are kept, identity de-duplication happens when results
/// are merged.
pub fn flatten_paths(paths: &[PathBuf]) -> FlattenedPaths {
    let mut flattened = FlattenedPaths::default();

    for path in paths {
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    flattened.files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(source) => {
                    warn!("Skipping unreadable path under {:?}: {}", path, source);
                    let failed = source.path().map(Path::to_path_buf);
                    flattened.unreadable.push(ImportError::Walk {
                        path: failed.unwrap_or_else(|| path.clone()),
                        source,
                    });
                }
            }
        }
    }

    debug!(
        "Flattened {} dropped path(s) into {} file(s), {} unreadable",
        paths.len(),
        flattened.files.len(),
        flattened.unreadable.len()
    );
    flattened
}

impl Session {
    /// Import dropped files and folders into the working set.
    ///
    /// Flattening and classification run as one blocking batch off the
    /// interactive task. Unreadable paths, rejected files and duplicates
    /// produce one error event each and never stop the rest of the batch.
    /// The busy flag is cleared before returning, whether or not the batch
    /// itself failed.
    pub async fn import_paths(&mut self, paths: Vec<PathBuf>) -> ImportSummary {
        self.set_busy(true);

        let classifier = self.collaborators.classifier.clone();
        let batch = tokio::task::spawn_blocking(move || {
            let flattened = flatten_paths(&paths);
            let results = classifier.handle_files(&flattened.files)?;
            Ok::<_, ImportError>((results, flattened.unreadable))
        })
        .await;

        let summary = match batch {
            Ok(Ok((results, unreadable))) => {
                let mut summary = ImportSummary {
                    unreadable: unreadable.len(),
                    ..Default::default()
                };
                for e in &unreadable {
                    self.emit_not_imported(&e.file_name(), e);
                }
                self.merge_results(results, &mut summary);
                summary
            }
            Ok(Err(e)) => {
                error!("Import batch failed: {}", e);
                self.emit_not_imported(&e.file_name(), &e);
                ImportSummary {
                    failed: true,
                    ..Default::default()
                }
            }
            Err(e) => {
                error!("Import task failed: {}", e);
                self.emit_not_imported("dropped files", &e);
                ImportSummary {
                    failed: true,
                    ..Default::default()
                }
            }
        };

        self.set_busy(false);
        summary
    }

    fn merge_results(&mut self, results: Vec<ClassificationResult>, summary: &mut ImportSummary) {
        for result in results {
            match (result.status, result.data) {
                (FileStatus::Accepted, Some(data)) => {
                    let item = ImportItem::from_classified(data);
                    let duplicate_of = self
                        .working_set
                        .find_duplicate(&item)
                        .map(|existing| existing.file_name());
                    match duplicate_of {
                        Some(existing) => {
                            debug!("Skipping duplicate {:?}", result.requested_file);
                            summary.duplicates += 1;
                            self.emit_not_imported(
                                &item.file_name(),
                                format!("duplicate of {}", existing),
                            );
                        }
                        None => {
                            self.working_set.insert_unique(item);
                            summary.accepted += 1;
                        }
                    }
                }
                _ => {
                    summary.rejected += 1;
                    let name = result
                        .requested_file
                        .file_name()
                        .map(|name| name.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let reason = result
                        .reason
                        .map(|reason| reason.to_string())
                        .unwrap_or_else(|| "file type not recognized".to_string());
                    self.emit_not_imported(&name, reason);
                }
            }
        }

        self.working_set.sort();
        if summary.accepted > 0 {
            self.emit(SessionEvent::ListUpdated);
        }

        info!(
            "Imported {} file(s): {} duplicate(s), {} rejected, {} unreadable",
            summary.accepted, summary.duplicates, summary.rejected, summary.unreadable
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flatten_collects_only_regular_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("album/hi")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("album/b.wav"), b"x").unwrap();
        fs::write(root.join("album/a.wav"), b"x").unwrap();
        fs::write(root.join("album/hi/c.mp3"), b"x").unwrap();
        fs::write(root.join("loose.wav"), b"x").unwrap();

        let flattened = flatten_paths(&[
            root.join("album"),
            root.join("empty"),
            root.join("loose.wav"),
        ]);

        assert!(flattened.unreadable.is_empty());
        assert_eq!(
            flattened.files,
            vec![
                root.join("album/a.wav"),
                root.join("album/b.wav"),
                root.join("album/hi/c.mp3"),
                root.join("loose.wav"),
            ]
        );
    }

    #[test]
    fn test_flatten_keeps_duplicates_across_arguments() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.wav");
        fs::write(&file, b"x").unwrap();

        let flattened = flatten_paths(&[file.clone(), dir.path().to_path_buf()]);
        assert_eq!(flattened.files, vec![file.clone(), file]);
    }

    #[test]
    fn test_flatten_skips_missing_path_and_keeps_the_rest() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.wav");
        fs::write(&file, b"x").unwrap();
        let missing = dir.path().join("missing");

        let flattened = flatten_paths(&[missing.clone(), file.clone()]);

        assert_eq!(flattened.files, vec![file]);
        assert_eq!(flattened.unreadable.len(), 1);
        assert!(matches!(
            &flattened.unreadable[0],
            ImportError::Walk { path, .. } if *path == missing
        ));
        assert_eq!(flattened.unreadable[0].file_name(), "missing");
    }

    #[cfg(unix)]
    #[test]
    fn test_flatten_follows_symlinks() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target.wav");
        fs::write(&target, b"x").unwrap();
        fs::create_dir_all(dir.path().join("drop")).unwrap();
        let inner = dir.path().join("drop/linked.wav");
        let direct = dir.path().join("direct.wav");
        std::os::unix::fs::symlink(&target, &inner).unwrap();
        std::os::unix::fs::symlink(&target, &direct).unwrap();

        let flattened = flatten_paths(&[dir.path().join("drop"), direct.clone()]);

        assert_eq!(flattened.files, vec![inner, direct]);
    }
}
