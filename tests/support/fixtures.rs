use media_uploader::wav::{write_bttr_wav, BttrMetadata};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a short WAV, tagged with `mode` when given
pub fn write_wav(dir: &Path, name: &str, mode: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let metadata = mode.map(|mode| BttrMetadata {
        language: Some("en".to_string()),
        slug: Some("psa".to_string()),
        mode: Some(mode.to_string()),
        ..Default::default()
    });
    write_bttr_wav(&path, metadata.as_ref(), 32).unwrap();
    path
}

/// Write an arbitrary file with the given contents
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// `en_ulb_b19_psa_c{NNN}.wav`
pub fn chapter_file_name(chapter: u32) -> String {
    format!("en_ulb_b19_psa_c{:03}.wav", chapter)
}
