//! RIFF/WAVE custom metadata.
//!
//! Recording tools embed their own metadata as JSON in an `IBTR` sub-chunk of
//! a `LIST`/`INFO` chunk. Only chunk headers and `LIST` bodies are read; audio
//! data is skipped with seeks.

use nom::{
    bytes::complete::{tag, take},
    multi::many0,
    number::complete::le_u32,
    sequence::tuple,
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

const LIST_ID: &[u8; 4] = b"LIST";
const INFO_ID: &[u8; 4] = b"INFO";
const BTTR_ID: &[u8; 4] = b"IBTR";

/// Upper bound for a LIST body we are willing to buffer
const MAX_LIST_SIZE: u32 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed WAV: {0}")]
    Malformed(String),
    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata written by the recording tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BttrMetadata {
    pub anthology: Option<String>,
    pub language: Option<String>,
    pub version: Option<String>,
    pub slug: Option<String>,
    pub book_number: Option<String>,
    pub mode: Option<String>,
    pub chapter: Option<String>,
    pub startv: Option<String>,
    pub endv: Option<String>,
}

/// Reads embedded audio metadata.
///
/// Never fails: a missing file, a malformed container or an absent metadata
/// block all yield `BttrMetadata::default()`.
pub trait AudioMetadataReader: Send + Sync {
    fn read_bttr(&self, path: &Path) -> BttrMetadata;
}

#[derive(Debug, Default, Clone)]
pub struct WavMetadataReader;

impl WavMetadataReader {
    pub fn new() -> Self {
        Self
    }
}

impl AudioMetadataReader for WavMetadataReader {
    fn read_bttr(&self, path: &Path) -> BttrMetadata {
        match read_bttr_metadata(path) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                debug!("No IBTR metadata in {:?}", path);
                BttrMetadata::default()
            }
            Err(e) => {
                warn!("Failed to read WAV metadata from {:?}: {}", path, e);
                BttrMetadata::default()
            }
        }
    }
}

fn riff_header(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, (_, size, _)) = tuple((tag("RIFF"), le_u32, tag("WAVE")))(input)?;
    Ok((input, size))
}

fn chunk_header(input: &[u8]) -> IResult<&[u8], (&[u8], u32)> {
    tuple((take(4usize), le_u32))(input)
}

/// A chunk with its body, including the even-byte pad when present
fn sub_chunk(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    let (input, (id, size)) = chunk_header(input)?;
    let (input, body) = take(size as usize)(input)?;
    let pad = (size as usize % 2).min(input.len());
    let (input, _) = take(pad)(input)?;
    Ok((input, (id, body)))
}

/// Body of an `INFO` list: the list type followed by sub-chunks
fn info_list(input: &[u8]) -> IResult<&[u8], Vec<(&[u8], &[u8])>> {
    let (input, _) = tag(&INFO_ID[..])(input)?;
    many0(sub_chunk)(input)
}

fn parse_bttr_json(body: &[u8]) -> Result<BttrMetadata, WavError> {
    let end = body
        .iter()
        .rposition(|b| *b != 0 && !b.is_ascii_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);
    Ok(serde_json::from_slice(&body[..end])?)
}

fn malformed(e: nom::Err<nom::error::Error<&[u8]>>) -> WavError {
    WavError::Malformed(format!("{:?}", e.map_input(|i| i.len())))
}

/// Walk the top-level chunks of a WAV file looking for IBTR metadata
pub fn read_bttr_metadata(path: &Path) -> Result<Option<BttrMetadata>, WavError> {
    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    let mut header = [0u8; 12];
    file.read_exact(&mut header)?;
    riff_header(&header).map_err(malformed)?;

    let mut position = 12u64;
    let mut chunk = [0u8; 8];
    while position + 8 <= file_len {
        file.read_exact(&mut chunk)?;
        let (_, (id, size)) = chunk_header(&chunk).map_err(malformed)?;
        position += 8;

        let padded = size as u64 + size as u64 % 2;
        if position + size as u64 > file_len {
            return Err(WavError::Malformed(format!(
                "chunk {:?} overruns file end",
                String::from_utf8_lossy(id)
            )));
        }

        if id == LIST_ID && size <= MAX_LIST_SIZE {
            let mut body = vec![0u8; size as usize];
            file.read_exact(&mut body)?;
            // Lists of other types (e.g. adtl) are skipped
            if let Ok((_, entries)) = info_list(&body) {
                if let Some((_, json)) = entries.iter().find(|(id, _)| *id == BTTR_ID) {
                    return parse_bttr_json(json).map(Some);
                }
            }
            file.seek(SeekFrom::Current((padded - size as u64) as i64))?;
        } else {
            file.seek(SeekFrom::Current(padded as i64))?;
        }
        position += padded;
    }

    Ok(None)
}

fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
}

/// Write a mono 16-bit PCM WAV of `samples` silent frames, with optional IBTR metadata
pub fn write_bttr_wav(
    path: &Path,
    metadata: Option<&BttrMetadata>,
    samples: usize,
) -> Result<(), WavError> {
    const SAMPLE_RATE: u32 = 44_100;
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;

    let block_align = CHANNELS * BITS / 8;
    let mut fmt = Vec::with_capacity(16);
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&CHANNELS.to_le_bytes());
    fmt.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    fmt.extend_from_slice(&(SAMPLE_RATE * block_align as u32).to_le_bytes());
    fmt.extend_from_slice(&block_align.to_le_bytes());
    fmt.extend_from_slice(&BITS.to_le_bytes());

    let mut chunks = Vec::new();
    push_chunk(&mut chunks, b"fmt ", &fmt);
    push_chunk(&mut chunks, b"data", &vec![0u8; samples * block_align as usize]);

    if let Some(metadata) = metadata {
        let mut json = serde_json::to_vec(metadata)?;
        // Word-align the JSON the way the recording tools do
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut list = INFO_ID.to_vec();
        push_chunk(&mut list, BTTR_ID, &json);
        push_chunk(&mut chunks, LIST_ID, &list);
    }

    let mut out = Vec::with_capacity(chunks.len() + 12);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(chunks.len() as u32 + 4).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(&chunks);

    let mut file = File::create(path)?;
    file.write_all(&out)?;
    Ok(())
}
