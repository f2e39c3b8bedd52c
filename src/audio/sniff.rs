//! Container detection from magic bytes
//!
//! Only the first four bytes are inspected, read in both byte orders.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// "OggS" capture pattern that starts every Ogg page
pub const OGG_MAGIC: u32 = 0x4F67_6753;

/// "ID3" followed by major version 3 (ID3v2.3-tagged MP3)
pub const ID3V23_MAGIC: u32 = 0x4944_3303;

/// Container family detected from the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Ogg container (Vorbis audio)
    Ogg,

    /// MP3 with an ID3v2.3 tag in front
    Id3Mp3,

    /// Nothing recognized; decoding falls back to content probing
    Unknown,
}

impl ContainerFormat {
    /// Extension hint handed to the decoder probe
    pub fn probe_hint(self) -> &'static str {
        match self {
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::Id3Mp3 | ContainerFormat::Unknown => "mp3",
        }
    }
}

/// Classify a header without caring which byte order it was read in
pub fn classify_header(header: [u8; 4]) -> ContainerFormat {
    let big = u32::from_be_bytes(header);
    let little = u32::from_le_bytes(header);

    if big == OGG_MAGIC || little == OGG_MAGIC {
        ContainerFormat::Ogg
    } else if big == ID3V23_MAGIC || little == ID3V23_MAGIC {
        ContainerFormat::Id3Mp3
    } else {
        ContainerFormat::Unknown
    }
}

/// Read the first four bytes of a file and classify them
///
/// Files shorter than four bytes are `Unknown`.
pub fn sniff_file(path: &Path) -> Result<ContainerFormat> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open audio file: {:?}", path))?;

    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = file
            .read(&mut header[filled..])
            .with_context(|| format!("Failed to read header of {:?}", path))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled < header.len() {
        log::debug!("Header of {:?} is only {} bytes", path, filled);
        return Ok(ContainerFormat::Unknown);
    }

    let format = classify_header(header);
    log::debug!("Sniffed {:?} as {:?} (header {:02x?})", path, format, header);
    Ok(format)
}
