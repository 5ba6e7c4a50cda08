//! Tracker module header sniffing
//!
//! Classifies a module by fixed signatures in its header rather than by file
//! extension, and pulls the embedded song title out of the same header.
//!
//! Detection order matters: the signature ranges overlap, so XM is checked
//! before S3M, S3M before IT, and the MOD tag at offset 1080 last.

use crate::types::ModuleFormat;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of header bytes needed to see every signature (the MOD tag ends at 1084)
pub const HEADER_LEN: usize = 1084;

/// Title reported for modules whose format is not recognised
pub const UNKNOWN_TITLE: &str = "Unknown";

const XM_MARKER: &[u8] = b"Extended Module: ";
const S3M_MARKER: &[u8] = b"SCRM";
const IT_MARKER: &[u8] = b"IMPM";

/// Magic tags found at offset 1080 of ProTracker-family modules
const MOD_TAGS: [&[u8; 4]; 9] = [
    b"M.K.", b"M!K!", b"4CHN", b"6CHN", b"8CHN", b"FLT4", b"FLT8", b"OKTA", b"CD81",
];

/// Result of sniffing a module header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "title")]
pub enum SniffResult {
    /// FastTracker II extended module
    Xm(String),
    /// ScreamTracker 3 module
    S3m(String),
    /// Impulse Tracker module
    It(String),
    /// ProTracker-family module
    Mod(String),
    /// No known signature matched
    Unknown,
}

impl SniffResult {
    /// Detected format
    pub fn format(&self) -> ModuleFormat {
        match self {
            Self::Xm(_) => ModuleFormat::Xm,
            Self::S3m(_) => ModuleFormat::S3m,
            Self::It(_) => ModuleFormat::It,
            Self::Mod(_) => ModuleFormat::Mod,
            Self::Unknown => ModuleFormat::Unknown,
        }
    }

    /// Embedded title, or [`UNKNOWN_TITLE`] for unrecognised headers
    pub fn title(&self) -> &str {
        match self {
            Self::Xm(title) | Self::S3m(title) | Self::It(title) | Self::Mod(title) => title,
            Self::Unknown => UNKNOWN_TITLE,
        }
    }

    /// Whether a known signature matched
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Classify a module header and extract its title.
///
/// `header` should hold the first [`HEADER_LEN`] bytes of the file. Shorter
/// buffers are accepted; any signature that lies beyond the end simply does
/// not match. Never panics.
pub fn sniff(header: &[u8]) -> SniffResult {
    if header.get(0..17) == Some(XM_MARKER) {
        return SniffResult::Xm(decode_title(field(header, 17, 37)));
    }

    if header.get(44..48) == Some(S3M_MARKER) {
        return SniffResult::S3m(decode_title(field(header, 0, 28)));
    }

    if header.get(0..4) == Some(IT_MARKER) {
        return SniffResult::It(decode_title(field(header, 4, 26)));
    }

    if let Some(tag) = header.get(1080..1084) {
        if MOD_TAGS.iter().any(|known| known.as_slice() == tag) {
            return SniffResult::Mod(decode_title(field(header, 0, 20)));
        }
    }

    SniffResult::Unknown
}

/// Read at most [`HEADER_LEN`] bytes from the start of a file.
pub fn read_header(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    Ok(header)
}

/// Byte range clamped to the buffer; empty when `start` is past the end.
fn field(buf: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(buf.len());
    if start >= end {
        return &[];
    }
    &buf[start..end]
}

/// Decode a fixed-width title: drop non-ASCII bytes, then trim whitespace and NUL padding.
fn decode_title(raw: &[u8]) -> String {
    let decoded: String = raw
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect();

    decoded
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}
