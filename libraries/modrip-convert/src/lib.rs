//! modrip Convert
//!
//! The two stages of a conversion job that depend on external programs:
//! - `openmpt123` renders a tracker module to a WAV file
//! - `ffmpeg` resamples and encodes the WAV to FLAC, then lofty writes the title tag
//!
//! Plus the precondition check that both tools resolve on `PATH` before any
//! job is dispatched.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ module file │ ──► │ OpenMptRenderer  │ ──► │ <module>.wav │ ──► │ Ffmpeg-     │ ──► <stem>.flac
//! └─────────────┘     └──────────────────┘     └──────────────┘     │ Transcoder  │      (TITLE tag)
//!                                                                   └─────────────┘
//! ```

#![forbid(unsafe_code)]

mod renderer;
mod tags;
mod tools;
mod transcoder;
mod waveform;

pub use renderer::OpenMptRenderer;
pub use tags::{read_title, write_title};
pub use tools::{require_tools, resolve_tool, DEFAULT_ENCODER, DEFAULT_RENDERER};
pub use transcoder::{FfmpegTranscoder, TranscodeSettings};
pub use waveform::{probe_waveform, WaveformInfo};

/// Target sample rate of the FLAC output
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Target bit depth of the FLAC output
pub const TARGET_BITS_PER_SAMPLE: u16 = 16;

/// Highest FLAC compression level ffmpeg accepts
pub const MAX_COMPRESSION_LEVEL: u8 = 12;
