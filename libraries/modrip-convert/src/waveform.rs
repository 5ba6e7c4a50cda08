/// Rendered waveform inspection
use modrip_core::{ModripError, Result};
use std::path::Path;

use crate::{TARGET_BITS_PER_SAMPLE, TARGET_SAMPLE_RATE};

/// Format of a rendered WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub is_float: bool,
    /// Length in frames (samples per channel)
    pub frames: u32,
}

impl WaveformInfo {
    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        f64::from(self.frames) / f64::from(self.sample_rate)
    }

    /// Whether the encoder must resample to reach `target_rate`
    pub fn needs_resample(&self, target_rate: u32) -> bool {
        self.sample_rate != target_rate
    }

    /// Whether the samples are already 16-bit integer PCM at the default target rate
    pub fn is_cd_format(&self) -> bool {
        !self.is_float
            && self.bits_per_sample == TARGET_BITS_PER_SAMPLE
            && self.sample_rate == TARGET_SAMPLE_RATE
    }
}

/// Read the header of a rendered waveform.
///
/// A missing or unparsable file means the render step failed without saying
/// so, which is reported as a transcode failure.
pub fn probe_waveform(path: &Path) -> Result<WaveformInfo> {
    if !path.exists() {
        return Err(ModripError::transcode(format!(
            "waveform not found: {}",
            path.display()
        )));
    }

    let reader = hound::WavReader::open(path).map_err(|e| {
        ModripError::transcode(format!("unreadable waveform {}: {}", path.display(), e))
    })?;

    let spec = reader.spec();
    Ok(WaveformInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        is_float: spec.sample_format == hound::SampleFormat::Float,
        frames: reader.duration(),
    })
}
