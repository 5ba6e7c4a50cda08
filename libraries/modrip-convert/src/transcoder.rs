/// Transcoding stage - FFmpeg wrapper for waveform to tagged FLAC conversion
use async_trait::async_trait;
use modrip_core::{ModripError, Result, Transcoder};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::tools::DEFAULT_ENCODER;
use crate::{tags, waveform, MAX_COMPRESSION_LEVEL, TARGET_SAMPLE_RATE};

/// Output format settings for the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// FLAC compression level (0-12)
    pub compression_level: u8,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            compression_level: MAX_COMPRESSION_LEVEL,
        }
    }
}

/// Encodes waveforms to 16-bit FLAC with ffmpeg and tags the result with lofty
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
    settings: TranscodeSettings,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, settings: TranscodeSettings) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            settings,
        }
    }

    pub fn settings(&self) -> TranscodeSettings {
        self.settings
    }

    /// Build the encoder invocation for one file
    fn encode_command(&self, waveform: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-hide_banner")
            .arg("-nostdin")
            .arg("-y") // Overwrite output file
            .arg("-i")
            .arg(waveform)
            .arg("-ar")
            .arg(self.settings.sample_rate.to_string())
            .arg("-sample_fmt")
            .arg("s16")
            .arg("-c:a")
            .arg("flac")
            .arg("-compression_level")
            .arg(self.settings.compression_level.to_string())
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_ENCODER, TranscodeSettings::default())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, waveform: &Path, output: &Path, title: &str) -> Result<()> {
        let wav_path = waveform.to_path_buf();
        let info = tokio::task::spawn_blocking(move || waveform::probe_waveform(&wav_path))
            .await
            .map_err(|e| ModripError::transcode(format!("waveform probe task failed: {}", e)))??;

        debug!(
            waveform = %waveform.display(),
            sample_rate = info.sample_rate,
            bits = info.bits_per_sample,
            channels = info.channels,
            duration_secs = info.duration_secs(),
            cd_format = info.is_cd_format(),
            resample = info.needs_resample(self.settings.sample_rate),
            "Encoding waveform"
        );

        let result = self
            .encode_command(waveform, output)
            .output()
            .await
            .map_err(|e| {
                ModripError::transcode(format!(
                    "failed to run {}: {}",
                    self.ffmpeg_path.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            remove_partial_output(output).await;
            return Err(ModripError::transcode(format!(
                "ffmpeg failed ({}): {}",
                result.status,
                stderr.trim()
            )));
        }

        let out_path = output.to_path_buf();
        let title = title.to_string();
        let tagged = tokio::task::spawn_blocking(move || tags::write_title(&out_path, &title))
            .await
            .map_err(|e| ModripError::Tag(format!("tag task failed: {}", e)))
            .and_then(|result| result);

        // An untagged file would be skipped as finished on the next run
        if let Err(e) = tagged {
            remove_partial_output(output).await;
            return Err(e);
        }

        Ok(())
    }
}

async fn remove_partial_output(output: &Path) {
    if let Err(e) = tokio::fs::remove_file(output).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(output = %output.display(), error = %e, "Failed to remove partial output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_cd_rate_max_compression() {
        let settings = TranscodeSettings::default();
        assert_eq!(settings.sample_rate, 44_100);
        assert_eq!(settings.compression_level, 12);
    }

    #[test]
    fn encode_command_arguments() {
        let transcoder = FfmpegTranscoder::new(
            "/usr/bin/ffmpeg",
            TranscodeSettings {
                sample_rate: 48_000,
                compression_level: 8,
            },
        );
        let cmd = transcoder.encode_command(Path::new("in.wav"), Path::new("out.flac"));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(cmd.as_std().get_program(), "/usr/bin/ffmpeg");
        assert!(args.windows(2).any(|w| w == ["-ar", "48000"]));
        assert!(args.windows(2).any(|w| w == ["-sample_fmt", "s16"]));
        assert!(args.windows(2).any(|w| w == ["-compression_level", "8"]));
        assert_eq!(args.last().map(String::as_str), Some("out.flac"));
    }

    #[tokio::test]
    async fn missing_waveform_fails_before_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.flac");

        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg", TranscodeSettings::default());
        let err = transcoder
            .transcode(&dir.path().join("missing.wav"), &output, "Title")
            .await
            .unwrap_err();

        assert!(matches!(err, ModripError::Transcode(_)));
        assert!(!output.exists());
    }
}
