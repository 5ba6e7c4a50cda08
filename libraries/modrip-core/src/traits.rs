/// Core traits for modrip
///
/// Both pipeline stages that shell out to external tools sit behind these
/// traits so the orchestrator can be driven by fakes in tests.
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Renders a tracker module into a PCM waveform file
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `module` and return the path of the waveform it produced.
    ///
    /// The waveform lands at [`crate::waveform_path_for`]`(module)`.
    ///
    /// # Errors
    /// Returns [`crate::ModripError::Render`] when the tool fails or leaves no waveform
    async fn render(&self, module: &Path) -> Result<PathBuf>;
}

/// Encodes a waveform into the final tagged lossless file
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Encode `waveform` to `output` and write `title` into its title tag.
    ///
    /// # Errors
    /// Returns [`crate::ModripError::Transcode`] or [`crate::ModripError::Tag`]
    async fn transcode(&self, waveform: &Path, output: &Path, title: &str) -> Result<()>;
}
