/// Renderer adapter - openmpt123 wrapper for module to waveform rendering
use async_trait::async_trait;
use modrip_core::{waveform_path_for, ModripError, Renderer, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::tools::DEFAULT_RENDERER;

/// Renders modules with `openmpt123 --render <module>`, which writes `<module>.wav`
#[derive(Debug, Clone)]
pub struct OpenMptRenderer {
    tool: PathBuf,
}

impl OpenMptRenderer {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }
}

impl Default for OpenMptRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDERER)
    }
}

#[async_trait]
impl Renderer for OpenMptRenderer {
    async fn render(&self, module: &Path) -> Result<PathBuf> {
        let name = module
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| module.display().to_string());
        let waveform = waveform_path_for(module);

        // The tool refuses to overwrite, and a stale file would hide a failed render
        match tokio::fs::remove_file(&waveform).await {
            Ok(()) => debug!(waveform = %waveform.display(), "Removed stale waveform"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ModripError::render(
                    name,
                    format!("cannot remove stale waveform {}: {}", waveform.display(), e),
                ))
            }
        }

        debug!(module = %name, tool = %self.tool.display(), "Rendering module");

        let output = Command::new(&self.tool)
            .arg("--render")
            .arg(module)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ModripError::render(
                    name.clone(),
                    format!("failed to run {}: {}", self.tool.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ModripError::render(
                name,
                format!("{} exited with {}: {}", self.tool.display(), output.status, stderr.trim()),
            ));
        }

        if !tokio::fs::try_exists(&waveform).await.unwrap_or(false) {
            return Err(ModripError::render(
                name,
                format!("no waveform produced at {}", waveform.display()),
            ));
        }

        debug!(module = %name, waveform = %waveform.display(), "Render complete");
        Ok(waveform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_openmpt123() {
        let renderer = OpenMptRenderer::default();
        assert_eq!(renderer.tool(), Path::new("openmpt123"));
    }

    #[tokio::test]
    async fn missing_binary_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("song.xm");
        std::fs::write(&module, b"Extended Module: x").unwrap();

        let renderer = OpenMptRenderer::new("/nonexistent/modrip/openmpt123");
        let err = renderer.render(&module).await.unwrap_err();
        match err {
            ModripError::Render { module, .. } => assert_eq!(module, "song.xm"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
