/// Core error types for modrip
use thiserror::Error;

/// Result type alias using `ModripError`
pub type Result<T> = std::result::Result<T, ModripError>;

/// Core error type for modrip
#[derive(Error, Debug)]
pub enum ModripError {
    /// One or more required external tools could not be resolved on `PATH`
    #[error("Required tool not found on PATH: {}", .tools.join(", "))]
    MissingTool { tools: Vec<String> },

    /// The external renderer failed or produced no waveform
    #[error("Render failed for {module}: {message}")]
    Render { module: String, message: String },

    /// The waveform could not be read or encoded
    #[error("Transcode failed: {0}")]
    Transcode(String),

    /// Writing the title tag failed
    #[error("Tag write failed: {0}")]
    Tag(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ModripError {
    /// Create a render error for a module
    pub fn render(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create a transcode error
    pub fn transcode(message: impl Into<String>) -> Self {
        Self::Transcode(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_lists_every_tool() {
        let err = ModripError::MissingTool {
            tools: vec!["openmpt123".to_string(), "ffmpeg".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Required tool not found on PATH: openmpt123, ffmpeg"
        );
    }

    #[test]
    fn render_error_names_module() {
        let err = ModripError::render("a.xm", "exit status 1");
        assert_eq!(err.to_string(), "Render failed for a.xm: exit status 1");
    }
}
