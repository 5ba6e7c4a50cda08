/// Application configuration
use modrip_core::{ExistingOutput, ModripError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "modrip.toml";

/// Prefix of environment overrides, e.g. `MODRIP_PIPELINE__WORKERS=4`
pub const ENV_PREFIX: &str = "MODRIP";

/// Highest FLAC compression level ffmpeg accepts
const MAX_COMPRESSION_LEVEL: u8 = modrip_convert::MAX_COMPRESSION_LEVEL;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_paths")]
    pub paths: PathSettings,

    #[serde(default = "default_tools")]
    pub tools: ToolSettings,

    #[serde(default = "default_pipeline")]
    pub pipeline: PipelineConfig,

    #[serde(default = "default_transcode")]
    pub transcode: TranscodeConfig,

    #[serde(default = "default_catalog")]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathSettings {
    #[serde(default = "default_module_dir")]
    pub module_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolSettings {
    #[serde(default = "default_renderer")]
    pub renderer: String,

    #[serde(default = "default_encoder")]
    pub encoder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub keep_waveforms: bool,

    #[serde(default)]
    pub existing_output: ExistingOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranscodeConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_artist_url")]
    pub artist_url: String,
}

impl AppConfig {
    /// Load configuration from an optional file and the process environment.
    ///
    /// An explicit `path` must exist. Without one, `modrip.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    /// Load configuration with a caller-supplied environment source.
    pub fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(
                    config::File::from(path)
                        .format(config::FileFormat::Toml)
                        .required(true),
                );
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(
                        config::File::from(default_path).format(config::FileFormat::Toml),
                    );
                }
            }
        }

        settings = settings.add_source(env);

        let config = settings
            .build()
            .map_err(|e| ModripError::config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ModripError::config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.workers == 0 {
            return Err(ModripError::config("pipeline.workers must be at least 1"));
        }

        if self.transcode.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(ModripError::config(format!(
                "transcode.compression_level must be between 0 and {}, got {}",
                MAX_COMPRESSION_LEVEL, self.transcode.compression_level
            )));
        }

        if self.transcode.sample_rate == 0 {
            return Err(ModripError::config("transcode.sample_rate must be positive"));
        }

        if self.tools.renderer.trim().is_empty() || self.tools.encoder.trim().is_empty() {
            return Err(ModripError::config("tool names must not be empty"));
        }

        validate_artist_url(&self.catalog.artist_url)
    }

    /// Names of the external tools every conversion needs
    pub fn required_tools(&self) -> Vec<String> {
        vec![self.tools.renderer.clone(), self.tools.encoder.clone()]
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            tools: default_tools(),
            pipeline: default_pipeline(),
            transcode: default_transcode(),
            catalog: default_catalog(),
        }
    }
}

/// Check that `artist_url` is an absolute http(s) URL
pub fn validate_artist_url(artist_url: &str) -> Result<()> {
    let url = url::Url::parse(artist_url)
        .map_err(|e| ModripError::config(format!("invalid artist URL {:?}: {}", artist_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ModripError::config(format!(
            "artist URL must use http or https, got {:?}",
            artist_url
        )));
    }

    Ok(())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_paths() -> PathSettings {
    PathSettings {
        module_dir: default_module_dir(),
        output_dir: default_output_dir(),
    }
}

fn default_module_dir() -> PathBuf {
    PathBuf::from("mods")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("rendered")
}

fn default_tools() -> ToolSettings {
    ToolSettings {
        renderer: default_renderer(),
        encoder: default_encoder(),
    }
}

fn default_renderer() -> String {
    modrip_convert::DEFAULT_RENDERER.to_string()
}

fn default_encoder() -> String {
    modrip_convert::DEFAULT_ENCODER.to_string()
}

fn default_pipeline() -> PipelineConfig {
    PipelineConfig {
        workers: default_workers(),
        keep_waveforms: false,
        existing_output: ExistingOutput::default(),
    }
}

fn default_workers() -> usize {
    6
}

fn default_transcode() -> TranscodeConfig {
    TranscodeConfig {
        sample_rate: default_sample_rate(),
        compression_level: default_compression_level(),
    }
}

fn default_sample_rate() -> u32 {
    modrip_convert::TARGET_SAMPLE_RATE
}

fn default_compression_level() -> u8 {
    MAX_COMPRESSION_LEVEL
}

fn default_catalog() -> CatalogConfig {
    CatalogConfig {
        artist_url: default_artist_url(),
    }
}

fn default_artist_url() -> String {
    "https://modarchive.org/index.php?request=view_artist_modules&query=84384".to_string()
}
