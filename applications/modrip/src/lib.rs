//! modrip - tracker module to FLAC pipeline
//!
//! Library half of the `modrip` binary: configuration loading, module
//! discovery and the bounded job orchestrator that drives the render and
//! transcode stages from `modrip-convert`.

pub mod config;
pub mod discovery;
pub mod jobs;

pub use config::AppConfig;
pub use discovery::discover_modules;
pub use jobs::{select_title, Orchestrator, PipelineSettings};
