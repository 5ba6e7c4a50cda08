/// Conversion job pool
mod orchestrator;

pub use orchestrator::{select_title, Orchestrator, PipelineSettings};
