//! modrip Core
//!
//! Platform-agnostic types, traits, and error handling for the modrip
//! tracker-module conversion pipeline.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `RenderJob`, `ModuleSource`, `JobOutcome`, `BatchSummary`
//! - **Header Sniffing**: `sniff()` classifies MOD/S3M/XM/IT headers and pulls the title
//! - **Core Traits**: `Renderer`, `Transcoder`
//! - **Error Handling**: Unified `ModripError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use modrip_core::{sniff, ModuleFormat, HEADER_LEN};
//!
//! let mut header = b"Extended Module: MyTrack".to_vec();
//! header.resize(HEADER_LEN, 0);
//!
//! let result = sniff(&header);
//! assert_eq!(result.format(), ModuleFormat::Xm);
//! assert_eq!(result.title(), "MyTrack");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod sniff;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ModripError, Result};
pub use sniff::{read_header, sniff, SniffResult, HEADER_LEN, UNKNOWN_TITLE};
pub use traits::{Renderer, Transcoder};
pub use types::{
    plan_jobs, waveform_path_for, BatchSummary, ExistingOutput, JobOutcome, JobStage, JobStatus,
    ModuleFormat, ModuleSource, PlannedJob, RenderJob, OUTPUT_EXTENSION, WAVEFORM_EXTENSION,
};
