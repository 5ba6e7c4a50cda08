/// Domain types for modrip
mod format;
mod job;
mod outcome;

pub use format::ModuleFormat;
pub use job::{
    plan_jobs, waveform_path_for, ExistingOutput, ModuleSource, PlannedJob, RenderJob,
    OUTPUT_EXTENSION, WAVEFORM_EXTENSION,
};
pub use outcome::{BatchSummary, JobOutcome, JobStage, JobStatus};
