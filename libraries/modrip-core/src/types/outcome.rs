/// Per-job outcomes and the batch summary built from them
use super::ModuleFormat;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stage at which a job failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    /// Claiming a distinct output path
    Output,
    /// Reading the module header
    Read,
    /// External render to waveform
    Render,
    /// Encoding and tagging
    Transcode,
    /// The job task panicked
    Panic,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStage::Output => "output",
            JobStage::Read => "read",
            JobStage::Render => "render",
            JobStage::Transcode => "transcode",
            JobStage::Panic => "panic",
        };
        f.write_str(name)
    }
}

/// How a single job ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Converted {
        output: PathBuf,
        format: ModuleFormat,
        title: String,
    },
    Skipped {
        output: PathBuf,
    },
    Failed {
        stage: JobStage,
        error: String,
    },
    Cancelled,
}

/// Result of one module's job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub module: String,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn converted(
        module: impl Into<String>,
        output: PathBuf,
        format: ModuleFormat,
        title: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            status: JobStatus::Converted {
                output,
                format,
                title: title.into(),
            },
        }
    }

    pub fn skipped(module: impl Into<String>, output: PathBuf) -> Self {
        Self {
            module: module.into(),
            status: JobStatus::Skipped { output },
        }
    }

    pub fn failed(module: impl Into<String>, stage: JobStage, error: impl fmt::Display) -> Self {
        Self {
            module: module.into(),
            status: JobStatus::Failed {
                stage,
                error: error.to_string(),
            },
        }
    }

    pub fn cancelled(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            status: JobStatus::Cancelled,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, JobStatus::Failed { .. })
    }
}

/// Outcomes of a whole batch, ordered by module identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchSummary {
    /// Build a summary; outcomes are sorted so reports are stable regardless of completion order
    pub fn from_outcomes(mut outcomes: Vec<JobOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.module.cmp(&b.module));
        Self { outcomes }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Failed { .. }))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Cancelled))
    }

    /// Failed outcomes only
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Output paths of every converted or skipped module
    pub fn outputs(&self) -> BTreeSet<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                JobStatus::Converted { output, .. } | JobStatus::Skipped { output } => {
                    Some(output.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Look up the outcome for a module
    pub fn get(&self, module: &str) -> Option<&JobOutcome> {
        self.outcomes.iter().find(|o| o.module == module)
    }

    fn count(&self, predicate: impl Fn(&JobStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                JobStatus::Converted {
                    output,
                    format,
                    title,
                } => writeln!(
                    f,
                    "  converted  {} -> {} ({}, {:?})",
                    outcome.module,
                    output.display(),
                    format,
                    title
                )?,
                JobStatus::Skipped { output } => writeln!(
                    f,
                    "  skipped    {} ({} exists)",
                    outcome.module,
                    output.display()
                )?,
                JobStatus::Failed { stage, error } => {
                    writeln!(f, "  failed     {} [{}]: {}", outcome.module, stage, error)?;
                }
                JobStatus::Cancelled => writeln!(f, "  cancelled  {}", outcome.module)?,
            }
        }

        write!(
            f,
            "{} modules: {} converted, {} skipped, {} failed, {} cancelled",
            self.total(),
            self.converted(),
            self.skipped(),
            self.failed(),
            self.cancelled()
        )
    }
}
