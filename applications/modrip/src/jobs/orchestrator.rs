/// Bounded conversion job pool
use futures_util::stream::{self, StreamExt};
use modrip_convert::{require_tools, DEFAULT_ENCODER, DEFAULT_RENDERER};
use modrip_core::{
    plan_jobs, read_header, sniff, BatchSummary, ExistingOutput, JobOutcome, JobStage,
    ModuleSource, PlannedJob, RenderJob, Renderer, Result, SniffResult, Transcoder,
    UNKNOWN_TITLE,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How a batch is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Jobs in flight at once
    pub workers: usize,

    /// Leave rendered waveforms next to their modules
    pub keep_waveforms: bool,

    /// Policy for outputs that already exist
    pub existing_output: ExistingOutput,

    /// Directory receiving the tagged FLAC files
    pub output_dir: PathBuf,

    /// Tools that must resolve on `PATH` before any job runs
    pub required_tools: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: 6,
            keep_waveforms: false,
            existing_output: ExistingOutput::Skip,
            output_dir: PathBuf::from("rendered"),
            required_tools: vec![DEFAULT_RENDERER.to_string(), DEFAULT_ENCODER.to_string()],
        }
    }
}

/// Runs one conversion job per module on a bounded pool.
///
/// Every job is spawned on its own task, so a panicking job surfaces as a
/// failed outcome for that module only.
pub struct Orchestrator {
    worker: JobWorker,
    workers: usize,
    output_dir: PathBuf,
    required_tools: Vec<String>,
}

/// Per-job state shared by every task in a batch
#[derive(Clone)]
struct JobWorker {
    renderer: Arc<dyn Renderer>,
    transcoder: Arc<dyn Transcoder>,
    keep_waveforms: bool,
    existing_output: ExistingOutput,
}

impl Orchestrator {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        transcoder: Arc<dyn Transcoder>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            worker: JobWorker {
                renderer,
                transcoder,
                keep_waveforms: settings.keep_waveforms,
                existing_output: settings.existing_output,
            },
            workers: settings.workers.max(1),
            output_dir: settings.output_dir,
            required_tools: settings.required_tools,
        }
    }

    /// Convert every module and collect one outcome per module.
    ///
    /// Outputs are assigned up front so no two jobs write the same file.
    /// Fails only when a required tool is missing (nothing runs and the
    /// output directory is not created) or the output directory cannot be
    /// created. Job failures are reported in the summary.
    pub async fn run(
        &self,
        modules: Vec<ModuleSource>,
        cancel: CancellationToken,
    ) -> Result<BatchSummary> {
        let tools = require_tools(&self.required_tools)?;
        debug!(?tools, "Required tools resolved");

        tokio::fs::create_dir_all(&self.output_dir).await?;

        info!(
            modules = modules.len(),
            workers = self.workers,
            output_dir = %self.output_dir.display(),
            "Starting conversion batch"
        );

        let outcomes: Vec<JobOutcome> = stream::iter(plan_jobs(modules, &self.output_dir))
            .map(|planned| {
                let worker = self.worker.clone();
                let cancel = cancel.clone();

                async move {
                    let (job, listing_title) = match planned {
                        PlannedJob::Ready { job, listing_title } => (job, listing_title),
                        PlannedJob::Collision {
                            module,
                            output,
                            owner,
                        } => {
                            warn!(
                                module = %module,
                                output = %output.display(),
                                owner = %owner,
                                "Output collides with another module"
                            );
                            return JobOutcome::failed(
                                module,
                                JobStage::Output,
                                format!("output {} collides with {}", output.display(), owner),
                            );
                        }
                    };
                    let module = job.module.clone();
                    match tokio::spawn(worker.run(job, listing_title, cancel)).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(module = %module, error = %e, "Job task panicked");
                            JobOutcome::failed(module, JobStage::Panic, panic_message(e))
                        }
                    }
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let summary = BatchSummary::from_outcomes(outcomes);
        info!(
            converted = summary.converted(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            cancelled = summary.cancelled(),
            "Conversion batch finished"
        );

        Ok(summary)
    }
}

impl JobWorker {
    async fn run(
        self,
        job: RenderJob,
        listing_title: Option<String>,
        cancel: CancellationToken,
    ) -> JobOutcome {
        let module = job.module.clone();

        if cancel.is_cancelled() {
            info!(module = %module, "Cancelled before start");
            return JobOutcome::cancelled(module);
        }

        if self.existing_output == ExistingOutput::Skip
            && tokio::fs::try_exists(&job.output).await.unwrap_or(false)
        {
            info!(module = %module, output = %job.output.display(), "Output exists, skipping");
            return JobOutcome::skipped(module, job.output);
        }

        let header = match read_module_header(&job.input).await {
            Ok(header) => header,
            Err(e) => {
                warn!(module = %module, error = %e, "Failed to read module");
                return JobOutcome::failed(module, JobStage::Read, e);
            }
        };

        let sniffed = sniff(&header);
        let title = select_title(&sniffed, listing_title.as_deref(), &job.input);
        info!(module = %module, format = %sniffed.format(), title = %title, "Rendering");

        let waveform = match self.renderer.render(&job.input).await {
            Ok(waveform) => waveform,
            Err(e) => {
                warn!(module = %module, error = %e, "Render failed");
                self.discard_waveform(&job.waveform).await;
                return JobOutcome::failed(module, JobStage::Render, e);
            }
        };

        let transcoded = self
            .transcoder
            .transcode(&waveform, &job.output, &title)
            .await;
        self.discard_waveform(&waveform).await;

        match transcoded {
            Ok(()) => {
                info!(module = %module, output = %job.output.display(), "Converted");
                JobOutcome::converted(module, job.output, sniffed.format(), title)
            }
            Err(e) => {
                warn!(module = %module, error = %e, "Transcode failed");
                JobOutcome::failed(module, JobStage::Transcode, e)
            }
        }
    }

    async fn discard_waveform(&self, waveform: &Path) {
        if self.keep_waveforms {
            return;
        }

        match tokio::fs::remove_file(waveform).await {
            Ok(()) => debug!(waveform = %waveform.display(), "Removed waveform"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(waveform = %waveform.display(), error = %e, "Failed to remove waveform"),
        }
    }
}

async fn read_module_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_header(&path))
        .await
        .unwrap_or_else(|e| Err(std::io::Error::other(e)))
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }

    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("job panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("job panicked: {}", message)
    } else {
        "job panicked".to_string()
    }
}

/// Title written into a module's output tag.
///
/// The header title wins when the format is recognised and the title is not
/// blank. Then the catalog listing title. Then the file stem for a recognised
/// format, and `"Unknown"` for anything else.
pub fn select_title(sniffed: &SniffResult, listing_title: Option<&str>, input: &Path) -> String {
    if sniffed.is_known() && !sniffed.title().is_empty() {
        return sniffed.title().to_string();
    }

    if let Some(listing) = listing_title.map(str::trim).filter(|t| !t.is_empty()) {
        return listing.to_string();
    }

    if sniffed.is_known() {
        if let Some(stem) = input.file_stem().map(|s| s.to_string_lossy()) {
            if !stem.is_empty() {
                return stem.into_owned();
            }
        }
    }

    UNKNOWN_TITLE.to_string()
}
