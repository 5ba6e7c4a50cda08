/// Per-module job description and path derivation
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension appended to a module path for its rendered waveform
pub const WAVEFORM_EXTENSION: &str = "wav";

/// Extension of the final compressed output
pub const OUTPUT_EXTENSION: &str = "flac";

/// Waveform path the renderer writes for `module`: the module path with `.wav` appended.
///
/// `mods/song.xm` becomes `mods/song.xm.wav`.
pub fn waveform_path_for(module: &Path) -> PathBuf {
    let mut path = OsString::from(module.as_os_str());
    path.push(".");
    path.push(WAVEFORM_EXTENSION);
    PathBuf::from(path)
}

/// A module handed to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// Module file on disk
    pub path: PathBuf,

    /// Title shown in the catalog listing, when the module came from a crawl
    pub listing_title: Option<String>,
}

impl ModuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            listing_title: None,
        }
    }

    pub fn with_listing_title(mut self, title: impl Into<String>) -> Self {
        self.listing_title = Some(title.into());
        self
    }
}

/// All paths involved in converting one module
///
/// The waveform is derived from the module path. Outputs of a batch are made
/// distinct by [`plan_jobs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Module identifier (its file name)
    pub module: String,

    /// Module file
    pub input: PathBuf,

    /// Intermediate waveform, next to the input
    pub waveform: PathBuf,

    /// Final tagged output
    pub output: PathBuf,
}

impl RenderJob {
    /// Derive the job for `input`, placing the output in `output_dir`
    pub fn new(input: impl Into<PathBuf>, output_dir: &Path) -> Self {
        let input = input.into();
        let module = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| module.clone());

        let output = output_dir.join(format!("{}.{}", stem, OUTPUT_EXTENSION));
        let waveform = waveform_path_for(&input);

        Self {
            module,
            input,
            waveform,
            output,
        }
    }

    /// Name the output after the module's full file name: `dup.it` writes `dup.it.flac`
    pub fn with_file_name_output(mut self, output_dir: &Path) -> Self {
        self.output = output_dir.join(format!("{}.{}", self.module, OUTPUT_EXTENSION));
        self
    }
}

/// A batch entry after output paths have been assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedJob {
    /// Ready to run with a distinct output
    Ready {
        job: RenderJob,
        listing_title: Option<String>,
    },
    /// Every candidate output is already claimed by `owner`
    Collision {
        module: String,
        output: PathBuf,
        owner: String,
    },
}

/// Assign every module of a batch its own output path.
///
/// Modules are taken in path order. The first module with a given stem keeps
/// `<stem>.flac`; later ones fall back to `<file name>.flac`. A module whose
/// fallback is claimed too is reported as a collision.
pub fn plan_jobs(mut sources: Vec<ModuleSource>, output_dir: &Path) -> Vec<PlannedJob> {
    sources.sort_by(|a, b| a.path.cmp(&b.path));

    let mut owners: HashMap<PathBuf, String> = HashMap::with_capacity(sources.len());
    let mut planned = Vec::with_capacity(sources.len());

    for source in sources {
        let mut job = RenderJob::new(source.path, output_dir);
        if owners.contains_key(&job.output) {
            job = job.with_file_name_output(output_dir);
        }

        if let Some(owner) = owners.get(&job.output) {
            planned.push(PlannedJob::Collision {
                module: job.module,
                output: job.output,
                owner: owner.clone(),
            });
            continue;
        }

        owners.insert(job.output.clone(), job.module.clone());
        planned.push(PlannedJob::Ready {
            job,
            listing_title: source.listing_title,
        });
    }

    planned
}

/// What to do when a job's output file already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingOutput {
    /// Leave the existing file alone and report the job as skipped
    #[default]
    Skip,
    /// Convert again and replace the file
    Overwrite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_appends_extension() {
        assert_eq!(
            waveform_path_for(Path::new("mods/song.xm")),
            PathBuf::from("mods/song.xm.wav")
        );
    }

    #[test]
    fn render_job_swaps_extension_for_output() {
        let job = RenderJob::new("mods/space_debris.mod", Path::new("rendered"));
        assert_eq!(job.module, "space_debris.mod");
        assert_eq!(job.waveform, PathBuf::from("mods/space_debris.mod.wav"));
        assert_eq!(job.output, PathBuf::from("rendered/space_debris.flac"));
    }

    #[test]
    fn render_job_without_extension() {
        let job = RenderJob::new("mods/noext", Path::new("out"));
        assert_eq!(job.output, PathBuf::from("out/noext.flac"));
        assert_eq!(job.waveform, PathBuf::from("mods/noext.wav"));
    }

    fn outputs(planned: &[PlannedJob]) -> Vec<(String, PathBuf)> {
        planned
            .iter()
            .filter_map(|p| match p {
                PlannedJob::Ready { job, .. } => Some((job.module.clone(), job.output.clone())),
                PlannedJob::Collision { .. } => None,
            })
            .collect()
    }

    #[test]
    fn shared_stem_falls_back_to_file_name() {
        let planned = plan_jobs(
            vec![
                ModuleSource::new("mods/dup.xm"),
                ModuleSource::new("mods/dup.it").with_listing_title("Listed"),
                ModuleSource::new("mods/other.mod"),
            ],
            Path::new("out"),
        );

        assert_eq!(
            outputs(&planned),
            vec![
                ("dup.it".to_string(), PathBuf::from("out/dup.flac")),
                ("dup.xm".to_string(), PathBuf::from("out/dup.xm.flac")),
                ("other.mod".to_string(), PathBuf::from("out/other.flac")),
            ]
        );
        assert!(matches!(
            &planned[0],
            PlannedJob::Ready { listing_title: Some(t), .. } if t == "Listed"
        ));
    }

    #[test]
    fn plan_is_independent_of_input_order() {
        let forward = plan_jobs(
            vec![ModuleSource::new("m/a.xm"), ModuleSource::new("m/a.s3m")],
            Path::new("out"),
        );
        let reverse = plan_jobs(
            vec![ModuleSource::new("m/a.s3m"), ModuleSource::new("m/a.xm")],
            Path::new("out"),
        );
        assert_eq!(forward, reverse);
    }

    #[test]
    fn third_copy_of_a_file_name_collides() {
        let planned = plan_jobs(
            vec![
                ModuleSource::new("c/song.xm"),
                ModuleSource::new("a/song.xm"),
                ModuleSource::new("b/song.xm"),
            ],
            Path::new("out"),
        );

        assert_eq!(
            outputs(&planned),
            vec![
                ("song.xm".to_string(), PathBuf::from("out/song.flac")),
                ("song.xm".to_string(), PathBuf::from("out/song.xm.flac")),
            ]
        );
        assert_eq!(
            planned[2],
            PlannedJob::Collision {
                module: "song.xm".to_string(),
                output: PathBuf::from("out/song.xm.flac"),
                owner: "song.xm".to_string(),
            }
        );
    }

    #[test]
    fn module_source_listing_title() {
        let source = ModuleSource::new("mods/a.it").with_listing_title("A Song");
        assert_eq!(source.listing_title.as_deref(), Some("A Song"));
    }

    #[test]
    fn existing_output_defaults_to_skip() {
        assert_eq!(ExistingOutput::default(), ExistingOutput::Skip);
    }
}
