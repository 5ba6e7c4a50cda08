/// Module discovery in the module directory
use modrip_core::{ModuleSource, Result, WAVEFORM_EXTENSION};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Suffix of an in-progress download
const PART_EXTENSION: &str = "part";

/// List the module files directly inside `dir`, sorted by name.
///
/// Rendered waveforms, partial downloads and hidden files are not modules.
/// A missing directory yields an empty list.
pub fn discover_modules(dir: &Path) -> Result<Vec<ModuleSource>> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Module directory does not exist");
        return Ok(Vec::new());
    }

    let mut modules = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !is_module_candidate(&entry) {
            continue;
        }
        modules.push(ModuleSource::new(entry.into_path()));
    }

    tracing::debug!(dir = %dir.display(), count = modules.len(), "Discovered modules");
    Ok(modules)
}

fn is_module_candidate(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return false;
    }

    match entry.path().extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            !ext.eq_ignore_ascii_case(WAVEFORM_EXTENSION) && !ext.eq_ignore_ascii_case(PART_EXTENSION)
        }
        None => true,
    }
}
