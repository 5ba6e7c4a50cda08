//! Title tag reading and writing
//!
//! Uses the file's primary tag type, which for FLAC is the Vorbis comment
//! block (`TITLE` field). A tag is created when the file has none.

use lofty::{Accessor, Probe, Tag, TagExt, TaggedFileExt};
use modrip_core::{ModripError, Result};
use std::path::Path;
use tracing::debug;

fn tag_error(path: &Path, err: lofty::error::LoftyError) -> ModripError {
    ModripError::Tag(format!("{}: {}", path.display(), err))
}

/// Write `title` into the primary tag of an audio file and save it
///
/// # Notes
/// - Creates the primary tag type if the file has no tag yet
/// - Preserves other existing fields (ffmpeg writes an `encoder` comment)
pub fn write_title<P: AsRef<Path>>(path: P, title: &str) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ModripError::Tag(format!("file not found: {}", path.display())));
    }

    let mut tagged_file = Probe::open(path)
        .map_err(|e| tag_error(path, e))?
        .read()
        .map_err(|e| tag_error(path, e))?;

    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| ModripError::Tag(format!("no {:?} tag in {}", tag_type, path.display())))?;

    tag.set_title(title.to_string());
    tag.save_to_path(path).map_err(|e| tag_error(path, e))?;

    debug!(path = %path.display(), title, "Wrote title tag");

    Ok(())
}

/// Read the title from the primary tag, falling back to any other tag present
pub fn read_title<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ModripError::Tag(format!("file not found: {}", path.display())));
    }

    let tagged_file = Probe::open(path)
        .map_err(|e| tag_error(path, e))?
        .read()
        .map_err(|e| tag_error(path, e))?;

    let title = tagged_file
        .primary_tag()
        .and_then(|tag| tag.title())
        .or_else(|| tagged_file.tags().iter().find_map(|tag| tag.title()))
        .map(|title| title.into_owned());

    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_to_missing_file_fails() {
        let err = write_title("/nonexistent/out.flac", "x").unwrap_err();
        assert!(matches!(err, ModripError::Tag(_)));
    }

    #[test]
    fn read_non_audio_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.flac");
        std::fs::write(&path, b"definitely not flac").unwrap();

        assert!(read_title(&path).is_err());
    }
}
