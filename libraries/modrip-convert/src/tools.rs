/// External tool resolution
use modrip_core::{ModripError, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Default tracker renderer
pub const DEFAULT_RENDERER: &str = "openmpt123";

/// Default audio encoder
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// Resolve a tool name (or path) the way the shell would, without running it
pub fn resolve_tool(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Check that every tool resolves; report all of the missing ones at once.
///
/// Returns the resolved paths in the same order as `names`.
pub fn require_tools<S: AsRef<str>>(names: &[S]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(names.len());
    let mut missing = Vec::new();

    for name in names {
        let name = name.as_ref();
        match resolve_tool(name) {
            Some(path) => {
                debug!(tool = name, path = %path.display(), "Resolved external tool");
                resolved.push(path);
            }
            None => {
                warn!(tool = name, "External tool not found");
                missing.push(name.to_string());
            }
        }
    }

    if !missing.is_empty() {
        return Err(ModripError::MissingTool { tools: missing });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_satisfied() {
        let resolved = require_tools::<&str>(&[]).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn reports_every_missing_tool() {
        let err = require_tools(&["modrip-no-such-tool-a", "modrip-no-such-tool-b"]).unwrap_err();
        match err {
            ModripError::MissingTool { tools } => {
                assert_eq!(tools, vec!["modrip-no-such-tool-a", "modrip-no-such-tool-b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unresolvable_tool_is_none() {
        assert!(resolve_tool("modrip-no-such-tool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolves_shell() {
        assert!(resolve_tool("sh").is_some());
        assert_eq!(require_tools(&["sh"]).unwrap().len(), 1);
    }
}
