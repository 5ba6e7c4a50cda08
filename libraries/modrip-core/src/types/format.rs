/// Tracker module formats
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracker format families recognised by the header sniffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    Xm,
    S3m,
    It,
    Mod,
    Unknown,
}

impl ModuleFormat {
    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            ModuleFormat::Xm => "XM",
            ModuleFormat::S3m => "S3M",
            ModuleFormat::It => "IT",
            ModuleFormat::Mod => "MOD",
            ModuleFormat::Unknown => "unknown",
        }
    }

    /// Conventional file extension, if the format has one
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ModuleFormat::Xm => Some("xm"),
            ModuleFormat::S3m => Some("s3m"),
            ModuleFormat::It => Some("it"),
            ModuleFormat::Mod => Some("mod"),
            ModuleFormat::Unknown => None,
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
