//! Log destination resolution

use std::path::{Path, PathBuf};

use crate::config::{Config, RoutingMode};

use super::event::file_name_lossy;

/// Suffix appended to the source file stem in per-source-file mode
pub const PER_SOURCE_SUFFIX: &str = "_error.log";

/// Resolves the log file an event is appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResolver {
    routing_mode: RoutingMode,
    single_log_file: PathBuf,
    source_root: Option<PathBuf>,
}

impl TargetResolver {
    pub fn new(
        routing_mode: RoutingMode,
        single_log_file: PathBuf,
        source_root: Option<PathBuf>,
    ) -> Self {
        Self {
            routing_mode,
            single_log_file,
            source_root,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.routing_mode,
            config.single_log_file(),
            config.source_root.clone(),
        )
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.routing_mode
    }

    /// Log file for an error raised in `source_file`
    pub fn resolve(&self, source_file: &Path) -> PathBuf {
        match self.routing_mode {
            RoutingMode::SingleFile => self.single_log_file.clone(),
            RoutingMode::PerSourceFile => {
                let source = match &self.source_root {
                    Some(root) if source_file.is_relative() => root.join(source_file),
                    _ => source_file.to_path_buf(),
                };
                per_source_log_path(&source)
            }
        }
    }
}

/// `<dir>/<stem>_error.log` for a source path
pub fn per_source_log_path(source_file: &Path) -> PathBuf {
    let stem = source_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name_lossy(source_file));
    let dir = source_file.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}{}", stem, PER_SOURCE_SUFFIX))
}

/// True if a file name looks like a per-source log (`*_error.log`, not hidden)
pub fn is_per_source_log_name(name: &str) -> bool {
    !name.starts_with('.') && name.ends_with(PER_SOURCE_SUFFIX)
}
