//! Log file retention management
//!
//! Deletes error logs older than the retention window. Runs once at start-up;
//! every deletion is best-effort and independent of the others.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::capture::is_per_source_log_name;
use crate::config::RoutingMode;
use crate::error::CaptureError;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// What the sweeper deletes and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Days a log is kept; 0 disables deletion
    pub max_age_days: u64,
    pub routing_mode: RoutingMode,
    /// Log checked in single-file mode
    pub single_log_file: Option<PathBuf>,
}

impl RetentionPolicy {
    pub fn is_disabled(&self) -> bool {
        self.max_age_days == 0
    }

    /// Modification time below which a log is expired
    pub fn expire_time(&self, now: SystemTime) -> SystemTime {
        let window = Duration::from_secs(self.max_age_days.saturating_mul(SECS_PER_DAY));
        now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

/// Delete expired logs under `logs_dir`
///
/// Returns the number of files deleted.
pub fn sweep(logs_dir: &Path, policy: &RetentionPolicy) -> usize {
    sweep_at(logs_dir, policy, SystemTime::now())
}

/// [`sweep`] against an explicit clock
pub fn sweep_at(logs_dir: &Path, policy: &RetentionPolicy, now: SystemTime) -> usize {
    if policy.is_disabled() || !logs_dir.is_dir() {
        return 0;
    }

    let cutoff = policy.expire_time(now);

    match policy.routing_mode {
        RoutingMode::SingleFile => match &policy.single_log_file {
            Some(file) => usize::from(delete_if_expired(file, cutoff)),
            None => 0,
        },
        RoutingMode::PerSourceFile => {
            let entries = match fs::read_dir(logs_dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::debug!("Cannot list {}: {}", logs_dir.display(), e);
                    return 0;
                }
            };

            let mut deleted_count = 0;
            for entry in entries.flatten() {
                let path = entry.path();

                // Only per-source error logs
                match path.file_name().and_then(|n| n.to_str()) {
                    Some(name) if is_per_source_log_name(name) => {}
                    _ => continue,
                }
                if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    continue;
                }

                if delete_if_expired(&path, cutoff) {
                    deleted_count += 1;
                }
            }
            deleted_count
        }
    }
}

/// Delete `path` if its modification time is strictly before `cutoff`
fn delete_if_expired(path: &Path, cutoff: SystemTime) -> bool {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };
    if modified >= cutoff {
        return false;
    }

    match fs::remove_file(path) {
        Ok(()) => true,
        Err(source) => {
            let e = CaptureError::Delete {
                path: path.to_path_buf(),
                source,
            };
            tracing::debug!("Skipping expired log: {}", e);
            false
        }
    }
}
