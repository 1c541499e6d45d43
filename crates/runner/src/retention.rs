// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log retention.
//!
//! Only files the layout recognises as run entries are considered; the
//! latest mirror, its staging copy, the lock, the run record and the
//! runner's own log are never touched. Deletion is best effort: a file that
//! cannot be removed is logged and skipped.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hourly_core::{LogLayout, RetentionPolicy};

/// A run log considered for retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Files to keep and delete, newest first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetentionPlan {
    pub keep: Vec<LogFile>,
    pub delete: Vec<LogFile>,
}

/// What enforcement actually did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetentionReport {
    pub kept: usize,
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// List the run logs in the layout's directory.
///
/// A missing directory has no logs.
pub fn list_entries(layout: &LogLayout) -> std::io::Result<Vec<LogFile>> {
    let read_dir = match std::fs::read_dir(layout.dir()) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry?;
        let name = dir_entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !layout.is_entry(name) {
            continue;
        }
        let metadata = match dir_entry.metadata() {
            Ok(m) => m,
            // Removed between listing and stat.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            continue;
        }
        entries.push(LogFile {
            path: dir_entry.path(),
            modified: metadata.modified()?,
        });
    }
    // Newest first; names carry the start time and attempt, so they break
    // mtime ties.
    entries.sort_by_cached_key(|f| {
        let order = f
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| layout.entry_order(name))
            .map(|(stamp, attempt)| (stamp.to_string(), attempt));
        Reverse((f.modified, order, f.path.clone()))
    });
    Ok(entries)
}

/// Decide which run logs the policy keeps. `protect` is always kept.
pub fn plan(
    layout: &LogLayout,
    policy: RetentionPolicy,
    protect: Option<&Path>,
    now: SystemTime,
) -> std::io::Result<RetentionPlan> {
    let entries = list_entries(layout)?;
    let mut plan = RetentionPlan::default();

    for (index, file) in entries.into_iter().enumerate() {
        let protected = protect.is_some_and(|p| p == file.path);
        let within = match policy {
            RetentionPolicy::KeepLast(n) => index < n,
            RetentionPolicy::MaxAge(max_age) => now
                .duration_since(file.modified)
                .map(|age| age <= max_age)
                // Modified in the future: keep.
                .unwrap_or(true),
        };
        if within || protected {
            plan.keep.push(file);
        } else {
            plan.delete.push(file);
        }
    }
    Ok(plan)
}

/// Apply the policy to the log directory.
///
/// Never fails: listing and deletion errors are logged and reported.
pub fn enforce(
    layout: &LogLayout,
    policy: RetentionPolicy,
    protect: Option<&Path>,
) -> RetentionReport {
    enforce_at(layout, policy, protect, SystemTime::now())
}

pub fn enforce_at(
    layout: &LogLayout,
    policy: RetentionPolicy,
    protect: Option<&Path>,
    now: SystemTime,
) -> RetentionReport {
    let plan = match plan(layout, policy, protect, now) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!(
                dir = %layout.dir().display(),
                error = %e,
                "failed to list logs, skipping retention"
            );
            return RetentionReport::default();
        }
    };

    let mut report = RetentionReport {
        kept: plan.keep.len(),
        ..RetentionReport::default()
    };
    for file in plan.delete {
        match std::fs::remove_file(&file.path) {
            Ok(()) => {
                tracing::debug!(path = %file.path.display(), "deleted expired log");
                report.deleted.push(file.path);
            }
            // Already gone is as good as deleted.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %file.path.display(),
                    error = %e,
                    "failed to delete expired log"
                );
                report.failed.push((file.path, e.to_string()));
            }
        }
    }

    if !report.deleted.is_empty() {
        tracing::info!(
            deleted = report.deleted.len(),
            kept = report.kept,
            %policy,
            "log retention applied"
        );
    }
    report
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
