// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check results reported by `hourly install`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
        }
    }
}

/// Checks belonging to one installation stage.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub name: String,
    pub checks: Vec<CheckResult>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    pub fn push(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    pub fn has_errors(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ok: usize,
    pub warn: usize,
    pub error: usize,
}

impl Summary {
    pub fn of(sections: &[Section]) -> Self {
        let mut summary = Summary::default();
        for check in sections.iter().flat_map(|s| &s.checks) {
            match check.status {
                CheckStatus::Ok => summary.ok += 1,
                CheckStatus::Warn => summary.warn += 1,
                CheckStatus::Error => summary.error += 1,
            }
        }
        summary
    }

    /// Worst status seen.
    pub fn status(&self) -> CheckStatus {
        if self.error > 0 {
            CheckStatus::Error
        } else if self.warn > 0 {
            CheckStatus::Warn
        } else {
            CheckStatus::Ok
        }
    }
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
