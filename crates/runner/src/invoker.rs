// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job invoker: precondition checks and spawning the processing command.

use std::ffi::OsString;
use std::io::PipeReader;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use hourly_core::{resolve_program, JobEnv, RunnerConfig};
use tokio::process::{Child, Command};

use crate::error::ConfigurationError;

/// A job whose preconditions have been verified and is ready to spawn.
#[derive(Debug)]
pub struct JobInvoker<'a> {
    config: &'a RunnerConfig,
    program: PathBuf,
    env: JobEnv,
}

impl<'a> JobInvoker<'a> {
    /// Verify everything the job needs before anything is written:
    /// the working directory, the configuration file with its required keys,
    /// and the program itself.
    pub fn prepare(config: &'a RunnerConfig) -> Result<Self, ConfigurationError> {
        if !config.working_dir.is_dir() {
            return Err(ConfigurationError::WorkingDir(config.working_dir.clone()));
        }

        let env = JobEnv::load(&config.env_file)?;
        let missing = env.missing_keys(&config.required_env);
        if !missing.is_empty() {
            return Err(ConfigurationError::MissingKeys {
                path: config.env_file.clone(),
                keys: missing.join(", "),
            });
        }

        // A PATH from the configuration file is what the child will search.
        let path_var = env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));
        let program = resolve_program(config.program(), &config.working_dir, path_var.as_deref())
            .ok_or_else(|| ConfigurationError::ProgramNotFound(config.program().to_string()))?;

        tracing::debug!(
            program = %program.display(),
            env_keys = env.len(),
            "job preconditions satisfied"
        );

        Ok(Self {
            config,
            program,
            env,
        })
    }

    /// Resolved path of the program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn env(&self) -> &JobEnv {
        &self.env
    }

    /// Spawn the job with stdout and stderr sharing a single pipe, the way
    /// `cmd 2>&1` would. Returns the child and the read end of that pipe.
    pub fn spawn(&self) -> std::io::Result<(Child, PipeReader)> {
        let (reader, writer) = std::io::pipe()?;
        let stderr = writer.try_clone()?;

        let mut cmd = Command::new(&self.program);
        cmd.args(self.config.args())
            .current_dir(&self.config.working_dir)
            .envs(self.env.iter())
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr)
            .kill_on_drop(true);
        let child = cmd.spawn()?;
        // The command still owns the pipe's write ends; the reader only sees
        // EOF once they are closed here and in the child.
        drop(cmd);

        tracing::info!(
            pid = child.id().unwrap_or_default(),
            command = %self.config.command_line(),
            "job started"
        );
        Ok((child, reader))
    }
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod tests;
