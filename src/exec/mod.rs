//! Synchronous external-process execution
//!
//! Every detector that shells out to a package manager or build tool goes
//! through [`CommandRunner`] so that extractability checks can distinguish
//! "tool is missing" from "tool ran and failed", and so tests can substitute
//! canned output without touching the host system.

use std::io;
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),
    #[error("failed to run {exe}: {source}")]
    SpawnFailed { exe: String, source: io::Error },
}

/// Captured result of one external command run.
#[derive(Debug, Clone)]
pub struct ExecutableOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutableOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Blocking "run a command, capture stdout/exit code" primitive.
pub trait CommandRunner: Send + Sync {
    fn run(&self, exe: &str, args: &[&str], cwd: &Path) -> Result<ExecutableOutput, ExecError>;

    /// Probes whether an executable responds on this host.
    fn executable_exists(&self, exe: &str, probe_arg: &str) -> bool {
        self.run(exe, &[probe_arg], Path::new(".")).is_ok()
    }
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, exe: &str, args: &[&str], cwd: &Path) -> Result<ExecutableOutput, ExecError> {
        trace!(exe, ?args, cwd = %cwd.display(), "Running external command");

        let output = Command::new(exe)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    ExecError::ExecutableNotFound(exe.to_string())
                } else {
                    ExecError::SpawnFailed {
                        exe: exe.to_string(),
                        source,
                    }
                }
            })?;

        let result = ExecutableOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            exe,
            exit_code = ?result.exit_code,
            stdout_len = result.stdout.len(),
            "External command finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() {
        let runner = SystemCommandRunner;
        let output = runner.run("echo", &["hello"], Path::new(".")).unwrap();
        assert!(output.succeeded());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_missing_executable_is_typed() {
        let runner = SystemCommandRunner;
        let err = runner
            .run("definitely-not-a-real-binary-xyz", &[], Path::new("."))
            .unwrap_err();
        assert!(matches!(err, ExecError::ExecutableNotFound(_)));
    }

    #[test]
    fn test_executable_exists_probe() {
        let runner = SystemCommandRunner;
        assert!(runner.executable_exists("echo", "probe"));
        assert!(!runner.executable_exists("definitely-not-a-real-binary-xyz", "--version"));
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let runner = SystemCommandRunner;
        let output = runner.run("false", &[], Path::new(".")).unwrap();
        assert!(!output.succeeded());
    }
}
