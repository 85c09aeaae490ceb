//! External process execution.
//!
//! The core hands a fully expanded command string to a runner and reports
//! the exit code verbatim — no retry, no output capture, no classification.
//! The trait seam lets tests substitute a recording runner.

use std::io;
use std::process::Command;

/// Executes an expanded command string and reports its exit code.
pub trait ProcessRunner {
    /// Run the command, blocking until it exits. The `io::Error` case is a
    /// failure to launch; a launched command that fails reports through the
    /// exit code.
    fn execute(&self, command: &str) -> io::Result<i32>;
}

/// Runs command strings through `sh -c`.
///
/// The expanded template is a single shell-invocable string (quoted paths,
/// flags), so the shell does the word splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn execute(&self, command: &str) -> io::Result<i32> {
        let status = Command::new("sh").arg("-c").arg(command).status()?;
        // None means terminated by signal.
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_runner_success() {
        let code = ShellRunner.execute("true").unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_shell_runner_nonzero() {
        let code = ShellRunner.execute("exit 3").unwrap();
        assert_eq!(code, 3);
    }
}
