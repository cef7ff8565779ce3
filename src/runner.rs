//! Subprocess execution for clone and install steps.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// A program invocation with an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Run a free-form command line through the platform shell.
    pub fn shell(line: &str) -> Self {
        if cfg!(windows) {
            Self::new("cmd", ["/C", line])
        } else {
            Self::new("sh", ["-c", line])
        }
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Executes commands to completion. Any non-zero exit is an error.
pub trait CommandRunner {
    fn run(&self, command: &ShellCommand) -> Result<(), RunError>;
}

/// Runs commands as child processes with inherited stdio. No timeout is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &ShellCommand) -> Result<(), RunError> {
        tracing::info!(command = %command, "running");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(ref dir) = command.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|e| RunError::Spawn {
            command: command.to_string(),
            source: e,
        })?;
        if !status.success() {
            return Err(RunError::Exit {
                command: command.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` exited with {}", exit_label(.code))]
    Exit { command: String, code: Option<i32> },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = ShellCommand::new("git", ["clone", "https://x/demo.git", "/tmp/demo"]);
        assert_eq!(cmd.to_string(), "git clone https://x/demo.git /tmp/demo");
    }

    #[test]
    fn exit_error_names_the_command() {
        let err = RunError::Exit {
            command: "npm install".into(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "`npm install` exited with status 1");
    }
}
