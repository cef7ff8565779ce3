#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use mcp_auto_install::runner::RunError;
use mcp_auto_install::{CommandRunner, Paths, ServerRecord, ShellCommand};

pub fn demo_record() -> ServerRecord {
    ServerRecord {
        name: "demo".to_string(),
        repo: "https://x/demo.git".to_string(),
        command: "npx demo".to_string(),
        description: "d".to_string(),
        keywords: vec!["demo".to_string()],
        ..Default::default()
    }
}

pub fn paths_in(root: &Path, external_config: bool) -> Paths {
    Paths::new(
        root.join("registry").join("mcp-registry.json"),
        root.join("servers"),
        external_config.then(|| root.join("claude_desktop_config.json")),
    )
}

/// Records every command instead of running it; optionally fails on one.
#[derive(Default)]
pub struct RecordingRunner {
    pub commands: RefCell<Vec<ShellCommand>>,
    pub fail_at: Option<usize>,
}

impl RecordingRunner {
    pub fn failing_at(index: usize) -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            fail_at: Some(index),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &ShellCommand) -> Result<(), RunError> {
        let index = self.commands.borrow().len();
        self.commands.borrow_mut().push(command.clone());
        if self.fail_at == Some(index) {
            return Err(RunError::Exit {
                command: command.to_string(),
                code: Some(1),
            });
        }
        Ok(())
    }
}
