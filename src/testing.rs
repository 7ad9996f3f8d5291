//! Recording `CommandRunner` for unit tests

use crate::security::command_executor::command_line;
use crate::security::{CommandError, CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

/// Records every command line and answers with canned results
///
/// Responses and file effects are matched by command-line prefix. Unmatched commands exit 0
/// with no output.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    responses: Vec<(String, i32, String)>,
    effects: Vec<(String, PathBuf)>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, code: i32, stdout: &str) -> Self {
        self.responses
            .push((prefix.to_string(), code, stdout.to_string()));
        self
    }

    /// Create `file` when a command starting with `prefix` runs
    pub fn creates(mut self, prefix: &str, file: PathBuf) -> Self {
        self.effects.push((prefix.to_string(), file));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        let line = command_line(program, args);

        for (prefix, file) in &self.effects {
            if line.starts_with(prefix.as_str()) {
                std::fs::write(file, b"PK").unwrap();
            }
        }

        let output = self
            .responses
            .iter()
            .find(|(prefix, _, _)| line.starts_with(prefix.as_str()))
            .map(|(_, code, stdout)| CommandOutput {
                code: Some(*code),
                stdout: stdout.clone(),
                stderr: String::new(),
            })
            .unwrap_or(CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            });

        self.calls.lock().unwrap().push(line);
        output
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn capture(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        Ok(self.run(program, args))
    }

    async fn inherit(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let mut output = self.run(program, args);
        output.stdout.clear();
        Ok(output)
    }
}
