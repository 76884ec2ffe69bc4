//! Shared test utilities: a recording executor and configuration fixtures

#![allow(dead_code)]

use markit::executor::{Captured, CommandExecutor, Status};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tempfile::TempDir;

/// One call made through the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Capture(Vec<String>),
    Run {
        argv: Vec<String>,
        input: Option<Vec<u8>>,
    },
}

impl Call {
    pub fn argv(&self) -> &[String] {
        match self {
            Call::Capture(argv) => argv,
            Call::Run { argv, .. } => argv,
        }
    }
}

/// Executor double that records every command instead of spawning it.
///
/// `capture` returns `<program> output` as stdout unless a canned output is
/// registered. Programs listed in `missing` fail to launch; programs in
/// `failing` exit with status 1.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub calls: Vec<Call>,
    pub outputs: HashMap<String, Vec<u8>>,
    pub missing: Vec<String>,
    pub failing: Vec<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn with_failing(mut self, program: &str) -> Self {
        self.failing.push(program.to_string());
        self
    }

    pub fn with_output(mut self, program: &str, stdout: &[u8]) -> Self {
        self.outputs.insert(program.to_string(), stdout.to_vec());
        self
    }

    fn status_for(&self, argv: &[String]) -> io::Result<Status> {
        let program = argv.first().map(String::as_str).unwrap_or_default();
        if self.missing.iter().any(|p| p == program) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not found"));
        }
        if self.failing.iter().any(|p| p == program) {
            return Ok(Status { code: Some(1) });
        }
        Ok(Status::SUCCESS)
    }

    /// Programs invoked, in order
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| call.argv().first().cloned())
            .collect()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn capture(&mut self, argv: &[String]) -> io::Result<Captured> {
        self.calls.push(Call::Capture(argv.to_vec()));
        let status = self.status_for(argv)?;
        let program = argv.first().cloned().unwrap_or_default();
        let stdout = self
            .outputs
            .get(&program)
            .cloned()
            .unwrap_or_else(|| format!("{} output", program).into_bytes());
        Ok(Captured { status, stdout })
    }

    fn run(&mut self, argv: &[String], input: Option<&[u8]>) -> io::Result<Status> {
        self.calls.push(Call::Run {
            argv: argv.to_vec(),
            input: input.map(<[u8]>::to_vec),
        });
        self.status_for(argv)
    }
}

/// Split a command line on whitespace
pub fn argv(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Write a configuration file into a fresh temporary directory
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("markit.toml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

pub const THREE_CONVERTERS: &str = r#"
[a]
extension = "a"
command = "-t a"

[b]
extension = "b"
command = "-t b"
also = "post-b {outfile}"

[c]
extension = "c"
command = "-t c"
"#;
