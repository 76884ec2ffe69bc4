use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Exit status of an external command.
///
/// `code` is `None` when the process was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: Option<i32>,
}

impl Status {
    pub const SUCCESS: Status = Status { code: Some(0) };

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for Status {
    fn from(status: std::process::ExitStatus) -> Self {
        Status {
            code: status.code(),
        }
    }
}

/// Result of a command whose stdout was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub status: Status,
    pub stdout: Vec<u8>,
}

/// Trait for running the external commands of a pipeline
///
/// `argv[0]` is the program, the rest are its arguments. Implementations
/// block until the process exits.
pub trait CommandExecutor {
    /// Run a command and capture its stdout; stderr is inherited
    fn capture(&mut self, argv: &[String]) -> io::Result<Captured>;
    /// Run a command with inherited streams, optionally feeding `input` on stdin
    fn run(&mut self, argv: &[String], input: Option<&[u8]>) -> io::Result<Status>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn command(argv: &[String]) -> io::Result<Command> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Empty command"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

impl CommandExecutor for SystemExecutor {
    fn capture(&mut self, argv: &[String]) -> io::Result<Captured> {
        let output = Self::command(argv)?
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()?;

        Ok(Captured {
            status: output.status.into(),
            stdout: output.stdout,
        })
    }

    fn run(&mut self, argv: &[String], input: Option<&[u8]>) -> io::Result<Status> {
        let mut cmd = Self::command(argv)?;

        let Some(input) = input else {
            return Ok(cmd.status()?.into());
        };

        let mut child = cmd.stdin(Stdio::piped()).spawn()?;
        // stdin is dropped at the end of the match, closing the pipe before the wait
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input),
            None => Ok(()),
        };
        // Reap the child even when feeding it failed, so no stage outlives its turn
        let status = child.wait()?;

        match written {
            // A child that exits without reading all of its input is not our failure
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::debug!("{} closed stdin early", argv[0]);
            }
            other => other?,
        }
        Ok(status.into())
    }
}

/// Render a command line for display.
pub fn display_command(argv: &[String]) -> String {
    argv.join(" ")
}
