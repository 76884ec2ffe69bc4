use crate::executor::{display_command, CommandExecutor, Status};
use crate::registry::{ConverterSpec, Registry};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Placeholder replaced by the source path in `first` commands.
pub const INFILE_PLACEHOLDER: &str = "{infile}";
/// Placeholder replaced by the output path in `also` commands.
pub const OUTFILE_PLACEHOLDER: &str = "{outfile}";

/// The external converter, in markdown-reading mode.
pub const DEFAULT_PROGRAM: [&str; 3] = ["pandoc", "-f", "markdown"];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to launch '{program}' for {converter}: {source}")]
    Launch {
        converter: String,
        program: String,
        source: io::Error,
    },

    #[error("'{command}' for {converter} exited with {}", describe_status(.status))]
    Exit {
        converter: String,
        command: String,
        status: Status,
    },
}

fn describe_status(status: &Status) -> String {
    match status.code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// The commands one converter will run, with placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub output: PathBuf,
    pub pre: Vec<Vec<String>>,
    pub main: Vec<String>,
    pub post: Vec<Vec<String>>,
}

impl Pipeline {
    /// Resolve a converter against a source file.
    ///
    /// The source path is only passed to the main command when no
    /// pre-command exists; otherwise the main command reads its stdin.
    pub fn plan(spec: &ConverterSpec, source: &Path, program: &[String]) -> Self {
        let source_arg = source.to_string_lossy();
        let output = output_path(source, &spec.extension);
        let output_arg = output.to_string_lossy();

        let pre: Vec<Vec<String>> = spec
            .pre_commands
            .iter()
            .map(|cmd| substitute(cmd, INFILE_PLACEHOLDER, &source_arg))
            .collect();

        let mut main = Vec::with_capacity(program.len() + spec.main_command.len() + 3);
        main.extend(program.iter().cloned());
        main.extend(spec.main_command.iter().cloned());
        main.push("-o".to_string());
        main.push(output_arg.to_string());
        if pre.is_empty() {
            main.push(source_arg.to_string());
        }

        let post = spec
            .post_commands
            .iter()
            .map(|cmd| substitute(cmd, OUTFILE_PLACEHOLDER, &output_arg))
            .collect();

        Self {
            output,
            pre,
            main,
            post,
        }
    }
}

/// `report.md` + `pdf` -> `report.pdf`; the suffix is replaced, not appended.
pub fn output_path(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(extension)
}

/// Replace every token that is exactly `placeholder`.
///
/// Tokens that merely contain the placeholder are left as written.
pub fn substitute(tokens: &[String], placeholder: &str, value: &str) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            if token == placeholder {
                value.to_string()
            } else {
                token.clone()
            }
        })
        .collect()
}

/// Outcome of converting one file with every active converter.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Converters whose pipeline was started
    pub attempted: Vec<String>,
    pub failures: Vec<PipelineError>,
    pub interrupted: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the pipelines of all active converters, strictly one process at a time.
pub struct PipelineRunner<'a, E: CommandExecutor> {
    executor: E,
    program: Vec<String>,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a, E: CommandExecutor> PipelineRunner<'a, E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            program: DEFAULT_PROGRAM.iter().map(|s| s.to_string()).collect(),
            interrupt: None,
        }
    }

    /// Replace the converter prefix (`pandoc -f markdown`).
    pub fn with_program(mut self, program: Vec<String>) -> Self {
        self.program = program;
        self
    }

    /// Stop before the next stage once `flag` is set.
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Convert `source` with every active converter in registry order.
    pub fn run(&mut self, source: &Path, registry: &Registry, verbose: bool) -> RunReport {
        let mut report = RunReport::default();

        for spec in registry.active() {
            if self.interrupted() {
                report.interrupted = true;
                break;
            }
            report.attempted.push(spec.name.clone());

            let pipeline = Pipeline::plan(spec, source, &self.program);
            if let Err(err) = self.run_pipeline(spec, &pipeline, verbose, &mut report) {
                eprintln!("Error: {}", err);
                report.failures.push(err);
            }
        }

        if report.attempted.is_empty() && !report.interrupted {
            log::warn!(
                "No outputs selected for {}; name one of: {}",
                source.display(),
                registry.sorted_selectable_names().join(", ")
            );
        }

        report
    }

    /// Run one converter. A launch failure aborts the rest of this pipeline;
    /// a non-zero exit is recorded and the next stage still runs.
    fn run_pipeline(
        &mut self,
        spec: &ConverterSpec,
        pipeline: &Pipeline,
        verbose: bool,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        let mut piped: Option<Vec<u8>> = None;

        for cmd in &pipeline.pre {
            if self.interrupted() {
                report.interrupted = true;
                return Ok(());
            }
            if verbose {
                println!("{}", display_command(cmd));
            }
            let captured = self
                .executor
                .capture(cmd)
                .map_err(|source| launch_error(spec, cmd, source))?;
            self.check_status(spec, cmd, captured.status, report);
            piped = Some(captured.stdout);
        }

        if self.interrupted() {
            report.interrupted = true;
            return Ok(());
        }
        if verbose {
            println!("{}", display_command(&pipeline.main));
        }
        println!(
            "Writing {} to {}",
            spec.title(),
            pipeline.output.display()
        );
        let status = self
            .executor
            .run(&pipeline.main, piped.as_deref())
            .map_err(|source| launch_error(spec, &pipeline.main, source))?;
        self.check_status(spec, &pipeline.main, status, report);

        for cmd in &pipeline.post {
            if self.interrupted() {
                report.interrupted = true;
                return Ok(());
            }
            println!("Also running {} for {}", display_command(cmd), spec.name);
            let status = self
                .executor
                .run(cmd, None)
                .map_err(|source| launch_error(spec, cmd, source))?;
            self.check_status(spec, cmd, status, report);
        }

        Ok(())
    }

    fn check_status(
        &self,
        spec: &ConverterSpec,
        cmd: &[String],
        status: Status,
        report: &mut RunReport,
    ) {
        if status.success() {
            return;
        }
        let err = PipelineError::Exit {
            converter: spec.name.clone(),
            command: display_command(cmd),
            status,
        };
        log::warn!("{}", err);
        report.failures.push(err);
    }
}

fn launch_error(spec: &ConverterSpec, cmd: &[String], source: io::Error) -> PipelineError {
    PipelineError::Launch {
        converter: spec.name.clone(),
        program: cmd.first().cloned().unwrap_or_default(),
        source,
    }
}
