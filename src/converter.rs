use crate::cli::{self, Cli};
use crate::config;
use crate::executor::SystemExecutor;
use crate::pipeline::PipelineRunner;
use crate::registry::Registry;
use crate::selection::{self, RunRequest, Selection};
use crate::watch;
use anyhow::Result;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

pub fn convert(cli: &Cli) -> Result<ExitCode> {
    let config_path = config::locate(cli.config.as_deref())?;
    let registry = Registry::load(&config_path)?;

    match selection::select(registry, cli.args.as_slice()) {
        Selection::Help(registry) => {
            print!("{}", cli::help_text(&registry.sorted_selectable_names()));
            Ok(ExitCode::SUCCESS)
        }
        Selection::Run(request) if request.continuous => run_continuously(&request),
        Selection::Run(request) => {
            let mut runner = PipelineRunner::new(SystemExecutor);
            let report = runner.run(&request.source, &request.registry, request.verbose);

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!(
                    "{} of {} conversions reported problems",
                    report.failures.len(),
                    report.attempted.len()
                );
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Convert once, then again after every change to the source file until Ctrl-C.
fn run_continuously(request: &RunRequest) -> Result<ExitCode> {
    let interrupted = watch::install_interrupt_handler()?;
    let mut runner = PipelineRunner::new(SystemExecutor).with_interrupt(interrupted);

    let mut convert_once = || {
        runner.run(&request.source, &request.registry, request.verbose);
        if !interrupted.load(Ordering::SeqCst) {
            println!(
                "\nWatching for updates to {}. Use Ctrl-C to stop.\n",
                request.source.display()
            );
        }
    };

    convert_once();
    watch::watch(
        &request.source,
        watch::POLL_INTERVAL,
        interrupted,
        convert_once,
    );

    Ok(ExitCode::SUCCESS)
}
