use anyhow::Result;
use clap::Parser;
use markit::{cli, converter};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::Cli::parse();
    converter::convert(&cli)
}
