//! markit: convert a Markdown file to other formats through configurable
//! pandoc pipelines, optionally re-running whenever the file changes.

pub mod cli;
pub mod config;
pub mod converter;
pub mod executor;
pub mod pipeline;
pub mod registry;
pub mod selection;
pub mod watch;
