use clap::Parser;
use std::path::PathBuf;

/// Convert a Markdown file to other formats with pandoc
///
/// clap's own `-h` and `-V` are disabled: both are markit flags handled by
/// the selection step, together with every other token after `--config`.
#[derive(Parser, Debug)]
#[command(
    name = "markit",
    about,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Converter configuration file (must come before the markdown file)
    #[arg(long, env = "MARKIT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The markdown file, converter names and flags such as -c, -h, -V
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

const USAGE: &str = "\
Convert markdown to other formats.

Usage:

    $ markit markdown-file [outputs] [options]

The markdown-file should typically have a name ending in .md that
conforms to regular markdown syntax as understood by pandoc. The
following outputs may be generated:

  {outputs}

The following options are recognized:

-c     - continuous run, update whenever the markdown file changes.
-h     - show this help text.
-V     - verbose, print each pandoc command before running it.

The converters are read from markit.toml (override with --config or
MARKIT_CONFIG).
";

/// Help text listing the converters that can be selected.
pub fn help_text(outputs: &[&str]) -> String {
    let listing = if outputs.is_empty() {
        "(none configured)".to_string()
    } else {
        outputs.join(", ")
    };
    USAGE.replace("{outputs}", &listing)
}
