// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

const AFTER_HELP: &str = "\
Example: `luatask hello` with the following tasks.lua writes \"Hello World!\" to output.txt.

    function task.hello()
      description \"Writes a greeting to output.txt\"
      write_file(\"output.txt\", \"Hello World!\")
    end

Note: `--list` finds each task's description and sources by running the whole
task body. While listing, file, process, console and code-loading functions
are removed and each body is cut off after a short timeout, but any other work
a task does still happens. Keep directives at the top of task bodies and
avoid heavy work outside of tasks.";

/// Command-line arguments for `luatask`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "luatask",
    version,
    about = "Run tasks declared in a Lua script.",
    long_about = None,
    after_long_help = AFTER_HELP
)]
pub struct CliArgs {
    /// Tasks to run, in order.
    ///
    /// If omitted, the configured default task (`default`) is run.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Task script to load. Overrides `[config].taskfile`.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub taskfile: Option<String>,

    /// List all tasks instead of running any.
    #[arg(short, long)]
    pub list: bool,

    /// Create a starter tasks.lua and exit.
    #[arg(long)]
    pub init: bool,

    /// Path to the optional config file (TOML).
    #[arg(long, value_name = "PATH", default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Stop at the first failing task instead of attempting the rest.
    #[arg(long)]
    pub fail_fast: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LUATASK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
