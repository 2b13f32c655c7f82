//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pathbind CLI - bind JSON documents to declared record schemas
///
/// Resolves path expressions against JSON input, binds documents to the
/// records declared in a schema file and writes them back out as a mapping,
/// JSON text or display text.
#[derive(Parser, Debug)]
#[command(
    name = "pathbind",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PATHBIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: configured format, else human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bind a JSON document to a record declared in a schema file
    Bind(BindArgs),

    /// Resolve a single path expression against a JSON document
    Resolve(ResolveArgs),

    /// Compile a schema file and list its records
    Check(CheckArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the bind command
#[derive(Parser, Debug)]
pub struct BindArgs {
    /// Schema file (YAML or JSON), or a bare name looked up in the schemas directory
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Record to bind to (defaults to the schema's root record)
    #[arg(short, long)]
    pub record: Option<String>,

    /// JSON input file (stdin if not specified)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Serialized form to print (defaults to the configured form)
    #[arg(short, long, value_enum)]
    pub form: Option<DumpForm>,

    /// Leave null fields out of the output
    #[arg(long)]
    pub exclude_none: bool,

    /// Reject values that need conversion to match the declared type
    #[arg(long)]
    pub strict: bool,

    /// Bind every element of a top-level array
    #[arg(long)]
    pub each: bool,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Path expression, e.g. `orders.*.lines.0.sku`
    #[arg(value_name = "PATH")]
    pub path: String,

    /// JSON input file (stdin if not specified)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// JSON value returned when the path does not match
    #[arg(short, long, default_value = "null")]
    pub default: String,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Schema file (YAML or JSON), or a bare name looked up in the schemas directory
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Print the configuration file locations that are searched
    Path,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Create `.pathbind.toml` in the current directory instead of the user config directory
    #[arg(long)]
    pub project: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Format to print the configuration in
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Serialized form of a bound record
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpForm {
    /// Structured mapping, rendered in the output format
    Mapping,
    /// Compact JSON text
    Json,
    /// `name=value` display text
    Display,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Output format from the flag, else the configured name, else human
    pub fn output_format(&self, configured: &str) -> OutputFormat {
        self.output
            .or_else(|| OutputFormat::from_str(configured, true).ok())
            .unwrap_or(OutputFormat::Human)
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
