//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "scriptkit",
    bin_name = "scriptkit",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Inspect scripts built on the scriptkit scaffold",
    long_about = "scriptkit reads the @usage block embedded in a script's source \
                  and shows the options, help text and parse results the script \
                  would produce, without running it.",
    after_help = "EXAMPLES:\n\
        \x20 scriptkit inspect ./report.rs\n\
        \x20 scriptkit help    ./report.rs\n\
        \x20 scriptkit parse   ./report.rs -- -f out.txt -i a.csv -i b.csv\n\
        \x20 scriptkit completions bash > /usr/share/bash-completion/completions/scriptkit",
    arg_required_else_help  = true,
    subcommand_required     = true,
    disable_help_subcommand = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the options declared in a script's usage block.
    #[command(
        visible_alias = "i",
        about = "Show the options a script declares",
        after_help = "EXAMPLES:\n\
            \x20 scriptkit inspect ./report.rs\n\
            \x20 scriptkit inspect ./report.rs --format json"
    )]
    Inspect(InspectArgs),

    /// Print the help text a script would show for `--help`.
    #[command(
        about = "Render a script's help text",
        after_help = "EXAMPLES:\n\
            \x20 scriptkit help ./report.rs\n\
            \x20 scriptkit help ./report.rs | less"
    )]
    Help(HelpArgs),

    /// Parse arguments the way a script would and print the result.
    #[command(
        visible_alias = "p",
        about = "Parse arguments against a script's usage block",
        after_help = "EXAMPLES:\n\
            \x20 scriptkit parse ./report.rs -- -f out.txt\n\
            \x20 scriptkit parse ./report.rs -- -xxx -f a.txt extra.csv"
    )]
    Parse(ParseArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 scriptkit completions bash > ~/.local/share/bash-completion/completions/scriptkit\n\
            \x20 scriptkit completions zsh  > ~/.zfunc/_scriptkit\n\
            \x20 scriptkit completions fish > ~/.config/fish/completions/scriptkit.fish"
    )]
    Completions(CompletionsArgs),
}

// ── inspect ───────────────────────────────────────────────────────────────────

/// Arguments for `scriptkit inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Script whose source carries an `@usage` block.
    #[arg(value_name = "SCRIPT", help = "Path to the script")]
    pub script: PathBuf,

    /// Output format.
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: InspectFormat,
}

/// Output format for `scriptkit inspect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    /// Aligned, human-readable table.
    #[default]
    Table,
    /// The extracted usage document as JSON.
    Json,
}

// ── help ──────────────────────────────────────────────────────────────────────

/// Arguments for `scriptkit help`.
#[derive(Debug, Args)]
pub struct HelpArgs {
    #[arg(value_name = "SCRIPT", help = "Path to the script")]
    pub script: PathBuf,
}

// ── parse ─────────────────────────────────────────────────────────────────────

/// Arguments for `scriptkit parse`.
#[derive(Debug, Args)]
pub struct ParseArgs {
    #[arg(value_name = "SCRIPT", help = "Path to the script")]
    pub script: PathBuf,

    /// Arguments handed to the script, after `--`.
    #[arg(
        value_name = "ARGS",
        last = true,
        allow_hyphen_values = true,
        help = "Arguments to parse (after --)"
    )]
    pub args: Vec<String>,

    /// Emit compact JSON on a single line.
    #[arg(long = "compact", help = "Print compact JSON")]
    pub compact: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `scriptkit completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Shells supported by `clap_complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
