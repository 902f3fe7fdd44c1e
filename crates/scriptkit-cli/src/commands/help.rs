//! Implementation of the `scriptkit help` command.

use tracing::instrument;

use crate::{
    cli::HelpArgs,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Print the script's help text on stdout, exactly as the script would
/// render it on stderr for `--help`.
#[instrument(skip_all, fields(script = %args.script.display()))]
pub fn execute(args: HelpArgs, output: OutputManager) -> CliResult<()> {
    let service = scriptkit_adapters::usage_service();
    let help = service.help(&args.script)?;
    output
        .payload(&help)
        .with_cli_context(|| "writing help text")
}
