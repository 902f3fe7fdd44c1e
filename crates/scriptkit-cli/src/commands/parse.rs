//! Implementation of the `scriptkit parse` command.
//!
//! Prints the [`ParsedArgs`](scriptkit_core::domain::ParsedArgs) a script
//! would receive. Usage errors surface as [`CliError::Core`] with a usage
//! category, so the tool exits 2 just like the script would.

use tracing::{debug, instrument};

use crate::{
    cli::ParseArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(script = %args.script.display(), args = args.args.len()))]
pub fn execute(args: ParseArgs, output: OutputManager) -> CliResult<()> {
    let service = scriptkit_adapters::usage_service();
    let parsed = service
        .parse_args(&args.script, &args.args)
        .map_err(CliError::Core)?;

    debug!(
        options = parsed.options.len(),
        positionals = parsed.positionals.len(),
        help = parsed.reserved.help,
        "arguments parsed"
    );
    output.json(&parsed, args.compact)
}
