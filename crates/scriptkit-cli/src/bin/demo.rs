//! scriptkit-demo: a reference script built on the scriptkit scaffold.
//!
//! The block below is both documentation and the option declaration: the
//! scaffold reads it from this file's own source at startup.
//!
//! @usage
//! Process input files into a report, demonstrating the scaffold.
//!
//! -f --file      [arg] Filename to process. Required.
//! -t --temp      [arg] Location of tempfile. Default="/tmp/bar"
//! -i --input     [arg] Input file. Can be repeated.
//! -x                   Specify a flag. Can be repeated.
//! -1 --one             Do just one thing.
//! -E --emergency       Log an emergency and stop immediately.
//! -F --fail      [arg] Fail the run with the given message.
//! -P --panic           Panic inside the script body.
//! -s --sleep     [arg] Seconds to wait before writing the report.
//! @end
//!
//! @helptext
//! Positional arguments are files to count lines in.
//!
//! Examples:
//!   scriptkit-demo -f out.txt -i a.csv -i b.csv
//!   LOG_LEVEL=7 scriptkit-demo -f out.txt -xxx notes.txt
//! @end

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use console::Term;
use tracing::instrument;

use scriptkit_core::prelude::*;

const SOURCE: &str = include_str!("demo.rs");

fn main() -> ExitCode {
    // Missing .env is fine; LOG_LEVEL / NO_COLOR may also come from there.
    let _ = dotenvy::dotenv();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let invocation =
        scriptkit_adapters::scaffold_service().boot("scriptkit-demo", SOURCE, &argv);

    let logger = invocation.logger().clone();
    invocation.on_exit("demo-farewell", move || {
        logger.notice("Removing demo scratch state");
    });

    invocation.run(body)
}

#[instrument(name = "body", skip_all)]
fn body(inv: &Invocation) -> Result<(), Failure> {
    let log = inv.logger();
    let options = inv.options();

    let file = options.scalar("file").or_fail("no output file")?;
    log.info(Message::new("Processing").and(file));
    log.debug(Message::new("Temp location").and(options.scalar("temp").unwrap_or("-")));

    for input in options.sequence("input") {
        log.info(Message::new("Reading input").and(input));
    }
    if options.count("x") > 0 {
        log.debug(format!("Flag x given {} time(s)", options.count("x")));
    }
    if options.is_set("one") {
        log.notice("Doing just one thing");
    }

    if options.is_set("emergency") {
        log.emergency("Emergency requested with -E");
    }
    if let Some(reason) = options.scalar("fail") {
        return Err(Failure::new(reason));
    }
    if options.is_set("panic") {
        panic!("panic requested with -P");
    }

    for path in inv.positionals() {
        let lines = count_lines(path)?;
        log.info(format!("{path}: {lines} line(s)"));
    }

    if let Some(secs) = options.scalar("sleep") {
        let secs: u64 = secs.parse()?;
        log.info(format!("Sleeping for {secs} second(s)"));
        std::thread::sleep(Duration::from_secs(secs));
    }

    let json = serde_json::to_string(options)?;
    Term::stdout().write_line(&json)?;
    Ok(())
}

fn count_lines(path: &str) -> anyhow::Result<usize> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    Ok(text.lines().count())
}
