//! Implementation of the `scriptkit inspect` command.

use tracing::{debug, instrument};

use scriptkit_core::{
    application::program_name,
    domain::{OptionSpec, ReservedFlag, UsageDoc},
};

use crate::{
    cli::{InspectArgs, InspectFormat},
    error::{CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(script = %args.script.display()))]
pub fn execute(args: InspectArgs, output: OutputManager) -> CliResult<()> {
    let service = scriptkit_adapters::usage_service();
    let doc = service.inspect(&args.script)?;
    debug!(options = doc.options.len(), "usage block extracted");

    match args.format {
        InspectFormat::Json => output.json(&doc, false),
        InspectFormat::Table => {
            print_table(&program_name(&args.script), &doc, &output)
                .with_cli_context(|| "writing option table")
        }
    }
}

fn print_table(program: &str, doc: &UsageDoc, output: &OutputManager) -> std::io::Result<()> {
    output.header(&format!("Options declared by {program}:"))?;
    for line in &doc.synopsis {
        output.print(&format!("  {line}"))?;
    }
    output.print("")?;

    let rows: Vec<Row> = doc.options.iter().map(Row::from_spec).collect();
    let reserved: Vec<Row> = ReservedFlag::ALL
        .iter()
        .map(|r| Row::from_spec(&r.spec()))
        .collect();

    let flag_width = rows
        .iter()
        .chain(&reserved)
        .map(|r| r.flags.len())
        .max()
        .unwrap_or(0);
    let attr_width = rows
        .iter()
        .chain(&reserved)
        .map(|r| r.attributes.len())
        .max()
        .unwrap_or(0);

    if rows.is_empty() {
        output.print(&output.dim("  (no script options)"))?;
    }
    for row in &rows {
        output.print(&row.render(flag_width, attr_width, output))?;
    }

    output.print("")?;
    output.header("Reserved by the scaffold:")?;
    for row in &reserved {
        output.print(&row.render(flag_width, attr_width, output))?;
    }
    Ok(())
}

/// One table line, unstyled, so widths can be computed before colouring.
struct Row {
    flags: String,
    attributes: String,
    description: String,
}

impl Row {
    fn from_spec(spec: &OptionSpec) -> Self {
        let flags = match &spec.placeholder {
            Some(p) => format!("{} [{p}]", spec.flags()),
            None => spec.flags(),
        };
        Self {
            flags,
            attributes: attributes(spec),
            description: spec.description.clone(),
        }
    }

    fn render(&self, flag_width: usize, attr_width: usize, output: &OutputManager) -> String {
        let flags = format!("{:<flag_width$}", self.flags);
        let attributes = format!("{:<attr_width$}", self.attributes);
        let line = format!(
            "  {}  {}  {}",
            output.flag(&flags),
            output.dim(&attributes),
            self.description
        );
        line.trim_end().to_owned()
    }
}

/// `required, repeatable, default=/tmp/bar` or `-` when nothing applies.
fn attributes(spec: &OptionSpec) -> String {
    let mut parts = Vec::new();
    if spec.required {
        parts.push("required".to_owned());
    }
    if spec.repeatable {
        parts.push("repeatable".to_owned());
    }
    if let Some(default) = &spec.default {
        parts.push(format!("default={default}"));
    }
    if parts.is_empty() {
        "-".to_owned()
    } else {
        parts.join(", ")
    }
}
