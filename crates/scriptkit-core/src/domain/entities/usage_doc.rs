use serde::Serialize;

use crate::domain::entities::option_spec::{OptionSet, OptionSpec, ReservedFlag};

/// Everything extracted from a script's documentation blocks.
///
/// This is the single source of truth for both argument parsing and help
/// output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageDoc {
    /// Free text lines preceding the first option line.
    pub synopsis: Vec<String>,
    pub options: OptionSet,
    /// Contents of the optional `@helptext` block.
    pub helptext: Option<String>,
}

impl UsageDoc {
    /// Render help text, optionally prefixed with the reason it is shown.
    pub fn render_help(&self, program: &str, reason: Option<&str>) -> String {
        let mut out = String::new();
        out.push('\n');

        if let Some(reason) = reason {
            out.push_str(&format!(" {reason}\n\n"));
        }

        out.push_str(&format!("  Usage: {program} [OPTIONS]\n"));
        for line in &self.synopsis {
            out.push_str(&format!("  {line}\n"));
        }
        out.push('\n');

        let reserved: Vec<OptionSpec> = ReservedFlag::ALL.iter().map(|r| r.spec()).collect();
        let rows: Vec<(String, &str)> = self
            .options
            .iter()
            .chain(reserved.iter())
            .map(|spec| (option_column(spec), spec.description.as_str()))
            .collect();
        let width = rows.iter().map(|(c, _)| c.len()).max().unwrap_or(0);

        out.push_str("  Options:\n");
        for (column, description) in &rows {
            let line = format!("    {column:<width$}  {description}");
            out.push_str(line.trim_end());
            out.push('\n');
        }

        if let Some(text) = &self.helptext {
            out.push('\n');
            for line in text.lines() {
                let line = format!("  {line}");
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }

        out.push('\n');
        out
    }
}

fn option_column(spec: &OptionSpec) -> String {
    match &spec.placeholder {
        Some(p) => format!("{} [{p}]", spec.flags()),
        None => spec.flags(),
    }
}
