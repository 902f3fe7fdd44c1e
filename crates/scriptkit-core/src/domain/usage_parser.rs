//! Usage-block extractor.
//!
//! Turns a script's own source text into a [`UsageDoc`] in two pure stages:
//!
//! 1. [`locate_blocks`] finds the `@usage … @end` block (and the optional
//!    `@helptext … @end` block), stripping comment prefixes.
//! 2. [`parse_usage_block`] reads option lines into [`OptionSpec`]s.
//!
//! ```text
//! //! @usage
//! //!   -f --file  [arg] Filename to process. Required.
//! //!   -t --temp  [arg] Location of tempfile. Default="/tmp/bar"
//! //!   -x               Specify a flag. Can be repeated.
//! //! @end
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::entities::{OptionSet, OptionSpec, UsageDoc};
use crate::domain::error::DomainError;

const USAGE_MARKER: &str = "@usage";
const HELPTEXT_MARKER: &str = "@helptext";
const END_MARKER: &str = "@end";

/// Comment prefixes stripped from block lines, longest first.
const COMMENT_PREFIXES: [&str; 4] = ["//!", "///", "//", "#"];

/// Regex patterns for option lines and description markers.
static PATTERNS: LazyLock<UsagePatterns> = LazyLock::new(UsagePatterns::new);

struct UsagePatterns {
    option: Regex,
    required: Regex,
    repeatable: Regex,
    default: Regex,
}

impl UsagePatterns {
    fn new() -> Self {
        Self {
            option: Regex::new(
                r"^(?:-(?P<short>[A-Za-z0-9])(?:\s+|$))?(?:--(?P<long>[A-Za-z0-9][A-Za-z0-9-]*)(?:\s+|$))?(?:\[(?P<placeholder>[A-Za-z][A-Za-z0-9_-]*)\](?:\s+|$))?(?P<desc>.*)$",
            )
            .unwrap(),
            required: Regex::new(r"(?:^|\s)Required\.(?:\s|$)").unwrap(),
            repeatable: Regex::new(r"(?:^|\s)Can be repeated\.(?:\s|$)").unwrap(),
            default: Regex::new(r#"Default=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>\S+))"#)
                .unwrap(),
        }
    }
}

/// A source line inside a documentation block: 1-based line number and
/// text with the comment prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLine {
    pub number: usize,
    pub text: String,
}

/// Raw documentation blocks found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlocks {
    pub usage: Vec<BlockLine>,
    pub helptext: Option<Vec<BlockLine>>,
}

/// Extract and parse the usage documentation of a script.
pub fn extract_usage(source: &str) -> Result<UsageDoc, DomainError> {
    let blocks = locate_blocks(source)?;
    let mut doc = parse_usage_block(&blocks.usage)?;
    doc.helptext = blocks.helptext.as_deref().map(dedent).filter(|t| !t.is_empty());
    Ok(doc)
}

/// Stage 1: find the documentation blocks in source text.
pub fn locate_blocks(source: &str) -> Result<DocBlocks, DomainError> {
    let mut usage: Option<Vec<BlockLine>> = None;
    let mut helptext: Option<Vec<BlockLine>> = None;
    let mut open: Option<(&'static str, usize, Vec<BlockLine>)> = None;

    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let text = strip_comment(raw);
        let marker = text.trim();

        match open.take() {
            None => {
                let (name, seen) = match marker {
                    USAGE_MARKER => (USAGE_MARKER, usage.is_some()),
                    HELPTEXT_MARKER => (HELPTEXT_MARKER, helptext.is_some()),
                    _ => continue,
                };
                if seen {
                    return Err(DomainError::DuplicateBlock { marker: name, line: number });
                }
                open = Some((name, number, Vec::new()));
            }
            Some((name, start, lines)) => {
                if marker == END_MARKER {
                    if name == USAGE_MARKER {
                        usage = Some(lines);
                    } else {
                        helptext = Some(lines);
                    }
                } else if marker == USAGE_MARKER || marker == HELPTEXT_MARKER {
                    return Err(DomainError::UnterminatedBlock { marker: name, line: start });
                } else {
                    let mut lines = lines;
                    lines.push(BlockLine {
                        number,
                        text: text.to_string(),
                    });
                    open = Some((name, start, lines));
                }
            }
        }
    }

    if let Some((marker, line, _)) = open {
        return Err(DomainError::UnterminatedBlock { marker, line });
    }

    let usage = usage.ok_or(DomainError::MissingUsageBlock)?;
    if usage.iter().all(|l| l.text.trim().is_empty()) {
        return Err(DomainError::EmptyUsageBlock);
    }

    Ok(DocBlocks { usage, helptext })
}

/// Stage 2: parse the lines of a usage block.
pub fn parse_usage_block(lines: &[BlockLine]) -> Result<UsageDoc, DomainError> {
    let mut synopsis = Vec::new();
    let mut specs: Vec<OptionSpec> = Vec::new();

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }

        if text.starts_with('-') {
            specs.push(parse_option_line(line.number, text)?);
        } else if let Some(last) = specs.last_mut() {
            if !last.description.is_empty() {
                last.description.push(' ');
            }
            last.description.push_str(text);
        } else {
            synopsis.push(text.to_string());
        }
    }

    let specs = specs.into_iter().map(apply_markers).collect();

    Ok(UsageDoc {
        synopsis,
        options: OptionSet::new(specs)?,
        helptext: None,
    })
}

fn parse_option_line(number: usize, text: &str) -> Result<OptionSpec, DomainError> {
    let malformed = |reason: &str| DomainError::MalformedOption {
        line: number,
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let caps = PATTERNS
        .option
        .captures(text)
        .ok_or_else(|| malformed("unrecognised option syntax"))?;

    let short = caps.name("short").and_then(|m| m.as_str().chars().next());
    let long = caps.name("long").map(|m| m.as_str());
    let placeholder = caps.name("placeholder").map(|m| m.as_str());
    let desc = caps.name("desc").map(|m| m.as_str().trim()).unwrap_or("");

    if short.is_none() && long.is_none() {
        return Err(malformed("expected '-x' or '--long' at the start of the line"));
    }
    if desc.starts_with('-') {
        return Err(malformed("unexpected flag after the option forms"));
    }
    if desc.starts_with('[') {
        return Err(malformed("value placeholder must look like [name]"));
    }

    let spec = match placeholder {
        Some(p) => OptionSpec::valued(short, long, p),
        None => OptionSpec::switch(short, long),
    };
    Ok(spec.with_description(desc))
}

fn apply_markers(mut spec: OptionSpec) -> OptionSpec {
    let desc = spec.description.as_str();
    spec.required = PATTERNS.required.is_match(desc);
    spec.repeatable = PATTERNS.repeatable.is_match(desc);
    spec.default = PATTERNS.default.captures(desc).and_then(|caps| {
        caps.name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("bare"))
            .map(|m| m.as_str().to_string())
    });
    spec
}

fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    COMMENT_PREFIXES
        .iter()
        .find_map(|p| trimmed.strip_prefix(p))
        .unwrap_or(trimmed)
}

/// Remove the common indentation and surrounding blank lines.
fn dedent(lines: &[BlockLine]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .map(|l| l.text.len() - l.text.trim_start().len())
        .min()
        .unwrap_or(0);

    let body: Vec<&str> = lines
        .iter()
        .map(|l| l.text.get(indent..).unwrap_or("").trim_end())
        .collect();

    let start = body.iter().position(|l| !l.is_empty()).unwrap_or(body.len());
    let end = body.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    body[start..end].join("\n")
}
