//! Argument parser driven by an [`OptionSet`].
//!
//! Tokens are read left to right. Reserved flags are matched before script
//! flags. Accepted forms:
//!
//! - `--long value`, `--long=value`
//! - `-f value`, `-fvalue`
//! - `-xxx` (clustered switches; the last one may take a value)
//! - `--` ends option parsing; other non-flag tokens are positionals

use serde::Serialize;

use crate::domain::entities::{
    OptionSet, OptionSpec, OptionValue, OptionValues, ReservedFlag, ReservedFlags,
};
use crate::domain::error::DomainError;

/// Result of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedArgs {
    pub options: OptionValues,
    pub positionals: Vec<String>,
    pub reserved: ReservedFlags,
}

/// A usage error together with the reserved flags seen before it, so the
/// caller can still honour `-n` / `-d` while reporting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageFailure {
    pub error: DomainError,
    pub reserved: ReservedFlags,
}

/// Parse `argv` (program name excluded) against `specs`.
///
/// When `-h`/`--help` appears before any usage error, the parse succeeds
/// with `reserved.help` set and required options are not checked.
pub fn parse<S: AsRef<str>>(argv: &[S], specs: &OptionSet) -> Result<ParsedArgs, UsageFailure> {
    let mut state = ParseState::new(specs);

    if let Err(error) = state.consume(argv) {
        if state.reserved.help {
            return Ok(state.finish_for_help());
        }
        return Err(UsageFailure {
            error,
            reserved: state.reserved,
        });
    }

    if state.reserved.help {
        return Ok(state.finish_for_help());
    }

    let reserved = state.reserved;
    state
        .finish()
        .map_err(|error| UsageFailure { error, reserved })
}

struct ParseState<'a> {
    specs: &'a OptionSet,
    slots: Vec<OptionValue>,
    positionals: Vec<String>,
    reserved: ReservedFlags,
}

impl<'a> ParseState<'a> {
    fn new(specs: &'a OptionSet) -> Self {
        Self {
            specs,
            slots: vec![OptionValue::Absent; specs.len()],
            positionals: Vec::new(),
            reserved: ReservedFlags::default(),
        }
    }

    fn consume<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<(), DomainError> {
        let tokens: Vec<&str> = argv.iter().map(|s| s.as_ref()).collect();
        let mut tokens = tokens.into_iter();

        while let Some(token) = tokens.next() {
            if token == "--" {
                self.positionals.extend(tokens.by_ref().map(String::from));
                break;
            }

            if let Some(body) = token.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((n, v)) => (n, Some(v)),
                    None => (body, None),
                };
                self.long_flag(name, inline, &mut tokens)?;
            } else if token.len() > 1 && token.starts_with('-') {
                self.short_cluster(&token[1..], &mut tokens)?;
            } else {
                self.positionals.push(token.to_string());
            }
        }
        Ok(())
    }

    fn long_flag<'t>(
        &mut self,
        name: &str,
        inline: Option<&str>,
        tokens: &mut impl Iterator<Item = &'t str>,
    ) -> Result<(), DomainError> {
        let flag = format!("--{name}");

        if let Some(reserved) = ReservedFlag::from_long(name) {
            if inline.is_some() {
                return Err(DomainError::UnexpectedValue { flag });
            }
            self.reserved.set(reserved);
            return Ok(());
        }

        let specs = self.specs;
        let (idx, spec) = specs
            .by_long(name)
            .ok_or_else(|| DomainError::UnknownFlag { flag: flag.clone() })?;

        if spec.takes_value() {
            let value = match inline {
                Some(v) => v.to_string(),
                None => tokens
                    .next()
                    .map(String::from)
                    .ok_or(DomainError::MissingValue { flag })?,
            };
            record_value(&mut self.slots[idx], spec, value);
        } else {
            if inline.is_some() {
                return Err(DomainError::UnexpectedValue { flag });
            }
            record_switch(&mut self.slots[idx], spec);
        }
        Ok(())
    }

    fn short_cluster<'t>(
        &mut self,
        cluster: &str,
        tokens: &mut impl Iterator<Item = &'t str>,
    ) -> Result<(), DomainError> {
        let specs = self.specs;
        for (pos, c) in cluster.char_indices() {
            if let Some(reserved) = ReservedFlag::from_short(c) {
                self.reserved.set(reserved);
                continue;
            }

            let flag = format!("-{c}");
            let (idx, spec) = specs
                .by_short(c)
                .ok_or_else(|| DomainError::UnknownFlag { flag: flag.clone() })?;

            if spec.takes_value() {
                let rest = &cluster[pos + c.len_utf8()..];
                let value = if rest.is_empty() {
                    tokens
                        .next()
                        .map(String::from)
                        .ok_or(DomainError::MissingValue { flag })?
                } else {
                    rest.to_string()
                };
                record_value(&mut self.slots[idx], spec, value);
                return Ok(());
            }
            record_switch(&mut self.slots[idx], spec);
        }
        Ok(())
    }

    /// Apply defaults and check required options.
    fn finish(self) -> Result<ParsedArgs, DomainError> {
        let mut options = OptionValues::new();

        for (spec, slot) in self.specs.iter().zip(self.slots) {
            let value = match (slot, &spec.default) {
                (OptionValue::Absent, _) if spec.required => {
                    return Err(DomainError::MissingRequired {
                        flag: spec.display_name(),
                    });
                }
                (OptionValue::Absent, Some(default)) => OptionValue::Scalar(default.clone()),
                (value, _) => value,
            };
            options.insert(spec.name(), value);
        }

        Ok(ParsedArgs {
            options,
            positionals: self.positionals,
            reserved: self.reserved,
        })
    }

    fn finish_for_help(self) -> ParsedArgs {
        ParsedArgs {
            options: OptionValues::new(),
            positionals: self.positionals,
            reserved: self.reserved,
        }
    }
}

fn record_value(slot: &mut OptionValue, spec: &OptionSpec, value: String) {
    if spec.repeatable {
        match slot {
            OptionValue::Sequence(values) => values.push(value),
            _ => *slot = OptionValue::Sequence(vec![value]),
        }
    } else {
        *slot = OptionValue::Scalar(value);
    }
}

fn record_switch(slot: &mut OptionValue, spec: &OptionSpec) {
    let next = if spec.repeatable { slot.count() + 1 } else { 1 };
    *slot = OptionValue::Counter(next);
}
