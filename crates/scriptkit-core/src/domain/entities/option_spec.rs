use serde::Serialize;
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::validation::DomainValidator;

/// Declarative description of one command-line flag.
///
/// Invariant: at least one of `short` / `long` is present. Enforced by
/// [`OptionSet::new`] through the domain validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub short: Option<char>,
    pub long: Option<String>,
    /// Value placeholder (`arg` for `[arg]`); `Some` means the option takes a value.
    pub placeholder: Option<String>,
    pub default: Option<String>,
    pub repeatable: bool,
    pub required: bool,
    pub description: String,
}

impl OptionSpec {
    /// A value-less flag.
    pub fn switch(short: Option<char>, long: Option<&str>) -> Self {
        Self {
            short,
            long: long.map(String::from),
            placeholder: None,
            default: None,
            repeatable: false,
            required: false,
            description: String::new(),
        }
    }

    /// A flag that consumes the next token as its value.
    pub fn valued(short: Option<char>, long: Option<&str>, placeholder: &str) -> Self {
        Self {
            placeholder: Some(placeholder.to_string()),
            ..Self::switch(short, long)
        }
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn takes_value(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Key used in the parsed option map (long form preferred).
    pub fn name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Flag forms as they appear on the command line: `-f, --file`.
    pub fn flags(&self) -> String {
        match (self.short, &self.long) {
            (Some(s), Some(l)) => format!("-{s}, --{l}"),
            (Some(s), None) => format!("-{s}"),
            (None, Some(l)) => format!("    --{l}"),
            (None, None) => String::new(),
        }
    }

    /// Short human form used in error messages: `-f (--file)`.
    pub fn display_name(&self) -> String {
        match (self.short, &self.long) {
            (Some(s), Some(l)) => format!("-{s} (--{l})"),
            (Some(s), None) => format!("-{s}"),
            (None, Some(l)) => format!("--{l}"),
            (None, None) => "<unnamed>".into(),
        }
    }

    pub fn matches_short(&self, c: char) -> bool {
        self.short == Some(c)
    }

    pub fn matches_long(&self, s: &str) -> bool {
        self.long.as_deref() == Some(s)
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flags().trim_start())?;
        if let Some(p) = &self.placeholder {
            write!(f, " [{p}]")?;
        }
        Ok(())
    }
}

// ── Reserved flags ───────────────────────────────────────────────────────────

/// Flags every script gets from the scaffold. Scripts may not redeclare them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedFlag {
    Debug,
    Verbose,
    Help,
    NoColor,
}

impl ReservedFlag {
    pub const ALL: [ReservedFlag; 4] = [Self::Debug, Self::Verbose, Self::Help, Self::NoColor];

    pub const fn short(self) -> char {
        match self {
            Self::Debug => 'd',
            Self::Verbose => 'v',
            Self::Help => 'h',
            Self::NoColor => 'n',
        }
    }

    pub const fn long(self) -> Option<&'static str> {
        match self {
            Self::Debug => Some("debug"),
            Self::Verbose => None,
            Self::Help => Some("help"),
            Self::NoColor => Some("no-color"),
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Debug => "Enable debug mode: debug logging, execution tracing, failure backtraces",
            Self::Verbose => "Echo execution steps as they start",
            Self::Help => "Print this help and exit",
            Self::NoColor => "Disable colored log output",
        }
    }

    pub fn from_short(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.short() == c)
    }

    pub fn from_long(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.long() == Some(s))
    }

    /// The reserved flag rendered as an ordinary spec, for help output.
    pub fn spec(self) -> OptionSpec {
        OptionSpec::switch(Some(self.short()), self.long()).with_description(self.description())
    }
}

/// Reserved flags observed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReservedFlags {
    pub debug: bool,
    pub verbose: bool,
    pub help: bool,
    pub no_color: bool,
}

impl ReservedFlags {
    pub fn set(&mut self, flag: ReservedFlag) {
        match flag {
            ReservedFlag::Debug => self.debug = true,
            ReservedFlag::Verbose => self.verbose = true,
            ReservedFlag::Help => self.help = true,
            ReservedFlag::NoColor => self.no_color = true,
        }
    }
}

// ── OptionSet ────────────────────────────────────────────────────────────────

/// A validated, ordered set of script options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionSet {
    specs: Vec<OptionSpec>,
}

impl OptionSet {
    /// Validate and wrap a list of specs (declaration order is kept).
    pub fn new(specs: Vec<OptionSpec>) -> Result<Self, DomainError> {
        DomainValidator::validate_option_specs(&specs)?;
        Ok(Self { specs })
    }

    pub fn by_short(&self, c: char) -> Option<(usize, &OptionSpec)> {
        self.specs.iter().enumerate().find(|(_, s)| s.matches_short(c))
    }

    pub fn by_long(&self, name: &str) -> Option<(usize, &OptionSpec)> {
        self.specs.iter().enumerate().find(|(_, s)| s.matches_long(name))
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a OptionSpec;
    type IntoIter = std::slice::Iter<'a, OptionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_prefers_long_form() {
        let spec = OptionSpec::valued(Some('f'), Some("file"), "arg");
        assert_eq!(spec.name(), "file");
        assert_eq!(OptionSpec::switch(Some('x'), None).name(), "x");
    }

    #[test]
    fn display_name_shows_both_forms() {
        let spec = OptionSpec::valued(Some('f'), Some("file"), "arg");
        assert_eq!(spec.display_name(), "-f (--file)");
        assert_eq!(spec.to_string(), "-f, --file [arg]");
    }

    #[test]
    fn reserved_lookup_by_either_form() {
        assert_eq!(ReservedFlag::from_short('h'), Some(ReservedFlag::Help));
        assert_eq!(ReservedFlag::from_long("no-color"), Some(ReservedFlag::NoColor));
        assert_eq!(ReservedFlag::from_long("verbose"), None);
        assert_eq!(ReservedFlag::from_short('x'), None);
    }

    #[test]
    fn option_set_lookup() {
        let set = OptionSet::new(vec![
            OptionSpec::valued(Some('f'), Some("file"), "arg"),
            OptionSpec::switch(Some('x'), None).repeatable(),
        ])
        .unwrap();

        assert_eq!(set.by_short('x').map(|(i, _)| i), Some(1));
        assert_eq!(set.by_long("file").map(|(i, _)| i), Some(0));
        assert!(set.by_long("x").is_none());
        assert!(set.get("file").is_some());
    }

    #[test]
    fn option_set_rejects_duplicates() {
        let err = OptionSet::new(vec![
            OptionSpec::switch(Some('x'), None),
            OptionSpec::switch(Some('x'), Some("extra")),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::DuplicateFlag { flag: "-x".into() });
    }

    #[test]
    fn option_set_rejects_reserved_forms() {
        let err = OptionSet::new(vec![OptionSpec::switch(Some('q'), Some("help"))]).unwrap_err();
        assert_eq!(err, DomainError::ReservedFlag { flag: "--help".into() });
    }
}
