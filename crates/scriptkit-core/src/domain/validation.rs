use std::collections::HashSet;

use crate::domain::entities::option_spec::{OptionSpec, ReservedFlag};
use crate::domain::error::DomainError;

/// Centralized domain validation.
///
/// All option-table invariants live here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// Check one spec in isolation: it is named and its markers agree.
    pub fn validate_option_spec(spec: &OptionSpec) -> Result<(), DomainError> {
        if spec.short.is_none() && spec.long.is_none() {
            return Err(DomainError::NamelessOption);
        }

        let conflict = |reason: &str| DomainError::ConflictingMarkers {
            flag: spec.display_name(),
            reason: reason.to_string(),
        };

        if spec.required && !spec.takes_value() {
            return Err(conflict("only options taking a value can be required"));
        }
        if spec.default.is_some() {
            if !spec.takes_value() {
                return Err(conflict("a default needs a value placeholder"));
            }
            if spec.required {
                return Err(conflict("a required option cannot have a default"));
            }
            if spec.repeatable {
                return Err(conflict("a repeatable option cannot have a default"));
            }
        }
        Ok(())
    }

    /// Check a whole table: every spec is valid, forms and map keys are
    /// unique, and no form collides with a reserved flag.
    pub fn validate_option_specs(specs: &[OptionSpec]) -> Result<(), DomainError> {
        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();
        let mut keys = HashSet::new();

        for spec in specs {
            Self::validate_option_spec(spec)?;

            if let Some(c) = spec.short {
                if ReservedFlag::from_short(c).is_some() {
                    return Err(DomainError::ReservedFlag { flag: format!("-{c}") });
                }
                if !shorts.insert(c) {
                    return Err(DomainError::DuplicateFlag { flag: format!("-{c}") });
                }
            }
            if let Some(long) = spec.long.as_deref() {
                if ReservedFlag::from_long(long).is_some() {
                    return Err(DomainError::ReservedFlag { flag: format!("--{long}") });
                }
                if !longs.insert(long) {
                    return Err(DomainError::DuplicateFlag { flag: format!("--{long}") });
                }
            }
            // A short-only option is keyed by its letter, so `--x` elsewhere
            // would share its slot in the option map.
            if !keys.insert(spec.name()) {
                return Err(DomainError::DuplicateFlag {
                    flag: spec.display_name(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_switch_is_rejected() {
        let spec = OptionSpec::switch(Some('x'), None).required();
        assert!(matches!(
            DomainValidator::validate_option_spec(&spec),
            Err(DomainError::ConflictingMarkers { .. })
        ));
    }

    #[test]
    fn required_with_default_is_rejected() {
        let spec = OptionSpec::valued(Some('f'), None, "arg")
            .required()
            .with_default("a");
        assert!(DomainValidator::validate_option_spec(&spec).is_err());
    }

    #[test]
    fn default_on_valued_option_is_fine() {
        let spec = OptionSpec::valued(Some('t'), Some("temp"), "arg").with_default("/tmp/bar");
        assert!(DomainValidator::validate_option_spec(&spec).is_ok());
    }

    #[test]
    fn nameless_is_rejected() {
        let spec = OptionSpec::switch(None, None);
        assert_eq!(
            DomainValidator::validate_option_spec(&spec),
            Err(DomainError::NamelessOption)
        );
    }

    #[test]
    fn reserved_short_is_rejected_even_with_other_long() {
        let specs = [OptionSpec::switch(Some('d'), Some("dry-run"))];
        assert_eq!(
            DomainValidator::validate_option_specs(&specs),
            Err(DomainError::ReservedFlag { flag: "-d".into() })
        );
    }

    #[test]
    fn duplicate_long_is_rejected() {
        let specs = [
            OptionSpec::switch(Some('a'), Some("all")),
            OptionSpec::switch(Some('b'), Some("all")),
        ];
        assert_eq!(
            DomainValidator::validate_option_specs(&specs),
            Err(DomainError::DuplicateFlag { flag: "--all".into() })
        );
    }

    #[test]
    fn short_only_key_clashing_with_long_is_rejected() {
        let specs = [
            OptionSpec::switch(Some('x'), None).repeatable(),
            OptionSpec::valued(Some('y'), Some("x"), "arg"),
        ];
        assert!(matches!(
            DomainValidator::validate_option_specs(&specs),
            Err(DomainError::DuplicateFlag { .. })
        ));
    }
}
