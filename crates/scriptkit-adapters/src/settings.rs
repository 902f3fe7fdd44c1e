//! Environment settings adapter.
//!
//! Reads the two overrides a generated script honours:
//!
//! | Variable    | Meaning                                           |
//! |-------------|---------------------------------------------------|
//! | `LOG_LEVEL` | threshold 0..=7, default 6; anything else is fatal |
//! | `NO_COLOR`  | set (and not `false`/`0`) disables colors         |
//!
//! Only those two variables are handed to the `config` crate, so unrelated
//! environment never affects the result.

use config::{Config, Environment};
use serde::Deserialize;

use scriptkit_core::{
    application::{
        ApplicationError,
        ports::{RuntimeSettings, SettingsSource},
    },
    domain::Verbosity,
    error::ScaffoldResult,
};

const LOG_LEVEL: &str = "LOG_LEVEL";
const NO_COLOR: &str = "NO_COLOR";

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(alias = "LOG_LEVEL")]
    log_level: Option<String>,
    #[serde(alias = "NO_COLOR")]
    no_color: Option<String>,
}

/// `LOG_LEVEL` / `NO_COLOR` from a filtered environment map.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    vars: config::Map<String, String>,
}

impl EnvSettings {
    /// Snapshot the process environment.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit variables (tests, embedding).
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k == LOG_LEVEL || k == NO_COLOR)
            .collect();
        Self { vars }
    }

    fn raw(&self) -> ScaffoldResult<RawSettings> {
        let config = Config::builder()
            .add_source(
                Environment::default()
                    .source(Some(self.vars.clone()))
                    .ignore_empty(true),
            )
            .build()
            .map_err(|e| invalid("environment", e))?;

        Ok(config
            .try_deserialize::<RawSettings>()
            .map_err(|e| invalid("environment", e))?)
    }
}

impl SettingsSource for EnvSettings {
    fn load(&self) -> ScaffoldResult<RuntimeSettings> {
        let raw = self.raw()?;

        let log_level = match raw.log_level.as_deref().map(str::trim) {
            None | Some("") => Verbosity::default(),
            Some(value) => value.parse::<Verbosity>().map_err(|_| {
                invalid(
                    LOG_LEVEL,
                    format!("'{value}' is not an integer from 0 to 7"),
                )
            })?,
        };

        let no_color = raw.no_color.as_deref().is_some_and(disables_color);

        Ok(RuntimeSettings {
            log_level,
            no_color,
        })
    }
}

fn disables_color(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

fn invalid(key: &'static str, reason: impl ToString) -> ApplicationError {
    ApplicationError::InvalidSetting {
        key,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptkit_core::error::{ErrorCategory, ScaffoldError};

    fn load(vars: &[(&str, &str)]) -> ScaffoldResult<RuntimeSettings> {
        EnvSettings::from_vars(vars.iter().copied()).load()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = load(&[]).unwrap();
        assert_eq!(settings.log_level.level(), 6);
        assert!(!settings.no_color);
    }

    #[test]
    fn reads_log_level() {
        assert_eq!(load(&[("LOG_LEVEL", "3")]).unwrap().log_level.level(), 3);
        assert_eq!(load(&[("LOG_LEVEL", "0")]).unwrap().log_level.level(), 0);
        assert_eq!(load(&[("LOG_LEVEL", "7")]).unwrap().log_level.level(), 7);
    }

    #[test]
    fn invalid_log_level_is_configuration_error() {
        for bad in ["8", "loud", "-1", "6.5"] {
            let err = load(&[("LOG_LEVEL", bad)]).unwrap_err();
            assert!(
                matches!(
                    err,
                    ScaffoldError::Application(ApplicationError::InvalidSetting { key: "LOG_LEVEL", .. })
                ),
                "{bad}: {err}"
            );
            assert_eq!(err.category(), ErrorCategory::Configuration);
        }
    }

    #[test]
    fn no_color_semantics() {
        assert!(load(&[("NO_COLOR", "1")]).unwrap().no_color);
        assert!(load(&[("NO_COLOR", "yes")]).unwrap().no_color);
        assert!(!load(&[("NO_COLOR", "0")]).unwrap().no_color);
        assert!(!load(&[("NO_COLOR", "false")]).unwrap().no_color);
        assert!(!load(&[("NO_COLOR", "")]).unwrap().no_color);
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let settings = load(&[("LOG_LEVEL_EXTRA", "banana"), ("PATH", "/bin")]).unwrap();
        assert_eq!(settings, RuntimeSettings::default());
    }
}
