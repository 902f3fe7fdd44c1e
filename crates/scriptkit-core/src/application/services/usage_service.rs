//! Usage Service - read-only queries over a script's usage block.
//!
//! Backs the `scriptkit` inspection tool. Separated from ScaffoldService
//! because it never touches the process lifecycle.

use std::path::Path;

use tracing::instrument;

use crate::{
    application::ports::ScriptReader,
    domain::{ParsedArgs, UsageDoc, extract_usage, parse},
    error::ScaffoldResult,
};

/// Service for inspecting scripts without running them.
pub struct UsageService {
    reader: Box<dyn ScriptReader>,
}

impl UsageService {
    /// Create a new usage service.
    pub fn new(reader: Box<dyn ScriptReader>) -> Self {
        Self { reader }
    }

    /// Extract the usage block of the script at `path`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn inspect(&self, path: &Path) -> ScaffoldResult<UsageDoc> {
        let source = self.reader.read(path)?;
        Ok(extract_usage(&source)?)
    }

    /// Render the help text the script would print for `--help`.
    pub fn help(&self, path: &Path) -> ScaffoldResult<String> {
        let doc = self.inspect(path)?;
        Ok(doc.render_help(&program_name(path), None))
    }

    /// Parse `argv` the way the script would.
    ///
    /// A `--help` request is returned as success with `reserved.help` set.
    #[instrument(skip(self, argv), fields(path = %path.display(), args = argv.len()))]
    pub fn parse_args(&self, path: &Path, argv: &[String]) -> ScaffoldResult<ParsedArgs> {
        let doc = self.inspect(path)?;
        parse(argv, &doc.options).map_err(|failure| failure.error.into())
    }
}

/// Program name shown in help: the file name of the script.
pub fn program_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::DomainError;
    use crate::error::{ErrorCategory, ScaffoldError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct MapReader(HashMap<PathBuf, String>);

    impl ScriptReader for MapReader {
        fn read(&self, path: &Path) -> ScaffoldResult<String> {
            self.0.get(path).cloned().ok_or_else(|| {
                ApplicationError::SourceUnreadable {
                    path: path.display().to_string(),
                    reason: "not found".into(),
                }
                .into()
            })
        }
    }

    fn service() -> UsageService {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("bin/report"),
            "# @usage\n# -f --file [arg] Input. Required.\n# -q --quiet\n# @end\n".to_string(),
        );
        UsageService::new(Box::new(MapReader(files)))
    }

    #[test]
    fn inspect_returns_option_table() {
        let doc = service().inspect(Path::new("bin/report")).unwrap();
        assert_eq!(doc.options.len(), 2);
        assert!(doc.options.get("file").unwrap().required);
    }

    #[test]
    fn help_uses_file_name_as_program() {
        let help = service().help(Path::new("bin/report")).unwrap();
        assert!(help.contains("Usage: report [OPTIONS]"));
    }

    #[test]
    fn parse_args_maps_usage_errors() {
        let err = service()
            .parse_args(Path::new("bin/report"), &["--quiet".to_string()])
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Domain(DomainError::MissingRequired { .. })
        ));
        assert_eq!(err.category(), ErrorCategory::Usage);
    }

    #[test]
    fn missing_script_is_configuration_error() {
        let err = service().inspect(Path::new("nope")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
