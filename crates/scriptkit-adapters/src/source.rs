//! Script source reader backed by the local filesystem.

use std::path::Path;

use scriptkit_core::{
    application::{ApplicationError, ports::ScriptReader},
    error::ScaffoldResult,
};

/// Reads script sources with `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScriptReader;

impl ScriptReader for FsScriptReader {
    fn read(&self, path: &Path) -> ScaffoldResult<String> {
        std::fs::read_to_string(path).map_err(|e| {
            ApplicationError::SourceUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptkit_core::error::ErrorCategory;
    use std::io::Write;

    #[test]
    fn reads_existing_script() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# @usage\n# -q --quiet\n# @end").unwrap();

        let source = FsScriptReader.read(file.path()).unwrap();
        assert!(source.contains("@usage"));
    }

    #[test]
    fn missing_script_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsScriptReader
            .read(&dir.path().join("absent.sh"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("absent.sh"));
    }
}
