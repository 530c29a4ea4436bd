//! Data validation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::data::RulesetData;
use arena_core::ruleset::Ruleset;
use thiserror::Error;

/// Error type for directory-level validation failures.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// Directory not found.
    #[error("Data directory not found: {0}")]
    DirectoryNotFound(String),
    /// Failed to list a directory.
    #[error("Failed to read directory '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Validation result for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File checked.
    pub path: PathBuf,
    /// Ruleset name, if the file parsed.
    pub name: Option<String>,
    /// Non-fatal data defects.
    pub issues: Vec<String>,
    /// Why the file cannot be used at all.
    pub fatal: Option<String>,
}

/// Validation results for a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// One entry per `.ron` file, in path order.
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// Whether any file is unusable.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.files.iter().any(|f| f.fatal.is_some())
    }

    /// Number of unusable files.
    #[must_use]
    pub fn fatal_count(&self) -> usize {
        self.files.iter().filter(|f| f.fatal.is_some()).count()
    }

    /// Total non-fatal issues.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }
}

/// Validate one ruleset file.
///
/// Parse failures and rulesets [`Ruleset::from_data`] rejects are fatal;
/// everything else [`RulesetData::validate`] reports is an issue.
#[must_use]
pub fn validate_ruleset_file(path: &Path) -> FileReport {
    let mut report = FileReport {
        path: path.to_path_buf(),
        name: None,
        issues: Vec::new(),
        fatal: None,
    };

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            report.fatal = Some(format!("Failed to read file: {e}"));
            return report;
        }
    };
    let data: RulesetData = match ron::from_str(&contents) {
        Ok(data) => data,
        Err(e) => {
            report.fatal = Some(format!("Failed to parse ruleset: {e}"));
            return report;
        }
    };

    report.name = Some(data.name.clone());
    report.issues = data.validate();
    if let Err(e) = Ruleset::from_data(data) {
        report.fatal = Some(e.to_string());
    }
    report
}

/// Validate all RON ruleset files under a directory, recursively.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed. Problems inside
/// individual files are collected in the report instead.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport, ValidateError> {
    if !path.is_dir() {
        return Err(ValidateError::DirectoryNotFound(path.display().to_string()));
    }

    let mut files = Vec::new();
    collect_ron_files(path, &mut files)?;
    files.sort();

    let report = ValidationReport {
        files: files.iter().map(|p| validate_ruleset_file(p)).collect(),
    };
    tracing::debug!(
        files = report.files.len(),
        fatal = report.fatal_count(),
        issues = report.issue_count(),
        "Validation finished"
    );
    Ok(report)
}

fn collect_ron_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ValidateError> {
    let io_err = |source: std::io::Error| ValidateError::Io {
        path: dir.display().to_string(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_ron_files(&path, out)?;
        } else if path.extension().is_some_and(|e| e == "ron") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::ruleset::standard_ruleset_data;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_standard_ruleset_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let src = ron::ser::to_string_pretty(&standard_ruleset_data(), Default::default()).unwrap();
        let path = write(dir.path(), "standard.ron", &src);

        let report = validate_ruleset_file(&path);
        assert_eq!(report.name.as_deref(), Some("standard"));
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert!(report.fatal.is_none());
    }

    #[test]
    fn test_duplicate_status_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "dupe.ron",
            r#"RulesetData(
                name: "dupe",
                statuses: [
                    (id: "stun", name: "Stunned", skip_turn_chance: Some(100)),
                    (id: "stun", name: "Dazed", skip_turn_chance: Some(50)),
                ],
            )"#,
        );

        let report = validate_ruleset_file(&path);
        assert!(report.fatal.is_some());
        assert!(report.issues.iter().any(|i| i.contains("Duplicate status id 'stun'")));
    }

    #[test]
    fn test_directory_walk() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write(dir.path(), "a.ron", r#"RulesetData(name: "a")"#);
        write(&dir.path().join("nested"), "b.ron", "not ron at all (");
        write(dir.path(), "notes.txt", "ignored");

        let report = validate_data_directory(dir.path()).unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.fatal_count(), 1);
        assert!(report.has_fatal());
        assert!(report.files[0].fatal.is_none());
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            validate_data_directory(Path::new("/no/such/dir")),
            Err(ValidateError::DirectoryNotFound(_))
        ));
    }
}
