//! Process environment and file system access
//!
//! Sources read environment variables and files through the [`Environment`]
//! trait so that resolution can run against an in-memory environment in tests
//! or when embedding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Read-only access to environment variables and file contents
pub trait Environment: Send + Sync {
    /// The value of an environment variable, `None` if unset or not unicode
    fn var(&self, name: &str) -> Option<String>;

    /// Full file contents, `None` if the file cannot be read for any reason
    fn read_file(&self, path: &Path) -> Option<String>;
}

/// The real process environment and file system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                // Unreadable is treated as absent; keep the reason for debugging
                log::debug!("Could not read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// An in-memory environment
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
    files: HashMap<PathBuf, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Add a readable file
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_map_environment() {
        let env = MapEnvironment::new()
            .with_var("PORT", "8080")
            .with_file("/run/secrets/token", "abc\n");

        assert_eq!(env.var("PORT").as_deref(), Some("8080"));
        assert_eq!(env.var("HOST"), None);
        assert_eq!(
            env.read_file(Path::new("/run/secrets/token")).as_deref(),
            Some("abc\n")
        );
        assert_eq!(env.read_file(Path::new("/run/secrets/other")), None);
    }

    #[test]
    fn test_system_environment_reads_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "contents").unwrap();

        let env = SystemEnvironment;
        assert_eq!(env.read_file(file.path()).as_deref(), Some("contents"));
        assert_eq!(env.read_file(Path::new("/nonexistent/confval/file")), None);
    }

    #[test]
    fn test_system_environment_reads_vars() {
        std::env::set_var("CONFVAL_ENVIRONMENT_TEST_VAR", "value");
        assert_eq!(
            SystemEnvironment.var("CONFVAL_ENVIRONMENT_TEST_VAR").as_deref(),
            Some("value")
        );
        std::env::remove_var("CONFVAL_ENVIRONMENT_TEST_VAR");
        assert_eq!(SystemEnvironment.var("CONFVAL_ENVIRONMENT_TEST_VAR"), None);
    }
}
