//! Configuration path utilities for toolbook.
//!
//! This module resolves the catalog database path and the default-tool
//! context file, expanding shell variables like `~` in paths. The context is
//! always read into an explicit value at action start and passed down;
//! there is no process-wide default-tool state.

use log::debug;

use crate::error::{Error, Result};

/// Default path for the catalog database
const DEFAULT_DB_PATH: &str = "~/.toolbook/catalog.db";
/// Default path for the default-tool context file
const DEFAULT_CONTEXT_PATH: &str = "~/.toolbook/context";

/// Environment variable overriding the catalog database path
pub const DB_PATH_ENV: &str = "TOOLBOOK_DB";

/// Default shell to run snippets under
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Resolves the catalog database path.
///
/// Precedence: explicit argument, then the `TOOLBOOK_DB` environment
/// variable, then the default location. Shell expansions like `~` are
/// resolved.
pub fn get_db_path(db_path_arg: &Option<String>) -> String {
    let db_path = match db_path_arg {
        Some(db_path) => db_path.clone(),
        None => std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
    };

    shellexpand::tilde(&db_path).to_string()
}

/// Resolves the default-tool context file path.
pub fn get_context_path(context_path_arg: &Option<String>) -> String {
    let context_path = match context_path_arg {
        Some(context_path) => context_path,
        None => DEFAULT_CONTEXT_PATH,
    };

    shellexpand::tilde(context_path).to_string()
}

/// Reads the default tool name from the context file.
///
/// Returns `None` when the file does not exist or holds only whitespace.
///
/// # Errors
///
/// Returns an error for any IO failure other than the file being absent.
pub fn read_default_tool(context_path: &str) -> Result<Option<String>> {
    match std::fs::read_to_string(context_path) {
        Ok(contents) => {
            let name = contents.trim();
            if name.is_empty() {
                Ok(None)
            } else {
                Ok(Some(name.to_string()))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io_error("context", context_path, e)),
    }
}

/// Writes the default tool name to the context file, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_default_tool(context_path: &str, name: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(context_path).parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io_error("context directory", context_path, e))?;
    }

    debug!("Setting default tool to `{name}`");
    std::fs::write(context_path, format!("{}\n", name.trim()))
        .map_err(|e| Error::io_error("context", context_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_db_path_with_custom_path() {
        let custom_path = Some("/custom/path/catalog.db".to_string());
        let result = get_db_path(&custom_path);
        assert_eq!(result, "/custom/path/catalog.db");
    }

    #[test]
    fn test_get_db_path_expands_tilde() {
        let tilde_path = Some("~/my-catalog.db".to_string());
        let result = get_db_path(&tilde_path);
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("my-catalog.db"));
    }

    #[test]
    fn test_get_context_path_with_none() {
        let result = get_context_path(&None);
        assert!(result.contains("context"));
        assert!(!result.starts_with('~'));
    }

    #[test]
    fn test_context_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context");
        let path = path.to_str().unwrap();

        assert!(read_default_tool(path).unwrap().is_none());

        write_default_tool(path, "curl").unwrap();
        assert_eq!(read_default_tool(path).unwrap(), Some("curl".to_string()));

        write_default_tool(path, "  ").unwrap();
        assert!(read_default_tool(path).unwrap().is_none());
    }

    #[test]
    fn test_default_shell_constant() {
        assert_eq!(DEFAULT_SHELL, "/bin/bash");
    }
}
