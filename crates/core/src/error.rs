use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Tool '{}' not found.", _0)]
    ToolNotFound(String),

    #[error("No command '{}' for tool '{}'.", .name, .tool)]
    CommandNotFound { tool: String, name: String },

    #[error("Selection {} is out of range (1..={}).", .position, .count)]
    InvalidSelection { position: usize, count: usize },

    #[error("Invalid input: {}", _0)]
    Validation(String),

    #[error("External tool unavailable: {}", _0)]
    ExternalToolUnavailable(String),

    #[error("Catalog store error: {}", _0)]
    Store(#[from] rusqlite::Error),

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("Snippet exited with status {}.", _0)]
    SnippetExit(i32),

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),
}

impl Error {
    pub fn command_not_found(tool: &str, name: &str) -> Self {
        Self::CommandNotFound {
            tool: tool.to_string(),
            name: name.to_string(),
        }
    }

    pub fn io_error(file_description: &str, path: &str, original: std::io::Error) -> Self {
        Self::Io {
            file_description: file_description.to_string(),
            path: path.to_string(),
            original,
        }
    }

    pub fn yaml_error(
        action: &str,
        file_description: &str,
        path: &str,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action: action.to_string(),
            file_description: file_description.to_string(),
            path: path.to_string(),
            original,
        }
    }
}
