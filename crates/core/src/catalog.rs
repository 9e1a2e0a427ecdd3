use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A tool row as stored in the catalog.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolRow {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl Display for ToolRow {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            formatter.write_str(&self.name)
        } else {
            write!(formatter, "{} ({})", self.name, self.description)
        }
    }
}

/// A command row, always owned by exactly one tool.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub snippet: String,
}

impl Display for CommandRow {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.description.is_empty(), self.snippet.is_empty()) {
            (false, _) => write!(formatter, "{}: {}", self.name, self.description),
            (true, false) => write!(formatter, "{}: {}", self.name, self.snippet),
            (true, true) => formatter.write_str(&self.name),
        }
    }
}

/// A tool with its tags and name-ordered commands, as returned by `show`.
#[derive(Debug, Clone)]
pub struct ToolDetails {
    pub tool: ToolRow,
    pub tags: Vec<String>,
    pub commands: Vec<CommandRow>,
}

/// One row of a `query` result. A tool that matches on its own fields but
/// has no matching command appears with empty command columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRow {
    pub tool: String,
    pub command: String,
    pub description: String,
    pub snippet: String,
}

/// How a command-name filter should match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandMatch {
    Substring(String),
    Exact(String),
}

/// Filters for `Catalog::query`. All fields are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Case-insensitive substring over tool name/description and command
    /// name/description/snippet.
    pub text: Option<String>,
    /// Exact tool name.
    pub tool: Option<String>,
    /// Tag the tool must carry.
    pub tag: Option<String>,
    /// Command-name filter, substring or exact.
    pub command: Option<CommandMatch>,
}

impl QueryFilter {
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

/// Splits a comma-separated tag line into clean tag names.
///
/// Blank entries are dropped and a leading `#` is stripped, so both
/// `"#http,net"` and `"http, net"` yield `["http", "net"]`.
#[must_use]
pub fn split_tags(line: &str) -> Vec<String> {
    line.split(',')
        .map(|t| t.trim().trim_start_matches('#').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_row_display() {
        let with_desc = ToolRow {
            id: 1,
            name: "curl".to_string(),
            description: "HTTP client".to_string(),
        };
        assert_eq!(format!("{with_desc}"), "curl (HTTP client)");

        let bare = ToolRow {
            id: 2,
            name: "jq".to_string(),
            description: String::new(),
        };
        assert_eq!(format!("{bare}"), "jq");
    }

    #[test]
    fn test_command_row_display_falls_back_to_snippet() {
        let cmd = CommandRow {
            id: 1,
            name: "get".to_string(),
            description: String::new(),
            snippet: "curl -s https://example.com".to_string(),
        };
        assert_eq!(format!("{cmd}"), "get: curl -s https://example.com");
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("#http,net"), vec!["http", "net"]);
        assert_eq!(split_tags("http, net ,"), vec!["http", "net"]);
        assert_eq!(split_tags("  "), Vec::<String>::new());
    }
}
