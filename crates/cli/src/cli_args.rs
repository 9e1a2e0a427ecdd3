//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure for the `tb`
//! binary using the `clap` crate. Every catalog operation is a subcommand;
//! the database and context paths are global options shared by all of them.

use clap::{Parser, Subcommand};
use toolbook_core::search::DEFAULT_LIMIT;

/// Command-line arguments for the toolbook CLI.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use toolbook_cli::cli_args::Args;
///
/// let args = Args::parse_from(["tb", "show", "curl"]);
/// ```
#[derive(Parser, Debug)]
#[command(name = "tb", about = "Your personal catalog of command-line tools and snippets.")]
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the catalog database.
    ///
    /// If not provided, uses `$TOOLBOOK_DB`, else `~/.toolbook/catalog.db`.
    #[arg(long, short = 'D', global = true)]
    pub db_path: Option<String>,

    /// Path to the default-tool context file.
    ///
    /// If not provided, defaults to `~/.toolbook/context`.
    #[arg(long, global = true)]
    pub context_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add or update a tool.
    AddTool {
        /// Tool name, e.g. 'ironclad'.
        name: String,

        /// Short description.
        #[arg(long = "desc", short = 'd', default_value = "")]
        description: String,

        /// Tags (repeatable).
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// Add or update a command for a tool.
    AddCmd {
        /// Tool name to attach to.
        tool: String,

        /// Subcommand/verb, e.g. 'init', 'list'.
        name: String,

        /// What it does.
        #[arg(long = "desc", short = 'd', default_value = "")]
        description: String,

        /// Command line snippet.
        #[arg(long = "run", short = 'r', default_value = "")]
        snippet: String,
    },

    /// Add or update a command under the default tool set via `tb use`.
    Cmd {
        /// Command name, e.g. 'init', 'list'.
        name: String,

        /// What it does.
        #[arg(long = "desc", short = 'd', default_value = "")]
        description: String,

        /// Command line snippet.
        #[arg(long = "run", short = 'r', default_value = "")]
        snippet: String,

        /// Override the default tool.
        #[arg(long, short = 'T')]
        tool: Option<String>,
    },

    /// Create or update a tool and make it the default context.
    Use {
        /// Tool to use by default.
        name: String,

        /// Short description.
        #[arg(long = "desc", short = 'd', default_value = "")]
        description: String,

        /// Tags (repeatable).
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// List tools, optionally filtered by tag.
    List {
        /// Only tools carrying this tag.
        #[arg(long, short = 't')]
        tag: Option<String>,
    },

    /// Show all tags and their tool counts.
    Tags,

    /// Show a tool with its tags and commands.
    Show {
        /// Tool name.
        name: String,
    },

    /// Search tools and commands by substring.
    Search {
        /// Search text (matched against names, descriptions, and snippets).
        query: String,

        /// Only tools carrying this tag.
        #[arg(long, short = 't')]
        tag: Option<String>,
    },

    /// Fuzzy-search the catalog; an empty query browses in catalog order.
    Find {
        /// Query text; leave empty to browse.
        #[arg(default_value = "")]
        query: String,

        /// Maximum number of results.
        #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Delete a tool and all of its commands.
    RmTool {
        /// Tool name.
        name: String,
    },

    /// Delete a command from a tool.
    RmCmd {
        /// Tool name.
        tool: String,

        /// Command name.
        name: String,
    },

    /// Print a stored snippet; execute it only with --exec.
    Run {
        /// Tool name.
        tool: String,

        /// Command name.
        name: String,

        /// Execute the snippet (after confirmation) instead of only
        /// printing it.
        #[arg(long, short = 'x', action)]
        exec: bool,

        /// Skip the execution confirmation.
        #[arg(long, short = 'y', action)]
        yes: bool,

        /// Copy the snippet to the clipboard.
        #[arg(long, short = 'c', action)]
        copy: bool,

        /// Shell to execute under (defaults to `$SHELL`).
        #[arg(long)]
        shell: Option<String>,
    },

    /// Import tools and commands from a YAML file.
    Import {
        /// YAML file to read.
        path: String,
    },

    /// Export the catalog to a YAML file.
    Export {
        /// YAML file to write.
        path: String,
    },

    /// Export the catalog to a single Markdown file.
    ExportMd {
        /// Markdown file to write.
        path: String,
    },

    /// Browse the catalog interactively.
    Browse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_add_tool_args() {
        let args = Args::parse_from([
            "tb", "add-tool", "curl", "-d", "HTTP client", "-t", "http", "-t", "net",
        ]);

        match args.command {
            Command::AddTool {
                name,
                description,
                tags,
            } => {
                assert_eq!(name, "curl");
                assert_eq!(description, "HTTP client");
                assert_eq!(tags, vec!["http", "net"]);
            }
            _ => panic!("Expected AddTool"),
        }
    }

    #[test]
    fn test_add_cmd_defaults() {
        let args = Args::parse_from(["tb", "add-cmd", "curl", "get"]);

        match args.command {
            Command::AddCmd {
                tool,
                name,
                description,
                snippet,
            } => {
                assert_eq!(tool, "curl");
                assert_eq!(name, "get");
                assert!(description.is_empty());
                assert!(snippet.is_empty());
            }
            _ => panic!("Expected AddCmd"),
        }
    }

    #[test]
    fn test_global_db_path_after_subcommand() {
        let args = Args::parse_from(["tb", "list", "-D", "/tmp/catalog.db"]);
        assert_eq!(args.db_path, Some("/tmp/catalog.db".to_string()));
        assert!(matches!(args.command, Command::List { tag: None }));
    }

    #[test]
    fn test_find_defaults_to_browse() {
        let args = Args::parse_from(["tb", "find"]);

        match args.command {
            Command::Find { query, limit } => {
                assert!(query.is_empty());
                assert_eq!(limit, DEFAULT_LIMIT);
            }
            _ => panic!("Expected Find"),
        }
    }

    #[test]
    fn test_run_flags() {
        let args = Args::parse_from(["tb", "run", "curl", "get", "-x", "-c", "-y"]);

        match args.command {
            Command::Run {
                tool,
                name,
                exec,
                yes,
                copy,
                shell,
            } => {
                assert_eq!(tool, "curl");
                assert_eq!(name, "get");
                assert!(exec);
                assert!(yes);
                assert!(copy);
                assert!(shell.is_none());
            }
            _ => panic!("Expected Run"),
        }
    }

    #[test]
    fn test_run_prints_by_default() {
        let args = Args::parse_from(["tb", "run", "curl", "get"]);

        match args.command {
            Command::Run { exec, yes, .. } => {
                assert!(!exec);
                assert!(!yes);
            }
            _ => panic!("Expected Run"),
        }
    }

    #[test]
    fn test_cmd_tool_override() {
        let args = Args::parse_from(["tb", "cmd", "init", "-r", "ironclad init", "-T", "ironclad"]);

        match args.command {
            Command::Cmd { name, tool, .. } => {
                assert_eq!(name, "init");
                assert_eq!(tool, Some("ironclad".to_string()));
            }
            _ => panic!("Expected Cmd"),
        }
    }
}
