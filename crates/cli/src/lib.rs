//! Toolbook CLI Library
//!
//! This crate provides the command-line interface for toolbook, a personal
//! catalog of command-line tools and snippets. It handles argument parsing,
//! the non-interactive catalog commands, and the interactive browser.
//!
//! # Architecture
//!
//! The CLI is organized into several key modules:
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`commands`]: Handlers for the non-interactive subcommands
//! - [`session`]: The interactive catalog browser and its modal forms
//!
//! # Examples
//!
//! The CLI binary (`tb`) can be used in several ways:
//!
//! ```bash
//! # Record a tool and one of its invocations
//! tb add-tool curl --desc "HTTP client" --tag http --tag net
//! tb add-cmd curl get --desc "Simple GET" --run "curl -s https://example.com"
//!
//! # Look things up
//! tb search example
//! tb find "curl get"
//!
//! # Print a stored snippet, or execute it after confirmation
//! tb run curl get
//! tb run curl get --exec
//!
//! # Browse interactively
//! tb browse
//! ```

pub mod cli_args;
pub mod commands;
pub mod session;
