//! Toolbook Core Library
//!
//! This crate provides the core functionality for toolbook, a personal
//! catalog of command-line tools and their invocation snippets, organized by
//! tags and queried by free-text and fuzzy search.
//!
//! # Key Features
//!
//! - **Catalog Store**: SQLite-backed tools, tags, and commands with
//!   uniqueness and cascade invariants
//! - **Typed Repository**: upsert, delete, list, show, and filtered query
//!   operations over the store
//! - **Search Engine**: deterministic fuzzy ranking over the flattened
//!   (tool, command) view
//! - **Bulk Interchange**: YAML import/export plus a Markdown rendering
//! - **Snippet Execution**: confirmed foreground execution and clipboard
//!   hand-off
//! - **Error Handling**: one error type for every failure mode
//!
//! # Examples
//!
//! Recording a tool and finding its snippet again:
//!
//! ```no_run
//! use toolbook_core::search::{Snapshot, DEFAULT_LIMIT};
//! use toolbook_core::store::Catalog;
//!
//! let catalog = Catalog::open_in_memory()?;
//! catalog.upsert_tool("curl", "HTTP client", &["http".to_string()])?;
//! catalog.upsert_command("curl", "get", "Simple GET", "curl -s https://example.com")?;
//!
//! let snapshot = Snapshot::build(&catalog)?;
//! for ranked in snapshot.rank("example", DEFAULT_LIMIT) {
//!     let entry = &snapshot.entries()[ranked.index];
//!     println!("[{}] {} {}", ranked.score, entry.tool, entry.command);
//! }
//! # Ok::<(), toolbook_core::error::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod execution;
pub mod interchange;
pub mod search;
pub mod store;
