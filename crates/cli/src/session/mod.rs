//! Interactive catalog browser.
//!
//! This module provides the terminal-based interactive session for toolbook:
//! a single-threaded state machine over the tool list, the selected tool's
//! commands, and a live filter, with modal forms for catalog edits.
//!
//! # Key Features
//!
//! - **Two-level navigation**: cycle tools, move through their commands
//! - **Live Filtering**: whitespace-tokenized AND filter over commands
//! - **Catalog Editing**: add tools, add/edit/delete commands via modal forms
//! - **Snippet Actions**: copy, print, or execute the selected snippet
//!
//! # User Interface
//!
//! The interface supports:
//! - Left/Right to change tool, Up/Down to change command
//! - Typing after `/` to filter commands
//! - 't' to add a tool, 'a'/'e' to add or edit a command, 'd' to delete
//! - 'y' to copy, 'p' to print, 'x' to execute (with confirmation)
//! - 'g' to reload from the store
//! - 'q' or Ctrl-C to quit

pub mod input;
pub mod state;
pub mod ui;

pub use state::Session;
pub use ui::run_session;
