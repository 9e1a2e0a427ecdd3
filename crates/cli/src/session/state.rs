//! Session state for the interactive browser.
//!
//! The session is a single-threaded state machine: one tool selection, the
//! selected tool's ordered commands, a live filter over those commands, and
//! one command selection inside the filtered view. Every transition is a
//! discrete method call; no two transitions overlap.

use indexmap::IndexSet;
use log::debug;

use toolbook_core::catalog::{CommandRow, ToolRow};
use toolbook_core::error::{Error, Result};
use toolbook_core::store::Catalog;

/// Direction to cycle a selection in.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Up,
    Down,
}

pub struct Session<'a> {
    catalog: &'a Catalog,
    /// Full ordered tool list.
    pub tools: Vec<ToolRow>,
    /// Index into `tools`, or none when the catalog has no tools.
    pub selected_tool: Option<usize>,
    /// Ordered commands of the selected tool.
    pub commands: Vec<CommandRow>,
    /// Live filter text applied to `commands`.
    pub filter_text: String,
    /// Indexes into `commands` that pass the filter.
    pub filtered: Vec<usize>,
    /// Index into `filtered`, or none when nothing matches.
    pub selected_command: Option<usize>,
    /// One-line report of the last action, shown in the status line.
    pub status: Option<String>,
}

impl<'a> Session<'a> {
    /// Creates a session over `catalog`, selecting the first tool if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool list cannot be loaded.
    pub fn new(catalog: &'a Catalog) -> Result<Self> {
        let mut session = Self {
            catalog,
            tools: Vec::new(),
            selected_tool: None,
            commands: Vec::new(),
            filter_text: String::new(),
            filtered: Vec::new(),
            selected_command: None,
            status: None,
        };
        session.reload()?;
        Ok(session)
    }

    /// Re-fetches the tool list from the store unconditionally, keeping the
    /// current tool selected when it still exists.
    pub fn reload(&mut self) -> Result<()> {
        let previous = self
            .selected_tool
            .and_then(|i| self.tools.get(i))
            .map(|tool| tool.name.clone());

        self.tools = self.catalog.list_tools(None)?;
        debug!("Session loaded {} tools", self.tools.len());

        let index = previous
            .and_then(|name| self.tools.iter().position(|tool| tool.name == name))
            .or(if self.tools.is_empty() { None } else { Some(0) });

        match index {
            Some(index) => self.select_tool(index),
            None => {
                self.selected_tool = None;
                self.commands.clear();
                self.refilter();
                Ok(())
            }
        }
    }

    /// Selects the tool at `index` and reloads its command list. The filter
    /// text is kept; the first filtered command (if any) becomes selected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelection`] for an out-of-range index.
    pub fn select_tool(&mut self, index: usize) -> Result<()> {
        if index >= self.tools.len() {
            return Err(Error::InvalidSelection {
                position: index + 1,
                count: self.tools.len(),
            });
        }

        self.selected_tool = Some(index);
        let details = self.catalog.show_tool(&self.tools[index].name)?;
        self.commands = details.commands;
        self.refilter();
        Ok(())
    }

    /// Cycles the tool selection, wrapping at either end.
    pub fn cycle_tool(&mut self, direction: CycleDirection) -> Result<()> {
        if self.tools.is_empty() {
            return Ok(());
        }

        let current = self.selected_tool.unwrap_or(0);
        let next = match direction {
            CycleDirection::Up => (current + self.tools.len() - 1) % self.tools.len(),
            CycleDirection::Down => (current + 1) % self.tools.len(),
        };
        self.select_tool(next)
    }

    /// Selects a command by index into the filtered list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelection`] for an out-of-range index.
    pub fn select_command(&mut self, index: usize) -> Result<()> {
        if index >= self.filtered.len() {
            return Err(Error::InvalidSelection {
                position: index + 1,
                count: self.filtered.len(),
            });
        }

        self.selected_command = Some(index);
        Ok(())
    }

    /// Cycles the command selection within the filtered list, wrapping.
    pub fn cycle_command(&mut self, direction: CycleDirection) {
        if self.filtered.is_empty() {
            return;
        }

        let current = self.selected_command.unwrap_or(0);
        let next = match direction {
            CycleDirection::Up => (current + self.filtered.len() - 1) % self.filtered.len(),
            CycleDirection::Down => (current + 1) % self.filtered.len(),
        };
        self.selected_command = Some(next);
    }

    /// The currently selected command row, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&CommandRow> {
        self.selected_command
            .and_then(|i| self.filtered.get(i))
            .and_then(|&i| self.commands.get(i))
    }

    /// The currently selected tool row, if any.
    #[must_use]
    pub fn selected_tool_row(&self) -> Option<&ToolRow> {
        self.selected_tool.and_then(|i| self.tools.get(i))
    }

    /// Replaces the filter text and recomputes the filtered view.
    pub fn set_filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
        self.refilter();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_text.push(c);
        self.refilter();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_text.pop();
        self.refilter();
    }

    /// Recomputes the filtered command list and resets the selection to the
    /// first match, or none.
    fn refilter(&mut self) {
        let tokens: IndexSet<String> = self
            .filter_text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        self.filtered = self
            .commands
            .iter()
            .enumerate()
            .filter(|(_, command)| command_matches(command, &tokens))
            .map(|(i, _)| i)
            .collect();

        self.selected_command = if self.filtered.is_empty() {
            None
        } else {
            Some(0)
        };
    }

    /// Upserts a tool, reloads the tool list, and re-selects the affected
    /// tool.
    ///
    /// # Errors
    ///
    /// Returns any store error; the session state is only updated on
    /// success.
    pub fn add_tool(&mut self, name: &str, description: &str, tags: &[String]) -> Result<()> {
        self.catalog.upsert_tool(name, description, tags)?;
        self.tools = self.catalog.list_tools(None)?;

        if let Some(index) = self.tools.iter().position(|tool| tool.name == name) {
            self.select_tool(index)?;
        }

        self.status = Some(format!("Saved tool '{name}'."));
        Ok(())
    }

    /// Upserts a command under the selected tool and reloads its command
    /// list, re-selecting the affected command when it passes the filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when no tool is selected.
    pub fn upsert_command(&mut self, name: &str, description: &str, snippet: &str) -> Result<()> {
        let Some(tool) = self.selected_tool_row().map(|tool| tool.name.clone()) else {
            return Err(Error::Validation("no tool selected".to_string()));
        };

        self.catalog.upsert_command(&tool, name, description, snippet)?;
        let index = self.selected_tool.unwrap_or(0);
        self.select_tool(index)?;

        if let Some(position) = self
            .filtered
            .iter()
            .position(|&i| self.commands[i].name == name)
        {
            self.selected_command = Some(position);
        }

        self.status = Some(format!("Saved '{tool}' command '{name}'."));
        Ok(())
    }

    /// Deletes the selected command and reloads the command list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when no command is selected.
    pub fn delete_selected_command(&mut self) -> Result<()> {
        let Some((tool, name)) = self
            .selected_tool_row()
            .map(|tool| tool.name.clone())
            .zip(self.selected().map(|command| command.name.clone()))
        else {
            return Err(Error::Validation("no command selected".to_string()));
        };

        self.catalog.delete_command(&tool, &name)?;
        let index = self.selected_tool.unwrap_or(0);
        self.select_tool(index)?;

        self.status = Some(format!("Removed '{tool}' command '{name}'."));
        Ok(())
    }
}

/// Whether a command passes the live filter: every token must appear
/// somewhere in the joined name, description, and snippet, ignoring case.
fn command_matches(command: &CommandRow, tokens: &IndexSet<String>) -> bool {
    if tokens.is_empty() {
        return true;
    }

    let joined = format!(
        "{} {} {}",
        command.name, command.description, command.snippet
    )
    .to_lowercase();

    tokens.iter().all(|token| joined.contains(token))
}
