use std::io::{stdin, stdout, Write};

use toolbook_core::catalog::{split_tags, CommandRow};
use toolbook_core::error::Result;

/// Values submitted by the add-tool modal form.
pub struct ToolForm {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Values submitted by the add/edit-command modal form.
pub struct CommandForm {
    pub name: String,
    pub description: String,
    pub snippet: String,
}

/// Prompts for a single line of input.
pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}: ");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompts for a single line, returning `default` when the user just
/// presses enter.
pub fn prompt_with_default(prompt: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        return prompt_line(prompt);
    }

    print!("{prompt} [{default}]: ");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;
    let read_value = input.trim();

    if read_value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(read_value.to_string())
    }
}

/// Asks a yes/no question until an acceptable answer is given.
pub fn confirm(prompt: &str, default_yes: bool) -> Result<bool> {
    let options = if default_yes { "[Y]es/[n]o" } else { "[y]es/[N]o" };

    loop {
        print!("{prompt} ({options}): ");
        stdout().flush()?;

        let mut input = String::new();
        stdin().read_line(&mut input)?;

        match input.trim().to_lowercase().as_str() {
            "" => return Ok(default_yes),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}

/// Runs the add-tool form. An empty name cancels the form.
pub fn tool_form() -> Result<Option<ToolForm>> {
    let name = prompt_line("Tool name (empty to cancel)")?;
    if name.is_empty() {
        return Ok(None);
    }

    let description = prompt_line("Tool description")?;
    let tags_line = prompt_line("Tags (comma-separated, optional)")?;

    Ok(Some(ToolForm {
        name,
        description,
        tags: split_tags(&tags_line),
    }))
}

/// Runs the add/edit-command form, prefilled from `existing` when editing.
/// An empty name cancels the form.
pub fn command_form(existing: Option<&CommandRow>) -> Result<Option<CommandForm>> {
    let name = match existing {
        Some(command) => prompt_with_default("Command name", &command.name)?,
        None => prompt_line("Command name (empty to cancel)")?,
    };
    if name.is_empty() {
        return Ok(None);
    }

    let (default_description, default_snippet) = match existing {
        Some(command) => (command.description.as_str(), command.snippet.as_str()),
        None => ("", ""),
    };

    let description = prompt_with_default("Command description", default_description)?;
    let snippet = prompt_with_default("Command snippet (paste the exact command)", default_snippet)?;

    Ok(Some(CommandForm {
        name,
        description,
        snippet,
    }))
}
