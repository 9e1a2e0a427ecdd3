//! Handlers for the non-interactive subcommands.
//!
//! Each handler takes the open catalog plus the values it needs, performs
//! one repository or search operation, and prints a plain-text report.

use itertools::Itertools;
use log::info;

use toolbook_core::catalog::{split_tags, QueryFilter};
use toolbook_core::error::{Error, Result};
use toolbook_core::interchange;
use toolbook_core::search::Snapshot;
use toolbook_core::store::Catalog;
use toolbook_core::{config, execution};

use crate::session::input::confirm;

pub fn add_tool(catalog: &Catalog, name: &str, description: &str, tags: &[String]) -> Result<()> {
    catalog.upsert_tool(name, description, &clean_tags(tags))?;
    println!("{name} added/updated.");
    Ok(())
}

pub fn add_cmd(
    catalog: &Catalog,
    tool: &str,
    name: &str,
    description: &str,
    snippet: &str,
) -> Result<()> {
    catalog.upsert_command(tool, name, description, snippet)?;
    println!("{tool} \u{b7} command {name} added/updated.");
    Ok(())
}

/// Adds a command under `--tool` or, failing that, the default tool from the
/// context file resolved once at action start.
pub fn cmd_short(
    catalog: &Catalog,
    context_path: &str,
    tool: Option<&str>,
    name: &str,
    description: &str,
    snippet: &str,
) -> Result<()> {
    let default_tool = config::read_default_tool(context_path)?;
    let Some(tool) = tool.or(default_tool.as_deref()) else {
        return Err(Error::Validation(
            "no default tool; run `tb use <tool>` or pass --tool".to_string(),
        ));
    };

    add_cmd(catalog, tool, name, description, snippet)
}

pub fn use_tool(
    catalog: &Catalog,
    context_path: &str,
    name: &str,
    description: &str,
    tags: &[String],
) -> Result<()> {
    catalog.upsert_tool(name, description, &clean_tags(tags))?;
    config::write_default_tool(context_path, name)?;
    println!("Default tool set to {name}.");
    Ok(())
}

pub fn list(catalog: &Catalog, tag: Option<&str>) -> Result<()> {
    let tools = catalog.list_tools(tag)?;
    if tools.is_empty() {
        println!("No tools.");
        return Ok(());
    }

    let width = tools.iter().map(|tool| tool.name.len()).max().unwrap_or(0);
    for tool in &tools {
        println!("{:<width$}  {}", tool.name, tool.description);
    }
    Ok(())
}

pub fn tags(catalog: &Catalog) -> Result<()> {
    let tags = catalog.list_tags()?;
    if tags.is_empty() {
        println!("No tags.");
        return Ok(());
    }

    let width = tags.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, count) in &tags {
        println!("{name:<width$}  {count}");
    }
    Ok(())
}

pub fn show(catalog: &Catalog, name: &str) -> Result<()> {
    let details = catalog.show_tool(name)?;

    println!("{}", details.tool);
    if !details.tags.is_empty() {
        println!("Tags: {}", details.tags.iter().join(", "));
    }

    println!();
    if details.commands.is_empty() {
        println!("No commands yet.");
        return Ok(());
    }

    for command in &details.commands {
        if command.description.is_empty() {
            println!("{}", command.name);
        } else {
            println!("{}: {}", command.name, command.description);
        }
        if !command.snippet.is_empty() {
            println!("  $ {}", command.snippet);
        }
        println!();
    }
    Ok(())
}

pub fn search(catalog: &Catalog, query: &str, tag: Option<&str>) -> Result<()> {
    let filter = QueryFilter {
        text: Some(query.to_string()),
        tag: tag.map(str::to_string),
        ..QueryFilter::default()
    };

    let rows = catalog.query(&filter)?;
    if rows.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for row in &rows {
        let summary = if row.description.is_empty() {
            &row.snippet
        } else {
            &row.description
        };
        println!("{}\t{}\t{}", row.tool, row.command, summary);
    }
    Ok(())
}

pub fn find(catalog: &Catalog, query: &str, limit: usize) -> Result<()> {
    let snapshot = Snapshot::build(catalog)?;
    let ranked = snapshot.rank(query, limit);

    if ranked.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (position, result) in ranked.iter().enumerate() {
        let entry = &snapshot.entries()[result.index];
        println!(
            "[{}] {:>3}  {} {}  {}",
            position + 1,
            result.score,
            entry.tool,
            entry.command,
            entry.summary
        );
    }
    Ok(())
}

pub fn rm_tool(catalog: &Catalog, name: &str) -> Result<()> {
    if catalog.delete_tool(name)? {
        println!("Removed tool: {name}.");
    } else {
        println!("Tool {name} was not in the catalog.");
    }
    Ok(())
}

pub fn rm_cmd(catalog: &Catalog, tool: &str, name: &str) -> Result<()> {
    if catalog.delete_command(tool, name)? {
        println!("Removed {tool} \u{b7} command {name}.");
    } else {
        println!("{tool} \u{b7} command {name} was not in the catalog.");
    }
    Ok(())
}

/// Prints a stored snippet. Execution happens only with `--exec`, and then
/// only behind a confirmation; `--yes` skips the confirmation.
#[allow(clippy::fn_params_excessive_bools)]
pub fn run(
    catalog: &Catalog,
    tool: &str,
    name: &str,
    exec: bool,
    yes: bool,
    copy: bool,
    shell: Option<&str>,
) -> Result<()> {
    let command = catalog.get_command(tool, name)?;

    println!("{tool} \u{b7} {name}");
    if !command.description.is_empty() {
        println!("{}", command.description);
    }
    println!("{}", command.snippet);

    if copy {
        match execution::copy_to_clipboard(&command.snippet) {
            Ok(()) => println!("Snippet copied to clipboard."),
            Err(Error::ExternalToolUnavailable(message)) => println!("{message}"),
            Err(e) => return Err(e),
        }
    }

    if !exec {
        return Ok(());
    }

    if !yes && !confirm("Run this command?", false)? {
        info!("Execution declined");
        return Ok(());
    }

    let shell = shell
        .map(str::to_string)
        .or_else(|| std::env::var("SHELL").ok())
        .unwrap_or_else(|| config::DEFAULT_SHELL.to_string());

    execution::run_snippet(&shell, &command.snippet)
}

pub fn import(catalog: &Catalog, path: &str) -> Result<()> {
    let counts = interchange::import_catalog(catalog, path)?;
    println!(
        "Imported {} tool(s), {} command(s).",
        counts.tools, counts.commands
    );
    Ok(())
}

pub fn export(catalog: &Catalog, path: &str) -> Result<()> {
    interchange::export_catalog(catalog, path)?;
    println!("Exported to {path}.");
    Ok(())
}

pub fn export_md(catalog: &Catalog, path: &str) -> Result<()> {
    interchange::export_markdown(catalog, path)?;
    println!("Exported to {path}.");
    Ok(())
}

/// `--tag` values may each be a comma-separated list.
fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter().flat_map(|tag| split_tags(tag)).collect()
}
