use std::process::ExitCode;

use clap::Parser;
use log::debug;

use toolbook_core::config;
use toolbook_core::error::{Error, Result};
use toolbook_core::store::Catalog;

use crate::cli_args::{Args, Command};

mod cli_args;
mod commands;
pub mod session;

fn execute() -> Result<()> {
    let args = Args::parse();

    let db_path = config::get_db_path(&args.db_path);
    debug!("Catalog path: `{db_path}`");
    let catalog = Catalog::open(&db_path)?;

    let context_path = config::get_context_path(&args.context_path);

    match &args.command {
        Command::AddTool {
            name,
            description,
            tags,
        } => commands::add_tool(&catalog, name, description, tags),
        Command::AddCmd {
            tool,
            name,
            description,
            snippet,
        } => commands::add_cmd(&catalog, tool, name, description, snippet),
        Command::Cmd {
            name,
            description,
            snippet,
            tool,
        } => commands::cmd_short(
            &catalog,
            &context_path,
            tool.as_deref(),
            name,
            description,
            snippet,
        ),
        Command::Use {
            name,
            description,
            tags,
        } => commands::use_tool(&catalog, &context_path, name, description, tags),
        Command::List { tag } => commands::list(&catalog, tag.as_deref()),
        Command::Tags => commands::tags(&catalog),
        Command::Show { name } => commands::show(&catalog, name),
        Command::Search { query, tag } => commands::search(&catalog, query, tag.as_deref()),
        Command::Find { query, limit } => commands::find(&catalog, query, *limit),
        Command::RmTool { name } => commands::rm_tool(&catalog, name),
        Command::RmCmd { tool, name } => commands::rm_cmd(&catalog, tool, name),
        Command::Run {
            tool,
            name,
            exec,
            yes,
            copy,
            shell,
        } => commands::run(&catalog, tool, name, *exec, *yes, *copy, shell.as_deref()),
        Command::Import { path } => commands::import(&catalog, path),
        Command::Export { path } => commands::export(&catalog, path),
        Command::ExportMd { path } => commands::export_md(&catalog, path),
        Command::Browse => session::run_session(&catalog),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        // The child already reported on stderr; just carry its status out.
        Err(Error::SnippetExit(code)) => ExitCode::from(code.clamp(1, 255) as u8),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
