//! Bulk import/export of the catalog.
//!
//! The interchange document is YAML: a list of tools, each with
//! name/description/tags and a nested list of commands. Importing upserts
//! every tool and command it contains and reports how many of each were
//! processed. A Markdown rendering of the whole catalog is also available
//! for sharing outside toolbook.

use std::fs::File;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::Catalog;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BulkDocument {
    #[serde(default)]
    pub tools: Vec<BulkTool>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BulkTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub commands: Vec<BulkCommand>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BulkCommand {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub snippet: String,
}

/// Counts of records processed by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportCounts {
    pub tools: usize,
    pub commands: usize,
}

/// Imports a bulk document, upserting every tool and command it contains.
///
/// # Errors
///
/// Returns [`Error::Validation`] for a record with an empty name, a YAML
/// error for a malformed document, or any store error from the upserts.
pub fn import_catalog(catalog: &Catalog, path: &str) -> Result<ImportCounts> {
    let reader =
        File::open(path).map_err(|e| Error::io_error("import", path, e))?;

    let document: BulkDocument = serde_yaml::from_reader(reader)
        .map_err(|e| Error::yaml_error("reading", "import", path, e))?;

    let mut counts = ImportCounts {
        tools: 0,
        commands: 0,
    };

    for tool in &document.tools {
        if tool.name.is_empty() {
            return Err(Error::Validation(
                "import record with empty tool name".to_string(),
            ));
        }

        catalog.upsert_tool(&tool.name, &tool.description, &tool.tags)?;
        for command in &tool.commands {
            if command.name.is_empty() {
                return Err(Error::Validation(format!(
                    "import record for tool '{}' with empty command name",
                    tool.name
                )));
            }

            catalog.upsert_command(
                &tool.name,
                &command.name,
                &command.description,
                &command.snippet,
            )?;
            counts.commands += 1;
        }
        counts.tools += 1;
    }

    Ok(counts)
}

/// Exports the whole catalog as a bulk document.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn export_catalog(catalog: &Catalog, path: &str) -> Result<()> {
    let document = build_document(catalog)?;

    let writer =
        File::create(path).map_err(|e| Error::io_error("export", path, e))?;

    serde_yaml::to_writer(writer, &document)
        .map_err(|e| Error::yaml_error("writing", "export", path, e))
}

fn build_document(catalog: &Catalog) -> Result<BulkDocument> {
    let mut tools = Vec::new();
    for tool in catalog.list_tools(None)? {
        let details = catalog.show_tool(&tool.name)?;
        tools.push(BulkTool {
            name: details.tool.name,
            description: details.tool.description,
            tags: details.tags,
            commands: details
                .commands
                .into_iter()
                .map(|command| BulkCommand {
                    name: command.name,
                    description: command.description,
                    snippet: command.snippet,
                })
                .collect(),
        });
    }

    Ok(BulkDocument { tools })
}

/// Renders the whole catalog to a single Markdown file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn export_markdown(catalog: &Catalog, path: &str) -> Result<()> {
    let document = build_document(catalog)?;

    let mut out =
        File::create(path).map_err(|e| Error::io_error("markdown export", path, e))?;

    let write = |out: &mut File, text: &str| -> Result<()> {
        out.write_all(text.as_bytes())
            .map_err(|e| Error::io_error("markdown export", path, e))
    };

    write(&mut out, "# Toolbook\n\n")?;
    for tool in &document.tools {
        write(&mut out, &format!("## {}\n\n", tool.name))?;
        if !tool.description.is_empty() {
            write(&mut out, &format!("{}\n\n", tool.description))?;
        }
        if !tool.tags.is_empty() {
            write(&mut out, &format!("**Tags:** {}\n\n", tool.tags.join(", ")))?;
        }
        if tool.commands.is_empty() {
            write(&mut out, "_No commands yet._\n\n")?;
        }
        for command in &tool.commands {
            write(&mut out, &format!("### {}\n\n", command.name))?;
            if !command.description.is_empty() {
                write(&mut out, &format!("{}\n\n", command.description))?;
            }
            if !command.snippet.is_empty() {
                write(
                    &mut out,
                    &format!("```bash\n{}\n```\n\n", command.snippet.trim()),
                )?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QueryFilter;

    #[test]
    fn test_import_counts_tools_and_commands() {
        let yaml = r#"
tools:
  - name: ironclad
    description: Password manager
    tags: [password, database]
    commands:
      - name: init
        description: Create a new vault
        snippet: ironclad init --store ~/.secrets/ironclad.vault
      - name: list
        snippet: ironclad list
  - name: jq
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yml");
        std::fs::write(&path, yaml).unwrap();

        let catalog = Catalog::open_in_memory().unwrap();
        let counts = import_catalog(&catalog, path.to_str().unwrap()).unwrap();

        assert_eq!(counts, ImportCounts { tools: 2, commands: 2 });
        let details = catalog.show_tool("ironclad").unwrap();
        assert_eq!(details.tags, vec!["database", "password"]);
        assert_eq!(details.commands.len(), 2);
    }

    #[test]
    fn test_import_rejects_empty_command_name() {
        let yaml = r#"
tools:
  - name: ironclad
    commands:
      - name: ""
        snippet: ironclad init
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yml");
        std::fs::write(&path, yaml).unwrap();

        let catalog = Catalog::open_in_memory().unwrap();
        let result = import_catalog(&catalog, path.to_str().unwrap());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_export_then_import_preserves_catalog() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .upsert_tool("curl", "HTTP client", &["http".to_string()])
            .unwrap();
        catalog
            .upsert_command("curl", "get", "Simple GET", "curl -s https://example.com")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.yml");
        export_catalog(&catalog, path.to_str().unwrap()).unwrap();

        let restored = Catalog::open_in_memory().unwrap();
        let counts = import_catalog(&restored, path.to_str().unwrap()).unwrap();
        assert_eq!(counts, ImportCounts { tools: 1, commands: 1 });

        let rows = restored.query(&QueryFilter::text("example")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].command, "get");
    }

    #[test]
    fn test_export_markdown_renders_sections() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .upsert_tool("curl", "HTTP client", &["http".to_string()])
            .unwrap();
        catalog
            .upsert_command("curl", "get", "Simple GET", "curl -s https://example.com")
            .unwrap();
        catalog.upsert_tool("jq", "", &[]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolbook.md");
        export_markdown(&catalog, path.to_str().unwrap()).unwrap();

        let rendered = std::fs::read_to_string(&path).unwrap();
        assert!(rendered.contains("## curl"));
        assert!(rendered.contains("**Tags:** http"));
        assert!(rendered.contains("```bash\ncurl -s https://example.com\n```"));
        assert!(rendered.contains("_No commands yet._"));
    }
}
