//! SQLite-backed catalog store and its typed repository operations.
//!
//! All access goes through [`Catalog`], which owns the connection and creates
//! the schema idempotently on open. Every operation is atomic with respect to
//! the store; sequences of operations are not wrapped in an outer transaction.

use std::path::Path;

use log::debug;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::catalog::{CommandMatch, CommandRow, QueryFilter, QueryRow, ToolDetails, ToolRow};
use crate::error::{Error, Result};

const SCHEMA: &str = "
PRAGMA foreign_keys=ON;
CREATE TABLE IF NOT EXISTS tools(
  id INTEGER PRIMARY KEY,
  name TEXT UNIQUE NOT NULL,
  description TEXT
);
CREATE TABLE IF NOT EXISTS tags(
  id INTEGER PRIMARY KEY,
  name TEXT UNIQUE NOT NULL
);
CREATE TABLE IF NOT EXISTS tool_tags(
  tool_id INTEGER NOT NULL REFERENCES tools(id) ON DELETE CASCADE,
  tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
  UNIQUE(tool_id, tag_id)
);
CREATE TABLE IF NOT EXISTS commands(
  id INTEGER PRIMARY KEY,
  tool_id INTEGER NOT NULL REFERENCES tools(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  description TEXT,
  snippet TEXT,
  UNIQUE(tool_id, name)
);
";

/// The catalog store. Owns the SQLite connection; repository operations are
/// methods on this handle.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Opens (or creates) the catalog at `path`, creating parent directories
    /// and the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::io_error("catalog directory", path, e))?;
            }
        }

        debug!("Opening catalog at `{path}`");
        let conn = Connection::open(path)?;
        let catalog = Self { conn };
        catalog.conn.execute_batch(SCHEMA)?;
        Ok(catalog)
    }

    /// Opens an in-memory catalog. Used by tests and safe to call anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self { conn };
        catalog.conn.execute_batch(SCHEMA)?;
        Ok(catalog)
    }

    fn tool_id(&self, name: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM tools WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// Inserts a tool or updates it in place on its unique name.
    ///
    /// An existing tool keeps its description unless the supplied one is
    /// non-empty. Tags are attached idempotently and never removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty tool name.
    pub fn upsert_tool(&self, name: &str, description: &str, tags: &[String]) -> Result<i64> {
        if name.is_empty() {
            return Err(Error::Validation("tool name may not be empty".to_string()));
        }

        let tool_id = match self.tool_id(name)? {
            Some(id) => {
                if !description.is_empty() {
                    self.conn.execute(
                        "UPDATE tools SET description = ?1 WHERE id = ?2",
                        params![description, id],
                    )?;
                }
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO tools(name, description) VALUES(?1, ?2)",
                    params![name, description],
                )?;
                self.conn.last_insert_rowid()
            }
        };

        self.attach_tags(tool_id, tags)?;
        Ok(tool_id)
    }

    /// Attaches tags to a tool, creating missing tag rows. Attaching an
    /// already-attached tag is a no-op; blank names are skipped.
    pub fn attach_tags(&self, tool_id: i64, tags: &[String]) -> Result<()> {
        for tag in tags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }

            let tag_id: i64 = match self
                .conn
                .query_row("SELECT id FROM tags WHERE name = ?1", [tag], |row| {
                    row.get(0)
                })
                .optional()?
            {
                Some(id) => id,
                None => {
                    self.conn
                        .execute("INSERT INTO tags(name) VALUES(?1)", [tag])?;
                    self.conn.last_insert_rowid()
                }
            };

            self.conn.execute(
                "INSERT OR IGNORE INTO tool_tags(tool_id, tag_id) VALUES(?1, ?2)",
                params![tool_id, tag_id],
            )?;
        }

        Ok(())
    }

    /// Inserts a command or updates the `(tool, name)` row in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] when `tool` does not resolve; a tool
    /// is never created implicitly. Returns [`Error::Validation`] for an
    /// empty command name.
    pub fn upsert_command(
        &self,
        tool: &str,
        name: &str,
        description: &str,
        snippet: &str,
    ) -> Result<i64> {
        if name.is_empty() {
            return Err(Error::Validation(
                "command name may not be empty".to_string(),
            ));
        }

        let tool_id = self
            .tool_id(tool)?
            .ok_or_else(|| Error::ToolNotFound(tool.to_string()))?;

        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM commands WHERE tool_id = ?1 AND name = ?2",
                params![tool_id, name],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE commands SET description = ?1, snippet = ?2 WHERE id = ?3",
                    params![description, snippet, id],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO commands(tool_id, name, description, snippet) VALUES(?1, ?2, ?3, ?4)",
                    params![tool_id, name, description, snippet],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
        }
    }

    /// Looks up a single command by tool and command name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] or [`Error::CommandNotFound`] when
    /// either name does not resolve.
    pub fn get_command(&self, tool: &str, name: &str) -> Result<CommandRow> {
        let tool_id = self
            .tool_id(tool)?
            .ok_or_else(|| Error::ToolNotFound(tool.to_string()))?;

        self.conn
            .query_row(
                "SELECT id, name, COALESCE(description, ''), COALESCE(snippet, '')
                 FROM commands WHERE tool_id = ?1 AND name = ?2",
                params![tool_id, name],
                |row| {
                    Ok(CommandRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        snippet: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::command_not_found(tool, name))
    }

    /// Deletes a tool, cascading to its commands and tag associations.
    /// Returns whether a row was removed; an absent name is a no-op.
    pub fn delete_tool(&self, name: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM tools WHERE name = ?1", [name])?;
        Ok(rows > 0)
    }

    /// Deletes a command. A missing tool or command is a no-op, not an
    /// error; deletion is advisory cleanup.
    pub fn delete_command(&self, tool: &str, name: &str) -> Result<bool> {
        let Some(tool_id) = self.tool_id(tool)? else {
            return Ok(false);
        };

        let rows = self.conn.execute(
            "DELETE FROM commands WHERE tool_id = ?1 AND name = ?2",
            params![tool_id, name],
        )?;
        Ok(rows > 0)
    }

    /// Lists tools ordered by name, optionally restricted to one tag.
    pub fn list_tools(&self, tag: Option<&str>) -> Result<Vec<ToolRow>> {
        let mut statement = match tag {
            Some(_) => self.conn.prepare(
                "SELECT tools.id, tools.name, COALESCE(tools.description, '')
                 FROM tools
                 JOIN tool_tags ON tool_tags.tool_id = tools.id
                 JOIN tags ON tags.id = tool_tags.tag_id
                 WHERE tags.name = ?1
                 ORDER BY tools.name",
            )?,
            None => self.conn.prepare(
                "SELECT id, name, COALESCE(description, '') FROM tools ORDER BY name",
            )?,
        };

        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(ToolRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        };

        let tools = match tag {
            Some(tag) => statement
                .query_map([tag], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => statement
                .query_map([], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        Ok(tools)
    }

    /// All tags with the number of tools carrying each, ordered by tag name.
    pub fn list_tags(&self) -> Result<Vec<(String, i64)>> {
        let mut statement = self.conn.prepare(
            "SELECT tags.name, COUNT(tool_tags.tool_id)
             FROM tags LEFT JOIN tool_tags ON tags.id = tool_tags.tag_id
             GROUP BY tags.id
             ORDER BY tags.name",
        )?;

        let counts = statement
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// A tool with its alphabetically ordered tags and name-ordered commands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] when the tool does not exist.
    pub fn show_tool(&self, name: &str) -> Result<ToolDetails> {
        let tool = self
            .conn
            .query_row(
                "SELECT id, name, COALESCE(description, '') FROM tools WHERE name = ?1",
                [name],
                |row| {
                    Ok(ToolRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        let mut statement = self.conn.prepare(
            "SELECT tags.name
             FROM tags JOIN tool_tags ON tags.id = tool_tags.tag_id
             WHERE tool_tags.tool_id = ?1 ORDER BY tags.name",
        )?;
        let tags = statement
            .query_map([tool.id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        let mut statement = self.conn.prepare(
            "SELECT id, name, COALESCE(description, ''), COALESCE(snippet, '')
             FROM commands WHERE tool_id = ?1 ORDER BY name",
        )?;
        let commands = statement
            .query_map([tool.id], |row| {
                Ok(CommandRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    snippet: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ToolDetails {
            tool,
            tags,
            commands,
        })
    }

    /// Runs a filtered query over the flattened (tool, command) view.
    ///
    /// Tools are LEFT-joined to commands, so a tool matching on its own
    /// fields appears once with empty command columns. Results are ordered
    /// by tool name then command name.
    pub fn query(&self, filter: &QueryFilter) -> Result<Vec<QueryRow>> {
        let mut sql = String::from(
            "SELECT tools.name, COALESCE(commands.name, ''),
                    COALESCE(commands.description, ''), COALESCE(commands.snippet, '')
             FROM tools
             LEFT JOIN commands ON commands.tool_id = tools.id",
        );

        if filter.tag.is_some() {
            sql.push_str(
                " JOIN tool_tags ON tool_tags.tool_id = tools.id
                  JOIN tags ON tags.id = tool_tags.tag_id",
            );
        }

        sql.push_str(" WHERE 1=1");
        let mut args: Vec<String> = Vec::new();

        if let Some(text) = &filter.text {
            let like = format!("%{text}%");
            sql.push_str(
                " AND (tools.name LIKE ? OR tools.description LIKE ?
                   OR commands.name LIKE ? OR commands.description LIKE ?
                   OR commands.snippet LIKE ?)",
            );
            for _ in 0..5 {
                args.push(like.clone());
            }
        }

        if let Some(tool) = &filter.tool {
            sql.push_str(" AND tools.name = ?");
            args.push(tool.clone());
        }

        if let Some(tag) = &filter.tag {
            sql.push_str(" AND tags.name = ?");
            args.push(tag.clone());
        }

        match &filter.command {
            Some(CommandMatch::Substring(name)) => {
                sql.push_str(" AND commands.name LIKE ?");
                args.push(format!("%{name}%"));
            }
            Some(CommandMatch::Exact(name)) => {
                sql.push_str(" AND commands.name = ?");
                args.push(name.clone());
            }
            None => {}
        }

        sql.push_str(" ORDER BY tools.name, commands.name");

        let mut statement = self.conn.prepare(&sql)?;
        let rows = statement
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(QueryRow {
                    tool: row.get(0)?,
                    command: row.get(1)?,
                    description: row.get(2)?,
                    snippet: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// The flattened (tool, command) pairs backing a search snapshot:
    /// inner-joined, so tools without commands are excluded, ordered by tool
    /// name then command name.
    pub fn command_pairs(&self) -> Result<Vec<QueryRow>> {
        let mut statement = self.conn.prepare(
            "SELECT tools.name, commands.name,
                    COALESCE(commands.description, ''), COALESCE(commands.snippet, '')
             FROM tools
             JOIN commands ON commands.tool_id = tools.id
             ORDER BY tools.name, commands.name",
        )?;

        let rows = statement
            .query_map([], |row| {
                Ok(QueryRow {
                    tool: row.get(0)?,
                    command: row.get(1)?,
                    description: row.get(2)?,
                    snippet: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Catalog {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .upsert_tool("curl", "HTTP client", &["http".to_string(), "net".to_string()])
            .unwrap();
        catalog
            .upsert_command("curl", "get", "Simple GET", "curl -s https://example.com")
            .unwrap();
        catalog
    }

    #[test]
    fn test_upsert_tool_updates_description_only_when_non_empty() {
        let catalog = Catalog::open_in_memory().unwrap();
        let first = catalog.upsert_tool("curl", "HTTP client", &[]).unwrap();
        let second = catalog.upsert_tool("curl", "", &[]).unwrap();
        assert_eq!(first, second);

        let details = catalog.show_tool("curl").unwrap();
        assert_eq!(details.tool.description, "HTTP client");

        catalog.upsert_tool("curl", "transfer data", &[]).unwrap();
        let details = catalog.show_tool("curl").unwrap();
        assert_eq!(details.tool.description, "transfer data");

        assert_eq!(catalog.list_tools(None).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_tool_rejects_empty_name() {
        let catalog = Catalog::open_in_memory().unwrap();
        let result = catalog.upsert_tool("", "desc", &[]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_attach_tags_is_idempotent() {
        let catalog = seeded();
        catalog
            .upsert_tool("curl", "", &["http".to_string()])
            .unwrap();

        let details = catalog.show_tool("curl").unwrap();
        assert_eq!(details.tags, vec!["http", "net"]);
    }

    #[test]
    fn test_upsert_tool_never_removes_tags() {
        let catalog = seeded();
        catalog.upsert_tool("curl", "still curl", &[]).unwrap();

        let details = catalog.show_tool("curl").unwrap();
        assert_eq!(details.tags.len(), 2);
    }

    #[test]
    fn test_upsert_command_requires_existing_tool() {
        let catalog = Catalog::open_in_memory().unwrap();
        let result = catalog.upsert_command("ghost", "init", "", "ghost init");
        assert!(matches!(result, Err(Error::ToolNotFound(name)) if name == "ghost"));
        // The failed upsert must not have created the tool.
        assert!(catalog.list_tools(None).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_command_updates_in_place() {
        let catalog = seeded();
        catalog
            .upsert_command("curl", "get", "GET with headers", "curl -sI https://example.com")
            .unwrap();

        let details = catalog.show_tool("curl").unwrap();
        assert_eq!(details.commands.len(), 1);
        assert_eq!(details.commands[0].description, "GET with headers");
    }

    #[test]
    fn test_get_command() {
        let catalog = seeded();
        let command = catalog.get_command("curl", "get").unwrap();
        assert_eq!(command.snippet, "curl -s https://example.com");

        assert!(matches!(
            catalog.get_command("curl", "post"),
            Err(Error::CommandNotFound { .. })
        ));
        assert!(matches!(
            catalog.get_command("ghost", "get"),
            Err(Error::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_delete_tool_cascades() {
        let catalog = seeded();
        assert!(catalog.delete_tool("curl").unwrap());

        assert!(catalog.list_tools(None).unwrap().is_empty());
        assert!(catalog.command_pairs().unwrap().is_empty());
        // Tag rows remain but carry no tools.
        let tags = catalog.list_tags().unwrap();
        assert!(tags.iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let catalog = seeded();
        assert!(catalog.delete_command("curl", "get").unwrap());
        assert!(!catalog.delete_command("curl", "get").unwrap());
        assert!(!catalog.delete_command("ghost", "get").unwrap());
        assert!(catalog.delete_tool("curl").unwrap());
        assert!(!catalog.delete_tool("curl").unwrap());
    }

    #[test]
    fn test_list_tools_by_tag() {
        let catalog = seeded();
        catalog
            .upsert_tool("jq", "JSON processor", &["json".to_string()])
            .unwrap();

        let net_tools = catalog.list_tools(Some("net")).unwrap();
        assert_eq!(net_tools.len(), 1);
        assert_eq!(net_tools[0].name, "curl");

        assert_eq!(catalog.list_tools(None).unwrap().len(), 2);
    }

    #[test]
    fn test_query_free_text_is_case_insensitive() {
        let catalog = seeded();

        let rows = catalog.query(&QueryFilter::text("EXAMPLE.COM")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tool, "curl");
        assert_eq!(rows[0].command, "get");
    }

    #[test]
    fn test_query_tool_without_commands_appears_with_empty_columns() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.upsert_tool("jq", "JSON processor", &[]).unwrap();

        let rows = catalog.query(&QueryFilter::text("json")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tool, "jq");
        assert!(rows[0].command.is_empty());
    }

    #[test]
    fn test_query_command_filter_modes() {
        let catalog = seeded();
        catalog
            .upsert_command("curl", "get-json", "GET json", "curl -s -H 'Accept: application/json'")
            .unwrap();

        let filter = QueryFilter {
            command: Some(CommandMatch::Substring("get".to_string())),
            ..QueryFilter::default()
        };
        assert_eq!(catalog.query(&filter).unwrap().len(), 2);

        let filter = QueryFilter {
            command: Some(CommandMatch::Exact("get".to_string())),
            ..QueryFilter::default()
        };
        assert_eq!(catalog.query(&filter).unwrap().len(), 1);
    }

    #[test]
    fn test_query_ordering_is_deterministic() {
        let catalog = Catalog::open_in_memory().unwrap();
        for tool in ["zsh", "awk", "sed"] {
            catalog.upsert_tool(tool, "", &[]).unwrap();
            catalog.upsert_command(tool, "b", "", "").unwrap();
            catalog.upsert_command(tool, "a", "", "").unwrap();
        }

        let pairs = catalog.command_pairs().unwrap();
        let order: Vec<(String, String)> = pairs
            .iter()
            .map(|r| (r.tool.clone(), r.command.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("awk".to_string(), "a".to_string()),
                ("awk".to_string(), "b".to_string()),
                ("sed".to_string(), "a".to_string()),
                ("sed".to_string(), "b".to_string()),
                ("zsh".to_string(), "a".to_string()),
                ("zsh".to_string(), "b".to_string()),
            ]
        );
    }
}
