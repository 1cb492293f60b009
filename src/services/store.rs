//! Local SQLite store for credentials, account metadata and paused timers
//!
//! Every public method opens its own connection, performs one unit of work
//! and drops the connection before returning. No connection outlives a
//! method call, so nothing is held open across a network request.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::api::Endpoints;
use crate::types::{
    Credential, PausedTimer, Project, ProjectListing, Result, TglError, Workspace,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS api_urls (
    name TEXT PRIMARY KEY,
    url TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workspaces (
    workspace_id TEXT PRIMARY KEY,
    workspace_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS defaults (
    slot INTEGER PRIMARY KEY CHECK (slot = 1),
    api_key TEXT NOT NULL,
    workspace_id TEXT NOT NULL,

    FOREIGN KEY (workspace_id) REFERENCES workspaces (workspace_id)
        ON UPDATE CASCADE
        ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS projects (
    workspace_id TEXT NOT NULL,
    project_id TEXT NOT NULL,
    project_name TEXT NOT NULL,

    PRIMARY KEY (workspace_id, project_id),
    FOREIGN KEY (workspace_id) REFERENCES workspaces (workspace_id)
        ON UPDATE CASCADE
        ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS paused_timers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workspace_id TEXT NOT NULL,
    description TEXT NOT NULL,
    project_id TEXT,
    billable INTEGER NOT NULL,
    tags TEXT,
    resumed INTEGER NOT NULL DEFAULT 0,
    paused_at TEXT NOT NULL
);
"#;

/// Handle to the store file. Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open the store at `path`, creating the file and schema on first use.
    /// `api_base_url` seeds the endpoint table only when it is still empty.
    pub fn open(path: PathBuf, api_base_url: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self { path };
        store.create_schema(api_base_url)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    fn create_schema(&self, api_base_url: &str) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO api_urls (name, url) VALUES (?1, ?2)")?;
            for (name, url) in Endpoints::from_base(api_base_url).entries() {
                stmt.execute(params![name, url])?;
            }
        }
        tx.commit()?;
        tracing::debug!(path = %self.path.display(), "store schema ready");
        Ok(())
    }

    // ========== setup state ==========

    /// True once setup has stored a credential
    pub fn is_user_data_saved(&self) -> Result<bool> {
        let conn = self.connect()?;
        let exists: bool = conn.query_row("SELECT EXISTS (SELECT 1 FROM defaults)", [], |row| {
            row.get(0)
        })?;
        Ok(exists)
    }

    pub fn are_there_projects(&self) -> Result<bool> {
        let conn = self.connect()?;
        let exists: bool = conn.query_row("SELECT EXISTS (SELECT 1 FROM projects)", [], |row| {
            row.get(0)
        })?;
        Ok(exists)
    }

    /// Remove projects, the credential and workspaces in one transaction.
    /// Paused timers are left in place.
    pub fn delete_user_data(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM projects", [])?;
        tx.execute("DELETE FROM defaults", [])?;
        tx.execute("DELETE FROM workspaces", [])?;
        tx.commit()?;
        tracing::info!("user data deleted");
        Ok(())
    }

    // ========== inserts ==========

    pub fn add_workspace(&self, workspace_id: &str, workspace_name: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO workspaces (workspace_id, workspace_name) VALUES (?1, ?2)",
            params![workspace_id, workspace_name],
        )?;
        Ok(())
    }

    /// Store the API token and default workspace. The workspace must already exist.
    pub fn add_credential(&self, api_token: &str, default_workspace_id: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO defaults (slot, api_key, workspace_id) VALUES (1, ?1, ?2)",
            params![api_token, default_workspace_id],
        )?;
        Ok(())
    }

    /// Insert a project. The workspace must already exist.
    pub fn add_project(&self, workspace_id: &str, project_id: &str, project_name: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO projects (workspace_id, project_id, project_name) VALUES (?1, ?2, ?3)",
            params![workspace_id, project_id, project_name],
        )?;
        Ok(())
    }

    // ========== lookups ==========

    pub fn workspaces(&self) -> Result<Vec<Workspace>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT workspace_id, workspace_name FROM workspaces ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(Workspace {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn workspace_ids(&self) -> Result<Vec<String>> {
        Ok(self.workspaces()?.into_iter().map(|w| w.id).collect())
    }

    #[allow(dead_code)] // Reverse lookup kept alongside the menu resolvers
    pub fn workspace_names(&self) -> Result<Vec<String>> {
        Ok(self.workspaces()?.into_iter().map(|w| w.name).collect())
    }

    #[allow(dead_code)] // Reverse lookup kept alongside the menu resolvers
    pub fn workspace_id_by_name(&self, workspace_name: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let id = conn
            .query_row(
                "SELECT workspace_id FROM workspaces WHERE workspace_name = ?1 ORDER BY rowid LIMIT 1",
                params![workspace_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn workspace_name_by_id(&self, workspace_id: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let name = conn
            .query_row(
                "SELECT workspace_name FROM workspaces WHERE workspace_id = ?1",
                params![workspace_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    pub fn projects_in_workspace(&self, workspace_id: &str) -> Result<Vec<Project>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT workspace_id, project_id, project_name FROM projects
             WHERE workspace_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(Project {
                workspace_id: row.get(0)?,
                id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn project_id_by_name(&self, project_name: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let id = conn
            .query_row(
                "SELECT project_id FROM projects WHERE project_name = ?1 ORDER BY rowid LIMIT 1",
                params![project_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    #[allow(dead_code)] // Reverse lookup kept alongside the menu resolvers
    pub fn project_name_by_id(&self, project_id: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let name = conn
            .query_row(
                "SELECT project_name FROM projects WHERE project_id = ?1 ORDER BY rowid LIMIT 1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    /// All projects with their workspace name, grouped by workspace
    pub fn project_listings(&self) -> Result<Vec<ProjectListing>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT p.project_name, w.workspace_name, p.project_id
             FROM projects p
             JOIN workspaces w ON w.workspace_id = p.workspace_id
             ORDER BY w.rowid, p.rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProjectListing {
                project_name: row.get(0)?,
                workspace_name: row.get(1)?,
                project_id: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Default workspace id. Calling this before setup is a caller bug.
    pub fn default_workspace_id(&self) -> Result<String> {
        let conn = self.connect()?;
        conn.query_row("SELECT workspace_id FROM defaults WHERE slot = 1", [], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or(TglError::MissingRow("default workspace"))
    }

    /// Stored credential. Calling this before setup is a caller bug.
    pub fn credential(&self) -> Result<Credential> {
        let conn = self.connect()?;
        let token: String = conn
            .query_row("SELECT api_key FROM defaults WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(TglError::MissingRow("credential"))?;
        Ok(Credential::ApiToken(token))
    }

    /// Endpoint templates seeded at schema creation
    pub fn endpoints(&self) -> Result<Endpoints> {
        let conn = self.connect()?;
        let url = |name: &'static str| -> Result<String> {
            conn.query_row("SELECT url FROM api_urls WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(TglError::MissingRow(name))
        };

        Ok(Endpoints {
            user_info: url("user_info")?,
            start: url("start")?,
            current: url("current")?,
            stop: url("stop")?,
            projects: url("projects")?,
            projects_from_workspace_id: url("projects_from_workspace_id")?,
        })
    }

    // ========== paused timers ==========

    /// The unresumed paused timer, if any. When several exist the oldest wins.
    pub fn paused_timer(&self) -> Result<Option<PausedTimer>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT workspace_id, description, project_id, billable, tags, resumed, paused_at
             FROM paused_timers WHERE resumed = 0 ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        if rows.len() > 1 {
            tracing::warn!(count = rows.len(), "multiple unresumed paused timers, using the oldest");
        }

        let Some((workspace_id, description, project_id, billable, tags, resumed, paused_at)) =
            rows.into_iter().next()
        else {
            return Ok(None);
        };

        let tags = tags
            .map(|raw| serde_json::from_str::<Vec<String>>(&raw))
            .transpose()
            .map_err(|e| TglError::Parse(format!("paused timer tags: {}", e)))?;
        let paused_at = DateTime::parse_from_rfc3339(&paused_at)
            .map_err(|e| TglError::Parse(format!("paused timer timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(Some(PausedTimer {
            workspace_id,
            description,
            project_id,
            billable,
            tags,
            resumed,
            paused_at,
        }))
    }

    /// Record a paused timer. Any older unresumed row is marked resumed so at
    /// most one unresumed row exists.
    pub fn add_paused_timer(&self, timer: &PausedTimer) -> Result<()> {
        let tags = timer
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| TglError::Parse(format!("paused timer tags: {}", e)))?;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let superseded = tx.execute("UPDATE paused_timers SET resumed = 1 WHERE resumed = 0", [])?;
        if superseded > 0 {
            tracing::debug!(superseded, "older paused timer superseded");
        }
        tx.execute(
            "INSERT INTO paused_timers
                (workspace_id, description, project_id, billable, tags, resumed, paused_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                timer.workspace_id,
                timer.description,
                timer.project_id,
                timer.billable,
                tags,
                timer.resumed,
                timer.paused_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Mark every unresumed paused timer as resumed. Returns the number of rows changed.
    pub fn mark_paused_timer_resumed(&self) -> Result<usize> {
        let conn = self.connect()?;
        let changed = conn.execute("UPDATE paused_timers SET resumed = 1 WHERE resumed = 0", [])?;
        Ok(changed)
    }
}
