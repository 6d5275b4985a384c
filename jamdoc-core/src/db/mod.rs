//! SQLite persistence for projects, tasks and notes.
//!
//! A [`Database`] is a cheap-to-clone handle around a single connection.
//! Mutations are plain synchronous calls; the only multi-statement writes
//! (project deletion, restore, reset) run inside a transaction.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{named_params, params, Connection, Row};

use crate::models::{
    CreateNoteInput, CreateProjectInput, CreateTaskInput, Note, Project, ProjectKind,
    ProjectStatus, ProjectSummary, Snapshot, Statistics, Task, UpdateNoteInput,
    UpdateProjectInput, UpdateTaskInput, SNAPSHOT_VERSION,
};

mod schema;

const PROJECT_COLUMNS: &str =
    "id, created_at, updated_at, concept, narrative, gameplay, status, kind, jam_deadline";
const TASK_COLUMNS: &str = "id, text, completed, project_id";
const NOTE_COLUMNS: &str = "id, content, created_at, label, project_id";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "jamdoc")
            .context("no data directory available for jamdoc")?;
        Self::open(&dirs.data_dir().join("jamdoc.db"))
    }

    /// In-memory database, used by tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(schema::SCHEMA)
            .context("applying database schema")?;
        tracing::debug!("database schema up to date");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    // ---- projects ----

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO projects (created_at, updated_at, concept, narrative, gameplay, status, kind, jam_deadline)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                fmt_ts(&now),
                fmt_ts(&now),
                serde_json::to_string(&input.concept)?,
                serde_json::to_string(&input.narrative)?,
                serde_json::to_string(&input.gameplay)?,
                status.as_str(),
                input.kind.map(|k| k.as_str()),
                input.jam_deadline.map(|d| fmt_ts(&d)),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(project_id = id, title = %input.concept.title, "project created");
        Ok(Project {
            id,
            created_at: now,
            updated_at: now,
            concept: input.concept,
            narrative: input.narrative,
            gameplay: input.gameplay,
            status,
            kind: input.kind,
            jam_deadline: input.jam_deadline,
        })
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        get_project_with(&*self.lock()?, id)
    }

    /// All projects, most recently modified first.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        list_projects_with(&*self.lock()?)
    }

    pub fn project_summaries(&self) -> Result<Vec<ProjectSummary>> {
        let projects = self.list_projects()?;
        Ok(projects.iter().map(Project::summary).collect())
    }

    /// Apply the present fields of `input` and bump `updated_at`.
    /// Returns the updated project, or `None` if the id is unknown.
    pub fn update_project(&self, id: i64, input: UpdateProjectInput) -> Result<Option<Project>> {
        let conn = self.lock()?;
        let Some(mut project) = get_project_with(&conn, id)? else {
            return Ok(None);
        };
        if let Some(concept) = input.concept {
            project.concept = concept;
        }
        if let Some(narrative) = input.narrative {
            project.narrative = narrative;
        }
        if let Some(gameplay) = input.gameplay {
            project.gameplay = gameplay;
        }
        if let Some(status) = input.status {
            project.status = status;
        }
        if let Some(kind) = input.kind {
            project.kind = Some(kind);
        }
        if let Some(deadline) = input.jam_deadline {
            project.jam_deadline = Some(deadline);
        }
        project.updated_at = Utc::now();

        conn.execute(
            "UPDATE projects
             SET updated_at = ?1, concept = ?2, narrative = ?3, gameplay = ?4,
                 status = ?5, kind = ?6, jam_deadline = ?7
             WHERE id = ?8",
            params![
                fmt_ts(&project.updated_at),
                serde_json::to_string(&project.concept)?,
                serde_json::to_string(&project.narrative)?,
                serde_json::to_string(&project.gameplay)?,
                project.status.as_str(),
                project.kind.map(|k| k.as_str()),
                project.jam_deadline.map(|d| fmt_ts(&d)),
                id,
            ],
        )?;
        Ok(Some(project))
    }

    /// Delete a project, unlinking its tasks and notes.
    ///
    /// The tasks and notes survive with `project_id = NULL`; this is a soft
    /// unlink, never a cascade. Runs as one transaction.
    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("UPDATE tasks SET project_id = NULL WHERE project_id = ?1", [id])?;
        tx.execute("UPDATE notes SET project_id = NULL WHERE project_id = ?1", [id])?;
        let deleted = tx.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        tx.commit()?;
        if deleted > 0 {
            tracing::info!(project_id = id, "project deleted, tasks and notes unlinked");
        }
        Ok(deleted > 0)
    }

    /// Jam projects with a deadline still ahead of `now`, soonest first.
    pub fn upcoming_jams(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Project>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE kind = 'jam' AND jam_deadline IS NOT NULL AND jam_deadline > ?1
             ORDER BY jam_deadline ASC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![fmt_ts(&now), limit as i64], project_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ---- tasks ----

    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (text, completed, project_id) VALUES (?1, ?2, ?3)",
            params![input.text, input.completed, input.project_id],
        )?;
        Ok(Task {
            id: conn.last_insert_rowid(),
            text: input.text,
            completed: input.completed,
            project_id: input.project_id,
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        get_task_with(&*self.lock()?, id)
    }

    pub fn list_tasks(&self, project_id: Option<i64>, pending_only: bool) -> Result<Vec<Task>> {
        list_tasks_with(&*self.lock()?, project_id, pending_only)
    }

    pub fn update_task(&self, id: i64, input: UpdateTaskInput) -> Result<Option<Task>> {
        let conn = self.lock()?;
        let Some(mut task) = get_task_with(&conn, id)? else {
            return Ok(None);
        };
        if let Some(text) = input.text {
            task.text = text;
        }
        if let Some(completed) = input.completed {
            task.completed = completed;
        }
        if let Some(project_id) = input.project_id {
            task.project_id = Some(project_id);
        }
        conn.execute(
            "UPDATE tasks SET text = ?1, completed = ?2, project_id = ?3 WHERE id = ?4",
            params![task.text, task.completed, task.project_id, id],
        )?;
        Ok(Some(task))
    }

    /// Flip the completed flag. Returns the updated task, `None` if unknown.
    pub fn toggle_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.lock()?;
        let Some(mut task) = get_task_with(&conn, id)? else {
            return Ok(None);
        };
        task.completed = !task.completed;
        conn.execute(
            "UPDATE tasks SET completed = ?1 WHERE id = ?2",
            params![task.completed, id],
        )?;
        Ok(Some(task))
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    // ---- notes ----

    pub fn create_note(&self, input: CreateNoteInput) -> Result<Note> {
        let now = Utc::now();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notes (content, created_at, label, project_id) VALUES (?1, ?2, ?3, ?4)",
            params![input.content, fmt_ts(&now), input.label, input.project_id],
        )?;
        Ok(Note {
            id: conn.last_insert_rowid(),
            content: input.content,
            created_at: now,
            label: input.label,
            project_id: input.project_id,
        })
    }

    pub fn get_note(&self, id: i64) -> Result<Option<Note>> {
        get_note_with(&*self.lock()?, id)
    }

    /// Notes, newest first, optionally scoped to one project.
    pub fn list_notes(&self, project_id: Option<i64>) -> Result<Vec<Note>> {
        list_notes_with(&*self.lock()?, project_id)
    }

    pub fn update_note(&self, id: i64, input: UpdateNoteInput) -> Result<Option<Note>> {
        let conn = self.lock()?;
        let Some(mut note) = get_note_with(&conn, id)? else {
            return Ok(None);
        };
        if let Some(content) = input.content {
            note.content = content;
        }
        if let Some(label) = input.label {
            note.label = Some(label);
        }
        if let Some(project_id) = input.project_id {
            note.project_id = Some(project_id);
        }
        conn.execute(
            "UPDATE notes SET content = ?1, label = ?2, project_id = ?3 WHERE id = ?4",
            params![note.content, note.label, note.project_id, id],
        )?;
        Ok(Some(note))
    }

    pub fn delete_note(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    // ---- derived state ----

    /// Recompute the dashboard counters with full-table aggregates.
    pub fn stats(&self) -> Result<Statistics> {
        let conn = self.lock()?;
        let active_projects: u32 =
            conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        let active_jams: u32 = conn.query_row(
            "SELECT COUNT(*) FROM projects
             WHERE kind = 'jam' AND jam_deadline IS NOT NULL AND jam_deadline > ?1",
            [fmt_ts(&Utc::now())],
            |row| row.get(0),
        )?;
        let pending_tasks: u32 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE completed = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(Statistics {
            active_projects,
            active_jams,
            pending_tasks,
        })
    }

    // ---- backup / restore ----

    pub fn export_snapshot(&self) -> Result<Snapshot> {
        let conn = self.lock()?;
        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            projects: list_projects_with(&conn)?,
            tasks: list_tasks_with(&conn, None, false)?,
            notes: list_notes_with(&conn, None)?,
        })
    }

    /// Replace the whole data set with the snapshot contents, keeping ids.
    ///
    /// Fails without touching the database if the snapshot version is
    /// unknown or a task/note points at a project id the snapshot lacks.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            bail!(
                "unsupported backup version {} (expected {})",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        let project_ids: HashSet<i64> = snapshot.projects.iter().map(|p| p.id).collect();
        for task in &snapshot.tasks {
            if let Some(pid) = task.project_id {
                if !project_ids.contains(&pid) {
                    bail!("task {} references missing project {}", task.id, pid);
                }
            }
        }
        for note in &snapshot.notes {
            if let Some(pid) = note.project_id {
                if !project_ids.contains(&pid) {
                    bail!("note {} references missing project {}", note.id, pid);
                }
            }
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        tx.execute("DELETE FROM notes", [])?;
        tx.execute("DELETE FROM projects", [])?;
        for p in &snapshot.projects {
            tx.execute(
                "INSERT INTO projects (id, created_at, updated_at, concept, narrative, gameplay, status, kind, jam_deadline)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    p.id,
                    fmt_ts(&p.created_at),
                    fmt_ts(&p.updated_at),
                    serde_json::to_string(&p.concept)?,
                    serde_json::to_string(&p.narrative)?,
                    serde_json::to_string(&p.gameplay)?,
                    p.status.as_str(),
                    p.kind.map(|k| k.as_str()),
                    p.jam_deadline.map(|d| fmt_ts(&d)),
                ],
            )?;
        }
        for t in &snapshot.tasks {
            tx.execute(
                "INSERT INTO tasks (id, text, completed, project_id) VALUES (?1, ?2, ?3, ?4)",
                params![t.id, t.text, t.completed, t.project_id],
            )?;
        }
        for n in &snapshot.notes {
            tx.execute(
                "INSERT INTO notes (id, content, created_at, label, project_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![n.id, n.content, fmt_ts(&n.created_at), n.label, n.project_id],
            )?;
        }
        tx.commit()?;
        tracing::info!(
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            notes = snapshot.notes.len(),
            "snapshot imported"
        );
        Ok(())
    }

    /// Clear every table and restart the id counters.
    pub fn reset(&self) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        tx.execute("DELETE FROM notes", [])?;
        tx.execute("DELETE FROM projects", [])?;
        // sqlite_sequence only exists once an AUTOINCREMENT insert happened.
        let has_sequence: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE name = 'sqlite_sequence')",
            [],
            |row| row.get(0),
        )?;
        if has_sequence {
            tx.execute(
                "DELETE FROM sqlite_sequence WHERE name IN ('projects', 'tasks', 'notes')",
                [],
            )?;
        }
        tx.commit()?;
        tracing::info!("database reset, all tables cleared");
        Ok(())
    }
}

// ---- row mapping ----

fn fmt_ts(dt: &DateTime<Utc>) -> String {
    // Fixed precision and a Z suffix keep string comparison consistent with
    // chronological order for the deadline queries.
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug)]
struct InvalidColumn(String);

impl std::fmt::Display for InvalidColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidColumn {}

fn column_err(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| column_err(idx, e))
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let concept: String = row.get(3)?;
    let narrative: String = row.get(4)?;
    let gameplay: String = row.get(5)?;
    let status: String = row.get(6)?;
    let kind: Option<String> = row.get(7)?;
    let deadline: Option<String> = row.get(8)?;
    Ok(Project {
        id: row.get(0)?,
        created_at: parse_ts(1, row.get(1)?)?,
        updated_at: parse_ts(2, row.get(2)?)?,
        concept: serde_json::from_str(&concept).map_err(|e| column_err(3, e))?,
        narrative: serde_json::from_str(&narrative).map_err(|e| column_err(4, e))?,
        gameplay: serde_json::from_str(&gameplay).map_err(|e| column_err(5, e))?,
        status: ProjectStatus::from_str(&status).ok_or_else(|| {
            column_err(6, InvalidColumn(format!("unknown project status '{status}'")))
        })?,
        kind: kind
            .map(|k| {
                ProjectKind::from_str(&k).ok_or_else(|| {
                    column_err(7, InvalidColumn(format!("unknown project kind '{k}'")))
                })
            })
            .transpose()?,
        jam_deadline: deadline.map(|d| parse_ts(8, d)).transpose()?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        text: row.get(1)?,
        completed: row.get(2)?,
        project_id: row.get(3)?,
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: parse_ts(2, row.get(2)?)?,
        label: row.get(3)?,
        project_id: row.get(4)?,
    })
}

// ---- connection-scoped queries ----
//
// Public methods lock once and delegate here; the mutex is not reentrant.

fn get_project_with(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map([id], project_from_row)?;
    rows.next().transpose().map_err(Into::into)
}

fn list_projects_with(conn: &Connection) -> Result<Vec<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY updated_at DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn get_task_with(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map([id], task_from_row)?;
    rows.next().transpose().map_err(Into::into)
}

fn list_tasks_with(
    conn: &Connection,
    project_id: Option<i64>,
    pending_only: bool,
) -> Result<Vec<Task>> {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks");
    let mut clauses: Vec<&str> = Vec::new();
    if project_id.is_some() {
        clauses.push("project_id = :project_id");
    }
    if pending_only {
        clauses.push("completed = 0");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = if let Some(pid) = project_id {
        stmt.query_map(named_params! {":project_id": pid}, task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    } else {
        stmt.query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };
    Ok(rows)
}

fn get_note_with(conn: &Connection, id: i64) -> Result<Option<Note>> {
    let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map([id], note_from_row)?;
    rows.next().transpose().map_err(Into::into)
}

fn list_notes_with(conn: &Connection, project_id: Option<i64>) -> Result<Vec<Note>> {
    let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes");
    if project_id.is_some() {
        sql.push_str(" WHERE project_id = :project_id");
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = if let Some(pid) = project_id {
        stmt.query_map(named_params! {":project_id": pid}, note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    } else {
        stmt.query_map([], note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };
    Ok(rows)
}
