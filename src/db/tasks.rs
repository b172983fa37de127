//! Task CRUD operations.

use super::{Database, now_stamp};
use crate::types::{Priority, Status, StatusFilter, Task};
use anyhow::Result;
use rusqlite::{Row, params};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let id: i64 = row.get("id")?;
    let title: String = row.get("title")?;
    let description: Option<String> = row.get("description")?;
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;
    let created_at: String = row.get("created_at")?;
    let completed_at: Option<String> = row.get("completed_at")?;

    Ok(Task {
        id,
        title,
        description: description.unwrap_or_default(),
        // Storage does not enforce the enums; fall back to the defaults
        // for values that predate boundary validation.
        status: status.parse().unwrap_or(Status::Pending),
        priority: priority.parse().unwrap_or(Priority::Medium),
        created_at,
        completed_at,
    })
}

impl Database {
    /// List tasks, optionally restricted to one status, most recent first.
    ///
    /// `created_at` has one-second resolution, so ties are broken by id to
    /// keep insertion order stable within a second.
    pub fn list_tasks(&self, filter: StatusFilter) -> Result<Vec<Task>> {
        let conn = self.connect()?;

        let mut tasks = Vec::new();
        match filter {
            StatusFilter::All => {
                let mut stmt = conn
                    .prepare("SELECT * FROM tasks ORDER BY created_at DESC, id DESC")?;
                let rows = stmt.query_map([], parse_task_row)?;
                for task in rows {
                    tasks.push(task?);
                }
            }
            StatusFilter::Only(status) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM tasks WHERE status = ?1 ORDER BY created_at DESC, id DESC",
                )?;
                let rows = stmt.query_map(params![status.as_str()], parse_task_row)?;
                for task in rows {
                    tasks.push(task?);
                }
            }
        }

        Ok(tasks)
    }

    /// Fetch a single task by id.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

        match stmt.query_row(params![task_id], parse_task_row) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a new pending task and return its assigned id.
    ///
    /// `created_at` comes from the column default; `completed_at` starts
    /// out null.
    pub fn create_task(
        &self,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<i64> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO tasks (title, description, priority) VALUES (?1, ?2, ?3)",
            params![title, description, priority.as_str()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite title, description, status and priority for a task.
    ///
    /// `completed_at` is derived from the incoming status: set to now when
    /// completed (refreshed even if the task was already completed),
    /// cleared otherwise. Returns the number of rows changed; a missing id
    /// updates zero rows and is not an error.
    pub fn update_task(
        &self,
        task_id: i64,
        title: &str,
        description: &str,
        status: Status,
        priority: Priority,
    ) -> Result<usize> {
        let conn = self.connect()?;

        let completed_at = match status {
            Status::Completed => Some(now_stamp()),
            Status::Pending => None,
        };

        let changed = conn.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, status = ?3, priority = ?4, completed_at = ?5
             WHERE id = ?6",
            params![
                title,
                description,
                status.as_str(),
                priority.as_str(),
                completed_at,
                task_id,
            ],
        )?;

        Ok(changed)
    }

    /// Delete a task. Returns the number of rows removed; a missing id is
    /// not an error.
    pub fn delete_task(&self, task_id: i64) -> Result<usize> {
        let conn = self.connect()?;

        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;

        Ok(changed)
    }

    /// Flip a task between pending and completed.
    ///
    /// Only a literal `pending` status flips to completed; any other
    /// stored value is treated as non-pending and flips back to pending.
    /// Returns false without mutating anything when the id does not exist.
    pub fn toggle_task(&self, task_id: i64) -> Result<bool> {
        let conn = self.connect()?;

        let current: Option<String> = match conn.query_row(
            "SELECT status FROM tasks WHERE id = ?1",
            params![task_id],
            |row| row.get(0),
        ) {
            Ok(status) => Some(status),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let Some(current) = current else {
            return Ok(false);
        };

        let (new_status, completed_at) = if current == Status::Pending.as_str() {
            (Status::Completed, Some(now_stamp()))
        } else {
            (Status::Pending, None)
        };

        conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![new_status.as_str(), completed_at, task_id],
        )?;

        Ok(true)
    }
}
