//! SQLite-backed task repository.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{StudivonError, StudivonResult};
use crate::traits::TaskRepository;
use crate::types::{
    clamp_difficulty, FocusWindow, SubjectAggregate, Task, TaskFilter, TaskPatch, TaskSort,
    TaskStatus, TaskType, DEFAULT_DIFFICULTY,
};

const TASK_COLUMNS: &str = "id, title, subject, task_type, difficulty, estimated_minutes, deadline, \
     priority_score, status, needs_reschedule, stability_level, parent_task_id, created_at, \
     actual_minutes, completed_at, completion_hour, focus_window, efficiency_score";

/// Fixed-width UTC timestamps, so text comparison in SQL orders correctly.
fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> StudivonResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StudivonError::parse(e.to_string()))
}

/// SQL `WHERE` clause and its positional values.
fn where_clause(filter: &TaskFilter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Value::Text(status.to_string()));
    }
    if let Some(subject) = &filter.subject {
        clauses.push("subject = ?");
        values.push(Value::Text(subject.clone()));
    }
    if let Some(min) = filter.min_difficulty {
        clauses.push("COALESCE(difficulty, 3) >= ?");
        values.push(Value::Integer(min as i64));
    }
    if let Some(since) = filter.completed_since {
        clauses.push("completed_at >= ?");
        values.push(Value::Text(fmt_ts(since)));
    }
    if let Some(before) = filter.completed_before {
        clauses.push("completed_at < ?");
        values.push(Value::Text(fmt_ts(before)));
    }
    if let Some(until) = filter.deadline_until {
        clauses.push("deadline <= ?");
        values.push(Value::Text(fmt_ts(until)));
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

/// SQL `SET` assignments for the fields a patch touches.
fn set_clause(patch: &TaskPatch) -> (Vec<&'static str>, Vec<Value>) {
    let mut sets = Vec::new();
    let mut values = Vec::new();

    if let Some(status) = patch.status {
        sets.push("status = ?");
        values.push(Value::Text(status.to_string()));
    }
    if let Some(priority) = patch.priority_score {
        sets.push("priority_score = ?");
        values.push(Value::Integer(priority as i64));
    }
    if let Some(flag) = patch.needs_reschedule {
        sets.push("needs_reschedule = ?");
        values.push(Value::Integer(flag as i64));
    }
    if let Some(minutes) = patch.actual_minutes {
        sets.push("actual_minutes = ?");
        values.push(Value::Real(minutes));
    }
    if let Some(at) = patch.completed_at {
        sets.push("completed_at = ?");
        values.push(Value::Text(fmt_ts(at)));
    }
    if let Some(hour) = patch.completion_hour {
        sets.push("completion_hour = ?");
        values.push(Value::Integer(hour as i64));
    }
    if let Some(window) = patch.focus_window {
        sets.push("focus_window = ?");
        values.push(Value::Text(window.to_string()));
    }
    if let Some(score) = patch.efficiency_score {
        sets.push("efficiency_score = ?");
        values.push(Value::Real(score));
    }

    (sets, values)
}

/// Task repository persisted in a SQLite file.
pub struct SqliteTaskRepository {
    conn: Mutex<Connection>,
}

impl SqliteTaskRepository {
    /// Open (or create) a store at the given path.
    pub fn new(path: impl AsRef<Path>) -> StudivonResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StudivonResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StudivonResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StudivonError::Internal("task store lock poisoned".to_string()))
    }

    fn init_schema(&self) -> StudivonResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                subject TEXT NOT NULL,
                task_type TEXT NOT NULL,
                difficulty INTEGER,
                estimated_minutes INTEGER NOT NULL,
                deadline TEXT NOT NULL,
                priority_score INTEGER NOT NULL,
                status TEXT NOT NULL,
                needs_reschedule INTEGER NOT NULL DEFAULT 0,
                stability_level INTEGER,
                parent_task_id TEXT,
                created_at TEXT NOT NULL,
                actual_minutes REAL,
                completed_at TEXT,
                completion_hour INTEGER,
                focus_window TEXT,
                efficiency_score REAL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            CREATE INDEX IF NOT EXISTS idx_tasks_subject ON tasks(subject);
            CREATE INDEX IF NOT EXISTS idx_tasks_completed_at ON tasks(completed_at);
            CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks(deadline);
        "#,
        )?;
        Ok(())
    }

    fn exists(conn: &Connection, id: &str) -> StudivonResult<bool> {
        Ok(conn
            .query_row("SELECT 1 FROM tasks WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    fn row_to_task(row: &rusqlite::Row<'_>) -> StudivonResult<Task> {
        let task_type: String = row.get(3)?;
        let difficulty: Option<i64> = row.get(4)?;
        let estimated_minutes: i64 = row.get(5)?;
        let deadline: String = row.get(6)?;
        let priority_score: i64 = row.get(7)?;
        let status: String = row.get(8)?;
        let needs_reschedule: i64 = row.get(9)?;
        let stability_level: Option<i64> = row.get(10)?;
        let created_at: String = row.get(12)?;
        let completed_at: Option<String> = row.get(14)?;
        let completion_hour: Option<i64> = row.get(15)?;
        let focus_window: Option<String> = row.get(16)?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            subject: row.get(2)?,
            task_type: task_type
                .parse::<TaskType>()
                .map_err(|e| StudivonError::parse(format!("task_type '{}': {}", task_type, e)))?,
            difficulty: difficulty.map_or(DEFAULT_DIFFICULTY, clamp_difficulty),
            estimated_minutes: estimated_minutes.max(0) as u32,
            deadline: parse_ts(&deadline)?,
            priority_score: priority_score.max(0) as u32,
            status: status
                .parse::<TaskStatus>()
                .map_err(|e| StudivonError::parse(format!("status '{}': {}", status, e)))?,
            needs_reschedule: needs_reschedule != 0,
            stability_level: stability_level.map(|s| s.max(1) as u32),
            parent_task_id: row.get(11)?,
            created_at: parse_ts(&created_at)?,
            actual_minutes: row.get(13)?,
            completed_at: completed_at.as_deref().map(parse_ts).transpose()?,
            completion_hour: completion_hour.map(|h| h as u32),
            focus_window: focus_window
                .map(|w| {
                    w.parse::<FocusWindow>()
                        .map_err(|e| StudivonError::parse(format!("focus_window '{}': {}", w, e)))
                })
                .transpose()?,
            efficiency_score: row.get(17)?,
        })
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn insert_task(&self, task: Task) -> StudivonResult<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                TASK_COLUMNS
            ),
            params![
                id,
                task.title,
                task.subject,
                task.task_type.to_string(),
                task.difficulty as i64,
                task.estimated_minutes as i64,
                fmt_ts(task.deadline),
                task.priority_score as i64,
                task.status.to_string(),
                task.needs_reschedule as i64,
                task.stability_level.map(|s| s as i64),
                task.parent_task_id,
                fmt_ts(task.created_at),
                task.actual_minutes,
                task.completed_at.map(fmt_ts),
                task.completion_hour.map(|h| h as i64),
                task.focus_window.map(|w| w.to_string()),
                task.efficiency_score,
            ],
        )?;
        Ok(id)
    }

    async fn get_task(&self, id: &str) -> StudivonResult<Option<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;
        let mut rows = stmt.query_map(params![id], |row| Ok(Self::row_to_task(row)))?;
        rows.next().transpose()?.transpose()
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> StudivonResult<()> {
        let conn = self.conn()?;
        let (sets, mut values) = set_clause(&patch);
        if sets.is_empty() {
            return if Self::exists(&conn, id)? {
                Ok(())
            } else {
                Err(StudivonError::not_found(id))
            };
        }

        values.push(Value::Text(id.to_string()));
        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(StudivonError::not_found(id));
        }
        Ok(())
    }

    async fn transition_task(
        &self,
        id: &str,
        from: &[TaskStatus],
        patch: TaskPatch,
    ) -> StudivonResult<bool> {
        let conn = self.conn()?;
        if from.is_empty() {
            return if Self::exists(&conn, id)? {
                Ok(false)
            } else {
                Err(StudivonError::not_found(id))
            };
        }

        let (mut sets, mut values) = set_clause(&patch);
        if sets.is_empty() {
            // A no-op write still has to prove the status matched.
            sets.push("status = status");
        }
        values.push(Value::Text(id.to_string()));
        values.extend(from.iter().map(|s| Value::Text(s.to_string())));

        let placeholders = vec!["?"; from.len()].join(", ");
        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ? AND status IN ({})",
            sets.join(", "),
            placeholders
        );
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed > 0 {
            return Ok(true);
        }
        if Self::exists(&conn, id)? {
            Ok(false)
        } else {
            Err(StudivonError::not_found(id))
        }
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StudivonResult<usize> {
        let conn = self.conn()?;
        let (clause, values) = where_clause(filter);
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks{}", clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }

    async fn find_tasks(
        &self,
        filter: &TaskFilter,
        sort: Option<TaskSort>,
        limit: Option<usize>,
    ) -> StudivonResult<Vec<Task>> {
        let conn = self.conn()?;
        let (clause, mut values) = where_clause(filter);
        let order = match sort {
            Some(TaskSort::PriorityDesc) => " ORDER BY priority_score DESC, rowid ASC",
            Some(TaskSort::CompletedAtDesc) => " ORDER BY completed_at DESC, rowid ASC",
            Some(TaskSort::CompletedAtAsc) => " ORDER BY completed_at ASC, rowid ASC",
            None => " ORDER BY rowid ASC",
        };
        let mut sql = format!("SELECT {} FROM tasks{}{}", TASK_COLUMNS, clause, order);
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit as i64));
        }

        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map(params_from_iter(values.iter()), |row| Ok(Self::row_to_task(row)))?;

        results
            .map(|r| r.map_err(|e| e.into()).and_then(|inner| inner))
            .collect()
    }

    async fn aggregate_by_subject(&self, filter: &TaskFilter) -> StudivonResult<Vec<SubjectAggregate>> {
        let conn = self.conn()?;
        let (clause, values) = where_clause(filter);
        let sql = format!(
            "SELECT subject, AVG(COALESCE(efficiency_score, 0.0)), COUNT(*), MAX(completed_at) \
             FROM tasks{} GROUP BY subject ORDER BY subject",
            clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map(params_from_iter(values.iter()), |row| {
            let subject: String = row.get(0)?;
            let avg: f64 = row.get(1)?;
            let count: i64 = row.get(2)?;
            let last: Option<String> = row.get(3)?;
            Ok((subject, avg, count, last))
        })?;

        results
            .map(|r| {
                let (subject, avg_efficiency, count, last) = r?;
                Ok(SubjectAggregate {
                    subject,
                    avg_efficiency,
                    count: count.max(0) as usize,
                    last_date: last.as_deref().map(parse_ts).transpose()?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(subject: &str, priority: u32) -> Task {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        Task::pending(
            "Limits",
            subject,
            TaskType::FirstTime,
            4,
            45,
            now + Duration::days(2),
            priority,
            now,
        )
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let store = SqliteTaskRepository::in_memory().unwrap();
        let task = sample("Calculus", 150).with_stability(2).with_parent("p1");
        let id = store.insert_task(task.clone()).await.unwrap();

        let stored = store.get_task(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.title, task.title);
        assert_eq!(stored.task_type, TaskType::FirstTime);
        assert_eq!(stored.deadline, task.deadline);
        assert_eq!(stored.stability_level, Some(2));
        assert_eq!(stored.parent_task_id.as_deref(), Some("p1"));
        assert!(stored.completed_at.is_none());
        assert!(stored.focus_window.is_none());
    }

    #[tokio::test]
    async fn test_transition_and_not_found() {
        let store = SqliteTaskRepository::in_memory().unwrap();
        let id = store.insert_task(sample("Calculus", 100)).await.unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 23, 15, 0).unwrap();
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            completed_at: Some(at),
            focus_window: Some(FocusWindow::NightOwl),
            efficiency_score: Some(0.75),
            ..Default::default()
        };

        let from = [TaskStatus::Pending, TaskStatus::Missed];
        assert!(store.transition_task(&id, &from, patch.clone()).await.unwrap());
        assert!(!store.transition_task(&id, &from, patch.clone()).await.unwrap());

        let stored = store.get_task(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert_eq!(stored.completed_at, Some(at));
        assert_eq!(stored.focus_window, Some(FocusWindow::NightOwl));

        let err = store.transition_task("missing", &from, patch).await.unwrap_err();
        assert!(matches!(err, StudivonError::NotFound { .. }));
        let err = store.update_task("missing", TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, StudivonError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_filters_sort_and_aggregate() {
        let store = SqliteTaskRepository::in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        for (subject, eff, days_ago, difficulty) in
            [("Math", 0.5, 10, 4), ("Math", 1.0, 2, 5), ("Art", 1.2, 1, 2)]
        {
            let mut task = sample(subject, 50);
            task.difficulty = difficulty;
            task.status = TaskStatus::Completed;
            task.efficiency_score = Some(eff);
            task.completed_at = Some(base - Duration::days(days_ago));
            store.insert_task(task).await.unwrap();
        }
        store.insert_task(sample("Bio", 90)).await.unwrap();

        let week = TaskFilter::completed().completed_since(base - Duration::days(7));
        assert_eq!(store.count_tasks(&week).await.unwrap(), 2);

        let heavy = week.clone().with_min_difficulty(4);
        assert_eq!(store.count_tasks(&heavy).await.unwrap(), 1);

        let latest = store
            .find_tasks(&TaskFilter::completed(), Some(TaskSort::CompletedAtDesc), Some(1))
            .await
            .unwrap();
        assert_eq!(latest[0].subject, "Art");

        let groups = store.aggregate_by_subject(&TaskFilter::completed()).await.unwrap();
        let subjects: Vec<_> = groups.iter().map(|g| g.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Art", "Math"]);
        assert!((groups[1].avg_efficiency - 0.75).abs() < 1e-9);
        assert_eq!(groups[1].last_date, Some(base - Duration::days(2)));
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");

        let id = {
            let store = SqliteTaskRepository::new(&path).unwrap();
            store.insert_task(sample("Chemistry", 80)).await.unwrap()
        };

        let reopened = SqliteTaskRepository::new(&path).unwrap();
        let task = reopened.get_task(&id).await.unwrap().unwrap();
        assert_eq!(task.subject, "Chemistry");
    }
}
