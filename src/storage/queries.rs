//! Database queries for to-do items

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::Storage;
use crate::error::Result;
use crate::types::{DeleteOutcome, Todo, TodoId};

const TODO_COLUMNS: &str = "id, todo, created_at, updated_at";

/// Parse a todo from a database row
pub fn todo_from_row(row: &Row) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get("id")?,
        todo: row.get("todo")?,
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}

fn timestamp_column(row: &Row, name: &str) -> rusqlite::Result<DateTime<Utc>> {
    let idx = row.as_ref().column_index(name)?;
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Rows written by this crate are RFC 3339; rows defaulted by SQLite use
/// `CURRENT_TIMESTAMP` ("YYYY-MM-DD HH:MM:SS", UTC).
fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc()))
}

/// All to-do items, in id order
pub fn list_todos(conn: &Connection) -> Result<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM todos ORDER BY id", TODO_COLUMNS))?;
    let todos = stmt
        .query_map([], todo_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(todos)
}

/// Insert a to-do and return its new id
pub fn create_todo(conn: &Connection, text: &str) -> Result<TodoId> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO todos (todo, created_at, updated_at) VALUES (?, ?, ?)",
        params![text, now, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete a to-do by id; a missing id deletes nothing
pub fn delete_todo(conn: &Connection, id: TodoId) -> Result<DeleteOutcome> {
    let deleted = conn.execute("DELETE FROM todos WHERE id = ?", params![id])?;
    Ok(DeleteOutcome { deleted })
}

/// Case-insensitive substring search over the to-do text.
///
/// Uses `instr` on Unicode-lowered text, so the query is matched literally
/// and non-ASCII letters fold too.
pub fn search_todos(conn: &Connection, query: &str) -> Result<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM todos WHERE instr(lower_unicode(todo), lower_unicode(?)) > 0 ORDER BY id",
        TODO_COLUMNS
    ))?;
    let todos = stmt
        .query_map(params![query], todo_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(todos)
}

/// Number of stored to-do items
pub fn count_todos(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?)
}

impl Storage {
    pub fn list(&self) -> Result<Vec<Todo>> {
        self.with_connection(list_todos)
    }

    pub fn create(&self, text: &str) -> Result<TodoId> {
        let id = self.with_transaction(|conn| create_todo(conn, text))?;
        tracing::debug!(id, "Created todo");
        Ok(id)
    }

    pub fn delete_by_id(&self, id: TodoId) -> Result<DeleteOutcome> {
        let outcome = self.with_transaction(|conn| delete_todo(conn, id))?;
        tracing::debug!(id, deleted = outcome.deleted, "Deleted todo");
        Ok(outcome)
    }

    pub fn search(&self, query: &str) -> Result<Vec<Todo>> {
        self.with_connection(|conn| search_todos(conn, query))
    }

    pub fn count(&self) -> Result<i64> {
        self.with_connection(count_todos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_then_list() {
        let storage = Storage::open_in_memory().unwrap();
        let first = storage.create("Build E-commerce Project (Due: 8:00 AM)").unwrap();
        let second = storage.create("Call mom").unwrap();
        assert_ne!(first, second);

        let todos = storage.list().unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id, first);
        assert_eq!(todos[0].todo, "Build E-commerce Project (Due: 8:00 AM)");
        assert_eq!(todos[1].todo, "Call mom");
        assert_eq!(todos[0].created_at, todos[0].updated_at);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let storage = Storage::open_in_memory().unwrap();
        let first = storage.create("one").unwrap();
        storage.delete_by_id(first).unwrap();
        let second = storage.create("two").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_delete_missing_is_not_an_error() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create("keep me").unwrap();

        let outcome = storage.delete_by_id(999).unwrap();
        assert_eq!(outcome, DeleteOutcome { deleted: 0 });
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_existing() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.create("gone soon").unwrap();

        let outcome = storage.delete_by_id(id).unwrap();
        assert_eq!(outcome.deleted, 1);
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_search_case_insensitive_contains() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create("Build Project").unwrap();
        storage.create("PROJECT plan").unwrap();
        storage.create("improject review").unwrap();
        storage.create("Buy groceries").unwrap();

        let found: Vec<String> = storage
            .search("proj")
            .unwrap()
            .into_iter()
            .map(|t| t.todo)
            .collect();
        assert_eq!(
            found,
            vec!["Build Project", "PROJECT plan", "improject review"]
        );
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create("100% done").unwrap();
        storage.create("1000 things").unwrap();
        storage.create("snake_case").unwrap();
        storage.create("snakeXcase").unwrap();

        let percent = storage.search("0%").unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].todo, "100% done");

        let underscore = storage.search("e_c").unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].todo, "snake_case");
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create("a").unwrap();
        storage.create("b").unwrap();
        assert_eq!(storage.search("").unwrap().len(), 2);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create("Écrire le RAPPORT").unwrap();
        storage.create("ÜBERPRÜFUNG der Zahlen").unwrap();
        storage.create("ecrire sans accent").unwrap();

        let found = storage.search("écrire").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].todo, "Écrire le RAPPORT");

        assert_eq!(storage.search("rapport").unwrap().len(), 1);
        assert_eq!(storage.search("überprüfung").unwrap().len(), 1);
        assert_eq!(storage.search("ÉCRIRE").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-03-01T10:15:00+00:00").unwrap();
        let sqlite = parse_timestamp("2024-03-01 10:15:00").unwrap();
        assert_eq!(rfc, sqlite);
    }

    #[test]
    fn test_unparseable_timestamp_is_an_error() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create("fine").unwrap();
        storage
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO todos (todo, created_at, updated_at) VALUES ('broken', 'yesterday', 'yesterday')",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let err = storage.list().unwrap_err();
        assert!(matches!(
            err,
            AgentError::Database(rusqlite::Error::FromSqlConversionFailure(2, Type::Text, _))
        ));
    }
}
