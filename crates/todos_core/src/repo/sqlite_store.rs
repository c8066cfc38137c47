//! Durable `TodoStore` backed by SQLite.
//!
//! # Responsibility
//! - Provide list/todo CRUD over the `lists` and `todos` tables.
//! - Check one pooled connection out per operation and return it on every
//!   exit path (success, empty result or error).
//! - Translate SQLite constraint failures into typed `StoreError`s.
//!
//! # Invariants
//! - `lists.title` is unique; violations surface as `DuplicateListTitle`.
//! - Todos reference their list with `ON DELETE CASCADE`; an orphan insert
//!   surfaces as `MissingList`.
//! - Ids come from `AUTOINCREMENT` and are never handed out twice.
//! - Token ids never match a row; they are treated as absent.

use crate::db::{open_pool, open_pool_in_memory, ConnectionPool, PoolConfig};
use crate::model::record_id::RecordId;
use crate::model::todo_list::{validate_list_title, Todo, TodoList};
use crate::repo::store::{StoreError, StoreResult, TodoStore};
use log::{error, info};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::fmt::Arguments;
use std::path::Path;

const BACKEND: &str = "sqlite";

// Extended result codes from sqlite3.h.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

const TODO_SELECT_SQL: &str = "SELECT id, list_id, title, completed FROM todos";

/// SQLite-backed todo store.
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>, config: &PoolConfig) -> StoreResult<Self> {
        Ok(Self {
            pool: open_pool(path, config)?,
        })
    }

    /// Opens a private in-memory database; data lives as long as the store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            pool: open_pool_in_memory()?,
        })
    }

    /// Wraps an existing pool, applying pending migrations first.
    pub fn from_pool(pool: ConnectionPool) -> StoreResult<Self> {
        {
            let mut conn = pool.get()?;
            crate::db::migrations::apply_migrations(&mut conn)?;
        }
        Ok(Self { pool })
    }

    /// Runs `body` on a freshly checked-out connection.
    ///
    /// The connection goes back to the pool when this returns, whatever the
    /// outcome. Failures are logged with their error code and propagated.
    fn with_conn<T>(
        &self,
        op: &'static str,
        details: Arguments<'_>,
        body: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        info!("event=store_op module=repo backend={BACKEND} op={op} {details}");

        let result = self
            .pool
            .get()
            .map_err(StoreError::from)
            .and_then(|conn| body(&*conn));

        if let Err(err) = &result {
            error!(
                "event=store_op module=repo backend={} op={} status=error error_code={} error={}",
                BACKEND,
                op,
                err.error_code(),
                err
            );
        }
        result
    }
}

impl TodoStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn all_lists(&self) -> StoreResult<Vec<TodoList>> {
        self.with_conn("all_lists", format_args!(""), |conn| {
            let mut stmt = conn.prepare("SELECT id, title FROM lists ORDER BY id ASC;")?;
            let mut rows = stmt.query([])?;
            let mut lists = Vec::new();
            while let Some(row) = rows.next()? {
                let id: i64 = row.get("id")?;
                lists.push(TodoList {
                    id: RecordId::Serial(id),
                    title: row.get("title")?,
                    todos: Vec::new(),
                });
            }

            for list in &mut lists {
                if let Some(list_id) = list.id.as_serial() {
                    list.todos = todos_for_list(conn, list_id)?;
                }
            }
            Ok(lists)
        })
    }

    fn find_list(&self, list_id: &RecordId) -> StoreResult<Option<TodoList>> {
        let Some(id) = list_id.as_serial() else {
            return Ok(None);
        };

        self.with_conn("find_list", format_args!("list_id={id}"), |conn| {
            let title: Option<String> = conn
                .query_row("SELECT title FROM lists WHERE id = ?1;", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            let Some(title) = title else {
                return Ok(None);
            };

            Ok(Some(TodoList {
                id: RecordId::Serial(id),
                title,
                todos: todos_for_list(conn, id)?,
            }))
        })
    }

    fn find_todo(&self, list_id: &RecordId, todo_id: &RecordId) -> StoreResult<Option<Todo>> {
        let (Some(list), Some(todo)) = (list_id.as_serial(), todo_id.as_serial()) else {
            return Ok(None);
        };

        self.with_conn(
            "find_todo",
            format_args!("list_id={list} todo_id={todo}"),
            |conn| {
                let mut stmt =
                    conn.prepare(&format!("{TODO_SELECT_SQL} WHERE list_id = ?1 AND id = ?2;"))?;
                let mut rows = stmt.query(params![list, todo])?;
                match rows.next()? {
                    Some(row) => Ok(Some(parse_todo_row(row)?)),
                    None => Ok(None),
                }
            },
        )
    }

    fn create_new_list(&mut self, title: &str) -> StoreResult<RecordId> {
        validate_list_title(title)?;

        self.with_conn(
            "create_new_list",
            format_args!("title_len={}", title.chars().count()),
            |conn| {
                conn.execute("INSERT INTO lists (title) VALUES (?1);", [title])
                    .map_err(|err| map_list_title_error(err, title))?;
                Ok(RecordId::Serial(conn.last_insert_rowid()))
            },
        )
    }

    fn update_list_by_id(&mut self, list_id: &RecordId, new_title: &str) -> StoreResult<()> {
        validate_list_title(new_title)?;
        let Some(id) = list_id.as_serial() else {
            return Ok(());
        };

        self.with_conn(
            "update_list_by_id",
            format_args!("list_id={id} title_len={}", new_title.chars().count()),
            |conn| {
                conn.execute(
                    "UPDATE lists SET title = ?1 WHERE id = ?2;",
                    params![new_title, id],
                )
                .map_err(|err| map_list_title_error(err, new_title))?;
                Ok(())
            },
        )
    }

    fn delete_list(&mut self, list_id: &RecordId) -> StoreResult<()> {
        let Some(id) = list_id.as_serial() else {
            return Ok(());
        };

        self.with_conn("delete_list", format_args!("list_id={id}"), |conn| {
            conn.execute("DELETE FROM lists WHERE id = ?1;", [id])?;
            Ok(())
        })
    }

    fn create_new_todo(&mut self, list_id: &RecordId, todo_title: &str) -> StoreResult<RecordId> {
        let Some(id) = list_id.as_serial() else {
            return Err(StoreError::MissingList(*list_id));
        };

        self.with_conn(
            "create_new_todo",
            format_args!("list_id={id} title_len={}", todo_title.chars().count()),
            |conn| {
                conn.execute(
                    "INSERT INTO todos (list_id, title) VALUES (?1, ?2);",
                    params![id, todo_title],
                )
                .map_err(|err| {
                    if constraint_code(&err) == Some(SQLITE_CONSTRAINT_FOREIGNKEY) {
                        StoreError::MissingList(RecordId::Serial(id))
                    } else {
                        StoreError::from(err)
                    }
                })?;
                Ok(RecordId::Serial(conn.last_insert_rowid()))
            },
        )
    }

    fn delete_todo_from_list(
        &mut self,
        list_id: &RecordId,
        todo_id: &RecordId,
    ) -> StoreResult<()> {
        let (Some(list), Some(todo)) = (list_id.as_serial(), todo_id.as_serial()) else {
            return Ok(());
        };

        self.with_conn(
            "delete_todo_from_list",
            format_args!("list_id={list} todo_id={todo}"),
            |conn| {
                conn.execute(
                    "DELETE FROM todos WHERE list_id = ?1 AND id = ?2;",
                    params![list, todo],
                )?;
                Ok(())
            },
        )
    }

    fn update_todo_status(
        &mut self,
        list_id: &RecordId,
        todo_id: &RecordId,
        status: bool,
    ) -> StoreResult<()> {
        let (Some(list), Some(todo)) = (list_id.as_serial(), todo_id.as_serial()) else {
            return Ok(());
        };

        self.with_conn(
            "update_todo_status",
            format_args!("list_id={list} todo_id={todo} completed={status}"),
            |conn| {
                conn.execute(
                    "UPDATE todos SET completed = ?1 WHERE list_id = ?2 AND id = ?3;",
                    params![bool_to_int(status), list, todo],
                )?;
                Ok(())
            },
        )
    }

    fn mark_all_todos_completed(&mut self, list_id: &RecordId) -> StoreResult<()> {
        let Some(id) = list_id.as_serial() else {
            return Ok(());
        };

        self.with_conn(
            "mark_all_todos_completed",
            format_args!("list_id={id}"),
            |conn| {
                conn.execute("UPDATE todos SET completed = 1 WHERE list_id = ?1;", [id])?;
                Ok(())
            },
        )
    }
}

fn todos_for_list(conn: &Connection, list_id: i64) -> StoreResult<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "{TODO_SELECT_SQL} WHERE list_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([list_id])?;
    let mut todos = Vec::new();
    while let Some(row) = rows.next()? {
        todos.push(parse_todo_row(row)?);
    }
    Ok(todos)
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<Todo> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed"
            )));
        }
    };

    Ok(Todo {
        id: RecordId::Serial(row.get("id")?),
        list_id: RecordId::Serial(row.get("list_id")?),
        title: row.get("title")?,
        completed,
    })
}

fn map_list_title_error(err: rusqlite::Error, title: &str) -> StoreError {
    if constraint_code(&err) == Some(SQLITE_CONSTRAINT_UNIQUE) {
        StoreError::DuplicateListTitle(title.to_string())
    } else {
        StoreError::from(err)
    }
}

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation => {
            Some(inner.extended_code)
        }
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
