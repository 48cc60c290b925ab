//! SQL tool executor: the concrete implementation of [`ToolExecutorPort`].
//!
//! [`SqlToolExecutor`] bridges the application layer's abstract
//! [`ToolExecutorPort`] with SQLite through the session's [`DatabaseHandle`].
//!
//! # Execution Path
//!
//! ```text
//! ToolExecutorPort::execute()
//!   ├─ DatabaseToolCall::parse()       typed arguments
//!   └─ spawn_blocking
//!        ├─ ScopedSession::acquire()   read-only or read-write by tool
//!        └─ ScopedSession::run()       commit / rollback, then close
//! ```
//!
//! When the deadline passed to `execute_within` expires, or the `execute`
//! future is dropped, the running statement is interrupted and a read-write
//! session rolls back. Once the tool body has finished, the call can no
//! longer be interrupted: the commit goes ahead and `execute_within` reports
//! it, so the model never sees a timeout for a write that landed.

use crate::database::render::{render_row, render_str_list};
use crate::database::{
    DatabaseError, DatabaseHandle, DatabaseTarget, ScopedSession, runs_outside_transaction,
};
use async_trait::async_trait;
use querymind_application::ports::database_control::DatabaseControl;
use querymind_application::ports::tool_executor::{ToolExecutorPort, deadline_exceeded};
use querymind_domain::core::string::truncate;
use querymind_domain::tool::catalog::{DatabaseToolCall, database_tool_spec};
use querymind_domain::tool::entities::{ToolCall, ToolSpec};
use querymind_domain::tool::value_objects::{ToolError, ToolResult};
use querymind_domain::{AccessMode, quote_identifier};
use rusqlite::{Batch, Connection, InterruptHandle, OptionalExtension, Statement};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Rendered tool output plus the number of rows (or names) it holds.
#[derive(Debug)]
struct Rendered {
    text: String,
    rows: usize,
}

/// Executor that runs the database tools against the session's database.
#[derive(Debug, Clone)]
pub struct SqlToolExecutor {
    tool_spec: ToolSpec,
    database: DatabaseHandle,
    /// Resolve table names against the live schema before interpolation
    strict_identifiers: bool,
}

impl SqlToolExecutor {
    pub fn new(database: DatabaseHandle) -> Self {
        Self {
            tool_spec: database_tool_spec(),
            database,
            strict_identifiers: true,
        }
    }

    pub fn with_strict_identifiers(mut self, strict: bool) -> Self {
        self.strict_identifiers = strict;
        self
    }

    pub fn database(&self) -> &DatabaseHandle {
        &self.database
    }

    async fn run_call(&self, call: &ToolCall, deadline: Option<Duration>) -> ToolResult {
        let started = Instant::now();
        let parsed = match DatabaseToolCall::parse(call) {
            Ok(parsed) => parsed,
            Err(e) => return ToolResult::failure(&call.tool_name, e),
        };
        info!(
            "{} reasoning: {}",
            parsed.tool().title(),
            truncate(parsed.reasoning(), 300)
        );

        let outcome = run_in_session(
            self.database.target(),
            parsed,
            self.strict_identifiers,
            deadline,
        )
        .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(rendered) => ToolResult::success(&call.tool_name, rendered.text)
                .with_row_count(rendered.rows)
                .with_duration(duration_ms),
            Err(e) => ToolResult::failure(&call.tool_name, e).with_duration(duration_ms),
        }
    }
}

#[async_trait]
impl DatabaseControl for SqlToolExecutor {
    fn current(&self) -> Option<String> {
        self.database.target().map(|t| t.to_string())
    }

    fn open(&self, path: &str) -> Result<String, String> {
        self.database
            .select(path)
            .map(|t| t.to_string())
            .map_err(|e| e.to_string())
    }

    /// List the tables of the session's database without going through the model.
    async fn list_tables(&self) -> Result<Vec<String>, ToolError> {
        let target = self.database.target();
        let names = tokio::task::spawn_blocking(move || -> Result<Vec<String>, ToolError> {
            ScopedSession::acquire(target.as_ref(), AccessMode::ReadOnly)
                .map_err(unavailable)?
                .run(table_names)
                .map_err(|e| ToolError::execution_failed(format!("Failed to list tables: {}", e)))
        })
        .await
        .map_err(|e| ToolError::execution_failed(format!("Database task failed: {}", e)))??;
        Ok(names)
    }
}

#[async_trait]
impl ToolExecutorPort for SqlToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        self.run_call(call, None).await
    }

    async fn execute_within(&self, call: &ToolCall, timeout: Duration) -> ToolResult {
        let result = self.run_call(call, Some(timeout)).await;
        if !result.error().is_some_and(ToolError::is_timeout) {
            return result;
        }
        let duration_ms = result.metadata.duration_ms.unwrap_or_default();
        ToolResult::failure(&call.tool_name, deadline_exceeded(&call.tool_name, timeout))
            .with_duration(duration_ms)
    }
}

#[derive(Default)]
enum InterruptState {
    #[default]
    Pending,
    Armed(InterruptHandle),
    Cancelled,
    /// The body finished; the outcome stands
    Settled,
}

/// Shared between the blocking body and the awaiting future.
#[derive(Default)]
struct Interrupter {
    state: Mutex<InterruptState>,
}

impl Interrupter {
    /// Register the connection's handle. Fails if already cancelled.
    fn arm(&self, handle: InterruptHandle) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            InterruptState::Cancelled => Err(DatabaseError::Cancelled),
            _ => {
                *state = InterruptState::Armed(handle);
                Ok(())
            }
        }
    }

    /// Called once the tool body is done, before commit. Fails if the call
    /// was cancelled first; afterwards [`Interrupter::cancel`] has no effect.
    fn settle(&self) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            InterruptState::Cancelled => Err(DatabaseError::Cancelled),
            _ => {
                *state = InterruptState::Settled;
                Ok(())
            }
        }
    }

    fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::take(&mut *state) {
            InterruptState::Settled => *state = InterruptState::Settled,
            InterruptState::Armed(handle) => {
                handle.interrupt();
                *state = InterruptState::Cancelled;
            }
            InterruptState::Pending | InterruptState::Cancelled => {
                *state = InterruptState::Cancelled;
            }
        }
    }
}

/// Interrupts the statement unless disarmed before drop.
struct InterruptOnDrop {
    interrupter: Arc<Interrupter>,
    armed: bool,
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if self.armed {
            warn!("Tool call abandoned; interrupting the running statement");
            self.interrupter.cancel();
        }
    }
}

async fn run_in_session(
    target: Option<DatabaseTarget>,
    call: DatabaseToolCall,
    strict: bool,
    deadline: Option<Duration>,
) -> Result<Rendered, ToolError> {
    let interrupter = Arc::new(Interrupter::default());
    let mut guard = InterruptOnDrop {
        interrupter: interrupter.clone(),
        armed: true,
    };

    let body_interrupter = interrupter.clone();
    let mut task = tokio::task::spawn_blocking(move || -> Result<Rendered, ToolError> {
        let session =
            ScopedSession::acquire(target.as_ref(), call.tool().access()).map_err(unavailable)?;
        let interrupter = body_interrupter;
        interrupter
            .arm(session.interrupt_handle())
            .map_err(|e| describe_failure(&call, e))?;
        let autocommit = matches!(
            &call,
            DatabaseToolCall::ExecuteSql(args) if runs_outside_transaction(&args.sql_query)
        );
        let body = |conn: &Connection| -> Result<Rendered, DatabaseError> {
            let rendered = run_tool(conn, &call, strict)?;
            // An autocommit statement has already landed; report it
            if interrupter.settle().is_err() && !autocommit {
                return Err(DatabaseError::Cancelled);
            }
            Ok(rendered)
        };
        let outcome = if autocommit {
            session.run_autocommit(body)
        } else {
            session.run(body)
        };
        outcome.map_err(|e| describe_failure(&call, e))
    });

    let joined = match deadline {
        None => (&mut task).await,
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("Tool call exceeded {:?}; interrupting the running statement", limit);
                interrupter.cancel();
                task.await
            }
        },
    };
    guard.armed = false;
    joined.map_err(|e| ToolError::execution_failed(format!("Database task failed: {}", e)))?
}

fn unavailable(e: DatabaseError) -> ToolError {
    debug!("{}", e);
    ToolError::database_unavailable().with_details(e.to_string())
}

fn describe_failure(call: &DatabaseToolCall, e: DatabaseError) -> ToolError {
    if e.is_unavailable() {
        return unavailable(e);
    }
    if e.is_interrupted() {
        return ToolError::timeout(call.tool().name());
    }
    let message = match call {
        DatabaseToolCall::ListTables(_) => format!("Failed to list tables: {}", e),
        DatabaseToolCall::SampleTable(args) => {
            format!("Failed to sample table '{}': {}", args.table_name, e)
        }
        DatabaseToolCall::DescribeTable(args) => {
            format!("Failed to describe table '{}': {}", args.table_name, e)
        }
        DatabaseToolCall::ExecuteSql(_) => format!("Failed to run query: {}", e),
    };
    match e {
        DatabaseError::UnknownTable(_) => ToolError::invalid_argument(message),
        _ => ToolError::execution_failed(message),
    }
}

fn run_tool(
    conn: &Connection,
    call: &DatabaseToolCall,
    strict: bool,
) -> Result<Rendered, DatabaseError> {
    match call {
        DatabaseToolCall::ListTables(_) => {
            let names = table_names(conn)?;
            Ok(Rendered {
                text: render_str_list(&names),
                rows: names.len(),
            })
        }
        DatabaseToolCall::SampleTable(args) => {
            let table = resolve_table(conn, &args.table_name, strict)?;
            render_rows(&mut conn.prepare(&format!(
                "SELECT * FROM {} LIMIT {}",
                table, args.row_sample_size
            ))?)
        }
        DatabaseToolCall::DescribeTable(args) => {
            let table = resolve_table(conn, &args.table_name, strict)?;
            render_rows(&mut conn.prepare(&format!("PRAGMA table_info({})", table))?)
        }
        DatabaseToolCall::ExecuteSql(args) => {
            debug!("Executing SQL: {}", truncate(&args.sql_query, 500));
            let mut stmt = single_statement(conn, &args.sql_query)?;
            match stmt.as_mut() {
                Some(stmt) => render_rows(stmt),
                None => Ok(Rendered {
                    text: String::new(),
                    rows: 0,
                }),
            }
        }
    }
}

/// Prepare the only statement in `sql`. `None` when it holds no statement.
///
/// Trailing whitespace, semicolons and comments are fine. Any further
/// statement is refused before anything runs.
fn single_statement<'conn>(
    conn: &'conn Connection,
    sql: &str,
) -> Result<Option<Statement<'conn>>, DatabaseError> {
    let mut batch = Batch::new(conn, sql);
    let first = batch.next()?;
    if first.is_some() && !matches!(batch.next(), Ok(None)) {
        return Err(DatabaseError::MultipleStatements);
    }
    Ok(first)
}

/// User tables, excluding SQLite's internal `sqlite_%` tables.
fn table_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

/// Quote a model-supplied table name for interpolation.
///
/// In strict mode the name is looked up in the live schema, ignoring case the
/// way SQLite does, and the schema's own spelling is quoted.
fn resolve_table(conn: &Connection, raw: &str, strict: bool) -> Result<String, DatabaseError> {
    if !strict {
        return Ok(quote_identifier(raw));
    }
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master
             WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
            [raw],
            |row| row.get(0),
        )
        .optional()?;
    match name {
        Some(name) => Ok(quote_identifier(&name)),
        None => Err(DatabaseError::UnknownTable(raw.to_string())),
    }
}

/// Run a prepared statement and render every returned row, one tuple per line.
fn render_rows(stmt: &mut Statement<'_>) -> Result<Rendered, DatabaseError> {
    let column_count = stmt.column_count();
    let mut rows = stmt.query([])?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        lines.push(render_row(row, column_count)?);
    }
    Ok(Rendered {
        rows: lines.len(),
        text: lines.join("\n"),
    })
}
