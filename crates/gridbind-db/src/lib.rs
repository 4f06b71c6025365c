// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gridbind_app::{CellValue, DataSource, Row};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_NAME: &str = "gridbind";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT name
                FROM sqlite_master
                WHERE type IN ('table', 'view')
                  AND name NOT LIKE 'sqlite_%'
                ORDER BY name ASC
                ",
            )
            .context("prepare table names query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query table names")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect table names")
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "
                SELECT 1
                FROM sqlite_master
                WHERE type IN ('table', 'view') AND name = ?
                ",
                [table],
                |_| Ok(()),
            )
            .optional()
            .with_context(|| format!("look up table {table}"))?;
        Ok(found.is_some())
    }

    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        if !is_safe_identifier(table) {
            bail!("invalid table name: {table:?}");
        }

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .with_context(|| format!("inspect columns for {table}"))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .with_context(|| format!("query column info for {table}"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("collect columns for {table}"))
    }

    /// Query over `table` for a grid to compose. The table must exist.
    pub fn source(&self, table: &str) -> Result<SqliteSource<'_>> {
        if !is_safe_identifier(table) {
            bail!("invalid table name: {table:?}");
        }
        if !self.table_exists(table)? {
            bail!("table {table:?} does not exist -- check [grid].table in the config");
        }
        Ok(SqliteSource::new(&self.conn, table))
    }
}

/// [`DataSource`] that renders a single SELECT against one table or view.
///
/// Predicates and ordering expressions are trusted configuration text and go
/// into the statement verbatim.
#[derive(Debug, Clone)]
pub struct SqliteSource<'c> {
    conn: &'c Connection,
    table: String,
    predicates: Vec<String>,
    order: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<'c> SqliteSource<'c> {
    fn new(conn: &'c Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_owned(),
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn select_sql(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", self.table);
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        match (self.limit, self.offset) {
            (None, None) => {}
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (limit, Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {offset}", limit.unwrap_or(-1)));
            }
        }
        sql
    }

    pub fn count_sql(&self) -> String {
        if self.limit.is_some() || self.offset.is_some() {
            return format!("SELECT COUNT(*) FROM ({})", self.select_sql());
        }
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        sql
    }
}

impl DataSource for SqliteSource<'_> {
    fn and_where(&mut self, predicate: &str) {
        self.predicates.push(format!("({predicate})"));
    }

    fn order_by(&mut self, expression: &str) {
        self.order.push(format!("{expression} ASC"));
    }

    fn order_by_descending(&mut self, expression: &str) {
        self.order.push(format!("{expression} DESC"));
    }

    fn take(&mut self, count: i64) {
        self.limit = Some(count.max(0));
    }

    fn skip(&mut self, count: i64) {
        self.offset = Some(count.max(0));
    }

    fn count(self) -> Result<i64> {
        let sql = self.count_sql();
        debug!(%sql, "counting rows");
        self.conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .with_context(|| format!("count rows in {}", self.table))
    }

    fn materialize(self) -> Result<Vec<Row>> {
        let sql = self.select_sql();
        debug!(%sql, "fetching rows");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("prepare query on {}", self.table))?;
        let columns = stmt
            .column_names()
            .iter()
            .map(|column| (*column).to_owned())
            .collect::<Vec<_>>();
        let mut rows = stmt
            .query([])
            .with_context(|| format!("query {}", self.table))?;

        let mut output = Vec::new();
        while let Some(row) = rows.next().context("scan query rows")? {
            let mut record = Row::new();
            for (index, column) in columns.iter().enumerate() {
                let value = row
                    .get_ref(index)
                    .map(value_ref_to_cell)
                    .with_context(|| format!("read column {column} from query result"))?;
                record.set(column, value);
            }
            output.push(record);
        }
        Ok(output)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("GRIDBIND_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set GRIDBIND_DB_PATH to a database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("gridbind.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

pub fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

fn value_ref_to_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(value) => CellValue::Integer(value),
        ValueRef::Real(value) => CellValue::Real(value),
        ValueRef::Text(value) => CellValue::Text(String::from_utf8_lossy(value).into_owned()),
        ValueRef::Blob(value) => CellValue::Text(format!("<blob {} bytes>", value.len())),
    }
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}
