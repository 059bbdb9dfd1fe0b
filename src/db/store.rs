use std::collections::HashMap;

use sqlx::{sqlite::SqliteRow, Column, Row, SqlitePool, TypeInfo, ValueRef};

use crate::export::dialect::Dialect;
use crate::export::format::{SemanticType, SqlValue};
use crate::AppResult;

/// Rows of one query with their column names in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// What a dump needs from the relational store.
#[allow(async_fn_in_trait)]
pub trait DumpStore {
    fn dialect(&self) -> Dialect;

    /// DDL that rebuilds the live schema on an empty database, without
    /// trailing terminators. Triggers are not included.
    async fn schema_statements(&self) -> AppResult<Vec<String>>;

    /// Trigger DDL, replayed only after every row is loaded.
    async fn trigger_statements(&self) -> AppResult<Vec<String>>;

    /// Run `sql` with `binds` as positional text parameters.
    async fn fetch_rows(&self, sql: &str, binds: &[String]) -> AppResult<RowSet>;

    /// Declared type per column, or `None` when the table is unknown to the
    /// catalog.
    async fn column_types(&self, table: &str)
        -> AppResult<Option<HashMap<String, SemanticType>>>;

    /// Every user id known to the store.
    async fn user_ids(&self) -> AppResult<Vec<String>>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// Object kinds in replay order; within a kind, creation order.
const SCHEMA_SQL: &str = "SELECT sql FROM sqlite_master \
     WHERE sql IS NOT NULL AND type <> 'trigger' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY CASE type WHEN 'table' THEN 0 WHEN 'index' THEN 1 ELSE 2 END, rowid";

const TRIGGER_SQL: &str = "SELECT sql FROM sqlite_master \
     WHERE sql IS NOT NULL AND type = 'trigger' \
     ORDER BY rowid";

impl SqliteStore {
    async fn ddl(&self, sql: &str) -> AppResult<Vec<String>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        let mut statements = Vec::with_capacity(rows.len());
        for row in rows {
            let sql: String = row.try_get("sql")?;
            let trimmed = sql.trim().trim_end_matches(';').trim_end();
            statements.push(trimmed.to_string());
        }
        Ok(statements)
    }
}

impl DumpStore for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn schema_statements(&self) -> AppResult<Vec<String>> {
        self.ddl(SCHEMA_SQL).await
    }

    async fn trigger_statements(&self) -> AppResult<Vec<String>> {
        self.ddl(TRIGGER_SQL).await
    }

    async fn fetch_rows(&self, sql: &str, binds: &[String]) -> AppResult<RowSet> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(value.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            values.push(decode_row(row)?);
        }
        Ok(RowSet {
            columns,
            rows: values,
        })
    }

    async fn column_types(
        &self,
        table: &str,
    ) -> AppResult<Option<HashMap<String, SemanticType>>> {
        let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?1)")
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut types = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let declared: String = row.try_get("type")?;
            types.insert(name, SemanticType::from_declared(&declared));
        }
        Ok(Some(types))
    }

    async fn user_ids(&self) -> AppResult<Vec<String>> {
        let rows = sqlx::query("SELECT CAST(id AS TEXT) AS id FROM koi_user ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get::<String, _>("id")?);
        }
        Ok(ids)
    }
}

// Decoded by the storage class of each value, not the declared column type.
fn decode_row(row: &SqliteRow) -> AppResult<Vec<SqlValue>> {
    let mut values = Vec::with_capacity(row.columns().len());
    for col in row.columns() {
        let idx = col.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => SqlValue::Integer(row.try_get::<i64, _>(idx)?),
                "REAL" => SqlValue::Real(row.try_get::<f64, _>(idx)?),
                "BLOB" => SqlValue::Blob(row.try_get::<Vec<u8>, _>(idx)?),
                _ => SqlValue::Text(row.try_get::<String, _>(idx)?),
            }
        };
        values.push(value);
    }
    Ok(values)
}
