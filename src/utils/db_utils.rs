use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlQueryResult;

use crate::validate::{FieldKind, Schema, parse_datetime};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    Str(String),
    I64(i64),
    U64(u64),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// Assembled INSERT/UPDATE statement
/// ===============================
#[derive(Debug)]
pub struct SqlWrite {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Convert a validated payload into bindable columns, in schema order.
/// Only fields named by the schema are bound; an explicit JSON null binds
/// as SQL NULL, an absent key or empty string binds nothing.
pub fn bind_columns(schema: &Schema, payload: &Value) -> Vec<(&'static str, SqlValue)> {
    let mut columns = Vec::new();
    let Some(obj) = payload.as_object() else {
        return columns;
    };

    for rule in schema.rules() {
        let value = match obj.get(rule.name) {
            None => continue,
            Some(Value::Null) => {
                columns.push((rule.name, SqlValue::Null));
                continue;
            }
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(value) => value,
        };

        let bound = match &rule.kind {
            FieldKind::Str { .. } | FieldKind::Enum { .. } => {
                value.as_str().map(|s| SqlValue::Str(s.to_string()))
            }
            FieldKind::Int => value.as_i64().map(SqlValue::I64),
            FieldKind::DateTime => value
                .as_str()
                .and_then(parse_datetime)
                .map(SqlValue::DateTime),
        };

        // Validation ran first; a conversion miss cannot happen for a
        // payload that passed it.
        if let Some(bound) = bound {
            columns.push((rule.name, bound));
        }
    }

    columns
}

/// Set `name` to `value`, replacing an existing binding for the column.
pub fn set_column(columns: &mut Vec<(&'static str, SqlValue)>, name: &'static str, value: SqlValue) {
    match columns.iter_mut().find(|(n, _)| *n == name) {
        Some(existing) => existing.1 = value,
        None => columns.push((name, value)),
    }
}

pub fn has_column(columns: &[(&'static str, SqlValue)], name: &str) -> bool {
    columns.iter().any(|(n, _)| *n == name)
}

pub fn build_insert(table: &str, columns: Vec<(&'static str, SqlValue)>) -> SqlWrite {
    let names = columns
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");

    SqlWrite {
        sql: format!("INSERT INTO {table} ({names}) VALUES ({placeholders})"),
        values: columns.into_iter().map(|(_, value)| value).collect(),
    }
}

pub fn build_update(table: &str, columns: Vec<(&'static str, SqlValue)>, id: u64) -> SqlWrite {
    let set_clause = columns
        .iter()
        .map(|(name, _)| format!("{name} = ?"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();
    values.push(SqlValue::U64(id));

    SqlWrite {
        sql: format!("UPDATE {table} SET {set_clause} WHERE id = ?"),
        values,
    }
}

/// ===============================
/// Execute the assembled statement
/// ===============================
pub async fn execute_write(
    pool: &MySqlPool,
    write: SqlWrite,
) -> Result<MySqlQueryResult, sqlx::Error> {
    tracing::debug!(sql = %write.sql, values = ?write.values, "executing write");

    let mut query = sqlx::query(&write.sql);
    for value in write.values {
        query = match value {
            SqlValue::Str(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    query.execute(pool).await
}
