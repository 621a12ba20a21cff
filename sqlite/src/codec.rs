//! Native SQLite row ↔ core value conversions.

use craftdb_core::{DbError, Record, Result, Value};
use rusqlite::types::ValueRef;

/// Converts a core value into the driver's owned value for binding.
pub(crate) fn to_native(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(r) => rusqlite::types::Value::Real(*r),
        Value::Text(t) => rusqlite::types::Value::Text(t.clone()),
    }
}

fn from_native(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        // Blobs travel as lossy text; the persistence contract carries
        // no binary column type.
        ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Runs a prepared statement and materializes every resulting row as an
/// ordered [`Record`], preserving the statement's column order.
pub(crate) fn fetch_all<P: rusqlite::Params>(
    stmt: &mut rusqlite::Statement<'_>,
    params: P,
) -> Result<Vec<Record>> {
    let columns: Vec<String> = stmt.column_names().iter().map(|c| (*c).to_string()).collect();
    let mut rows = stmt
        .query(params)
        .map_err(|e| DbError::Execution(e.to_string()))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(|e| DbError::Execution(e.to_string()))? {
        let mut record = Record::new();
        for (index, name) in columns.iter().enumerate() {
            let value = row
                .get_ref(index)
                .map_err(|e| DbError::Execution(e.to_string()))?;
            record.push(name.clone(), from_native(value));
        }
        records.push(record);
    }
    Ok(records)
}
