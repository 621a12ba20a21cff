//! Native MySQL row ↔ core value conversions.

use craftdb_core::{DbError, Record, Result, Value};
use mysql::prelude::Protocol;

/// Converts a core value into the driver's value for binding.
pub(crate) fn to_native(value: &Value) -> mysql::Value {
    match value {
        Value::Null => mysql::Value::NULL,
        Value::Integer(i) => mysql::Value::Int(*i),
        Value::Real(r) => mysql::Value::Double(*r),
        Value::Text(t) => mysql::Value::Bytes(t.clone().into_bytes()),
    }
}

/// Positional parameter pack for a bound execution.
pub(crate) fn to_params(params: &[Value]) -> mysql::Params {
    if params.is_empty() {
        mysql::Params::Empty
    } else {
        mysql::Params::Positional(params.iter().map(to_native).collect())
    }
}

/// Converts a driver value into a core value.
///
/// Byte payloads decode as (lossy) UTF-8 text, matching the text
/// protocol's delivery of most column types. Temporal values render in
/// the conventional `YYYY-MM-DD hh:mm:ss` shape.
pub(crate) fn from_native(value: mysql::Value) -> Value {
    use mysql::Value as Native;
    match value {
        Native::NULL => Value::Null,
        Native::Bytes(bytes) => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Native::Int(i) => Value::Integer(i),
        Native::UInt(u) => Value::Integer(u as i64),
        Native::Float(f) => Value::Real(f64::from(f)),
        Native::Double(d) => Value::Real(d),
        temporal @ (Native::Date(..) | Native::Time(..)) => {
            Value::Text(temporal.as_sql(true).trim_matches('\'').to_string())
        }
    }
}

/// Materializes one driver row as an ordered [`Record`], preserving the
/// result set's column order.
pub(crate) fn row_to_record(row: mysql::Row) -> Record {
    let mut record = Record::new();
    for (index, column) in row.columns_ref().iter().enumerate() {
        let value = row.as_ref(index).cloned().unwrap_or(mysql::Value::NULL);
        record.push(column.name_str().into_owned(), from_native(value));
    }
    record
}

/// Drains a query result into records.
pub(crate) fn collect_rows<P: Protocol>(
    result: mysql::QueryResult<'_, '_, '_, P>,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for row in result {
        let row = row.map_err(|e| DbError::Execution(e.to_string()))?;
        records.push(row_to_record(row));
    }
    Ok(records)
}
