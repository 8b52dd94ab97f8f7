// 📊 Query runner - execute a statement and print its rows
//
// Rows print one per line in tuple form: ('JPMorgan Chase', 432.92)
// A failing statement aborts the run; nothing is retried.

use crate::error::{EtlError, Result};
use crate::models::format_number;
use crate::progress::ProgressLog;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::io::Write;

/// Rows returned by one statement, in result order
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Run `sql`, print a banner plus every row to `out`, log once
pub fn run_query(
    sql: &str,
    conn: &Connection,
    log: &dyn ProgressLog,
    out: &mut dyn Write,
) -> Result<QueryResult> {
    let query_err = |source| EtlError::Query {
        sql: sql.to_string(),
        source,
    };

    writeln!(out, "\n>>> Query: {}", sql)?;

    let mut stmt = conn.prepare(sql).map_err(query_err)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .map_err(query_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_err)?;

    for row in &rows {
        writeln!(out, "{}", format_row(row))?;
    }

    log.log("Process Complete")?;

    Ok(QueryResult { columns, rows })
}

/// Tuple rendering of a row; one-element rows keep the trailing comma
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(format_value).collect();
    match cells.len() {
        1 => format!("({},)", cells[0]),
        _ => format!("({})", cells.join(", ")),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format_number(*f),
        Value::Text(s) => quote_text(s),
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("\\x{:02x}", b)).collect();
            format!("b'{}'", hex)
        }
    }
}

/// Single quotes unless the text contains one (then double quotes)
fn quote_text(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", s.replace('\\', "\\\\"))
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}
