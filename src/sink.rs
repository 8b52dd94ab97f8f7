// 💾 Persistence sink - dataset → CSV file and SQLite table
//
// Both writes fully replace what was there: the CSV is truncated and
// rewritten, the table is dropped and recreated. Nothing is appended.

use crate::error::{EtlError, Result};
use crate::models::{BankDataset, DatasetColumns, TransformedBankRecord};
use crate::progress::ProgressLog;
use rusqlite::{params, Connection};
use std::path::Path;

// ============================================================================
// CSV
// ============================================================================

/// Write the header row and one line per record, overwriting `path`
pub fn write_csv(dataset: &BankDataset, path: &Path, log: &dyn ProgressLog) -> Result<()> {
    let target = path.display().to_string();
    let fail = |e: csv::Error| EtlError::persist(target.as_str(), e);

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(fail)?;

    wtr.write_record(dataset.columns.headers()).map_err(fail)?;
    for record in &dataset.records {
        wtr.serialize(record).map_err(fail)?;
    }
    wtr.flush().map_err(|e| EtlError::persist(target.as_str(), e))?;

    log.log("Data saved to CSV file")?;
    Ok(())
}

/// Read a CSV written by `write_csv` back into a dataset
pub fn read_csv(path: &Path) -> Result<BankDataset> {
    let target = path.display().to_string();
    let fail = |e: csv::Error| EtlError::persist(target.as_str(), e);

    let mut rdr = csv::Reader::from_path(path).map_err(fail)?;
    let headers: Vec<String> = rdr.headers().map_err(fail)?.iter().map(String::from).collect();
    let columns = columns_from_headers(&headers).ok_or_else(|| {
        EtlError::persist(target.as_str(), format!("expected 5 columns, found {}", headers.len()))
    })?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(fail)?;
        let row: TransformedBankRecord = record.deserialize(None).map_err(fail)?;
        records.push(row);
    }

    Ok(BankDataset { columns, records })
}

fn columns_from_headers(headers: &[String]) -> Option<DatasetColumns> {
    match headers {
        [name, mc_usd, mc_gbp, mc_eur, mc_inr] => Some(DatasetColumns {
            name: name.clone(),
            mc_usd: mc_usd.clone(),
            mc_gbp: mc_gbp.clone(),
            mc_eur: mc_eur.clone(),
            mc_inr: mc_inr.clone(),
        }),
        _ => None,
    }
}

// ============================================================================
// DATABASE
// ============================================================================

/// Quote an SQL identifier (table or column name)
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Replace `table_name` with the dataset: drop, create, insert, in one transaction
pub fn write_table(
    dataset: &BankDataset,
    conn: &Connection,
    table_name: &str,
    log: &dyn ProgressLog,
) -> Result<usize> {
    let fail = |e: rusqlite::Error| EtlError::persist(table_name, e);

    let [name, usd, gbp, eur, inr] = dataset.columns.headers().map(quote_ident);
    let table = quote_ident(table_name);

    let tx = conn.unchecked_transaction().map_err(fail)?;

    tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
        .map_err(fail)?;

    tx.execute(
        &format!(
            "CREATE TABLE {} (
                {} TEXT,
                {} REAL,
                {} REAL,
                {} REAL,
                {} REAL
            )",
            table, name, usd, gbp, eur, inr
        ),
        [],
    )
    .map_err(fail)?;

    let mut inserted = 0;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
                table, name, usd, gbp, eur, inr
            ))
            .map_err(fail)?;

        for r in &dataset.records {
            inserted += stmt
                .execute(params![
                    r.name,
                    r.mc_usd_billion,
                    r.mc_gbp_billion,
                    r.mc_eur_billion,
                    r.mc_inr_billion,
                ])
                .map_err(fail)?;
        }
    }

    tx.commit().map_err(fail)?;

    log.log("Data loaded to Database as a table, Executing queries")?;
    Ok(inserted)
}

/// Read every row of `table_name`, in stored order
pub fn read_table(conn: &Connection, table_name: &str) -> Result<BankDataset> {
    let fail = |e: rusqlite::Error| EtlError::persist(table_name, e);

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {}", quote_ident(table_name)))
        .map_err(fail)?;

    let headers: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let columns = columns_from_headers(&headers).ok_or_else(|| {
        EtlError::persist(table_name, format!("expected 5 columns, found {}", headers.len()))
    })?;

    let records = stmt
        .query_map([], |row| {
            Ok(TransformedBankRecord {
                name: row.get(0)?,
                mc_usd_billion: row.get(1)?,
                mc_gbp_billion: row.get(2)?,
                mc_eur_billion: row.get(3)?,
                mc_inr_billion: row.get(4)?,
            })
        })
        .map_err(fail)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(fail)?;

    Ok(BankDataset { columns, records })
}

pub fn count_rows(conn: &Connection, table_name: &str) -> Result<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table_name)),
        [],
        |row| row.get(0),
    )
    .map_err(|e| EtlError::persist(table_name, e))
}
