// 🚚 ETL pipeline - fetch → extract → transform → persist → query
//
// Strictly sequential. Any stage error aborts the run; the progress
// log shows how far it got. Console output goes to `out`.

use crate::config::PipelineConfig;
use crate::error::{EtlError, Result};
use crate::extract::TableExtractor;
use crate::fetch::SourceFetcher;
use crate::models::{format_number, Currency};
use crate::progress::ProgressLog;
use crate::query::run_query;
use crate::sink::{write_csv, write_table};
use crate::transform::transform;
use rusqlite::Connection;
use std::io::Write;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub banks: usize,
    pub queries: usize,
}

pub fn run(
    config: &PipelineConfig,
    fetcher: &dyn SourceFetcher,
    log: &dyn ProgressLog,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    log.log("Preliminaries complete. Initiating ETL process")?;

    // 1. Extract
    let html = fetcher.fetch(&config.url)?;
    let table = TableExtractor::new(config.source.clone())
        .extract(&html, &config.columns, log, out)?;

    // 2. Transform
    let dataset = transform(&table, &config.rates_path, log)?;

    writeln!(out, "{}", dataset.render_table())?;
    if let Some(fifth) = dataset.records.get(4) {
        writeln!(out, "Market cap of the 5th largest bank in EUR billion:")?;
        writeln!(out, "{}", format_number(fifth.market_cap_in(Currency::Eur)))?;
    }

    // 3. Load
    write_csv(&dataset, &config.csv_path, log)?;

    let db_target = config.db_path.display().to_string();
    let conn = Connection::open(&config.db_path)
        .map_err(|e| EtlError::persist(db_target.as_str(), e))?;
    log.log("SQL Connection initiated")?;

    write_table(&dataset, &conn, &config.table_name, log)?;

    // 4. Query
    for sql in &config.queries {
        run_query(sql, &conn, log, out)?;
    }

    conn.close()
        .map_err(|(_, e)| EtlError::persist(db_target.as_str(), e))?;
    log.log("Server Connection closed")?;

    Ok(RunSummary {
        banks: dataset.len(),
        queries: config.queries.len(),
    })
}
