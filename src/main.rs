use anyhow::{Context, Result};
use std::io;

use largest_banks::{run, FileProgressLog, HttpFetcher, PipelineConfig};

fn main() -> Result<()> {
    let config = PipelineConfig::default();

    println!("🏦 Largest Banks ETL v{}", largest_banks::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Source: {}", config.url);

    let fetcher =
        HttpFetcher::new(config.http_timeout).context("Failed to build HTTP client")?;
    let log = FileProgressLog::new(&config.log_path);

    let summary = {
        let mut out = io::stdout().lock();
        run(&config, &fetcher, &log, &mut out).context("ETL run aborted")?
    };

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ {} banks written to {}", summary.banks, config.csv_path.display());
    println!(
        "✓ Table {} in {} ({} queries run)",
        config.table_name,
        config.db_path.display(),
        summary.queries
    );
    println!("✓ Progress log: {}", log.path().display());

    Ok(())
}
