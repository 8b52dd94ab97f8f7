// ⚙️ Pipeline configuration
// All inputs and outputs of a run. The binary uses the defaults as-is.

use crate::models::ColumnNames;
use std::path::PathBuf;
use std::time::Duration;

/// Archived snapshot of the "largest banks" page
pub const SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";

/// Queries run against the loaded table, in order
pub const DEFAULT_QUERIES: [&str; 3] = [
    "SELECT * FROM Largest_banks",
    "SELECT AVG(MC_GBP_Billion) FROM Largest_banks",
    "SELECT Name FROM Largest_banks LIMIT 5",
];

/// Where the source table lives and which of its columns to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    /// CSS class marking candidate tables (first match wins)
    pub marker_class: String,

    /// Exact header of the entity-name column
    pub name_header: String,

    /// Substring identifying the market-cap column header
    pub market_cap_header: String,
}

impl Default for TableSource {
    fn default() -> Self {
        TableSource {
            marker_class: "wikitable".to_string(),
            name_header: "Bank name".to_string(),
            market_cap_header: "Market cap".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub url: String,
    pub http_timeout: Duration,
    pub source: TableSource,
    pub columns: ColumnNames,
    pub rates_path: PathBuf,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
    pub log_path: PathBuf,
    pub queries: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            url: SOURCE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            source: TableSource::default(),
            columns: ColumnNames::default(),
            rates_path: PathBuf::from("exchange_rate.csv"),
            csv_path: PathBuf::from("./Largest_banks_data.csv"),
            db_path: PathBuf::from("Banks.db"),
            table_name: "Largest_banks".to_string(),
            log_path: PathBuf::from("code_log.txt"),
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Same run, all files placed under `dir`
    pub fn in_dir(dir: &std::path::Path) -> Self {
        PipelineConfig {
            rates_path: dir.join("exchange_rate.csv"),
            csv_path: dir.join("Largest_banks_data.csv"),
            db_path: dir.join("Banks.db"),
            log_path: dir.join("code_log.txt"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.table_name, "Largest_banks");
        assert_eq!(config.csv_path, PathBuf::from("./Largest_banks_data.csv"));
        assert_eq!(config.log_path, PathBuf::from("code_log.txt"));
        assert_eq!(config.columns, ColumnNames::new("Name", "MC_USD_Billion"));
        assert_eq!(config.source.marker_class, "wikitable");
        assert_eq!(config.queries.len(), 3);
        assert_eq!(config.queries[2], "SELECT Name FROM Largest_banks LIMIT 5");
    }

    #[test]
    fn test_in_dir() {
        let dir = std::path::Path::new("/tmp/run");
        let config = PipelineConfig::in_dir(dir);
        assert_eq!(config.db_path, dir.join("Banks.db"));
        assert_eq!(config.rates_path, dir.join("exchange_rate.csv"));
        assert_eq!(config.url, SOURCE_URL);
    }
}
