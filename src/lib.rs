// Largest Banks ETL - Core Library
// Exposes the pipeline stages for the binary and tests

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod rates;
pub mod sink;
pub mod transform;

// Re-export commonly used types
pub use config::{PipelineConfig, TableSource, DEFAULT_QUERIES, SOURCE_URL};
pub use error::{ConfigError, EtlError, ExtractionError};
pub use extract::{read_marked_table, RawTable, TableExtractor};
pub use fetch::{HttpFetcher, SourceFetcher, StaticFetcher};
pub use models::{
    BankDataset, BankRecord, ColumnNames, Currency, DatasetColumns, ExtractedTable,
    TransformedBankRecord,
};
pub use pipeline::{run, RunSummary};
pub use progress::{FileProgressLog, MemoryProgressLog, ProgressLog};
pub use query::{run_query, QueryResult};
pub use rates::{ConversionRates, ExchangeRates};
pub use sink::{read_csv, read_table, write_csv, write_table};
pub use transform::{round2, transform, transform_with};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
