// 🏦 Bank records - the tabular shapes flowing through the pipeline
//
// Extraction yields `ExtractedTable` (name + USD market cap),
// transformation yields `BankDataset` (plus GBP/EUR/INR columns).
// Records are built by field, column names travel next to them.

use serde::{Deserialize, Serialize};

// ============================================================================
// CURRENCIES
// ============================================================================

/// Target currency for the derived market-cap columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Gbp,
    Eur,
    Inr,
}

impl Currency {
    /// ISO code as found in the exchange rate file
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Inr => "INR",
        }
    }

    /// Output column holding the market cap in this currency
    pub fn column_name(&self) -> String {
        format!("MC_{}_Billion", self.code())
    }
}

// ============================================================================
// EXTRACTED TABLE
// ============================================================================

/// Output names for the two extracted columns (name first, market cap second)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub name: String,
    pub market_cap: String,
}

impl ColumnNames {
    pub fn new(name: &str, market_cap: &str) -> Self {
        ColumnNames {
            name: name.to_string(),
            market_cap: market_cap.to_string(),
        }
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames::new("Name", "MC_USD_Billion")
    }
}

/// One bank as scraped from the source table
#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    pub name: String,
    pub mc_usd_billion: f64,
}

impl BankRecord {
    pub fn new(name: &str, mc_usd_billion: f64) -> Self {
        BankRecord {
            name: name.to_string(),
            mc_usd_billion,
        }
    }
}

/// Extraction result: records in source order plus their column names
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub columns: ColumnNames,
    pub records: Vec<BankRecord>,
}

// ============================================================================
// TRANSFORMED DATASET
// ============================================================================

/// Column names of the final dataset, in canonical order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetColumns {
    pub name: String,
    pub mc_usd: String,
    pub mc_gbp: String,
    pub mc_eur: String,
    pub mc_inr: String,
}

impl DatasetColumns {
    /// Extend the extracted column names with the derived currency columns
    pub fn from_extracted(columns: &ColumnNames) -> Self {
        DatasetColumns {
            name: columns.name.clone(),
            mc_usd: columns.market_cap.clone(),
            mc_gbp: Currency::Gbp.column_name(),
            mc_eur: Currency::Eur.column_name(),
            mc_inr: Currency::Inr.column_name(),
        }
    }

    /// Header row: name, USD, GBP, EUR, INR
    pub fn headers(&self) -> [&str; 5] {
        [
            self.name.as_str(),
            self.mc_usd.as_str(),
            self.mc_gbp.as_str(),
            self.mc_eur.as_str(),
            self.mc_inr.as_str(),
        ]
    }
}

impl Default for DatasetColumns {
    fn default() -> Self {
        DatasetColumns::from_extracted(&ColumnNames::default())
    }
}

/// Final row: the scraped record plus the three derived currency columns.
///
/// Field order is the on-disk column order (CSV and database).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedBankRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,

    #[serde(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,

    #[serde(rename = "MC_EUR_Billion")]
    pub mc_eur_billion: f64,

    #[serde(rename = "MC_INR_Billion")]
    pub mc_inr_billion: f64,
}

impl TransformedBankRecord {
    /// Market cap in a derived currency
    pub fn market_cap_in(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Gbp => self.mc_gbp_billion,
            Currency::Eur => self.mc_eur_billion,
            Currency::Inr => self.mc_inr_billion,
        }
    }
}

/// The dataset handed to the persistence sink
#[derive(Debug, Clone, PartialEq)]
pub struct BankDataset {
    pub columns: DatasetColumns,
    pub records: Vec<TransformedBankRecord>,
}

impl BankDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render as a plain-text table (row index, then the five columns)
    pub fn render_table(&self) -> String {
        let headers = self.columns.headers();
        let rows: Vec<[String; 5]> = self
            .records
            .iter()
            .map(|r| {
                [
                    r.name.clone(),
                    format_number(r.mc_usd_billion),
                    format_number(r.mc_gbp_billion),
                    format_number(r.mc_eur_billion),
                    format_number(r.mc_inr_billion),
                ]
            })
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        let index_width = rows.len().saturating_sub(1).to_string().len();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (i, header) in headers.iter().enumerate() {
            out.push_str(&format!("  {:>width$}", header, width = widths[i]));
        }
        out.push('\n');

        for (idx, row) in rows.iter().enumerate() {
            out.push_str(&format!("{:<width$}", idx, width = index_width));
            for (i, cell) in row.iter().enumerate() {
                out.push_str(&format!("  {:>width$}", cell, width = widths[i]));
            }
            out.push('\n');
        }

        out
    }
}

/// Float formatting used for console output: integral values keep a `.0`
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}
