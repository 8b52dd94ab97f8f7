// 🔁 Currency transformer - adds GBP/EUR/INR market-cap columns
//
// Each derived value is round(mc_usd_billion * rate, 2), half-to-even.

use crate::error::Result;
use crate::models::{BankDataset, BankRecord, DatasetColumns, ExtractedTable, TransformedBankRecord};
use crate::progress::ProgressLog;
use crate::rates::{ConversionRates, ExchangeRates};
use std::path::Path;

/// Round to 2 decimal places, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn convert(record: &BankRecord, rates: &ConversionRates) -> TransformedBankRecord {
    let usd = record.mc_usd_billion;

    TransformedBankRecord {
        name: record.name.clone(),
        mc_usd_billion: usd,
        mc_gbp_billion: round2(usd * rates.gbp),
        mc_eur_billion: round2(usd * rates.eur),
        mc_inr_billion: round2(usd * rates.inr),
    }
}

/// Load the exchange rate file at `rates_path` and convert every record
pub fn transform(
    table: &ExtractedTable,
    rates_path: &Path,
    log: &dyn ProgressLog,
) -> Result<BankDataset> {
    let rates = ExchangeRates::load(rates_path)?;
    transform_with(table, &rates, log)
}

/// Convert every record using already-loaded rates; order and count are kept
pub fn transform_with(
    table: &ExtractedTable,
    rates: &ExchangeRates,
    log: &dyn ProgressLog,
) -> Result<BankDataset> {
    let conversion = rates.conversion()?;

    let records = table
        .records
        .iter()
        .map(|r| convert(r, &conversion))
        .collect();

    log.log("Data transformation complete. Initiating Loading process")?;

    Ok(BankDataset {
        columns: DatasetColumns::from_extracted(&table.columns),
        records,
    })
}
