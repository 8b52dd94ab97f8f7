// 💱 Exchange rate table - Currency,Rate CSV → lookup by code

use crate::error::ConfigError;
use crate::models::Currency;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,

    #[serde(rename = "Rate")]
    rate: f64,
}

/// USD → currency multipliers, keyed by currency code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

/// The three rates the transformer needs, all present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRates {
    pub gbp: f64,
    pub eur: f64,
    pub inr: f64,
}

impl ConversionRates {
    pub fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Gbp => self.gbp,
            Currency::Eur => self.eur,
            Currency::Inr => self.inr,
        }
    }
}

impl ExchangeRates {
    /// Load from a CSV file with `Currency` and `Rate` columns
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |source| ConfigError::InvalidRates {
            path: path.display().to_string(),
            source,
        };

        let rdr = csv::Reader::from_path(path).map_err(invalid)?;
        Self::from_csv(rdr).map_err(invalid)
    }

    /// Load from any reader holding the CSV text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Self::from_csv(csv::Reader::from_reader(reader)).map_err(|source| {
            ConfigError::InvalidRates {
                path: "<reader>".to_string(),
                source,
            }
        })
    }

    fn from_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self, csv::Error> {
        let mut rates = HashMap::new();

        // Later rows win on duplicate codes
        for result in rdr.deserialize() {
            let row: RateRow = result?;
            rates.insert(row.currency.trim().to_string(), row.rate);
        }

        Ok(ExchangeRates { rates })
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        ExchangeRates {
            rates: pairs
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn require(&self, currency: Currency) -> Result<f64, ConfigError> {
        self.rate(currency.code())
            .ok_or_else(|| ConfigError::MissingRate {
                currency: currency.code().to_string(),
            })
    }

    /// GBP, EUR and INR rates; fails on the first one missing
    pub fn conversion(&self) -> Result<ConversionRates, ConfigError> {
        Ok(ConversionRates {
            gbp: self.require(Currency::Gbp)?,
            eur: self.require(Currency::Eur)?,
            inr: self.require(Currency::Inr)?,
        })
    }
}
