//! Currency records and the shapes used to create or patch them

use serde::{Deserialize, Serialize};

/// A currency known to the installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: u64,
    pub name: String,
    pub code: String,
    pub symbol: String,
    pub precision: u8,
    pub thousand_separator: String,
    pub decimal_separator: String,
}

/// Fields of a currency about to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCurrency {
    pub name: String,
    pub code: String,
    pub symbol: String,
    pub precision: u8,
    pub thousand_separator: String,
    pub decimal_separator: String,
}

impl NewCurrency {
    pub fn into_currency(self, id: u64) -> Currency {
        Currency {
            id,
            name: self.name,
            code: self.code,
            symbol: self.symbol,
            precision: self.precision,
            thousand_separator: self.thousand_separator,
            decimal_separator: self.decimal_separator,
        }
    }
}

/// Partial update applied by `update_or_create`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
}

impl CurrencyPatch {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    /// Apply the patch in place
    pub fn apply(&self, currency: &mut Currency) {
        if let Some(symbol) = &self.symbol {
            currency.symbol = symbol.clone();
        }
        if let Some(name) = &self.name {
            currency.name = name.clone();
        }
        if let Some(precision) = self.precision {
            currency.precision = precision;
        }
    }

    /// Build a fresh record for an id that does not exist yet
    pub fn into_currency(self, id: u64) -> Currency {
        let mut currency = Currency {
            id,
            name: String::new(),
            code: String::new(),
            symbol: String::new(),
            precision: 2,
            thousand_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        };
        self.apply(&mut currency);
        currency
    }
}
