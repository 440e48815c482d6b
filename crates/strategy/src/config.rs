use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};

/// Top-level trading config file (TOML).
///
/// Example `config/trading.toml`:
/// ```toml
/// [[trading]]
/// symbol = "005930"
/// name = "Samsung turtle"
/// quantity = 10
/// entry_price = "71000"
/// pyramiding = ["+2.00", "+4.00"]
///
/// [trading.strategy]
/// type = "turtle"
/// atr_period = 20
/// step_n = 0.5
/// max_units = 4
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingFileConfig {
    #[serde(rename = "trading")]
    pub entries: Vec<TradingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingConfig {
    /// KRX ticker, e.g. "005930".
    pub symbol: String,
    /// Human-readable name shown in logs.
    pub name: String,
    /// Order quantity in shares.
    pub quantity: f64,
    /// Entry price as typed into the form. Empty when not set yet.
    #[serde(default)]
    pub entry_price: String,
    /// Pyramiding offsets in percent from the entry, as typed (`"+5.00"`).
    #[serde(default)]
    pub pyramiding: Vec<String>,
    #[serde(default)]
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StrategyKind {
    /// Levels are placed by hand.
    #[default]
    Manual,
    /// Add a unit every `step_n` ATRs above the entry, up to `max_units`.
    Turtle {
        atr_period: usize,
        step_n: f64,
        max_units: usize,
    },
}

impl TradingFileConfig {
    /// Load and validate a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file = Self::from_toml_str(&content)?;
        info!(path, entries = file.entries.len(), "Trading config loaded");
        Ok(file)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: Self = toml::from_str(content)?;
        for entry in &file.entries {
            entry.validate()?;
        }
        Ok(file)
    }

    /// Entry for `symbol`, or the first one when no symbol is given.
    pub fn find(&self, symbol: Option<&str>) -> Option<&TradingConfig> {
        match symbol {
            Some(symbol) => self.entries.iter().find(|e| e.symbol == symbol),
            None => self.entries.first(),
        }
    }
}

impl TradingConfig {
    fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::Config(format!("'{}': symbol must not be empty", self.name)));
        }
        if !(self.quantity.is_finite() && self.quantity > 0.0) {
            return Err(Error::Config(format!(
                "'{}': quantity must be positive, got {}",
                self.symbol, self.quantity
            )));
        }
        if let StrategyKind::Turtle {
            atr_period,
            step_n,
            max_units,
        } = self.strategy
        {
            if atr_period < 2 {
                return Err(Error::Config(format!(
                    "'{}': atr_period must be >= 2",
                    self.symbol
                )));
            }
            if !(step_n.is_finite() && step_n > 0.0) {
                return Err(Error::Config(format!(
                    "'{}': step_n must be positive",
                    self.symbol
                )));
            }
            if max_units == 0 {
                return Err(Error::Config(format!(
                    "'{}': max_units must be at least 1",
                    self.symbol
                )));
            }
        }
        Ok(())
    }
}
