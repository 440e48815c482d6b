use serde::{Deserialize, Serialize};
use tracing::debug;

use common::offset::parse_offset;
use common::tick::parse_price;
use common::{quantize, TradingParameterSink};

use crate::config::TradingConfig;

/// The trading form: entry price and pyramiding offsets, stored as the text
/// the user sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingParameters {
    pub entry_price: String,
    pub pyramiding_offsets: Vec<String>,
}

impl TradingParameters {
    /// Level prices implied by the offsets, quantized to the tick grid.
    ///
    /// One slot per offset; `None` where the offset does not parse or there
    /// is no positive entry to measure from.
    pub fn pyramiding_prices(&self) -> Vec<Option<f64>> {
        let entry = TradingParameterSink::entry_price(self);
        self.pyramiding_offsets
            .iter()
            .map(|raw| {
                let entry = entry?;
                let pct = parse_offset(raw)?;
                Some(quantize(entry * (1.0 + pct / 100.0)))
            })
            .collect()
    }
}

impl From<&TradingConfig> for TradingParameters {
    fn from(cfg: &TradingConfig) -> Self {
        Self {
            entry_price: cfg.entry_price.clone(),
            pyramiding_offsets: cfg.pyramiding.clone(),
        }
    }
}

impl TradingParameterSink for TradingParameters {
    fn entry_price(&self) -> Option<f64> {
        parse_price(&self.entry_price).filter(|p| *p > 0.0)
    }

    fn set_entry_price(&mut self, value: String) {
        debug!(entry = %value, "Entry price field updated");
        self.entry_price = value;
    }

    fn set_pyramiding_offset(&mut self, index: usize, value: String) {
        if self.pyramiding_offsets.len() <= index {
            self.pyramiding_offsets.resize(index + 1, String::new());
        }
        debug!(level = index, offset = %value, "Pyramiding offset field updated");
        self.pyramiding_offsets[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entry: &str, offsets: &[&str]) -> TradingParameters {
        TradingParameters {
            entry_price: entry.to_string(),
            pyramiding_offsets: offsets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn entry_reads_form_text() {
        assert_eq!(params("71,000", &[]).entry_price(), Some(71_000.0));
        assert_eq!(params("", &[]).entry_price(), None);
        assert_eq!(params("0", &[]).entry_price(), None);
        assert_eq!(params("abc", &[]).entry_price(), None);
    }

    #[test]
    fn offset_writes_grow_the_list() {
        let mut p = TradingParameters::default();
        p.set_pyramiding_offset(2, "+3.00".into());
        assert_eq!(p.pyramiding_offsets, vec!["", "", "+3.00"]);
        p.set_pyramiding_offset(0, "-1.50".into());
        assert_eq!(p.pyramiding_offsets[0], "-1.50");
    }

    #[test]
    fn prices_resolve_against_entry() {
        let p = params("10000", &["+5.00", "-10", "", "nope"]);
        assert_eq!(
            p.pyramiding_prices(),
            vec![Some(10_500.0), Some(9_000.0), None, None]
        );
    }

    #[test]
    fn prices_land_on_ticks() {
        // 71000 * 1.0123 = 71873.3 -> 71900 at the 100-won tick.
        let p = params("71000", &["+1.23"]);
        assert_eq!(p.pyramiding_prices(), vec![Some(71_900.0)]);
    }

    #[test]
    fn no_entry_means_no_prices() {
        let p = params("", &["+5.00"]);
        assert_eq!(p.pyramiding_prices(), vec![None]);
    }
}
