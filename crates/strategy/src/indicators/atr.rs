use common::Candle;

/// ATR (Average True Range) indicator, the turtle "N".
///
/// Uses Wilder's smoothing: the first value is the mean of the first `period`
/// true ranges, later ones blend in each new range with weight `1 / period`.
/// Returns `None` until at least `period + 1` candles are available.
#[derive(Debug, Clone)]
pub struct AtrIndicator {
    pub period: usize,
}

impl AtrIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "ATR period must be >= 2");
        Self { period }
    }

    /// Compute ATR from candles (oldest first).
    pub fn compute(&self, candles: &[Candle]) -> Option<f64> {
        if candles.len() < self.period + 1 {
            return None;
        }

        // True range needs the previous close, so the first candle only seeds.
        let ranges: Vec<f64> = candles
            .windows(2)
            .map(|w| true_range(&w[1], w[0].close))
            .collect();

        let n = self.period as f64;
        let mut atr = ranges[..self.period].iter().sum::<f64>() / n;
        for &tr in &ranges[self.period..] {
            atr = (atr * (n - 1.0) + tr) / n;
        }

        atr.is_finite().then_some(atr)
    }
}

/// Largest of high-low, |high - prev close| and |low - prev close|.
pub fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    let hl = candle.high - candle.low;
    let hc = (candle.high - prev_close).abs();
    let lc = (candle.low - prev_close).abs();
    hl.max(hc).max(lc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(i: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn atr_returns_none_when_insufficient_data() {
        let atr = AtrIndicator::new(3);
        let candles: Vec<Candle> = (0..3).map(|i| candle(i, 110.0, 90.0, 100.0)).collect();
        assert!(atr.compute(&candles).is_none());
    }

    #[test]
    fn atr_constant_range() {
        let atr = AtrIndicator::new(3);
        // Every bar spans 20 around a flat close.
        let candles: Vec<Candle> = (0..10).map(|i| candle(i, 110.0, 90.0, 100.0)).collect();
        let value = atr.compute(&candles).unwrap();
        assert!((value - 20.0).abs() < 1e-9, "Expected 20, got {value}");
    }

    #[test]
    fn true_range_uses_gap_from_previous_close() {
        // Gap up: the bar itself spans 5 but sits 30 above the prior close.
        let c = candle(1, 135.0, 130.0, 132.0);
        assert_eq!(true_range(&c, 100.0), 35.0);
        assert_eq!(true_range(&c, 133.0), 5.0);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let atr = AtrIndicator::new(2);
        let candles = vec![
            candle(0, 10.0, 10.0, 10.0),
            candle(1, 12.0, 10.0, 11.0), // tr 2
            candle(2, 15.0, 11.0, 14.0), // tr 4
            candle(3, 14.0, 14.0, 14.0), // tr 0
        ];
        // seed (2 + 4) / 2 = 3, then (3 * 1 + 0) / 2 = 1.5
        let value = atr.compute(&candles).unwrap();
        assert!((value - 1.5).abs() < 1e-9, "Expected 1.5, got {value}");
    }
}
