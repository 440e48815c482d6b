/// KRX minimum quotation unit per price band, as (exclusive upper bound,
/// tick) in ascending order. Bands are half-open on the absolute price:
///
/// | price band           | tick |
/// |----------------------|------|
/// | `[0, 1_000)`         | 1    |
/// | `[1_000, 5_000)`     | 5    |
/// | `[5_000, 10_000)`    | 10   |
/// | `[10_000, 50_000)`   | 50   |
/// | `[50_000, 100_000)`  | 100  |
/// | `[100_000, 500_000)` | 500  |
/// | `[500_000, ∞)`       | 1000 |
const TICK_BANDS: [(f64, f64); 6] = [
    (1_000.0, 1.0),
    (5_000.0, 5.0),
    (10_000.0, 10.0),
    (50_000.0, 50.0),
    (100_000.0, 100.0),
    (500_000.0, 500.0),
];

const TOP_TICK: f64 = 1_000.0;

/// Minimum legal price increment at `price`.
///
/// Non-finite input falls into the lowest band.
pub fn tick_size(price: f64) -> f64 {
    if !price.is_finite() {
        return TICK_BANDS[0].1;
    }
    let magnitude = price.abs();
    TICK_BANDS
        .iter()
        .find(|(upper, _)| magnitude < *upper)
        .map(|(_, tick)| *tick)
        .unwrap_or(TOP_TICK)
}

/// Round `price` to the nearest multiple of its tick, halves away from zero.
/// NaN and infinities quantize to `0`.
pub fn quantize(price: f64) -> f64 {
    if !price.is_finite() {
        return 0.0;
    }
    let tick = tick_size(price);
    let steps = (price / tick).round();
    let adjusted = steps * tick;
    // normalise -0.0 so it prints as "0"
    if adjusted == 0.0 {
        0.0
    } else {
        adjusted
    }
}

/// Quantize an optional price; a missing value is `0`.
pub fn quantize_opt(price: Option<f64>) -> f64 {
    price.map(quantize).unwrap_or(0.0)
}

/// Quantize free-form text from an input field. Thousands separators and
/// surrounding whitespace are accepted; anything unparsable is `0`.
pub fn quantize_input(raw: &str) -> f64 {
    quantize_opt(parse_price(raw))
}

/// Parse a price typed by a user, e.g. `"70,500"` or `" 1003 "`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a price the way the trading form stores it: integral prices have
/// no fractional part (`50000`), anything else keeps its digits.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_match_krx_table() {
        assert_eq!(tick_size(0.0), 1.0);
        assert_eq!(tick_size(999.0), 1.0);
        assert_eq!(tick_size(1_000.0), 5.0);
        assert_eq!(tick_size(4_999.0), 5.0);
        assert_eq!(tick_size(5_000.0), 10.0);
        assert_eq!(tick_size(9_999.0), 10.0);
        assert_eq!(tick_size(10_000.0), 50.0);
        assert_eq!(tick_size(49_999.0), 50.0);
        assert_eq!(tick_size(50_000.0), 100.0);
        assert_eq!(tick_size(99_999.0), 100.0);
        assert_eq!(tick_size(100_000.0), 500.0);
        assert_eq!(tick_size(499_999.0), 500.0);
        assert_eq!(tick_size(500_000.0), 1_000.0);
        assert_eq!(tick_size(12_345_678.0), 1_000.0);
    }

    #[test]
    fn quantize_rounds_to_nearest_tick() {
        assert_eq!(quantize(999.0), 999.0);
        assert_eq!(quantize(1_002.0), 1_000.0);
        assert_eq!(quantize(1_003.0), 1_005.0);
        assert_eq!(quantize(70_149.0), 70_100.0);
        assert_eq!(quantize(70_151.0), 70_200.0);
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(quantize(1_002.5), 1_005.0);
        assert_eq!(quantize(10_025.0), 10_050.0);
        assert_eq!(quantize(-1_002.5), -1_005.0);
    }

    #[test]
    fn negative_prices_use_magnitude_bands() {
        assert_eq!(tick_size(-1_500.0), 5.0);
        assert_eq!(quantize(-1_002.0), -1_000.0);
    }

    #[test]
    fn invalid_input_quantizes_to_zero() {
        assert_eq!(quantize(f64::NAN), 0.0);
        assert_eq!(quantize(f64::INFINITY), 0.0);
        assert_eq!(quantize_opt(None), 0.0);
        assert_eq!(quantize_input(""), 0.0);
        assert_eq!(quantize_input("abc"), 0.0);
        assert_eq!(quantize(-0.2).to_string(), "0");
    }

    #[test]
    fn input_text_accepts_separators() {
        assert_eq!(quantize_input("70,512"), 70_500.0);
        assert_eq!(quantize_input(" 1003 "), 1_005.0);
        assert_eq!(parse_price("1,2,3"), Some(123.0));
    }

    #[test]
    fn integral_prices_print_without_fraction() {
        assert_eq!(format_price(50_000.0), "50000");
        assert_eq!(format_price(999.0), "999");
        assert_eq!(format_price(12.5), "12.5");
    }
}
