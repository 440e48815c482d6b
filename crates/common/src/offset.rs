/// Rounding applied to a pyramiding offset: the percentage distance of a
/// level from the entry price, stored as signed text (`"+5.00"`, `"-10"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetPrecision {
    /// Two decimals (`+5.00`). Used when a drag commits.
    Hundredths,
    /// Whole percent (`+5`). Used by the explicit connect action.
    Whole,
}

/// Percentage distance of `price` from `entry`. `None` unless `entry` is a
/// positive finite number.
pub fn offset_percent(price: f64, entry: f64) -> Option<f64> {
    if !entry.is_finite() || entry <= 0.0 || !price.is_finite() {
        return None;
    }
    Some((price - entry) / entry * 100.0)
}

/// Explicit `+` on positive values, plain `-` on negative ones, bare zero
/// otherwise.
pub fn format_offset(percent: f64, precision: OffsetPrecision) -> String {
    let rounded = match precision {
        OffsetPrecision::Hundredths => (percent * 100.0).round() / 100.0,
        OffsetPrecision::Whole => percent.round(),
    };
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let sign = if rounded > 0.0 { "+" } else { "" };
    match precision {
        OffsetPrecision::Hundredths => format!("{sign}{rounded:.2}"),
        OffsetPrecision::Whole => format!("{sign}{}", rounded as i64),
    }
}

/// Read an offset back from form text. Accepts an optional sign and a
/// trailing `%`.
pub fn parse_offset(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
