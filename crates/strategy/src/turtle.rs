use tracing::debug;

use common::offset::{format_offset, offset_percent, OffsetPrecision};
use common::quantize;

/// Suggested pyramiding offsets for `units` add-ons, as form text (`"+1.41"`).
/// Turtle pyramiding adds a unit every `step_n × N` above the entry, where N
/// is the ATR.
///
/// Level `k` (zero-based) sits at the quantized price `entry + (k + 1) × step_n × atr`.
/// Empty when the entry is not positive or `atr`/`step_n` are not positive
/// finite numbers.
pub fn turtle_offsets(entry: f64, atr: f64, step_n: f64, units: usize) -> Vec<String> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(entry) || !valid(atr) || !valid(step_n) {
        return Vec::new();
    }
    let offsets: Vec<String> = (1..=units)
        .filter_map(|k| {
            let level = quantize(entry + k as f64 * step_n * atr);
            offset_percent(level, entry).map(|pct| format_offset(pct, OffsetPrecision::Hundredths))
        })
        .collect();
    debug!(entry, atr, step_n, units, ?offsets, "Turtle offsets computed");
    offsets
}
