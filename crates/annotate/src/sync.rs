use tracing::{info, warn};

use common::offset::{format_offset, offset_percent, OffsetPrecision};
use common::tick::format_price;
use common::{quantize, LineRole, Notifier, Severity, TradingParameterSink};

use crate::store::ReferenceLine;

/// Shown when a pyramiding offset is requested before an entry price exists.
pub const ENTRY_REQUIRED_MESSAGE: &str = "set the primary entry point first";

/// What a push wrote, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Entry { value: String },
    Pyramiding { index: usize, offset: String },
    /// Unassigned lines feed nothing.
    Unbound,
    /// Pyramiding push refused: no positive entry price to measure against.
    MissingEntry,
}

/// Quantize `line`'s value and write it to the parameter its role names.
///
/// One direction only: lines write to the parameter sink, edits made in the
/// form never move a line.
///
/// The guard for a missing entry price raises exactly one warning through
/// `notifier` and leaves `params` untouched.
pub fn push_line<P, N>(
    line: &ReferenceLine,
    precision: OffsetPrecision,
    params: &mut P,
    notifier: &mut N,
) -> SyncOutcome
where
    P: TradingParameterSink + ?Sized,
    N: Notifier + ?Sized,
{
    let price = quantize(line.value);
    match line.role {
        LineRole::Unassigned => SyncOutcome::Unbound,
        LineRole::Entry => {
            let value = format_price(price);
            info!(line = %line.id, entry = %value, "Entry price pushed from line");
            params.set_entry_price(value.clone());
            SyncOutcome::Entry { value }
        }
        LineRole::Pyramiding(index) => {
            let Some(percent) = params
                .entry_price()
                .and_then(|entry| offset_percent(price, entry))
            else {
                warn!(line = %line.id, level = index, "Pyramiding push rejected: no entry price");
                notifier.notify(ENTRY_REQUIRED_MESSAGE, Severity::Warning);
                return SyncOutcome::MissingEntry;
            };
            let offset = format_offset(percent, precision);
            info!(line = %line.id, level = index, offset = %offset, "Pyramiding offset pushed from line");
            params.set_pyramiding_offset(index, offset.clone());
            SyncOutcome::Pyramiding { index, offset }
        }
    }
}
