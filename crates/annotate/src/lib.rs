pub mod controller;
pub mod mapping;
pub mod store;
pub mod sync;

pub use controller::{InteractionConfig, InteractionController, Mode, Release};
pub use mapping::{price_at_pixel, MappedPrice, PriceSource};
pub use store::{LineStore, ReferenceLine};
pub use sync::{push_line, SyncOutcome, ENTRY_REQUIRED_MESSAGE};

pub use common::offset::{format_offset, OffsetPrecision};
