pub mod config;
pub mod error;
pub mod offset;
pub mod surface;
pub mod tick;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use surface::{ChartSurface, Notifier, PointerCapture, TradingParameterSink};
pub use tick::{quantize, tick_size};
pub use types::*;
