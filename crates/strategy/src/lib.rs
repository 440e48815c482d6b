pub mod config;
pub mod indicators;
pub mod params;
pub mod turtle;

pub use config::{StrategyKind, TradingConfig, TradingFileConfig};
pub use params::TradingParameters;
pub use turtle::turtle_offsets;
