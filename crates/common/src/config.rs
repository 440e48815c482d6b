/// Default pointer travel, in pixels, below which a press/release is a click.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON session (candles + pointer events) to replay.
    pub session_path: String,

    /// TOML file with per-symbol trading configurations.
    pub trading_config_path: String,

    /// Symbol whose trading configuration seeds the parameters.
    /// `None` picks the first entry of the file.
    pub symbol: Option<String>,

    /// Click-vs-drag threshold in pixels.
    pub drag_threshold_px: f64,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let drag_threshold_px = match optional_env("TICKLINE_DRAG_THRESHOLD_PX") {
            None => DEFAULT_DRAG_THRESHOLD_PX,
            Some(raw) => parse_threshold(&raw).unwrap_or_else(|| {
                panic!("ERROR: TICKLINE_DRAG_THRESHOLD_PX must be a positive number, got: '{raw}'")
            }),
        };

        Config {
            session_path: required_env("TICKLINE_SESSION_PATH"),
            trading_config_path: optional_env("TICKLINE_TRADING_CONFIG_PATH")
                .unwrap_or_else(|| "config/trading.toml".to_string()),
            symbol: optional_env("TICKLINE_SYMBOL").filter(|s| !s.trim().is_empty()),
            drag_threshold_px,
        }
    }
}

fn parse_threshold(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_accepts_positive_numbers() {
        assert_eq!(parse_threshold(" 8 "), Some(8.0));
        assert_eq!(parse_threshold("2.5"), Some(2.5));
    }

    #[test]
    fn threshold_rejects_garbage_and_non_positive() {
        assert_eq!(parse_threshold("0"), None);
        assert_eq!(parse_threshold("-3"), None);
        assert_eq!(parse_threshold("NaN"), None);
        assert_eq!(parse_threshold("five"), None);
    }
}
