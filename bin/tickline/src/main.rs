mod session;

use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use annotate::{InteractionConfig, InteractionController, ReferenceLine};
use common::{Config, Result, TradingParameterSink};
use strategy::indicators::AtrIndicator;
use strategy::{turtle_offsets, StrategyKind, TradingConfig, TradingFileConfig, TradingParameters};

use session::{apply, LogNotifier, Notification, ScriptedChart, Session};

/// What the replay leaves behind, printed as JSON on stdout.
#[derive(Debug, Serialize)]
struct Report<'a> {
    symbol: &'a str,
    lines: &'a [ReferenceLine],
    parameters: &'a TradingParameters,
    notifications: &'a [Notification],
}

fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(
            "info".parse().unwrap_or_else(|e| panic!("Bad log directive: {e}")),
        ))
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(session = %cfg.session_path, "Tickline starting");

    if let Err(e) = run(&cfg) {
        panic!("Replay failed: {e}");
    }
}

fn run(cfg: &Config) -> Result<()> {
    // ── Trading parameters ────────────────────────────────────────────────────
    let trading_file = TradingFileConfig::load(&cfg.trading_config_path)?;
    let trading = trading_file.find(cfg.symbol.as_deref()).ok_or_else(|| {
        common::Error::Config(format!(
            "No trading entry for symbol {:?} in '{}'",
            cfg.symbol, cfg.trading_config_path
        ))
    })?;
    info!(symbol = %trading.symbol, name = %trading.name, "Trading entry selected");

    // ── Session ───────────────────────────────────────────────────────────────
    let session = Session::load(&cfg.session_path)?;
    info!(
        candles = session.candles.len(),
        events = session.events.len(),
        "Session loaded"
    );

    let params = initial_parameters(trading, &session);

    // ── Controller ────────────────────────────────────────────────────────────
    let chart = ScriptedChart::new(session.candles.clone(), session.pane_height, session.scale);
    let mut ctrl = InteractionController::new(
        InteractionConfig::from(cfg),
        chart,
        params,
        LogNotifier::default(),
    );
    let levels = ctrl.params().pyramiding_prices();
    let entry = ctrl.params().entry_price();
    ctrl.seed_lines(entry, &levels);

    for event in &session.events {
        apply(&mut ctrl, event);
    }

    if ctrl.chart().active_captures() != 0 {
        warn!(
            active = ctrl.chart().active_captures(),
            "Session ended mid-drag; pointer capture still held"
        );
    }

    let report = Report {
        symbol: &trading.symbol,
        lines: ctrl.lines(),
        parameters: ctrl.params(),
        notifications: &ctrl.notifier().messages,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    info!(lines = ctrl.lines().len(), "Replay finished");
    Ok(())
}

/// Parameters from the config file. Turtle entries with no offsets of their
/// own get suggestions from the session's candles.
fn initial_parameters(trading: &TradingConfig, session: &Session) -> TradingParameters {
    let mut params = TradingParameters::from(trading);
    let StrategyKind::Turtle {
        atr_period,
        step_n,
        max_units,
    } = trading.strategy
    else {
        return params;
    };
    if !params.pyramiding_offsets.is_empty() {
        return params;
    }
    let Some(entry) = params.entry_price() else {
        warn!(symbol = %trading.symbol, "Turtle entry has no entry price; no offsets suggested");
        return params;
    };
    match AtrIndicator::new(atr_period).compute(&session.candles) {
        Some(atr) => {
            params.pyramiding_offsets = turtle_offsets(entry, atr, step_n, max_units);
            info!(atr, offsets = ?params.pyramiding_offsets, "Turtle offsets suggested");
        }
        None => warn!(
            candles = session.candles.len(),
            atr_period, "Not enough candles for ATR; no offsets suggested"
        ),
    }
    params
}
