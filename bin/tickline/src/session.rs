use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use annotate::{InteractionController, Release, SyncOutcome};
use common::{
    Candle, ChartSurface, LineId, LineRole, Notifier, PixelPoint, PointerCapture, Result,
    Severity,
};
use strategy::TradingParameters;

/// A recorded session: what the chart showed and what the pointer did.
/// Replayed against [`ScriptedChart`].
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub candles: Vec<Candle>,
    /// Height of the price pane in pixels.
    pub pane_height: Option<f64>,
    /// Price scale as laid out by the renderer. Absent until the chart has
    /// rendered once.
    pub scale: Option<LinearScale>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Session {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Prices at the top and bottom pixel rows of the pane.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinearScale {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ToggleDrawing,
    PlacementRole { role: LineRole },
    ChartClick { y: f64 },
    PointerDown { line: LineId, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    AddLine { price: f64 },
    UpdateLine {
        line: LineId,
        value: f64,
        #[serde(default)]
        commit: bool,
    },
    ConnectEntry { line: LineId },
    ConnectPyramiding { line: LineId, level: usize },
    SetColor { line: LineId, color: String },
    DeleteLine { line: LineId },
    ClearAll,
    ClosePopup,
    /// Typed into the entry field directly. Lines do not follow.
    EditEntry { value: String },
    /// The renderer re-laid out the price axis.
    Rescale { scale: Option<LinearScale> },
}

/// Chart surface driven by a fixed linear scale.
pub struct ScriptedChart {
    candles: Vec<Candle>,
    pane_height: Option<f64>,
    scale: Option<LinearScale>,
    captures: Rc<Cell<usize>>,
}

impl ScriptedChart {
    pub fn new(candles: Vec<Candle>, pane_height: Option<f64>, scale: Option<LinearScale>) -> Self {
        Self {
            candles,
            pane_height,
            scale,
            captures: Rc::new(Cell::new(0)),
        }
    }

    /// Pointer captures currently installed.
    pub fn active_captures(&self) -> usize {
        self.captures.get()
    }

    pub fn set_scale(&mut self, scale: Option<LinearScale>) {
        self.scale = scale;
    }
}

impl ChartSurface for ScriptedChart {
    fn price_at(&self, pixel_y: f64) -> Option<f64> {
        let scale = self.scale?;
        let height = self.pane_height.filter(|h| *h > 0.0)?;
        Some(scale.top - (scale.top - scale.bottom) * pixel_y / height)
    }

    fn visible_candles(&self) -> &[Candle] {
        &self.candles
    }

    fn pane_height(&self) -> Option<f64> {
        self.pane_height
    }

    fn capture_pointer(&mut self) -> PointerCapture {
        self.captures.set(self.captures.get() + 1);
        let captures = self.captures.clone();
        PointerCapture::new(move || captures.set(captures.get().saturating_sub(1)))
    }
}

/// Logs notifications and keeps them for the final report.
#[derive(Debug, Default)]
pub struct LogNotifier {
    pub messages: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(message, "Notification"),
            Severity::Warning | Severity::Error => warn!(message, ?severity, "Notification"),
        }
        self.messages.push(Notification {
            message: message.to_string(),
            severity,
        });
    }
}

pub type Controller = InteractionController<ScriptedChart, TradingParameters, LogNotifier>;

/// Feed one event to the controller.
pub fn apply(ctrl: &mut Controller, event: &Event) {
    match event {
        Event::ToggleDrawing => {
            let armed = ctrl.toggle_drawing();
            info!(armed, "Drawing toggled");
        }
        Event::PlacementRole { role } => ctrl.set_placement_role(*role),
        Event::ChartClick { y } => {
            if let Some(id) = ctrl.chart_click(*y) {
                info!(%id, "Line placed from click");
            }
        }
        Event::PointerDown { line, x, y } => {
            ctrl.pointer_down(*line, PixelPoint::new(*x, *y));
        }
        Event::PointerMove { x, y } => {
            ctrl.pointer_move(PixelPoint::new(*x, *y));
        }
        Event::PointerUp { x, y } => match ctrl.pointer_up(PixelPoint::new(*x, *y)) {
            Release::Committed {
                line,
                value,
                outcome,
            } => info!(%line, value, outcome = ?outcome, "Drag released"),
            Release::Click { line, popup_open } => info!(%line, popup_open, "Label clicked"),
            Release::Vanished { line } => warn!(%line, "Released a deleted line"),
            Release::Ignored => {}
        },
        Event::AddLine { price } => {
            ctrl.add_line(*price);
        }
        Event::UpdateLine {
            line,
            value,
            commit,
        } => {
            if ctrl.update_line_value(*line, *value, *commit).is_none() {
                warn!(%line, "Update for unknown line ignored");
            }
        }
        Event::ConnectEntry { line } => log_connect(*line, ctrl.connect_entry(*line)),
        Event::ConnectPyramiding { line, level } => {
            log_connect(*line, ctrl.connect_pyramiding(*line, *level))
        }
        Event::SetColor { line, color } => {
            if !ctrl.set_line_color(*line, color.clone()) {
                warn!(%line, "Recolor for unknown line ignored");
            }
        }
        Event::DeleteLine { line } => {
            ctrl.delete_line(*line);
        }
        Event::ClearAll => {
            ctrl.clear_all();
        }
        Event::ClosePopup => ctrl.close_popup(),
        Event::EditEntry { value } => ctrl.params_mut().entry_price = value.clone(),
        Event::Rescale { scale } => ctrl.chart_mut().set_scale(*scale),
    }
}

fn log_connect(line: LineId, outcome: Option<SyncOutcome>) {
    match outcome {
        Some(outcome) => info!(%line, outcome = ?outcome, "Line connected"),
        None => warn!(%line, "Connect for unknown line ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotate::InteractionConfig;

    const SESSION: &str = r##"{
        "pane_height": 200,
        "scale": { "top": 11000, "bottom": 9000 },
        "events": [
            { "type": "toggle_drawing" },
            { "type": "chart_click", "y": 100 },
            { "type": "connect_entry", "line": 1 },
            { "type": "toggle_drawing" },
            { "type": "chart_click", "y": 40 },
            { "type": "pointer_down", "line": 2, "x": 0, "y": 40 },
            { "type": "pointer_move", "x": 0, "y": 60 },
            { "type": "pointer_up", "x": 0, "y": 52 },
            { "type": "connect_pyramiding", "line": 2, "level": 0 },
            { "type": "set_color", "line": 2, "color": "#00897b" }
        ]
    }"##;

    fn controller(session: &Session) -> Controller {
        InteractionController::new(
            InteractionConfig::default(),
            ScriptedChart::new(session.candles.clone(), session.pane_height, session.scale),
            TradingParameters::default(),
            LogNotifier::default(),
        )
    }

    #[test]
    fn replays_place_connect_and_drag() {
        let session = Session::from_json(SESSION).unwrap();
        let mut ctrl = controller(&session);
        for event in &session.events {
            apply(&mut ctrl, event);
        }
        // 10 won per pixel: y=100 -> 10000. The drag's last move (y=60)
        // holds 10400, which connects as +4%.
        assert_eq!(ctrl.params().entry_price, "10000");
        assert_eq!(ctrl.params().pyramiding_offsets, vec!["+4"]);
        assert_eq!(ctrl.lines()[1].value, 10_400.0);
        assert_eq!(ctrl.lines()[1].color, "#00897b");
        assert_eq!(ctrl.lines().len(), 2);
        assert_eq!(ctrl.chart().active_captures(), 0);
        assert!(ctrl.notifier().messages.is_empty());
    }

    #[test]
    fn pyramiding_before_entry_is_reported() {
        let json = r#"{
            "pane_height": 200,
            "scale": { "top": 11000, "bottom": 9000 },
            "events": [
                { "type": "add_line", "price": 10500 },
                { "type": "connect_pyramiding", "line": 1, "level": 0 }
            ]
        }"#;
        let session = Session::from_json(json).unwrap();
        let mut ctrl = controller(&session);
        for event in &session.events {
            apply(&mut ctrl, event);
        }
        assert!(ctrl.params().pyramiding_offsets.is_empty());
        assert_eq!(ctrl.notifier().messages.len(), 1);
        assert_eq!(ctrl.notifier().messages[0].severity, Severity::Warning);
    }

    #[test]
    fn unknown_event_type_is_a_json_error() {
        let err = Session::from_json(r#"{ "events": [ { "type": "teleport" } ] }"#).unwrap_err();
        assert!(matches!(err, common::Error::Json(_)));
    }

    #[test]
    fn scale_needs_a_pane_height() {
        let chart = ScriptedChart::new(
            Vec::new(),
            None,
            Some(LinearScale {
                top: 11_000.0,
                bottom: 9_000.0,
            }),
        );
        assert!(chart.price_at(10.0).is_none());
    }
}
