use tracing::{debug, info, warn};

use common::offset::OffsetPrecision;
use common::{
    quantize, ChartSurface, Config, LineId, LineRole, Notifier, PixelPoint, PointerCapture,
    Severity, TradingParameterSink,
};

use crate::mapping::price_at_pixel;
use crate::store::{LineStore, ReferenceLine};
use crate::sync::{push_line, SyncOutcome, ENTRY_REQUIRED_MESSAGE};

/// Tunables for pointer interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Pointer travel below this many pixels between press and release is a
    /// click, not a drag.
    pub drag_threshold_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: common::config::DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

impl From<&Config> for InteractionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            drag_threshold_px: cfg.drag_threshold_px,
        }
    }
}

/// Public view of the interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    /// Armed to place one line on the next chart click.
    Drawing,
    /// Pointer pressed on a line label; not yet moved past the threshold.
    PendingDrag(LineId),
    Dragging(LineId),
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Release {
    /// No press was in flight.
    Ignored,
    /// Press and release stayed within the threshold. `popup_open` is the
    /// settings popup state after the toggle.
    Click { line: LineId, popup_open: bool },
    /// A drag ended; the quantized value was committed.
    Committed {
        line: LineId,
        value: f64,
        outcome: SyncOutcome,
    },
    /// The dragged line was deleted before the release.
    Vanished { line: LineId },
}

#[derive(Debug)]
enum Session {
    Idle,
    Drawing,
    PendingDrag {
        line: LineId,
        origin: PixelPoint,
        capture: PointerCapture,
    },
    Dragging {
        line: LineId,
        capture: PointerCapture,
    },
}

/// Drives reference lines from raw pointer input.
///
/// Owns the line store and the single interaction session. The chart
/// surface supplies the pixel→price scale and the global pointer capture;
/// committed values are pushed into the parameter sink.
pub struct InteractionController<C, P, N> {
    config: InteractionConfig,
    chart: C,
    params: P,
    notifier: N,
    store: LineStore,
    session: Session,
    /// Line whose settings popup is open.
    popup: Option<LineId>,
    /// Role given to lines placed by a chart click.
    placement_role: LineRole,
}

impl<C, P, N> InteractionController<C, P, N>
where
    C: ChartSurface,
    P: TradingParameterSink,
    N: Notifier,
{
    pub fn new(config: InteractionConfig, chart: C, params: P, notifier: N) -> Self {
        Self {
            config,
            chart,
            params,
            notifier,
            store: LineStore::new(),
            session: Session::Idle,
            popup: None,
            placement_role: LineRole::Unassigned,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        match &self.session {
            Session::Idle => Mode::Idle,
            Session::Drawing => Mode::Drawing,
            Session::PendingDrag { line, .. } => Mode::PendingDrag(*line),
            Session::Dragging { line, .. } => Mode::Dragging(*line),
        }
    }

    pub fn lines(&self) -> &[ReferenceLine] {
        self.store.lines()
    }

    pub fn line(&self, id: LineId) -> Option<&ReferenceLine> {
        self.store.get(id)
    }

    pub fn popup(&self) -> Option<LineId> {
        self.popup
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut C {
        &mut self.chart
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    /// Direct access for form edits. Changes made here never move a line.
    pub fn params_mut(&mut self) -> &mut P {
        &mut self.params
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> InteractionConfig {
        self.config
    }

    /// Role assigned to lines placed by the next chart clicks.
    pub fn set_placement_role(&mut self, role: LineRole) {
        self.placement_role = role;
    }

    // ── Store operations ─────────────────────────────────────────────────────

    /// Add an unassigned line at the quantized `price`.
    pub fn add_line(&mut self, price: f64) -> LineId {
        self.store.add(price, LineRole::Unassigned)
    }

    /// Add a line for a value that came from outside (e.g. the entry field).
    /// Nothing is pushed back: the value already lives in the parameters.
    pub fn add_line_with_role(&mut self, price: f64, role: LineRole) -> LineId {
        self.store.add(price, role)
    }

    /// Replace a line's value. Live updates store the raw value; a commit
    /// quantizes it and pushes it to the line's parameter.
    ///
    /// Returns the stored value, or `None` for an unknown id or a non-finite
    /// `raw`.
    pub fn update_line_value(&mut self, id: LineId, raw: f64, commit_external: bool) -> Option<f64> {
        self.store.set_value(id, raw)?;
        if commit_external {
            self.commit(id, OffsetPrecision::Hundredths);
        }
        self.store.get(id).map(|l| l.value)
    }

    /// Remove a line. The parameter it fed keeps its last pushed value.
    pub fn delete_line(&mut self, id: LineId) -> bool {
        if self.popup == Some(id) {
            self.popup = None;
        }
        match self.store.remove(id) {
            Some(line) => {
                debug!(%id, role = %line.role, "Line deleted");
                true
            }
            None => false,
        }
    }

    /// Recolor a line from the settings popup. The role keeps feeding the
    /// same parameter.
    pub fn set_line_color(&mut self, id: LineId, color: impl Into<String>) -> bool {
        self.store.set_color(id, color).is_some()
    }

    /// Remove every line. Parameters are left as they are.
    pub fn clear_all(&mut self) -> usize {
        self.popup = None;
        let removed = self.store.clear();
        debug!(removed, "All lines cleared");
        removed
    }

    /// Bind a line to a new role and push its quantized value there now.
    ///
    /// A pyramiding role needs an entry price to measure against. Without
    /// one the line keeps its role, color and value, and only the warning is
    /// raised.
    pub fn reassign_role(&mut self, id: LineId, role: LineRole) -> Option<SyncOutcome> {
        if !self.store.contains(id) {
            return None;
        }
        if let LineRole::Pyramiding(index) = role {
            if !self.has_entry() {
                warn!(%id, level = index, "Pyramiding role rejected: no entry price");
                self.notifier.notify(ENTRY_REQUIRED_MESSAGE, Severity::Warning);
                return Some(SyncOutcome::MissingEntry);
            }
        }
        self.store.set_role(id, role)?;
        info!(%id, %role, "Line role reassigned");
        self.commit(id, OffsetPrecision::Whole)
    }

    /// "Connect to entry" from the settings popup.
    pub fn connect_entry(&mut self, id: LineId) -> Option<SyncOutcome> {
        self.popup = None;
        self.reassign_role(id, LineRole::Entry)
    }

    /// "Connect to pyramiding level `index`" from the settings popup.
    pub fn connect_pyramiding(&mut self, id: LineId, index: usize) -> Option<SyncOutcome> {
        self.popup = None;
        self.reassign_role(id, LineRole::Pyramiding(index))
    }

    /// Add lines for values already in the parameters: one entry line and one
    /// line per resolved pyramiding level (`None` levels are skipped but keep
    /// their index). One-shot; later form edits do not move these lines.
    pub fn seed_lines(&mut self, entry: Option<f64>, pyramiding: &[Option<f64>]) -> Vec<LineId> {
        let mut ids = Vec::new();
        if let Some(price) = entry.filter(|p| p.is_finite() && *p > 0.0) {
            ids.push(self.store.add(price, LineRole::Entry));
        }
        for (index, price) in pyramiding.iter().enumerate() {
            if let Some(price) = price.filter(|p| p.is_finite()) {
                ids.push(self.store.add(price, LineRole::Pyramiding(index)));
            }
        }
        info!(count = ids.len(), "Lines seeded from parameters");
        ids
    }

    // ── Pointer events ───────────────────────────────────────────────────────

    /// Arm or disarm single-shot line placement. Inert while a press or drag
    /// is in flight. Returns whether placement is armed afterwards.
    pub fn toggle_drawing(&mut self) -> bool {
        match self.session {
            Session::Idle => {
                self.session = Session::Drawing;
                debug!("Drawing armed");
                true
            }
            Session::Drawing => {
                self.session = Session::Idle;
                debug!("Drawing disarmed");
                false
            }
            Session::PendingDrag { .. } | Session::Dragging { .. } => {
                debug!("Drawing toggle ignored during drag");
                false
            }
        }
    }

    /// Click on the chart body. Places one line when drawing is armed.
    ///
    /// If the pixel cannot be mapped to a price the click is skipped and
    /// drawing stays armed.
    pub fn chart_click(&mut self, pixel_y: f64) -> Option<LineId> {
        if !matches!(self.session, Session::Drawing) {
            return None;
        }
        let Some(mapped) = price_at_pixel(&self.chart, pixel_y) else {
            warn!(pixel_y, "Line placement skipped: no price for pixel");
            return None;
        };
        self.session = Session::Idle;

        let role = self.placement_role;
        let id = self.store.add(mapped.price, role);
        info!(%id, price = mapped.price, source = ?mapped.source, %role, "Line placed");
        if role != LineRole::Unassigned {
            self.commit(id, OffsetPrecision::Hundredths);
        }
        Some(id)
    }

    /// Press on a line's label. Takes the global pointer capture and waits to
    /// see whether this is a click or a drag.
    pub fn pointer_down(&mut self, line: LineId, at: PixelPoint) -> bool {
        if !matches!(self.session, Session::Idle) || !self.store.contains(line) {
            return false;
        }
        let capture = self.chart.capture_pointer();
        self.session = Session::PendingDrag {
            line,
            origin: at,
            capture,
        };
        debug!(%line, x = at.x, y = at.y, "Pointer down on line");
        true
    }

    /// Global pointer move. Returns the line's live value when it moved.
    pub fn pointer_move(&mut self, at: PixelPoint) -> Option<f64> {
        let threshold = self.config.drag_threshold_px;
        if let Session::PendingDrag { line, origin, .. } = &self.session {
            if origin.distance_to(at) < threshold {
                return None;
            }
            let line = *line;
            self.start_drag();
            debug!(%line, "Drag started");
        }

        match &self.session {
            Session::Dragging { line, .. } => {
                let line = *line;
                self.drag_to(line, at.y)
            }
            _ => None,
        }
    }

    /// Global pointer release. Ends the press or drag, releasing the capture
    /// on every path.
    pub fn pointer_up(&mut self, at: PixelPoint) -> Release {
        let session = std::mem::replace(&mut self.session, Session::Idle);
        match session {
            Session::PendingDrag {
                line,
                origin,
                capture,
            } => {
                if origin.distance_to(at) < self.config.drag_threshold_px {
                    capture.release();
                    self.toggle_popup(line)
                } else {
                    // Released past the threshold without an intervening move.
                    self.popup = None;
                    self.drag_to(line, at.y);
                    self.finish_drag(line, capture)
                }
            }
            Session::Dragging { line, capture } => self.finish_drag(line, capture),
            other => {
                self.session = other;
                Release::Ignored
            }
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn start_drag(&mut self) {
        let session = std::mem::replace(&mut self.session, Session::Idle);
        self.session = match session {
            Session::PendingDrag { line, capture, .. } => Session::Dragging { line, capture },
            other => other,
        };
        self.popup = None;
    }

    fn drag_to(&mut self, line: LineId, pixel_y: f64) -> Option<f64> {
        let Some(mapped) = price_at_pixel(&self.chart, pixel_y) else {
            warn!(%line, pixel_y, "Drag update skipped: no price for pixel");
            return None;
        };
        self.store.set_value(line, mapped.price).map(|l| l.value)
    }

    fn finish_drag(&mut self, line: LineId, capture: PointerCapture) -> Release {
        // Held until the commit returns; unwinding out of the sink drops it too.
        let _capture = capture;
        if !self.store.contains(line) {
            debug!(%line, "Dragged line vanished before release");
            return Release::Vanished { line };
        }
        let outcome = self.commit(line, OffsetPrecision::Hundredths);
        let value = self.store.get(line).map_or(0.0, |l| l.value);
        info!(%line, value, "Drag committed");
        Release::Committed {
            line,
            value,
            outcome: outcome.unwrap_or(SyncOutcome::Unbound),
        }
    }

    fn toggle_popup(&mut self, line: LineId) -> Release {
        if !self.store.contains(line) {
            return Release::Vanished { line };
        }
        self.popup = if self.popup == Some(line) { None } else { Some(line) };
        let popup_open = self.popup.is_some();
        debug!(%line, popup_open, "Line label clicked");
        Release::Click { line, popup_open }
    }

    fn has_entry(&self) -> bool {
        self.params
            .entry_price()
            .map_or(false, |e| e.is_finite() && e > 0.0)
    }

    /// Quantize the stored value and push it per role.
    fn commit(&mut self, id: LineId, precision: OffsetPrecision) -> Option<SyncOutcome> {
        let line = self.store.quantize_value(id)?;
        debug_assert_eq!(line.value, quantize(line.value));
        Some(push_line(line, precision, &mut self.params, &mut self.notifier))
    }
}
