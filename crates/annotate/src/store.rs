use serde::Serialize;
use tracing::debug;

use common::{quantize, LineId, LineRole};

/// A horizontal price marker drawn on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub id: LineId,
    /// Price. A tick multiple except while a drag is in flight.
    pub value: f64,
    pub role: LineRole,
    /// Display only.
    pub color: String,
}

/// Ordered set of reference lines for the current instrument.
///
/// Iteration order is insertion order. Every mutation addressed by id is a
/// silent no-op when the id is unknown: pointer callbacks can land after the
/// line they target has been deleted.
#[derive(Debug)]
pub struct LineStore {
    lines: Vec<ReferenceLine>,
    next_id: u64,
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStore {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_id: 1,
        }
    }

    /// Quantize `price` and append a new line with `role`.
    pub fn add(&mut self, price: f64, role: LineRole) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        let value = quantize(price);
        self.lines.push(ReferenceLine {
            id,
            value,
            role,
            color: role.default_color().to_string(),
        });
        debug!(%id, value, %role, "Line added");
        id
    }

    pub fn get(&self, id: LineId) -> Option<&ReferenceLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.get(id).is_some()
    }

    pub fn lines(&self) -> &[ReferenceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Store a raw (unquantized) value. Non-finite values are ignored.
    pub fn set_value(&mut self, id: LineId, value: f64) -> Option<&ReferenceLine> {
        if !value.is_finite() {
            return None;
        }
        let line = self.get_mut(id)?;
        line.value = value;
        Some(line)
    }

    /// Snap the stored value onto its tick.
    pub fn quantize_value(&mut self, id: LineId) -> Option<&ReferenceLine> {
        let line = self.get_mut(id)?;
        line.value = quantize(line.value);
        Some(line)
    }

    /// Change the role (and its color) and snap the value onto its tick.
    pub fn set_role(&mut self, id: LineId, role: LineRole) -> Option<&ReferenceLine> {
        let line = self.get_mut(id)?;
        line.role = role;
        line.color = role.default_color().to_string();
        line.value = quantize(line.value);
        Some(line)
    }

    pub fn set_color(&mut self, id: LineId, color: impl Into<String>) -> Option<&ReferenceLine> {
        let line = self.get_mut(id)?;
        line.color = color.into();
        Some(line)
    }

    pub fn remove(&mut self, id: LineId) -> Option<ReferenceLine> {
        let idx = self.lines.iter().position(|l| l.id == id)?;
        Some(self.lines.remove(idx))
    }

    /// Drop every line, returning how many were removed. Ids keep counting.
    pub fn clear(&mut self) -> usize {
        let n = self.lines.len();
        self.lines.clear();
        n
    }

    fn get_mut(&mut self, id: LineId) -> Option<&mut ReferenceLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }
}
