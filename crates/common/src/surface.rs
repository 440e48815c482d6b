use crate::{Candle, Severity};

/// The rendering surface the interaction controller drives.
///
/// Implemented by whatever draws the candlestick chart. Every method is read
/// fresh on each pointer event because the vertical scale can change between
/// renders.
pub trait ChartSurface {
    /// Price under pixel row `pixel_y`, read from the live price scale.
    /// `None` while the scale has not been laid out yet.
    fn price_at(&self, pixel_y: f64) -> Option<f64>;

    /// Candles currently rendered, oldest first.
    fn visible_candles(&self) -> &[Candle];

    /// Pixel height of the price pane, if known.
    fn pane_height(&self) -> Option<f64>;

    /// Install the global pointer-move / pointer-up listeners used while a
    /// line is being dragged. Dropping the returned guard removes them.
    fn capture_pointer(&mut self) -> PointerCapture;
}

/// Receives values pushed from reference lines.
///
/// Writes are fire-and-forget; the controller never reads back what it
/// wrote except for the entry price used as the pyramiding base.
pub trait TradingParameterSink {
    /// Current entry price, if the field holds a number.
    fn entry_price(&self) -> Option<f64>;

    fn set_entry_price(&mut self, value: String);

    fn set_pyramiding_offset(&mut self, index: usize, value: String);
}

/// User-facing message channel (toast, status bar, log line).
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Scoped ownership of the global pointer listeners.
///
/// Holds the disposer handed out by [`ChartSurface::capture_pointer`] and
/// runs it exactly once: on [`PointerCapture::release`] or on drop,
/// including drops during unwinding.
#[must_use = "dropping the capture immediately removes the listeners"]
pub struct PointerCapture {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl PointerCapture {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A capture with nothing to tear down, for surfaces without global
    /// listeners.
    pub fn detached() -> Self {
        Self { dispose: None }
    }

    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }

    /// Remove the listeners now.
    pub fn release(mut self) {
        self.run_dispose();
    }

    fn run_dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.run_dispose();
    }
}

impl std::fmt::Debug for PointerCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerCapture")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counted() -> (PointerCapture, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        (PointerCapture::new(move || c.set(c.get() + 1)), calls)
    }

    #[test]
    fn drop_runs_disposer_once() {
        let (capture, calls) = counted();
        assert!(capture.is_active());
        drop(capture);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn release_does_not_double_dispose() {
        let (capture, calls) = counted();
        capture.release();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn disposer_runs_during_unwind() {
        let (capture, calls) = counted();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _held = capture;
            panic!("handler failed");
        }));
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn detached_capture_is_inert() {
        let capture = PointerCapture::detached();
        assert!(!capture.is_active());
        drop(capture);
    }
}
