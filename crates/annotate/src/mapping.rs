use common::{Candle, ChartSurface};

/// Which step of the chain produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    LiveScale,
    VisibleRange,
    RangeMidpoint,
    LastClose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedPrice {
    pub price: f64,
    pub source: PriceSource,
}

/// Map `pixel_y` to a price on `chart`. Recomputed on every pointer event.
///
/// The chain, first hit wins:
///
/// 1. the chart's live price scale;
/// 2. a linear map over the visible candles' low/high across the pane height
///    (the range midpoint when the height is unknown);
/// 3. the last visible close.
///
/// A non-finite result moves on to the next step. A finite but non-positive
/// one means the pixel lies below the price axis and ends the chain with
/// `None`: there is no quotation there.
pub fn price_at_pixel<C: ChartSurface + ?Sized>(chart: &C, pixel_y: f64) -> Option<MappedPrice> {
    let mapped = chart
        .price_at(pixel_y)
        .filter(|p| p.is_finite())
        .map(|price| MappedPrice {
            price,
            source: PriceSource::LiveScale,
        })
        .or_else(|| from_visible_range(chart, pixel_y))
        .or_else(|| {
            last_close(chart.visible_candles()).map(|price| MappedPrice {
                price,
                source: PriceSource::LastClose,
            })
        })?;
    (mapped.price > 0.0).then_some(mapped)
}

fn from_visible_range<C: ChartSurface + ?Sized>(chart: &C, pixel_y: f64) -> Option<MappedPrice> {
    let (min, max) = visible_range(chart.visible_candles())?;
    match chart.pane_height().filter(|h| h.is_finite() && *h > 0.0) {
        Some(height) => {
            let price = max - (pixel_y / height) * (max - min);
            price.is_finite().then_some(MappedPrice {
                price,
                source: PriceSource::VisibleRange,
            })
        }
        None => Some(MappedPrice {
            price: (min + max) / 2.0,
            source: PriceSource::RangeMidpoint,
        }),
    }
}

/// Lowest low and highest high over `candles`, skipping non-finite values.
pub fn visible_range(candles: &[Candle]) -> Option<(f64, f64)> {
    let mut lows = candles.iter().map(|c| c.low).filter(|v| v.is_finite());
    let mut highs = candles.iter().map(|c| c.high).filter(|v| v.is_finite());
    let min = lows.next().map(|first| lows.fold(first, f64::min))?;
    let max = highs.next().map(|first| highs.fold(first, f64::max))?;
    (min <= max).then_some((min, max))
}

/// Close of the most recent candle with a usable close.
pub fn last_close(candles: &[Candle]) -> Option<f64> {
    candles.iter().rev().map(|c| c.close).find(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::PointerCapture;

    struct Chart {
        scale: Option<f64>,
        candles: Vec<Candle>,
        height: Option<f64>,
    }

    impl ChartSurface for Chart {
        fn price_at(&self, _pixel_y: f64) -> Option<f64> {
            self.scale
        }
        fn visible_candles(&self) -> &[Candle] {
            &self.candles
        }
        fn pane_height(&self) -> Option<f64> {
            self.height
        }
        fn capture_pointer(&mut self) -> PointerCapture {
            PointerCapture::detached()
        }
    }

    fn candle(low: f64, high: f64, close: f64) -> Candle {
        Candle {
            time: Utc::now(),
            open: close,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn live_scale_wins() {
        let chart = Chart {
            scale: Some(70_000.0),
            candles: vec![candle(1.0, 2.0, 1.5)],
            height: Some(100.0),
        };
        let mapped = price_at_pixel(&chart, 10.0).unwrap();
        assert_eq!(mapped.source, PriceSource::LiveScale);
        assert_eq!(mapped.price, 70_000.0);
    }

    #[test]
    fn falls_back_to_linear_visible_range() {
        let chart = Chart {
            scale: None,
            candles: vec![candle(9_000.0, 10_000.0, 9_500.0), candle(9_500.0, 11_000.0, 10_500.0)],
            height: Some(200.0),
        };
        let top = price_at_pixel(&chart, 0.0).unwrap();
        assert_eq!(top.source, PriceSource::VisibleRange);
        assert_eq!(top.price, 11_000.0);
        assert_eq!(price_at_pixel(&chart, 100.0).unwrap().price, 10_000.0);
        assert_eq!(price_at_pixel(&chart, 200.0).unwrap().price, 9_000.0);
    }

    #[test]
    fn midpoint_without_pane_height() {
        let chart = Chart {
            scale: None,
            candles: vec![candle(100.0, 300.0, 250.0)],
            height: None,
        };
        let mapped = price_at_pixel(&chart, 42.0).unwrap();
        assert_eq!(mapped.source, PriceSource::RangeMidpoint);
        assert_eq!(mapped.price, 200.0);
    }

    #[test]
    fn non_finite_scale_and_range_fall_to_last_close() {
        let chart = Chart {
            scale: Some(f64::NAN),
            candles: vec![candle(f64::NAN, f64::NAN, 1_234.0)],
            height: Some(100.0),
        };
        let mapped = price_at_pixel(&chart, 5.0).unwrap();
        assert_eq!(mapped.source, PriceSource::LastClose);
        assert_eq!(mapped.price, 1_234.0);
    }

    #[test]
    fn below_the_price_axis_is_unmapped() {
        let chart = Chart {
            scale: Some(-2_000.0),
            candles: vec![candle(9_000.0, 11_000.0, 10_000.0)],
            height: Some(200.0),
        };
        assert!(price_at_pixel(&chart, 1_300.0).is_none());

        let zero = Chart {
            scale: Some(0.0),
            candles: Vec::new(),
            height: Some(200.0),
        };
        assert!(price_at_pixel(&zero, 400.0).is_none());
    }

    #[test]
    fn visible_range_below_axis_does_not_jump_to_last_close() {
        let chart = Chart {
            scale: None,
            candles: vec![candle(9_000.0, 11_000.0, 10_000.0)],
            height: Some(200.0),
        };
        // 11000 - 6.5 * 2000 = -2000
        assert!(price_at_pixel(&chart, 1_300.0).is_none());
    }

    #[test]
    fn nothing_to_map_returns_none() {
        let chart = Chart {
            scale: None,
            candles: Vec::new(),
            height: Some(100.0),
        };
        assert!(price_at_pixel(&chart, 5.0).is_none());
    }
}
