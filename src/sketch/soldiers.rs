use std::f64::consts::PI;

use crate::{
    foundation::{
        core::{FrameCounter, Hsb, Point},
        error::SketchResult,
    },
    sketch::{
        Sketch,
        draw::{DrawCommand, DrawList, StrokeStyle},
        random::RandomSource,
    },
};

pub const BACKGROUND: Hsb = Hsb::new(0.0, 100.0, 0.0);

/// Counter modulus: the march repeats every `PERIOD` ticks.
pub const PERIOD: u64 = 400;
pub const STROKE_WEIGHT: f64 = 4.0;

const OFFSET_START: i64 = -400;
const OFFSET_END: i64 = 400;
const OFFSET_STEP: usize = 20;

/// A row of marching line segments. Deterministic; the random source is unused.
#[derive(Clone, Copy, Debug, Default)]
pub struct Soldiers;

impl Soldiers {
    /// Segment drawn for loop offset `x` at counter `frame`.
    pub fn segment(frame: FrameCounter, x: i64) -> (Point, Point) {
        let xx = (frame.0 % PERIOD) as f64 + x as f64;
        let from = Point::new(xx + 5.0 * (xx / 10.0).sin(), 100.0 + 30.0 * (xx / 10.0).sin());
        let to = Point::new(
            xx + 5.0 * (xx / 10.0 * 2.0 + PI).sin(),
            250.0 + 50.0 * (xx / 10.0 / 2.0).sin(),
        );
        (from, to)
    }

    /// Hue follows the loop offset, not the shifted position. The remainder keeps the sign of
    /// `x`, and negative hues clamp to 0, so the left half of the row is red.
    pub fn hue(x: i64) -> f64 {
        (x % 255).max(0) as f64
    }

    pub fn offsets() -> impl Iterator<Item = i64> {
        (OFFSET_START..OFFSET_END).step_by(OFFSET_STEP)
    }
}

impl Sketch for Soldiers {
    fn name(&self) -> &'static str {
        "soldiers"
    }

    #[tracing::instrument(level = "trace", skip(self, _rng))]
    fn render(&self, frame: FrameCounter, _rng: &mut dyn RandomSource) -> SketchResult<DrawList> {
        let mut list = DrawList::new();
        list.push(DrawCommand::Background(BACKGROUND));
        for x in Self::offsets() {
            let (from, to) = Self::segment(frame, x);
            list.push(DrawCommand::Line {
                from,
                to,
                stroke: StrokeStyle {
                    color: Hsb::new(Self::hue(x), 200.0, 100.0),
                    weight: STROKE_WEIGHT,
                },
            });
        }
        Ok(list)
    }

    fn advance(&self, frame: FrameCounter) -> FrameCounter {
        frame.next_wrapping(PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::random::Fixed;

    #[test]
    fn forty_segments_per_tick() {
        assert_eq!(Soldiers::offsets().count(), 40);
        let list = Soldiers.render(FrameCounter(0), &mut Fixed(0.0)).unwrap();
        assert_eq!(list.lines().count(), 40);
    }

    #[test]
    fn counter_wraps_after_period() {
        let mut f = FrameCounter::ZERO;
        for _ in 0..PERIOD {
            f = Soldiers.advance(f);
        }
        assert_eq!(f, FrameCounter::ZERO);
    }

    #[test]
    fn segment_at_origin_offset() {
        let (from, to) = Soldiers::segment(FrameCounter(0), 0);
        assert_eq!(from, Point::new(0.0, 100.0));
        assert!((to.x - 5.0 * PI.sin()).abs() < 1e-12);
        assert_eq!(to.y, 250.0);
    }

    #[test]
    fn hue_uses_offset_modulo() {
        assert_eq!(Soldiers::hue(0), 0.0);
        assert_eq!(Soldiers::hue(260), 5.0);
        assert_eq!(Soldiers::hue(380), 125.0);
        assert_eq!(Soldiers::hue(-20), 0.0);
        assert_eq!(Soldiers::hue(-400), 0.0);
    }

    #[test]
    fn rendering_ignores_the_random_source() {
        let a = Soldiers.render(FrameCounter(77), &mut Fixed(0.0)).unwrap();
        let b = Soldiers.render(FrameCounter(77), &mut Fixed(0.9)).unwrap();
        assert_eq!(a, b);
    }
}
