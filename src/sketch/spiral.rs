use std::f64::consts::TAU;

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

pub const BACKGROUND: Hsb = Hsb::new(220.0, 0.0, 0.0);

const CENTER: Point = Point::new(200.0, 200.0);
const STEP: f64 = 0.1;
const TURNS: f64 = 20.0;
const MAX_JITTER: f64 = 6.0;

/// Jittered spiral whose twist swings with the frame counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spiral;

impl Spiral {
    /// Angle offset applied to every sample of frame `frame`.
    pub fn twist(frame: FrameCounter) -> f64 {
        -10.0 * (frame.as_f64() / 10.0).sin()
    }

    pub fn curve(frame: FrameCounter, rng: &mut dyn RandomSource) -> Vec<Point> {
        let twist = Self::twist(frame);
        let mut points = Vec::with_capacity((TURNS * TAU / STEP) as usize + 1);
        // Accumulated, not indexed, so the sample count matches a float loop exactly.
        let mut z = 0.0_f64;
        while z < TURNS * TAU {
            let a = z * 50.0 / 20.0 + rng.uniform(0.0, MAX_JITTER);
            let th = z + twist;
            points.push(Point::new(CENTER.x + a * th.sin(), CENTER.y + a * th.cos()));
            z += STEP;
        }
        points
    }

    pub fn hue(frame: FrameCounter) -> f64 {
        (frame.0 % 255) as f64
    }
}

impl Sketch for Spiral {
    fn name(&self) -> &'static str {
        "spiral"
    }

    #[tracing::instrument(level = "trace", skip(self, rng))]
    fn render(&self, frame: FrameCounter, rng: &mut dyn RandomSource) -> SketchResult<DrawList> {
        let mut list = DrawList::new();
        list.push(DrawCommand::Background(BACKGROUND));
        list.push(DrawCommand::Polyline {
            points: Self::curve(frame, rng),
            stroke: StrokeStyle {
                color: Hsb::new(Self::hue(frame), 100.0, 100.0),
                weight: 1.0,
            },
        });
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::random::{Fixed, Rng64};

    #[test]
    fn first_sample_sits_on_center_without_jitter() {
        for f in [0u64, 1, 17, 1234] {
            let pts = Spiral::curve(FrameCounter(f), &mut Fixed(0.0));
            assert_eq!(pts[0], CENTER);
        }
    }

    #[test]
    fn first_sample_stays_within_jitter_radius() {
        let mut rng = Rng64::new(5);
        for f in 0..50u64 {
            let pts = Spiral::curve(FrameCounter(f), &mut rng);
            assert!(pts[0].distance(CENTER) < MAX_JITTER);
        }
    }

    #[test]
    fn twist_follows_counter() {
        assert_eq!(Spiral::twist(FrameCounter(0)), 0.0);
        let f = FrameCounter(31);
        assert!((Spiral::twist(f) - (-10.0 * 3.1_f64.sin())).abs() < 1e-12);
    }

    #[test]
    fn sample_count_covers_twenty_turns() {
        let pts = Spiral::curve(FrameCounter(0), &mut Fixed(0.0));
        assert_eq!(pts.len(), 1257);
    }

    #[test]
    fn hue_cycles_every_255_frames() {
        assert_eq!(Spiral::hue(FrameCounter(254)), 254.0);
        assert_eq!(Spiral::hue(FrameCounter(255)), 0.0);
        assert_eq!(Spiral::hue(FrameCounter(300)), 45.0);
    }

    #[test]
    fn render_clears_then_strokes_one_curve() {
        let list = Spiral.render(FrameCounter(3), &mut Fixed(0.5)).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.commands[0], DrawCommand::Background(BACKGROUND));
        assert_eq!(list.polylines().count(), 1);
    }
}
