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

pub const BACKGROUND: Hsb = Hsb::new(220.0, 0.0, 0.0);

pub const CURVES: u32 = 20;
const X_END: u32 = 400;
const X_STEP: usize = 3;
const MAX_JITTER: f64 = 10.0;

/// Twenty superimposed sine traces whose amplitudes beat against the counter.
///
/// Curve `z` divides its amplitude by `z`, so curve 0 is degenerate: its
/// samples are infinite (or NaN where the sine term is zero). Curves with any
/// non-finite sample are left out of the draw list.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cannon;

impl Cannon {
    pub fn amplitude(z: u32, frame: FrameCounter) -> f64 {
        10.0 * (1.0 + f64::from(z) * frame.as_f64() * PI / 70.0).sin()
    }

    pub fn hue(z: u32, frame: FrameCounter) -> f64 {
        ((frame.as_f64() / 10.0 + f64::from(z)) * 30.0) % 255.0
    }

    /// Raw samples of curve `z`, including non-finite ones.
    pub fn curve(z: u32, frame: FrameCounter, rng: &mut dyn RandomSource) -> Vec<Point> {
        let a = Self::amplitude(z, frame);
        let scale = 10.0 * a / f64::from(z);
        (0..X_END)
            .step_by(X_STEP)
            .map(|x| {
                let x = f64::from(x);
                let y = 200.0 + scale * (x / 15.0).sin() + rng.uniform(0.0, MAX_JITTER);
                Point::new(x, y)
            })
            .collect()
    }
}

impl Sketch for Cannon {
    fn name(&self) -> &'static str {
        "cannon"
    }

    #[tracing::instrument(level = "trace", skip(self, rng))]
    fn render(&self, frame: FrameCounter, rng: &mut dyn RandomSource) -> SketchResult<DrawList> {
        let mut list = DrawList::new();
        list.push(DrawCommand::Background(BACKGROUND));
        for z in 0..CURVES {
            let cmd = DrawCommand::Polyline {
                points: Self::curve(z, frame, rng),
                stroke: StrokeStyle {
                    color: Hsb::new(Self::hue(z, frame), 100.0, 100.0),
                    weight: 1.0,
                },
            };
            if !cmd.is_finite() {
                tracing::debug!(z, frame = frame.0, "skipping curve with non-finite samples");
                continue;
            }
            list.push(cmd);
        }
        Ok(list)
    }
}
