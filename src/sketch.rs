pub(crate) mod cannon;
pub(crate) mod draw;
pub(crate) mod random;
pub(crate) mod soldiers;
pub(crate) mod spiral;

use crate::foundation::{
    core::{Canvas, Fps, FrameCounter},
    error::{SketchError, SketchResult},
};

use draw::DrawList;
use random::RandomSource;

/// Canvas size shared by every sketch.
pub const SKETCH_CANVAS: Canvas = Canvas {
    width: 400,
    height: 400,
};

/// Target tick rate shared by every sketch.
pub const SKETCH_FPS: Fps = Fps::whole(20);

/// One-time parameters a sketch fixes before its first tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SketchSetup {
    pub canvas: Canvas,
    pub fps: Fps,
}

impl Default for SketchSetup {
    fn default() -> Self {
        Self {
            canvas: SKETCH_CANVAS,
            fps: SKETCH_FPS,
        }
    }
}

/// A generative animation: a pure function from frame counter (and jitter) to draw commands.
pub trait Sketch: Send {
    fn name(&self) -> &'static str;

    fn setup(&self) -> SketchSetup {
        SketchSetup::default()
    }

    /// Draw commands for one tick. Must not keep state between calls.
    fn render(&self, frame: FrameCounter, rng: &mut dyn RandomSource) -> SketchResult<DrawList>;

    /// Counter value for the tick after `frame`.
    fn advance(&self, frame: FrameCounter) -> FrameCounter {
        frame.next()
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SketchKind {
    Spiral,
    Cannon,
    Soldiers,
}

impl SketchKind {
    pub const ALL: [SketchKind; 3] = [SketchKind::Spiral, SketchKind::Cannon, SketchKind::Soldiers];

    pub fn as_str(self) -> &'static str {
        match self {
            SketchKind::Spiral => "spiral",
            SketchKind::Cannon => "cannon",
            SketchKind::Soldiers => "soldiers",
        }
    }

    pub fn build(self) -> Box<dyn Sketch> {
        match self {
            SketchKind::Spiral => Box::new(spiral::Spiral),
            SketchKind::Cannon => Box::new(cannon::Cannon),
            SketchKind::Soldiers => Box::new(soldiers::Soldiers),
        }
    }
}

impl std::fmt::Display for SketchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SketchKind {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SketchKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SketchError::validation(format!("unknown sketch '{s}'")))
    }
}
