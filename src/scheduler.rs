use std::time::{Duration, Instant};

use crate::{
    foundation::{
        core::{Fps, FrameCounter},
        error::{SketchError, SketchResult},
    },
    sketch::{Sketch, SketchSetup, draw::DrawList, random::RandomSource},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Initializing,
    Running,
}

/// Output of one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Zero-based number of ticks run before this one.
    pub index: u64,
    /// Counter value the draw list was rendered with.
    pub frame: FrameCounter,
    pub draw: DrawList,
}

/// Owns a sketch, its frame counter, and the random source it draws jitter from.
pub struct AnimationController {
    sketch: Box<dyn Sketch>,
    rng: Box<dyn RandomSource + Send>,
    state: ControllerState,
    setup: Option<SketchSetup>,
    frame: FrameCounter,
    ticks: u64,
}

impl AnimationController {
    pub fn new(sketch: Box<dyn Sketch>, rng: Box<dyn RandomSource + Send>) -> Self {
        Self {
            sketch,
            rng,
            state: ControllerState::Initializing,
            setup: None,
            frame: FrameCounter::ZERO,
            ticks: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn frame(&self) -> FrameCounter {
        self.frame
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sketch_name(&self) -> &'static str {
        self.sketch.name()
    }

    /// Runs the sketch's one-time setup and enters `Running`. Later calls return the same setup.
    pub fn setup(&mut self) -> SketchResult<SketchSetup> {
        if let Some(setup) = self.setup {
            return Ok(setup);
        }
        let setup = self.sketch.setup();
        setup.canvas.validate()?;
        tracing::debug!(
            sketch = self.sketch.name(),
            width = setup.canvas.width,
            height = setup.canvas.height,
            fps = setup.fps.as_f64(),
            "sketch initialized"
        );
        self.setup = Some(setup);
        self.state = ControllerState::Running;
        Ok(setup)
    }

    /// Renders the current counter, then advances it.
    #[tracing::instrument(level = "trace", skip(self), fields(sketch = self.sketch.name(), frame = self.frame.0))]
    pub fn tick(&mut self) -> SketchResult<Tick> {
        if self.state != ControllerState::Running {
            return Err(SketchError::validation(
                "controller must be set up before it can tick",
            ));
        }
        let frame = self.frame;
        let draw = self.sketch.render(frame, self.rng.as_mut())?;
        let tick = Tick {
            index: self.ticks,
            frame,
            draw,
        };
        self.frame = self.sketch.advance(frame);
        self.ticks += 1;
        Ok(tick)
    }
}

/// Receives every tick the scheduler produces.
pub trait FrameSink {
    fn consume(&mut self, setup: &SketchSetup, tick: &Tick) -> SketchResult<()>;

    fn finish(&mut self) -> SketchResult<()> {
        Ok(())
    }
}

/// Keeps every tick in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub ticks: Vec<Tick>,
}

impl FrameSink for CollectSink {
    fn consume(&mut self, _setup: &SketchSetup, tick: &Tick) -> SketchResult<()> {
        self.ticks.push(tick.clone());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Sleep until each tick's deadline, like a display loop.
    #[default]
    Realtime,
    /// Tick back-to-back, for offline output.
    Unpaced,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    /// Ticks that started after their deadline had already passed.
    pub late_ticks: u64,
}

/// Drives an [`AnimationController`] at the sketch's tick rate.
#[derive(Clone, Copy, Debug)]
pub struct Scheduler {
    pacing: Pacing,
    fps_override: Option<Fps>,
}

impl Scheduler {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            fps_override: None,
        }
    }

    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps_override = Some(fps);
        self
    }

    /// Ticks `limit` times, or forever when `limit` is `None`.
    pub fn run(
        &self,
        controller: &mut AnimationController,
        limit: Option<u64>,
        sink: &mut dyn FrameSink,
    ) -> SketchResult<RunStats> {
        let setup = controller.setup()?;
        let fps = self.fps_override.unwrap_or(setup.fps);
        let period = fps.frame_duration();
        let mut stats = RunStats::default();

        tracing::info!(
            sketch = controller.sketch_name(),
            fps = fps.as_f64(),
            pacing = ?self.pacing,
            limit = ?limit,
            "scheduler started"
        );

        let start = Instant::now();
        while limit.is_none_or(|n| stats.ticks < n) {
            if self.pacing == Pacing::Realtime {
                let deadline = start + period.mul_f64(stats.ticks as f64);
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                } else if now - deadline > period {
                    stats.late_ticks += 1;
                }
            }

            let tick = controller.tick()?;
            sink.consume(&setup, &tick)?;
            stats.ticks += 1;
        }

        sink.finish()?;
        tracing::info!(
            ticks = stats.ticks,
            late = stats.late_ticks,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scheduler finished"
        );
        Ok(stats)
    }

    pub fn expected_duration(&self, setup: &SketchSetup, ticks: u64) -> Duration {
        let fps = self.fps_override.unwrap_or(setup.fps);
        fps.frame_duration().mul_f64(ticks.saturating_sub(1) as f64)
    }
}
