//! Sketchbook renders small generative canvas animations and a clickable location map.
//!
//! # Sketches
//!
//! A [`Sketch`] is a pure function from a [`FrameCounter`] (plus jitter drawn from an injected
//! [`RandomSource`]) to a [`DrawList`]. An [`AnimationController`] owns the counter and moves
//! from `Initializing` to `Running` on setup; a [`Scheduler`] ticks it at the sketch's rate and
//! hands every draw list to a [`FrameSink`].
//!
//! 1. **Tick**: `FrameCounter -> DrawList` ([`AnimationController::tick`])
//! 2. **Render**: `DrawList -> FrameRGBA` ([`CpuBackend`])
//! 3. **Output**: PNG ([`write_png`], [`PngSequenceSink`]) or MP4 via the system `ffmpeg`
//!    ([`Mp4Sink`])
//!
//! # Map
//!
//! [`parse_location_list`] reads location records from list markup, [`MapViewer`] places one
//! marker per record and resolves clicks to a single open [`Popup`], and
//! [`render_leaflet_page`] writes the same map as a standalone Leaflet page.
#![forbid(unsafe_code)]

mod config;
mod encode;
mod foundation;
mod map;
mod render;
mod scheduler;
mod sketch;

pub use config::{RunConfig, SEED_ENV};
pub use encode::ffmpeg::{EncodeConfig, FfmpegEncoder, ensure_parent_dir, is_ffmpeg_on_path};
pub use encode::{Mp4Sink, PngSequenceSink, write_png};
pub use foundation::core::{BezPath, Canvas, Fps, FrameCounter, Hsb, Point, Vec2};
pub use foundation::error::{SketchError, SketchResult};
pub use map::page::render_leaflet_page;
pub use map::record::{LatLng, LocationRecord, parse_location_list, parse_records_json};
pub use map::viewer::{MapView, MapViewer, Marker, MarkerId, MarkerTarget, Popup};
pub use render::cpu::CpuBackend;
pub use render::{FrameRGBA, RenderBackend, RenderSettings};
pub use scheduler::{
    AnimationController, CollectSink, ControllerState, FrameSink, Pacing, RunStats, Scheduler,
    Tick,
};
pub use sketch::cannon::Cannon;
pub use sketch::draw::{DrawCommand, DrawList, StrokeStyle};
pub use sketch::random::{Fixed, RandomSource, Rng64};
pub use sketch::soldiers::Soldiers;
pub use sketch::spiral::Spiral;
pub use sketch::{SKETCH_CANVAS, SKETCH_FPS, Sketch, SketchKind, SketchSetup};
