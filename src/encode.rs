pub(crate) mod ffmpeg;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{SketchError, SketchResult},
    render::{FrameRGBA, RenderBackend},
    scheduler::{FrameSink, Tick},
    sketch::SketchSetup,
};

use ffmpeg::{EncodeConfig, FfmpegEncoder, ensure_parent_dir};

/// Writes a frame as an 8-bit RGBA PNG with straight alpha.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> SketchResult<()> {
    ensure_parent_dir(path)?;
    let data = if frame.premultiplied {
        unpremultiply_rgba8(&frame.data)
    } else {
        frame.data.clone()
    };
    image::save_buffer_with_format(
        path,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn unpremultiply_rgba8(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Rasterizes every tick and writes `<prefix>_<index>.png` into a directory.
pub struct PngSequenceSink {
    backend: Box<dyn RenderBackend>,
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(backend: Box<dyn RenderBackend>, dir: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            backend,
            dir: dir.into(),
            prefix: prefix.to_string(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}_{index:06}.png", self.prefix))
    }
}

impl FrameSink for PngSequenceSink {
    fn consume(&mut self, setup: &SketchSetup, tick: &Tick) -> SketchResult<()> {
        let frame = self.backend.render_draw_list(setup.canvas, &tick.draw)?;
        let path = self.path_for(tick.index);
        write_png(&frame, &path)?;
        tracing::debug!(path = %path.display(), frame = tick.frame.0, "wrote png");
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> SketchResult<()> {
        tracing::info!(
            dir = %self.dir.display(),
            frames = self.written.len(),
            "png sequence complete"
        );
        Ok(())
    }
}

/// Rasterizes every tick and streams it to `ffmpeg`. The encoder starts on the first tick,
/// once the canvas size is known.
pub struct Mp4Sink {
    backend: Box<dyn RenderBackend>,
    out_path: PathBuf,
    overwrite: bool,
    encoder: Option<FfmpegEncoder>,
    frames: u64,
}

impl Mp4Sink {
    pub fn new(backend: Box<dyn RenderBackend>, out_path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            out_path: out_path.into(),
            overwrite: true,
            encoder: None,
            frames: 0,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for Mp4Sink {
    fn consume(&mut self, setup: &SketchSetup, tick: &Tick) -> SketchResult<()> {
        if self.encoder.is_none() {
            let fps = setup.fps.as_whole().ok_or_else(|| {
                SketchError::validation("mp4 output requires a whole-number frame rate")
            })?;
            let mut cfg = EncodeConfig::new(self.out_path.clone(), setup.canvas, fps);
            cfg.overwrite = self.overwrite;
            self.encoder = Some(FfmpegEncoder::new(cfg)?);
        }

        let frame = self.backend.render_draw_list(setup.canvas, &tick.draw)?;
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(SketchError::encode("ffmpeg encoder was not started"));
        };
        encoder.encode_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> SketchResult<()> {
        match self.encoder.take() {
            Some(encoder) => {
                encoder.finish()?;
                Ok(())
            }
            None => Err(SketchError::validation("no frames were rendered")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpremultiply_restores_straight_color() {
        let out = unpremultiply_rgba8(&[64, 0, 0, 128, 10, 20, 30, 255, 0, 0, 0, 0]);
        assert_eq!(&out[0..4], &[128, 0, 0, 128]);
        assert_eq!(&out[4..8], &[10, 20, 30, 255]);
        assert_eq!(&out[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn sequence_paths_are_zero_padded() {
        let sink = PngSequenceSink::new(
            Box::new(crate::render::cpu::CpuBackend::default()),
            "frames",
            "spiral",
        );
        assert_eq!(sink.path_for(7), PathBuf::from("frames").join("spiral_000007.png"));
    }
}
