use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Canvas,
        error::{SketchError, SketchResult},
    },
    render::FrameRGBA,
};

/// Where and how an MP4 is written.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub out_path: PathBuf,
    pub canvas: Canvas,
    pub fps: u32,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, canvas: Canvas, fps: u32) -> Self {
        Self {
            out_path: out_path.into(),
            canvas,
            fps,
            overwrite: true,
        }
    }

    pub fn validate(&self) -> SketchResult<()> {
        self.canvas.validate()?;
        if self.fps == 0 {
            return Err(SketchError::validation("mp4 fps must be > 0"));
        }
        // yuv420p subsamples chroma 2x2
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(SketchError::validation(format!(
                "mp4 canvas {}x{} must have even sides",
                self.canvas.width, self.canvas.height
            )));
        }
        Ok(())
    }

    fn frame_bytes(&self) -> usize {
        self.canvas.width as usize * self.canvas.height as usize * 3
    }

    /// Arguments for an `ffmpeg` reading packed RGB24 frames from stdin.
    fn ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            if self.overwrite { "-y" } else { "-n" }.to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "-video_size".to_string(),
            format!("{}x{}", self.canvas.width, self.canvas.height),
            "-framerate".to_string(),
            self.fps.to_string(),
            "-i".to_string(),
            "-".to_string(),
        ];
        args.extend(
            ["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]
                .map(String::from),
        );
        args.push(self.out_path.to_string_lossy().into_owned());
        args
    }
}

/// True when an `ffmpeg` binary answers `-version`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Creates the directory `path` will be written into.
pub fn ensure_parent_dir(path: &Path) -> SketchResult<()> {
    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(dir).with_context(|| format!("create directory '{}'", dir.display()))?;
    Ok(())
}

/// A running `ffmpeg` child fed one frame at a time.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    rgb: Vec<u8>,
    frames: u64,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> SketchResult<Self> {
        cfg.validate()?;
        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(SketchError::validation(format!(
                "refusing to replace '{}'",
                cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(SketchError::encode("`ffmpeg` not found on PATH"));
        }
        ensure_parent_dir(&cfg.out_path)?;

        let mut child = Command::new("ffmpeg")
            .args(cfg.ffmpeg_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SketchError::encode(format!("spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SketchError::encode("ffmpeg stdin unavailable"))?;

        tracing::debug!(out = %cfg.out_path.display(), fps = cfg.fps, "ffmpeg started");
        Ok(Self {
            rgb: Vec::with_capacity(cfg.frame_bytes()),
            cfg,
            child,
            stdin: Some(stdin),
            frames: 0,
        })
    }

    pub fn encode_frame(&mut self, frame: &FrameRGBA) -> SketchResult<()> {
        let canvas = self.cfg.canvas;
        if (frame.width, frame.height) != (canvas.width, canvas.height) {
            return Err(SketchError::validation(format!(
                "frame is {}x{} but the encoder expects {}x{}",
                frame.width, frame.height, canvas.width, canvas.height
            )));
        }
        rgba_over_black(&mut self.rgb, &frame.data, frame.premultiplied)?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SketchError::encode("encoder already finished"))?;
        stdin
            .write_all(&self.rgb)
            .map_err(|e| SketchError::encode(format!("pipe frame {} to ffmpeg: {e}", self.frames)))?;
        self.frames += 1;
        Ok(())
    }

    /// Closes the pipe and waits for `ffmpeg`. Returns the number of frames written.
    pub fn finish(mut self) -> SketchResult<u64> {
        self.stdin = None;
        let out = self
            .child
            .wait_with_output()
            .map_err(|e| SketchError::encode(format!("wait for ffmpeg: {e}")))?;
        if !out.status.success() {
            return Err(SketchError::encode(format!(
                "ffmpeg failed ({}): {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        tracing::info!(out = %self.cfg.out_path.display(), frames = self.frames, "wrote mp4");
        Ok(self.frames)
    }
}

/// Packs RGBA pixels into RGB, composited over black.
pub(crate) fn rgba_over_black(dst: &mut Vec<u8>, src: &[u8], premultiplied: bool) -> SketchResult<()> {
    if !src.len().is_multiple_of(4) {
        return Err(SketchError::validation("rgba buffer length is not a multiple of 4"));
    }
    dst.clear();
    for px in src.chunks_exact(4) {
        let alpha = u32::from(px[3]);
        for &c in &px[..3] {
            let c = u32::from(c);
            dst.push(if premultiplied || alpha == 255 {
                c as u8
            } else {
                ((c * alpha + 127) / 255) as u8
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(width: u32, height: u32, fps: u32) -> EncodeConfig {
        EncodeConfig::new("out/a.mp4", Canvas { width, height }, fps)
    }

    #[test]
    fn odd_or_empty_canvas_and_zero_fps_are_rejected() {
        assert!(cfg(0, 10, 20).validate().is_err());
        assert!(cfg(11, 10, 20).validate().is_err());
        assert!(cfg(10, 10, 0).validate().is_err());
        assert!(cfg(400, 400, 20).validate().is_ok());
    }

    #[test]
    fn args_describe_raw_rgb_input_and_end_with_output() {
        let args = cfg(400, 400, 20).ffmpeg_args();
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "rgb24"]));
        assert!(args.windows(2).any(|w| w == ["-video_size", "400x400"]));
        assert!(args.windows(2).any(|w| w == ["-framerate", "20"]));
        assert_eq!(args.last().map(String::as_str), Some("out/a.mp4"));

        let mut keep = cfg(400, 400, 20);
        keep.overwrite = false;
        assert_eq!(keep.ffmpeg_args()[0], "-n");
    }

    #[test]
    fn straight_alpha_is_darkened_and_alpha_dropped() {
        let mut rgb = Vec::new();
        rgba_over_black(&mut rgb, &[255, 0, 0, 128, 10, 20, 30, 255], false).unwrap();
        assert_eq!(rgb, vec![128, 0, 0, 10, 20, 30]);
    }

    #[test]
    fn premultiplied_color_passes_through() {
        let mut rgb = vec![9; 12];
        rgba_over_black(&mut rgb, &[128, 0, 0, 128], true).unwrap();
        assert_eq!(rgb, vec![128, 0, 0]);
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let mut rgb = Vec::new();
        assert!(rgba_over_black(&mut rgb, &[0; 5], true).is_err());
    }
}
