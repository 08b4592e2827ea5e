use std::time::Duration;

use crate::foundation::error::{SketchError, SketchResult};

pub use kurbo::{BezPath, Point, Vec2};

/// Tick index handed to a sketch's render function.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameCounter(pub u64);

impl FrameCounter {
    pub const ZERO: Self = Self(0);

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Next counter value, wrapping back to zero at `modulus`.
    pub fn next_wrapping(self, modulus: u64) -> Self {
        if modulus == 0 {
            return self.next();
        }
        Self((self.0 % modulus + 1) % modulus)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> SketchResult<Self> {
        if den == 0 {
            return Err(SketchError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SketchError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub const fn whole(num: u32) -> Self {
        Self { num, den: 1 }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }

    /// Integer rate, if the fraction is whole. The MP4 encoder needs one.
    pub fn as_whole(self) -> Option<u32> {
        (self.num % self.den == 0).then(|| self.num / self.den)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn validate(self) -> SketchResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SketchError::validation("canvas width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(SketchError::validation("canvas width/height exceeds u16"));
        }
        Ok(())
    }
}

/// Color in hue/saturation/brightness space with ranges `h: 0..360`, `s: 0..100`,
/// `b: 0..100`. Out-of-range components are clamped on conversion.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hsb {
    pub h: f64,
    pub s: f64,
    pub b: f64,
}

impl Hsb {
    pub const fn new(h: f64, s: f64, b: f64) -> Self {
        Self { h, s, b }
    }

    /// Straight-alpha RGBA8, fully opaque.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn unit(v: f64, max: f64) -> f64 {
            if v.is_nan() {
                return 0.0;
            }
            (v / max).clamp(0.0, 1.0)
        }

        let hue = unit(self.h, 360.0) * 6.0;
        let sat = unit(self.s, 100.0);
        let val = unit(self.b, 100.0);

        let (r, g, b) = if sat == 0.0 {
            (val, val, val)
        } else {
            let sector = hue.floor();
            let tint1 = val * (1.0 - sat);
            let tint2 = val * (1.0 - sat * (hue - sector));
            let tint3 = val * (1.0 - sat * (1.0 + sector - hue));
            match sector as u8 {
                1 => (tint2, val, tint1),
                2 => (tint1, val, tint3),
                3 => (tint1, tint2, val),
                4 => (tint3, tint1, val),
                5 => (val, tint1, tint2),
                _ => (val, tint3, tint1),
            }
        };

        let to_u8 = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [to_u8(r), to_u8(g), to_u8(b), 255]
    }
}
