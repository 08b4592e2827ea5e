use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::error::{SketchError, SketchResult},
    render::RenderSettings,
    scheduler::Pacing,
    sketch::{
        SketchKind,
        random::{RandomSource, Rng64},
    },
};

/// Environment variable supplying a seed when the config has none.
pub const SEED_ENV: &str = "SKETCHBOOK_SEED";

/// Settings for one sketch run, usually read from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub sketch: SketchKind,
    /// Ticks to run.
    pub frames: u64,
    /// Jitter seed. Unset means a fresh seed each run.
    pub seed: Option<u64>,
    pub pacing: Pacing,
    /// Straight-alpha color painted under the first draw command.
    pub clear_rgba: Option<[u8; 4]>,
    /// Stroke flattening tolerance in pixels. Renderer default when unset.
    pub tolerance: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sketch: SketchKind::Spiral,
            frames: 100,
            seed: None,
            pacing: Pacing::Realtime,
            clear_rgba: None,
            tolerance: None,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> SketchResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: RunConfig = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SketchResult<()> {
        if self.frames == 0 {
            return Err(SketchError::validation("frames must be > 0"));
        }
        if let Some(tol) = self.tolerance
            && !(tol.is_finite() && tol > 0.0)
        {
            return Err(SketchError::validation(format!(
                "tolerance must be a positive number, got {tol}"
            )));
        }
        Ok(())
    }

    /// The configured seed, else `SKETCHBOOK_SEED`, else none.
    pub fn resolve_seed(&self) -> Option<u64> {
        self.resolve_seed_with(std::env::var(SEED_ENV).ok().as_deref())
    }

    fn resolve_seed_with(&self, env: Option<&str>) -> Option<u64> {
        self.seed.or_else(|| {
            let raw = env?;
            match raw.trim().parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    tracing::warn!(value = raw, "ignoring non-numeric {SEED_ENV}");
                    None
                }
            }
        })
    }

    pub fn random_source(&self) -> Box<dyn RandomSource + Send> {
        match self.resolve_seed() {
            Some(seed) => Box::new(Rng64::new(seed)),
            None => Box::new(Rng64::from_entropy()),
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            clear_rgba: self.clear_rgba,
            tolerance: self.tolerance,
        }
    }
}
