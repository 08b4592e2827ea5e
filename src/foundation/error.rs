pub type SketchResult<T> = Result<T, SketchError>;

#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    /// A value outside its allowed range: canvas size, fps, coordinates, config fields.
    #[error("invalid: {0}")]
    Validation(String),

    /// The location list could not be read.
    #[error("location list: {0}")]
    Markup(String),

    #[error("rasterizing failed: {0}")]
    Render(String),

    #[error("mp4 output failed: {0}")]
    Encode(String),

    #[error("json: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SketchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn markup(msg: impl Into<String>) -> Self {
        Self::Markup(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SketchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
