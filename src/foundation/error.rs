/// Result alias used throughout the crate.
pub type GlowResult<T> = Result<T, GlowError>;

/// Error type shared by every layer of the engine.
#[derive(thiserror::Error, Debug)]
pub enum GlowError {
    /// Invalid input that could not be clamped into a usable value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Curve parsing or geometry resolution failed.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Rasterization or compositing failed.
    #[error("render error: {0}")]
    Render(String),

    /// The host environment lacks a required capability.
    #[error("host error: {0}")]
    Host(String),

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlowError {
    /// Build a [`GlowError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlowError::Geometry`].
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`GlowError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GlowError::Host`].
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Build a [`GlowError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for GlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
