/// Convenience result type used across slidefx.
pub type SlideFxResult<T> = Result<T, SlideFxError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Nothing in the per-frame path returns these to the host: the session logs them and degrades to
/// an inert frame. They surface from constructors, parsers and resource creation.
#[derive(thiserror::Error, Debug)]
pub enum SlideFxError {
    /// Invalid caller-provided or document metadata.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while configuring or driving an activity.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while evaluating a frame (buffer shape mismatches and similar).
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors raised by the rendering context (disposed context, missing handle).
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlideFxError {
    /// Build a [`SlideFxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlideFxError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`SlideFxError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`SlideFxError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SlideFxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
