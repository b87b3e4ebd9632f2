//! Render error types

use kiln_core::KilnError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Render context lost")]
    ContextLost,
    #[error("Pass '{pass}' failed: {message}")]
    PassFailed { pass: String, message: String },
    #[error("Frame graph error: {0}")]
    FrameGraph(String),
    #[error("Lightmap bake failed: {0}")]
    LightmapBake(String),
}

impl From<RenderError> for KilnError {
    fn from(err: RenderError) -> Self {
        KilnError::RenderError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        let err = RenderError::PassFailed {
            pass: "world".into(),
            message: "bad target".into(),
        };
        assert_eq!(err.to_string(), "Pass 'world' failed: bad target");
    }

    #[test]
    fn test_into_kiln_error() {
        let err: KilnError = RenderError::ContextLost.into();
        assert!(matches!(err, KilnError::RenderError(msg) if msg == "Render context lost"));
    }
}
