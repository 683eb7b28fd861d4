//! Render error types.

/// Reason a document could not be rendered.
///
/// [`DocumentRenderer::render`](crate::DocumentRenderer::render) maps each
/// variant to one of the configured fallback messages; use
/// [`DocumentRenderer::try_render`](crate::DocumentRenderer::try_render) to
/// inspect it directly.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The content is missing or empty.
    #[error("content is empty")]
    Unavailable,

    /// The top-level value does not look like any supported document.
    #[error("invalid document shape: {0}")]
    InvalidShape(&'static str),

    /// A node inside the tree could not be decoded.
    #[error("malformed node: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The tree nests deeper than the configured limit.
    #[error("tree exceeds maximum depth of {limit}")]
    TooDeep {
        /// Configured nesting limit.
        limit: usize,
    },
}

impl RenderError {
    /// Whether the error comes from the shape of the input rather than from
    /// a failure while walking it.
    #[must_use]
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::Unavailable | Self::InvalidShape(_))
    }
}
