//! Top-level dispatch from content documents to HTML.

use serde_json::Value;

use crate::commonmark::CommonMarkRenderer;
use crate::document::{ContentDocument, tree_children};
use crate::error::RenderError;
use crate::markdown::BasicMarkdown;
use crate::node::{Node, NodeDecoder};
use crate::options::{MarkdownEngine, RenderOptions};
use crate::tree::TreeRenderer;

/// Renders CMS content into HTML for direct injection into a page.
///
/// The renderer holds only its options, so a single instance can be shared
/// across threads and reused for any number of documents.
#[derive(Clone, Debug, Default)]
pub struct DocumentRenderer {
    options: RenderOptions,
}

impl DocumentRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Options this renderer was built with.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a document, substituting fallback markup on failure.
    ///
    /// Never fails: missing content, unrecognised shapes and errors while
    /// walking a tree each map to their configured fallback message.
    pub fn render(&self, content: Option<&ContentDocument>) -> String {
        let result = match content {
            Some(document) => self.try_render(document),
            None => Err(RenderError::Unavailable),
        };
        self.or_fallback(result)
    }

    /// Render a raw field value, classifying it first.
    ///
    /// See [`ContentDocument::from_value`] for how values are classified.
    pub fn render_value(&self, value: Value) -> String {
        let result = ContentDocument::from_value(value, self.options.markdown)
            .and_then(|document| self.try_render(&document));
        self.or_fallback(result)
    }

    /// Render a document, returning the failure instead of fallback markup.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Unavailable`] for empty content,
    /// [`RenderError::InvalidShape`] for unrecognised tree shapes and
    /// [`RenderError::Malformed`] or [`RenderError::TooDeep`] when a node
    /// cannot be decoded.
    pub fn try_render(&self, content: &ContentDocument) -> Result<String, RenderError> {
        if content.is_empty() {
            return Err(RenderError::Unavailable);
        }
        match content {
            ContentDocument::PlainHtml(html) => {
                tracing::debug!(len = html.len(), "Passing HTML through");
                Ok(html.clone())
            }
            ContentDocument::MarkdownText(markdown) if self.options.markdown => {
                Ok(self.render_markdown(markdown))
            }
            ContentDocument::MarkdownText(html) => {
                tracing::debug!("Markdown disabled, passing string through");
                Ok(html.clone())
            }
            ContentDocument::StructuredTree(tree) => {
                let nodes = self.decode_tree(tree)?;
                Ok(TreeRenderer::new(&self.options.links).render(&nodes))
            }
        }
    }

    /// Convert markdown with the configured engine.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> String {
        tracing::debug!(engine = self.options.engine.name(), "Rendering markdown");
        match self.options.engine {
            MarkdownEngine::Basic => BasicMarkdown::new(&self.options.links).render(markdown),
            MarkdownEngine::CommonMark => {
                CommonMarkRenderer::new(&self.options.links).render(markdown)
            }
        }
    }

    /// Decode an editor state into its top-level nodes.
    ///
    /// # Errors
    ///
    /// Same as [`try_render`](Self::try_render) for structured trees.
    pub fn decode_tree(&self, tree: &Value) -> Result<Vec<Node>, RenderError> {
        let children = tree_children(tree)?;
        NodeDecoder::new(self.options.max_depth, self.options.raw_html_nodes)
            .decode_children(children)
    }

    /// Fallback markup for a failure, logged according to its class.
    ///
    /// Lets callers that fail before reaching the renderer (e.g. while
    /// parsing input) answer with the same markup as [`render`](Self::render).
    pub fn fallback_for(&self, err: &RenderError) -> String {
        let fallback = &self.options.fallback;
        match err {
            RenderError::Unavailable => fallback.unavailable.clone(),
            RenderError::InvalidShape(_) => {
                tracing::warn!(error = %err, "Content has an unrecognised shape");
                fallback.invalid.clone()
            }
            RenderError::Malformed(_) | RenderError::TooDeep { .. } => {
                tracing::error!(error = %err, "Failed to render content");
                fallback.error.clone()
            }
        }
    }

    fn or_fallback(&self, result: Result<String, RenderError>) -> String {
        result.unwrap_or_else(|err| self.fallback_for(&err))
    }
}
