//! Renderer for CMS article bodies.
//!
//! Article bodies arrive in one of three shapes: pre-rendered HTML, a
//! markdown string, or a rich-text editor tree serialised as JSON. The
//! [`DocumentRenderer`] turns any of them into a single HTML string meant to
//! be injected into a page without further escaping.
//!
//! # Architecture
//!
//! - [`ContentDocument`] classifies the input.
//! - Editor trees are decoded into typed [`Node`]s and written out by a pure
//!   recursive walk.
//! - Markdown goes through either the line-oriented basic engine or a
//!   `pulldown-cmark` backed engine, selected with [`MarkdownEngine`].
//!
//! Rendering never fails: missing content, unrecognised shapes and decode
//! errors are replaced with the fallback markup in [`FallbackMessages`].
//! [`DocumentRenderer::try_render`] exposes the underlying [`RenderError`].
//!
//! # Example
//!
//! ```
//! use artigo_renderer::{ContentDocument, DocumentRenderer};
//! use serde_json::json;
//!
//! let renderer = DocumentRenderer::default();
//! let doc = ContentDocument::StructuredTree(json!({
//!     "root": {"children": [
//!         {"type": "paragraph", "children": [{"type": "text", "text": "hi", "format": 1}]}
//!     ]}
//! }));
//! assert_eq!(renderer.render(Some(&doc)), "<p><strong>hi</strong></p>");
//! ```

mod commonmark;
mod document;
mod error;
mod markdown;
mod node;
mod options;
mod renderer;
mod tree;
mod util;

pub use document::ContentDocument;
pub use error::RenderError;
pub use node::{Node, TextFormat};
pub use options::{
    DEFAULT_ERROR, DEFAULT_INVALID, DEFAULT_MARKDOWN_TARGET, DEFAULT_MAX_DEPTH, DEFAULT_REL,
    DEFAULT_UNAVAILABLE, FallbackMessages, LinkOptions, MarkdownEngine, RenderOptions,
};
pub use renderer::DocumentRenderer;
pub use util::escape_html;
