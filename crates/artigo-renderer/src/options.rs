//! Renderer options.

/// Fallback shown when content is missing.
pub const DEFAULT_UNAVAILABLE: &str = "<p>Conteúdo não disponível.</p>";
/// Fallback shown when content has an unrecognised shape.
pub const DEFAULT_INVALID: &str = "<p>Conteúdo em formato inválido.</p>";
/// Fallback shown when rendering fails part-way through a tree.
pub const DEFAULT_ERROR: &str = "<p>Erro ao carregar conteúdo.</p>";
/// Default `rel` attribute for links.
pub const DEFAULT_REL: &str = "noopener noreferrer";
/// Default `target` attribute for markdown links.
pub const DEFAULT_MARKDOWN_TARGET: &str = "_blank";
/// Default maximum tree nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Markdown conversion engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkdownEngine {
    /// Line-oriented converter for the small subset CMS authors use.
    #[default]
    Basic,
    /// Full `CommonMark` parser with GFM extensions.
    CommonMark,
}

impl MarkdownEngine {
    /// Parse an engine name as used in configuration files.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(Self::Basic),
            "commonmark" => Some(Self::CommonMark),
            _ => None,
        }
    }

    /// Engine name as used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::CommonMark => "commonmark",
        }
    }
}

/// Link attribute defaults.
#[derive(Clone, Debug)]
pub struct LinkOptions {
    /// `rel` emitted when a link does not carry its own.
    pub default_rel: String,
    /// `target` emitted on links produced from markdown.
    pub markdown_target: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            default_rel: DEFAULT_REL.to_owned(),
            markdown_target: DEFAULT_MARKDOWN_TARGET.to_owned(),
        }
    }
}

/// Markup substituted when content cannot be rendered.
#[derive(Clone, Debug)]
pub struct FallbackMessages {
    /// Content is missing or empty.
    pub unavailable: String,
    /// Content has an unrecognised shape.
    pub invalid: String,
    /// Rendering failed while walking the tree.
    pub error: String,
}

impl Default for FallbackMessages {
    fn default() -> Self {
        Self {
            unavailable: DEFAULT_UNAVAILABLE.to_owned(),
            invalid: DEFAULT_INVALID.to_owned(),
            error: DEFAULT_ERROR.to_owned(),
        }
    }
}

/// Options controlling how a [`DocumentRenderer`](crate::DocumentRenderer)
/// treats its input.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Treat bare strings as markdown. When disabled they pass through as HTML.
    pub markdown: bool,
    /// Engine used for markdown strings.
    pub engine: MarkdownEngine,
    /// Emit `html` tree nodes verbatim. When disabled they render as unknown nodes.
    pub raw_html_nodes: bool,
    /// Maximum nesting depth accepted in a structured tree.
    pub max_depth: usize,
    /// Link attribute defaults.
    pub links: LinkOptions,
    /// Fallback markup.
    pub fallback: FallbackMessages,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            markdown: true,
            engine: MarkdownEngine::default(),
            raw_html_nodes: true,
            max_depth: DEFAULT_MAX_DEPTH,
            links: LinkOptions::default(),
            fallback: FallbackMessages::default(),
        }
    }
}

impl RenderOptions {
    /// Enable or disable markdown conversion of bare strings.
    #[must_use]
    pub fn with_markdown(mut self, enabled: bool) -> Self {
        self.markdown = enabled;
        self
    }

    /// Select the markdown engine.
    #[must_use]
    pub fn with_engine(mut self, engine: MarkdownEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Enable or disable verbatim output of `html` tree nodes.
    #[must_use]
    pub fn with_raw_html_nodes(mut self, enabled: bool) -> Self {
        self.raw_html_nodes = enabled;
        self
    }

    /// Set the maximum tree nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Replace link attribute defaults.
    #[must_use]
    pub fn with_links(mut self, links: LinkOptions) -> Self {
        self.links = links;
        self
    }

    /// Replace fallback markup.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackMessages) -> Self {
        self.fallback = fallback;
        self
    }
}
