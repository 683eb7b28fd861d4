//! `artigo render` command implementation.

use std::path::{Path, PathBuf};

use artigo_config::{CliSettings, Config, MarkdownEngineName};
use artigo_renderer::{
    ContentDocument, DocumentRenderer, FallbackMessages, LinkOptions, MarkdownEngine,
    RenderError, RenderOptions,
};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use serde_json::Value;

use crate::error::CliError;
use crate::output::Output;

/// JSON nesting allowed on top of two levels per tree node (node object and
/// its `children` array), for the CMS document and `root` wrappers.
const JSON_NESTING_SLACK: usize = 16;

/// How to interpret the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputFormat {
    /// Guess from the file extension, then from the content.
    Auto,
    /// Pre-rendered HTML.
    Html,
    /// Markdown text.
    Markdown,
    /// Editor JSON or a CMS document containing it.
    Json,
}

/// Concrete input kind after resolving [`InputFormat::Auto`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceKind {
    Html,
    Markdown,
    Json,
}

impl InputFormat {
    fn resolve(self, path: Option<&Path>, source: &str) -> SourceKind {
        match self {
            Self::Html => SourceKind::Html,
            Self::Markdown => SourceKind::Markdown,
            Self::Json => SourceKind::Json,
            Self::Auto => {
                let extension = path
                    .and_then(Path::extension)
                    .and_then(|ext| ext.to_str())
                    .map(str::to_ascii_lowercase);
                match extension.as_deref() {
                    Some("json") => SourceKind::Json,
                    Some("md" | "markdown") => SourceKind::Markdown,
                    Some("html" | "htm") => SourceKind::Html,
                    _ if source.trim_start().starts_with('{') => SourceKind::Json,
                    _ => SourceKind::Markdown,
                }
            }
        }
    }
}

/// Markdown engine selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum EngineArg {
    Basic,
    Commonmark,
}

impl From<EngineArg> for MarkdownEngineName {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Basic => Self::Basic,
            EngineArg::Commonmark => Self::CommonMark,
        }
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Input file (default: read from stdin; `-` also means stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover artigo.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input format.
    #[arg(short, long, value_enum, default_value_t = InputFormat::Auto)]
    format: InputFormat,

    /// JSON pointer to the content field of a JSON document (e.g. `/content`).
    #[arg(long)]
    pointer: Option<String>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Markdown engine (overrides config).
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// Pass strings through as HTML instead of converting markdown.
    #[arg(long)]
    no_markdown: bool,

    /// Drop raw HTML nodes from editor trees.
    #[arg(long)]
    no_raw_html: bool,

    /// Fail instead of emitting fallback markup.
    #[arg(long)]
    strict: bool,

    /// Enable verbose output (debug logs on stderr).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or input cannot be read, the output
    /// cannot be written, or `--strict` is set and the content does not render.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            markdown_enabled: self.no_markdown.then_some(false),
            engine: self.engine.map(MarkdownEngineName::from),
            raw_html: self.no_raw_html.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }
        let renderer = DocumentRenderer::new(render_options_from_config(&config));

        let source = self.read_input()?;
        let html = self.render(&renderer, source)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                output.success(&format!("Rendered {} bytes to {}", html.len(), path.display()));
            }
            None => output.document(&html)?,
        }

        Ok(())
    }

    fn read_input(&self) -> Result<String, CliError> {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => {
                tracing::debug!(path = %path.display(), "Reading input file");
                Ok(std::fs::read_to_string(path)?)
            }
            _ => {
                Output::new().info("Reading from stdin...");
                Ok(std::io::read_to_string(std::io::stdin())?)
            }
        }
    }

    fn render(&self, renderer: &DocumentRenderer, source: String) -> Result<String, CliError> {
        let kind = self.format.resolve(self.input.as_deref(), &source);
        tracing::debug!(?kind, "Resolved input format");

        if self.pointer.is_some() && kind != SourceKind::Json {
            return Err(CliError::Validation(
                "--pointer requires JSON input".to_owned(),
            ));
        }

        let document = match kind {
            SourceKind::Html => ContentDocument::PlainHtml(source),
            SourceKind::Markdown => ContentDocument::MarkdownText(source),
            SourceKind::Json => {
                let value = match parse_json(&source, renderer.options().max_depth) {
                    Err(CliError::Render(err)) if !self.strict => {
                        return Ok(renderer.fallback_for(&err));
                    }
                    parsed => self.select(parsed?)?,
                };
                if !self.strict {
                    return Ok(renderer.render_value(value));
                }
                ContentDocument::from_value(value, renderer.options().markdown)?
            }
        };

        if self.strict {
            Ok(renderer.try_render(&document)?)
        } else {
            Ok(renderer.render(Some(&document)))
        }
    }

    /// Apply `--pointer` to a parsed JSON document.
    fn select(&self, mut value: Value) -> Result<Value, CliError> {
        let Some(pointer) = &self.pointer else {
            return Ok(value);
        };
        value.pointer_mut(pointer).map(Value::take).ok_or_else(|| {
            CliError::Validation(format!("JSON pointer {pointer} does not match the input"))
        })
    }
}

/// Parse JSON input without `serde_json`'s fixed nesting limit.
///
/// Nesting is bounded from the renderer's `max_depth` instead, so any tree
/// the renderer accepts also parses, and deeper input fails as
/// [`RenderError::TooDeep`] before the parser recurses into it.
fn parse_json(source: &str, max_depth: usize) -> Result<Value, CliError> {
    let limit = max_depth.saturating_mul(2).saturating_add(JSON_NESTING_SLACK);
    if json_nesting(source) > limit {
        return Err(RenderError::TooDeep { limit: max_depth }.into());
    }
    let mut deserializer = serde_json::Deserializer::from_str(source);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Deepest bracket nesting in a JSON text, ignoring brackets inside strings.
fn json_nesting(source: &str) -> usize {
    let (mut depth, mut max) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for byte in source.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Build renderer options from the loaded configuration.
pub(crate) fn render_options_from_config(config: &Config) -> RenderOptions {
    let engine = match config.markdown.engine {
        MarkdownEngineName::Basic => MarkdownEngine::Basic,
        MarkdownEngineName::CommonMark => MarkdownEngine::CommonMark,
    };
    RenderOptions::default()
        .with_markdown(config.markdown.enabled)
        .with_engine(engine)
        .with_raw_html_nodes(config.tree.raw_html)
        .with_max_depth(config.tree.max_depth)
        .with_links(LinkOptions {
            default_rel: config.links.rel.clone(),
            markdown_target: config.links.markdown_target.clone(),
        })
        .with_fallback(FallbackMessages {
            unavailable: config.fallback.unavailable.clone(),
            invalid: config.fallback.invalid.clone(),
            error: config.fallback.error.clone(),
        })
}
