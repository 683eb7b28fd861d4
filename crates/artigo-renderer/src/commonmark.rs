//! `CommonMark` engine built on `pulldown-cmark`.
//!
//! Walks the parser's event stream and writes the same HTML vocabulary as the
//! tree renderer, so switching engines only changes which markdown is
//! understood.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::options::LinkOptions;
use crate::util::escape_html;

/// Event-stream renderer for full markdown documents.
pub(crate) struct CommonMarkRenderer<'a> {
    links: &'a LinkOptions,
    output: String,
    /// Buffer for the code block being collected.
    code: Option<CodeBlock>,
    /// Image whose alt text is being collected.
    image: Option<PendingImage>,
    in_table_head: bool,
}

struct CodeBlock {
    language: Option<String>,
    content: String,
}

struct PendingImage {
    src: String,
    title: String,
    alt: String,
    /// Images opened inside this image's description.
    nested: usize,
}

impl<'a> CommonMarkRenderer<'a> {
    pub(crate) fn new(links: &'a LinkOptions) -> Self {
        Self {
            links,
            output: String::with_capacity(4096),
            code: None,
            image: None,
            in_table_head: false,
        }
    }

    fn parser_options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    /// Render a markdown document.
    pub(crate) fn render(mut self, markdown: &str) -> String {
        for event in Parser::new_ext(markdown, Self::parser_options()) {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        if let Some(image) = &mut self.image {
            if image.collect_alt(&event) {
                self.end_tag(TagEnd::Image);
            }
            return;
        }
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                write!(self.output, "<code>{}</code>", escape_html(&code)).unwrap();
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.output.push_str("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                let checked = if checked { " checked" } else { "" };
                write!(self.output, r#"<input type="checkbox" disabled{checked}>"#).unwrap();
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                write!(self.output, "<h{}>", heading_level_to_num(level)).unwrap();
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    language,
                    content: String::new(),
                });
            }
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => write!(self.output, r#"<ol start="{start}">"#).unwrap(),
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(_) => self.output.push_str("<table>"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => self.output.push_str("<tr>"),
            Tag::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "<th>" } else { "<td>" });
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link { dest_url, .. } => self.link_start(&dest_url),
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    src: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                    nested: 0,
                });
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                if let Some(block) = self.code.take() {
                    self.code_block(&block);
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    self.image_tag(&image);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = &mut self.code {
            code.content.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn link_start(&mut self, url: &str) {
        write!(self.output, r#"<a href="{}""#, escape_html(url)).unwrap();
        if !self.links.markdown_target.is_empty() {
            write!(
                self.output,
                r#" target="{}""#,
                escape_html(&self.links.markdown_target)
            )
            .unwrap();
        }
        write!(
            self.output,
            r#" rel="{}">"#,
            escape_html(&self.links.default_rel)
        )
        .unwrap();
    }

    fn code_block(&mut self, block: &CodeBlock) {
        match &block.language {
            Some(lang) => write!(
                self.output,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(&block.content)
            )
            .unwrap(),
            None => write!(
                self.output,
                "<pre><code>{}</code></pre>",
                escape_html(&block.content)
            )
            .unwrap(),
        }
    }

    fn image_tag(&mut self, image: &PendingImage) {
        let title_attr = if image.title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(&image.title))
        };
        write!(
            self.output,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(&image.src),
            escape_html(&image.alt)
        )
        .unwrap();
    }
}

impl PendingImage {
    /// Flatten an event inside the image description into alt text.
    ///
    /// Returns `true` on the event that closes this image.
    fn collect_alt(&mut self, event: &Event<'_>) -> bool {
        match event {
            Event::Text(text) | Event::Code(text) => self.alt.push_str(text),
            Event::SoftBreak | Event::HardBreak => self.alt.push(' '),
            Event::Start(Tag::Image { .. }) => self.nested += 1,
            Event::End(TagEnd::Image) if self.nested == 0 => return true,
            Event::End(TagEnd::Image) => self.nested -= 1,
            _ => {}
        }
        false
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
