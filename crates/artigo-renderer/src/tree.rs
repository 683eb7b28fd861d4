//! HTML output for decoded rich-text trees.

use std::fmt::Write;

use crate::node::Node;
use crate::options::LinkOptions;
use crate::util::escape_html;

/// Renders [`Node`] trees into HTML.
///
/// Output is a pure function of the nodes and link options: children are
/// concatenated in order without separators.
pub(crate) struct TreeRenderer<'a> {
    links: &'a LinkOptions,
}

impl<'a> TreeRenderer<'a> {
    pub(crate) fn new(links: &'a LinkOptions) -> Self {
        Self { links }
    }

    /// Render a sequence of sibling nodes.
    pub(crate) fn render(&self, nodes: &[Node]) -> String {
        let mut out = String::with_capacity(4096);
        self.render_into(nodes, &mut out);
        out
    }

    fn render_into(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            self.render_node(node, out);
        }
    }

    fn wrap(&self, tag: &str, children: &[Node], out: &mut String) {
        write!(out, "<{tag}>").unwrap();
        self.render_into(children, out);
        write!(out, "</{tag}>").unwrap();
    }

    fn render_node(&self, node: &Node, out: &mut String) {
        match node {
            Node::Text { text, format } => {
                let tags: Vec<&str> = format.tags().collect();
                for tag in &tags {
                    write!(out, "<{tag}>").unwrap();
                }
                out.push_str(&escape_html(text));
                for tag in tags.iter().rev() {
                    write!(out, "</{tag}>").unwrap();
                }
            }
            Node::Paragraph(children) => self.wrap("p", children, out),
            Node::Heading { tag, children } => self.wrap(tag, children, out),
            Node::List { ordered, children } => {
                self.wrap(if *ordered { "ol" } else { "ul" }, children, out);
            }
            Node::ListItem(children) => self.wrap("li", children, out),
            Node::Link {
                url,
                target,
                rel,
                children,
            } => {
                write!(out, r#"<a href="{}""#, escape_html(url)).unwrap();
                if let Some(target) = target {
                    write!(out, r#" target="{}""#, escape_html(target)).unwrap();
                }
                let rel = rel.as_deref().unwrap_or(&self.links.default_rel);
                write!(out, r#" rel="{}">"#, escape_html(rel)).unwrap();
                self.render_into(children, out);
                out.push_str("</a>");
            }
            Node::Quote(children) => self.wrap("blockquote", children, out),
            Node::Code(children) => {
                out.push_str("<pre><code>");
                self.render_into(children, out);
                out.push_str("</code></pre>");
            }
            Node::LineBreak => out.push_str("<br>"),
            Node::HorizontalRule => out.push_str("<hr>"),
            Node::Html(html) => out.push_str(html),
            Node::Unknown(children) => self.render_into(children, out),
        }
    }
}
