//! Typed rich-text nodes and their decoding from editor JSON.
//!
//! The editor stores documents as a JSON tree where every node carries a
//! `type` string. Decoding maps that open set onto [`Node`], keeping an
//! explicit [`Node::Unknown`] arm for types the renderer does not know.

use serde::Deserialize;
use serde::de::{Expected, Unexpected};
use serde_json::Value;

use crate::error::RenderError;

/// Inline style bitmask carried by text nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextFormat(u32);

impl TextFormat {
    /// No styling.
    pub const NONE: Self = Self(0);
    /// `<strong>`
    pub const BOLD: Self = Self(1);
    /// `<em>`
    pub const ITALIC: Self = Self(1 << 1);
    /// `<u>`
    pub const UNDERLINE: Self = Self(1 << 2);
    /// `<s>`
    pub const STRIKETHROUGH: Self = Self(1 << 3);
    /// `<code>`
    pub const CODE: Self = Self(1 << 4);
    /// `<sub>`
    pub const SUBSCRIPT: Self = Self(1 << 5);
    /// `<sup>`
    pub const SUPERSCRIPT: Self = Self(1 << 6);

    /// Wrapping order, outermost first.
    pub(crate) const TAGS: [(Self, &'static str); 7] = [
        (Self::BOLD, "strong"),
        (Self::ITALIC, "em"),
        (Self::UNDERLINE, "u"),
        (Self::STRIKETHROUGH, "s"),
        (Self::CODE, "code"),
        (Self::SUBSCRIPT, "sub"),
        (Self::SUPERSCRIPT, "sup"),
    ];

    /// Create a format from raw bits. Unknown bits are kept but never rendered.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Iterate over the HTML tags for the set bits, outermost first.
    pub fn tags(self) -> impl Iterator<Item = &'static str> {
        Self::TAGS
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, tag)| tag)
    }
}

impl std::ops::BitOr for TextFormat {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A decoded rich-text node.
///
/// Container variants own their children in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Run of text with inline styling.
    Text {
        /// Unescaped text content.
        text: String,
        /// Inline styles.
        format: TextFormat,
    },
    /// `<p>`
    Paragraph(Vec<Node>),
    /// Heading rendered with `tag` as the element name (e.g. `h2`).
    Heading {
        /// Element name, passed through as authored.
        tag: String,
        /// Inline content.
        children: Vec<Node>,
    },
    /// `<ol>` when `ordered`, otherwise `<ul>`.
    List {
        /// Numbered list.
        ordered: bool,
        /// List items.
        children: Vec<Node>,
    },
    /// `<li>`
    ListItem(Vec<Node>),
    /// Hyperlink.
    Link {
        /// Destination, `#` when the node has none.
        url: String,
        /// Browsing context, if any.
        target: Option<String>,
        /// Link relation. The renderer substitutes its default when absent.
        rel: Option<String>,
        /// Link text.
        children: Vec<Node>,
    },
    /// `<blockquote>`
    Quote(Vec<Node>),
    /// `<pre><code>`
    Code(Vec<Node>),
    /// `<br>`
    LineBreak,
    /// `<hr>`
    HorizontalRule,
    /// Trusted markup emitted verbatim.
    Html(String),
    /// Node of an unrecognised type; its children render transparently.
    Unknown(Vec<Node>),
}

/// Node as it appears in editor JSON, without its `children`.
///
/// Unknown keys are ignored. Children are decoded separately by
/// [`NodeDecoder`] so nesting depth is checked before descending.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
    /// Bitmask on text nodes, alignment string on element nodes.
    format: Option<Value>,
    tag: Option<String>,
    list_type: Option<String>,
    url: Option<String>,
    target: Option<String>,
    rel: Option<String>,
    html: Option<String>,
    /// Link settings as stored by the CMS link feature.
    fields: Option<Value>,
}

impl RawNode {
    fn format(&self) -> TextFormat {
        self.format
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|bits| u32::try_from(bits).ok())
            .map_or(TextFormat::NONE, TextFormat::from_bits)
    }

    fn field_str(&self, key: &str) -> Option<String> {
        self.fields
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }

    fn opens_new_tab(&self) -> bool {
        self.fields
            .as_ref()
            .and_then(|fields| fields.get("newTab"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Converts editor JSON into [`Node`]s.
///
/// Each level is decoded only after its depth has been checked, so a tree
/// nested past `max_depth` fails with [`RenderError::TooDeep`] without the
/// decoder recursing any further.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeDecoder {
    max_depth: usize,
    raw_html_nodes: bool,
}

impl NodeDecoder {
    pub(crate) fn new(max_depth: usize, raw_html_nodes: bool) -> Self {
        Self {
            max_depth,
            raw_html_nodes,
        }
    }

    /// Decode a `children` array.
    pub(crate) fn decode_children(&self, children: &Value) -> Result<Vec<Node>, RenderError> {
        self.convert_all(children, 1)
    }

    fn convert_all(&self, children: &Value, depth: usize) -> Result<Vec<Node>, RenderError> {
        if depth > self.max_depth {
            return Err(RenderError::TooDeep {
                limit: self.max_depth,
            });
        }
        let Value::Array(items) = children else {
            return Err(invalid_type(children, &"an array of nodes").into());
        };
        items.iter().map(|item| self.convert(item, depth)).collect()
    }

    fn convert(&self, value: &Value, depth: usize) -> Result<Node, RenderError> {
        let mut raw = RawNode::deserialize(value)?;
        let children = match value.get("children") {
            None | Some(Value::Null) => Vec::new(),
            Some(children) => self.convert_all(children, depth + 1)?,
        };
        let kind = raw.kind.as_deref().unwrap_or_default();

        let node = match kind {
            // Tabs and highlighted code tokens are text runs in the editor
            "text" | "tab" | "code-highlight" => Node::Text {
                format: raw.format(),
                text: raw.text.take().unwrap_or_default(),
            },
            "paragraph" => Node::Paragraph(children),
            "heading" => Node::Heading {
                tag: raw.tag.take().unwrap_or_else(|| "h2".to_owned()),
                children,
            },
            "list" => Node::List {
                ordered: raw.list_type.as_deref() == Some("number"),
                children,
            },
            "listitem" => Node::ListItem(children),
            "link" | "autolink" => {
                let target = non_empty(raw.target.take())
                    .or_else(|| raw.opens_new_tab().then(|| "_blank".to_owned()));
                Node::Link {
                    url: non_empty(raw.url.take())
                        .or_else(|| raw.field_str("url"))
                        .unwrap_or_else(|| "#".to_owned()),
                    target,
                    rel: non_empty(raw.rel.take()),
                    children,
                }
            }
            "quote" => Node::Quote(children),
            "code" => Node::Code(children),
            "linebreak" => Node::LineBreak,
            "horizontalrule" => Node::HorizontalRule,
            "html" if self.raw_html_nodes => Node::Html(raw.html.take().unwrap_or_default()),
            _ => Node::Unknown(children),
        };
        Ok(node)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn invalid_type(value: &Value, expected: &dyn Expected) -> serde_json::Error {
    let unexpected = match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    };
    serde::de::Error::invalid_type(unexpected, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decode(children: &Value) -> Vec<Node> {
        NodeDecoder::new(128, true).decode_children(children).unwrap()
    }

    fn text(s: &str) -> Node {
        Node::Text {
            text: s.to_owned(),
            format: TextFormat::NONE,
        }
    }

    #[test]
    fn test_format_tags_outermost_first() {
        let format = TextFormat::from_bits(1 | 2 | 16);
        assert_eq!(
            format.tags().collect::<Vec<_>>(),
            vec!["strong", "em", "code"]
        );
    }

    #[test]
    fn test_format_contains() {
        let format = TextFormat::BOLD | TextFormat::UNDERLINE;
        assert!(format.contains(TextFormat::BOLD));
        assert!(format.contains(TextFormat::UNDERLINE));
        assert!(!format.contains(TextFormat::ITALIC));
        assert_eq!(format.bits(), 5);
    }

    #[test]
    fn test_format_unknown_bits_ignored() {
        let format = TextFormat::from_bits(128);
        assert_eq!(format.tags().count(), 0);
    }

    #[test]
    fn test_decode_paragraph() {
        let nodes = decode(&json!([
            {"type": "paragraph", "children": [{"type": "text", "text": "hi"}]}
        ]));
        assert_eq!(nodes, vec![Node::Paragraph(vec![text("hi")])]);
    }

    #[test]
    fn test_decode_missing_children_is_empty() {
        let nodes = decode(&json!([{"type": "paragraph"}, {"type": "quote", "children": null}]));
        assert_eq!(nodes, vec![Node::Paragraph(vec![]), Node::Quote(vec![])]);
    }

    #[test]
    fn test_decode_text_defaults() {
        let nodes = decode(&json!([{"type": "text"}]));
        assert_eq!(nodes, vec![text("")]);
    }

    #[test]
    fn test_decode_element_format_string_ignored() {
        let nodes = decode(&json!([
            {"type": "text", "text": "x", "format": "center"}
        ]));
        assert_eq!(nodes, vec![text("x")]);
    }

    #[test]
    fn test_decode_heading_default_tag() {
        let nodes = decode(&json!([{"type": "heading", "children": []}]));
        assert_eq!(
            nodes,
            vec![Node::Heading {
                tag: "h2".to_owned(),
                children: vec![]
            }]
        );
    }

    #[test]
    fn test_decode_list_type() {
        let nodes = decode(&json!([
            {"type": "list", "listType": "number"},
            {"type": "list", "listType": "bullet"},
            {"type": "list"}
        ]));
        let ordered: Vec<bool> = nodes
            .iter()
            .map(|n| matches!(n, Node::List { ordered: true, .. }))
            .collect();
        assert_eq!(ordered, vec![true, false, false]);
    }

    #[test]
    fn test_decode_link_defaults() {
        let nodes = decode(&json!([{"type": "link", "target": null, "rel": ""}]));
        assert_eq!(
            nodes,
            vec![Node::Link {
                url: "#".to_owned(),
                target: None,
                rel: None,
                children: vec![]
            }]
        );
    }

    #[test]
    fn test_decode_link_from_fields() {
        let nodes = decode(&json!([{
            "type": "link",
            "fields": {"url": "https://example.com", "newTab": true, "linkType": "custom"}
        }]));
        assert_eq!(
            nodes,
            vec![Node::Link {
                url: "https://example.com".to_owned(),
                target: Some("_blank".to_owned()),
                rel: None,
                children: vec![]
            }]
        );
    }

    #[test]
    fn test_decode_autolink() {
        let nodes = decode(&json!([{"type": "autolink", "url": "https://x"}]));
        assert!(matches!(&nodes[0], Node::Link { url, .. } if url == "https://x"));
    }

    #[test]
    fn test_decode_code_highlight_as_text() {
        let nodes = decode(&json!([
            {"type": "code", "children": [{"type": "code-highlight", "text": "let x"}]}
        ]));
        assert_eq!(nodes, vec![Node::Code(vec![text("let x")])]);
    }

    #[test]
    fn test_decode_html_node() {
        let nodes = decode(&json!([{"type": "html", "html": "<iframe></iframe>"}]));
        assert_eq!(nodes, vec![Node::Html("<iframe></iframe>".to_owned())]);
    }

    #[test]
    fn test_decode_html_node_disabled() {
        let nodes = NodeDecoder::new(128, false)
            .decode_children(&json!([{"type": "html", "html": "<b>x</b>"}]))
            .unwrap();
        assert_eq!(nodes, vec![Node::Unknown(vec![])]);
    }

    #[test]
    fn test_decode_unknown_keeps_children() {
        let nodes = decode(&json!([
            {"type": "upload", "value": {"id": 1}, "children": [{"type": "text", "text": "a"}]}
        ]));
        assert_eq!(nodes, vec![Node::Unknown(vec![text("a")])]);
    }

    #[test]
    fn test_decode_non_object_node_fails() {
        let result = NodeDecoder::new(128, true).decode_children(&json!(["oops"]));
        assert!(matches!(result, Err(RenderError::Malformed(_))));
    }

    #[test]
    fn test_decode_non_array_children_fails() {
        let result = NodeDecoder::new(128, true)
            .decode_children(&json!([{"type": "paragraph", "children": "oops"}]));
        assert!(matches!(result, Err(RenderError::Malformed(_))));
    }

    #[test]
    fn test_decode_depth_limit() {
        let tree = json!([{"type": "quote", "children": [
            {"type": "quote", "children": [{"type": "quote"}]}
        ]}]);
        assert!(NodeDecoder::new(3, true).decode_children(&tree).is_ok());
        let result = NodeDecoder::new(2, true).decode_children(&tree);
        assert!(matches!(result, Err(RenderError::TooDeep { limit: 2 })));
    }

    #[test]
    fn test_decode_depth_checked_before_descending() {
        let mut tree = json!([{"type": "text", "text": "x"}]);
        for _ in 0..500 {
            tree = json!([{"type": "quote", "children": tree}]);
        }
        let result = NodeDecoder::new(128, true).decode_children(&tree);
        assert!(matches!(result, Err(RenderError::TooDeep { limit: 128 })));
    }

    #[test]
    fn test_decode_top_level_not_array_fails() {
        let result = NodeDecoder::new(128, true).decode_children(&json!({"type": "text"}));
        let Err(RenderError::Malformed(err)) = result else {
            panic!("expected a malformed error");
        };
        assert!(err.to_string().contains("an array of nodes"));
    }
}
