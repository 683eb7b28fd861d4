//! Line-oriented markdown converter.
//!
//! Handles the subset of markdown CMS authors type into plain text fields:
//! `#`–`###` headings, `**bold**`, `*italic*`, `[label](url)` links, `> `
//! quotes, `- ` and `1. ` lists, and blank-line separated blocks.
//!
//! Each line is converted on its own, with a small list state machine
//! grouping consecutive items. Converted lines are then collected into
//! blank-line separated blocks: a block whose text starts with `<` is kept
//! as-is, anything else becomes a `<p>` with `<br>` between its lines.
//! Inline substitutions run bold before italic so `**` pairs are consumed
//! first.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::options::LinkOptions;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Heading markers, longest first.
const HEADINGS: [(&str, &str); 3] = [("### ", "h3"), ("## ", "h2"), ("# ", "h1")];

/// Scanner state for list grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListState {
    Normal,
    UnorderedList,
    OrderedList,
}

/// Converts markdown text to HTML.
pub(crate) struct BasicMarkdown<'a> {
    links: &'a LinkOptions,
}

impl<'a> BasicMarkdown<'a> {
    pub(crate) fn new(links: &'a LinkOptions) -> Self {
        Self { links }
    }

    /// Convert a markdown string. Blocks are separated by newlines.
    pub(crate) fn render(&self, markdown: &str) -> String {
        let mut scanner = Scanner {
            inline: self,
            state: ListState::Normal,
            list: String::new(),
            block: Vec::new(),
            blocks: Vec::new(),
        };
        for line in markdown.lines() {
            scanner.line(line);
        }
        scanner.finish()
    }

    /// Apply inline substitutions: bold, then italic, then links.
    fn inline(&self, text: &str) -> String {
        let text = BOLD.replace_all(text, "<strong>$1</strong>");
        let text = ITALIC.replace_all(&text, "<em>$1</em>");
        LINK.replace_all(&text, |caps: &Captures| self.link(&caps[1], &caps[2]))
            .into_owned()
    }

    fn link(&self, label: &str, url: &str) -> String {
        let target = &self.links.markdown_target;
        let rel = &self.links.default_rel;
        if target.is_empty() {
            format!(r#"<a href="{url}" rel="{rel}">{label}</a>"#)
        } else {
            format!(r#"<a href="{url}" target="{target}" rel="{rel}">{label}</a>"#)
        }
    }
}

struct Scanner<'r, 'a> {
    inline: &'r BasicMarkdown<'a>,
    state: ListState,
    /// `<li>` items of the open list.
    list: String,
    /// Converted lines of the open blank-line block.
    block: Vec<String>,
    blocks: Vec<String>,
}

impl Scanner<'_, '_> {
    fn line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.close_block();
            return;
        }

        if let Some((tag, content)) = HEADINGS
            .iter()
            .find_map(|&(marker, tag)| line.strip_prefix(marker).map(|rest| (tag, rest)))
        {
            let html = format!("<{tag}>{}</{tag}>", self.inline.inline(content));
            self.push_line(html);
        } else if let Some(content) = line.strip_prefix("> ") {
            let html = format!("<blockquote>{}</blockquote>", self.inline.inline(content));
            self.push_line(html);
        } else if let Some(content) = line.strip_prefix("- ") {
            self.list_item(ListState::UnorderedList, content);
        } else if let Some(content) = strip_ordered_marker(line) {
            self.list_item(ListState::OrderedList, content);
        } else {
            let html = self.inline.inline(line);
            self.push_line(html);
        }
    }

    /// Add a converted line to the open block, closing any open list first.
    fn push_line(&mut self, html: String) {
        self.close_list();
        self.block.push(html);
    }

    fn list_item(&mut self, kind: ListState, content: &str) {
        if self.state != kind {
            self.close_list();
            self.state = kind;
        }
        self.list.push_str("<li>");
        self.list.push_str(&self.inline.inline(content));
        self.list.push_str("</li>");
    }

    fn close_list(&mut self) {
        let tag = match self.state {
            ListState::Normal => return,
            ListState::UnorderedList => "ul",
            ListState::OrderedList => "ol",
        };
        let items = std::mem::take(&mut self.list);
        self.block.push(format!("<{tag}>{items}</{tag}>"));
        self.state = ListState::Normal;
    }

    fn close_block(&mut self) {
        self.close_list();
        if self.block.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.block);
        if lines[0].starts_with('<') {
            self.blocks.push(lines.join("\n"));
        } else {
            self.blocks.push(format!("<p>{}</p>", lines.join("<br>")));
        }
    }

    fn finish(mut self) -> String {
        self.close_block();
        self.blocks.join("\n")
    }
}

/// Strip a `1. ` style marker, returning the item content.
fn strip_ordered_marker(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}
