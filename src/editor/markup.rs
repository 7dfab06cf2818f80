//! HTML-shaped serialization of the document model
//!
//! Only the subset the editor produces is understood when parsing. Unknown
//! tags are dropped but their text is kept.

use super::document::{Block, BlockKind, Marks, StyledChar};
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

/// Length of the text left after removing every tag and trimming.
///
/// Counts characters. Entities are not decoded. This is a length heuristic for
/// validation, not a sanitizer.
pub fn text_length(markup: &str) -> usize {
    strip_tags(markup).trim().chars().count()
}

/// Remove everything that looks like a tag
pub fn strip_tags(markup: &str) -> String {
    TAG_RE.replace_all(markup, "").into_owned()
}

fn escape_into(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(ch),
    }
}

fn open_marks(out: &mut String, marks: Marks) {
    if marks.bold {
        out.push_str("<strong>");
    }
    if marks.italic {
        out.push_str("<em>");
    }
    if marks.strike {
        out.push_str("<s>");
    }
}

fn close_marks(out: &mut String, marks: Marks) {
    if marks.strike {
        out.push_str("</s>");
    }
    if marks.italic {
        out.push_str("</em>");
    }
    if marks.bold {
        out.push_str("</strong>");
    }
}

fn serialize_inline(out: &mut String, chars: &[StyledChar]) {
    let mut current: Option<Marks> = None;
    for c in chars {
        if current != Some(c.marks) {
            if let Some(prev) = current {
                close_marks(out, prev);
            }
            open_marks(out, c.marks);
            current = Some(c.marks);
        }
        escape_into(out, c.ch);
    }
    if let Some(prev) = current {
        close_marks(out, prev);
    }
}

fn list_tag(kind: BlockKind) -> Option<&'static str> {
    match kind {
        BlockKind::BulletItem => Some("ul"),
        BlockKind::OrderedItem => Some("ol"),
        _ => None,
    }
}

/// Serialize blocks to markup. An empty document is `<p></p>`.
pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = list_tag(block.kind);
        if open_list != list {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{tag}>"));
            }
            if let Some(tag) = list {
                out.push_str(&format!("<{tag}>"));
            }
            open_list = list;
        }
        match block.kind {
            BlockKind::Paragraph => {
                out.push_str("<p>");
                serialize_inline(&mut out, &block.chars);
                out.push_str("</p>");
            }
            BlockKind::Heading(level) => {
                out.push_str(&format!("<h{level}>"));
                serialize_inline(&mut out, &block.chars);
                out.push_str(&format!("</h{level}>"));
            }
            BlockKind::BulletItem | BlockKind::OrderedItem => {
                out.push_str("<li><p>");
                serialize_inline(&mut out, &block.chars);
                out.push_str("</p></li>");
            }
        }
    }
    if let Some(tag) = open_list {
        out.push_str(&format!("</{tag}>"));
    }
    if out.is_empty() {
        out.push_str("<p></p>");
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Incremental builder used while walking the token stream
#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: Option<Block>,
    lists: Vec<BlockKind>,
    bold: u32,
    italic: u32,
    strike: u32,
}

impl Builder {
    fn marks(&self) -> Marks {
        Marks {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strike: self.strike > 0,
        }
    }

    fn item_kind(&self) -> Option<BlockKind> {
        self.lists.last().copied()
    }

    fn finish_block(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    fn start_block(&mut self, kind: BlockKind) {
        self.finish_block();
        self.current = Some(Block::new(kind));
    }

    fn text(&mut self, raw: &str) {
        let text = decode_entities(raw);
        if self.current.is_none() {
            if text.trim().is_empty() {
                return;
            }
            let kind = self.item_kind().unwrap_or(BlockKind::Paragraph);
            self.current = Some(Block::new(kind));
        }
        let marks = self.marks();
        if let Some(block) = self.current.as_mut() {
            block
                .chars
                .extend(text.chars().map(|ch| StyledChar { ch, marks }));
        }
    }

    fn open(&mut self, tag: &str) {
        match tag {
            "p" => match (self.item_kind(), self.current.as_ref()) {
                // <li><p>: the list item block is already open
                (Some(kind), Some(block)) if block.kind == kind && block.is_empty() => {}
                (Some(kind), _) => self.start_block(kind),
                (None, _) => self.start_block(BlockKind::Paragraph),
            },
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse().unwrap_or(1);
                self.start_block(BlockKind::Heading(level));
            }
            "ul" => {
                self.finish_block();
                self.lists.push(BlockKind::BulletItem);
            }
            "ol" => {
                self.finish_block();
                self.lists.push(BlockKind::OrderedItem);
            }
            "li" => {
                let kind = self.item_kind().unwrap_or(BlockKind::BulletItem);
                self.start_block(kind);
            }
            "strong" | "b" => self.bold += 1,
            "em" | "i" => self.italic += 1,
            "s" | "strike" | "del" => self.strike += 1,
            "br" => self.text(" "),
            _ => {}
        }
    }

    fn close(&mut self, tag: &str) {
        match tag {
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" => self.finish_block(),
            "ul" | "ol" => {
                self.finish_block();
                self.lists.pop();
            }
            "strong" | "b" => self.bold = self.bold.saturating_sub(1),
            "em" | "i" => self.italic = self.italic.saturating_sub(1),
            "s" | "strike" | "del" => self.strike = self.strike.saturating_sub(1),
            _ => {}
        }
    }
}

/// Parse markup into blocks. Never fails; unexpected input degrades to text.
pub fn parse(markup: &str) -> Vec<Block> {
    let mut builder = Builder::default();
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(markup) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((last, last));
        if whole.0 > last {
            builder.text(&markup[last..whole.0]);
        }
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let tag = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        if closing {
            builder.close(&tag);
        } else {
            builder.open(&tag);
        }
        last = whole.1;
    }
    if last < markup.len() {
        builder.text(&markup[last..]);
    }
    builder.finish_block();
    builder.blocks
}
