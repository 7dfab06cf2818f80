//! Rich-text body rendering: toolbar and document view

use super::components::{render_toggle_button, toggle_width};
use super::forms::field_block;
use crate::editor::{
    text_length, Block as DocBlock, BlockKind, Command, Document, Marks, Position, RichTextEditor,
};
use crate::platform::toolbar_hint;
use crate::state::MIN_BODY_LEN;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Draw the toolbar; each toggle is highlighted while its state is active
pub fn draw_toolbar(frame: &mut Frame, area: Rect, editor: &RichTextEditor) {
    let glyphs: Vec<String> = Command::TOOLBAR.iter().map(|c| c.glyph()).collect();
    let mut constraints: Vec<Constraint> = glyphs
        .iter()
        .map(|g| Constraint::Length(toggle_width(g)))
        .collect();
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (idx, command) in Command::TOOLBAR.iter().enumerate() {
        render_toggle_button(
            frame,
            chunks[idx],
            &glyphs[idx],
            editor.is_active(*command),
            editor.is_ready(),
        );
    }

    let hints: Vec<String> = Command::TOOLBAR
        .iter()
        .map(|c| format!("{} {}", c.glyph(), toolbar_hint(*c)))
        .collect();
    let legend = Paragraph::new(Line::from(Span::styled(
        hints.join("  "),
        Style::default().fg(Color::DarkGray),
    )))
    .wrap(Wrap { trim: true });
    let legend_area = chunks[Command::TOOLBAR.len()];
    frame.render_widget(
        legend,
        Rect {
            y: legend_area.y + 1,
            height: legend_area.height.saturating_sub(1),
            ..legend_area
        },
    );
}

/// Draw the document with marks, list prefixes, selection and cursor
pub fn draw_body(
    frame: &mut Frame,
    area: Rect,
    editor: &RichTextEditor,
    is_active: bool,
    error: Option<&str>,
) {
    let block = field_block("Body", is_active, error).title(
        Line::from(Span::styled(
            length_hint(editor),
            Style::default().fg(Color::DarkGray),
        ))
        .right_aligned(),
    );
    let content = match editor.document() {
        Some(doc) => Paragraph::new(document_lines(doc, is_active)),
        None => Paragraph::new("Loading editor…").style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

/// Minimum and current plain-text length of the body
fn length_hint(editor: &RichTextEditor) -> String {
    format!(
        " Minimum {MIN_BODY_LEN} characters. Current: {} ",
        text_length(&editor.serialized())
    )
}

fn mark_style(marks: Marks, base: Style) -> Style {
    let mut style = base;
    if marks.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if marks.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if marks.strike {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    style
}

fn block_prefix(kind: BlockKind, ordinal: usize) -> String {
    match kind {
        BlockKind::Paragraph => String::new(),
        BlockKind::Heading(level) => format!("{} ", "#".repeat(level as usize)),
        BlockKind::BulletItem => "• ".to_string(),
        BlockKind::OrderedItem => format!("{ordinal}. "),
    }
}

fn document_lines(doc: &Document, show_cursor: bool) -> Vec<Line<'static>> {
    let selection = doc.selection();
    let (from, to) = (selection.from(), selection.to());
    let cursor_style = Style::default().fg(Color::Cyan);
    let mut ordinal = 0;

    doc.blocks()
        .iter()
        .enumerate()
        .map(|(b, block)| {
            ordinal = match block.kind {
                BlockKind::OrderedItem => ordinal + 1,
                _ => 0,
            };
            let base = match block.kind {
                BlockKind::Heading(_) => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                _ => Style::default(),
            };
            let mut spans = vec![Span::styled(
                block_prefix(block.kind, ordinal),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(block_spans(block, b, from, to, base));
            if show_cursor && selection.head.block == b {
                let at = selection.head.offset.min(block.len());
                // The cursor glyph goes after the prefix and `at` characters
                spans.insert(at + 1, Span::styled("▌", cursor_style));
            }
            Line::from(spans)
        })
        .collect()
}

/// One span per character so the cursor can be inserted between them
fn block_spans(
    block: &DocBlock,
    b: usize,
    from: Position,
    to: Position,
    base: Style,
) -> Vec<Span<'static>> {
    block
        .chars
        .iter()
        .enumerate()
        .map(|(offset, c)| {
            let pos = Position::new(b, offset);
            let mut style = mark_style(c.marks, base);
            if from != to && pos >= from && pos < to {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(c.ch.to_string(), style)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::parse;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_length_hint_counts_text_not_markup() {
        let mut editor = RichTextEditor::new("<p><strong>Hello</strong> there</p>", |_: &str| {});
        assert_eq!(
            length_hint(&editor),
            " Minimum 20 characters. Current: 11 "
        );
        editor.initialize();
        editor.insert_text("!");
        assert_eq!(
            length_hint(&editor),
            " Minimum 20 characters. Current: 12 "
        );
    }

    #[test]
    fn test_ordered_items_are_numbered() {
        let doc = Document::from_blocks(parse("<ol><li><p>a</p></li><li><p>b</p></li></ol>"));
        let lines = document_lines(&doc, false);
        assert_eq!(line_text(&lines[0]), "1. a");
        assert_eq!(line_text(&lines[1]), "2. b");
    }

    #[test]
    fn test_cursor_is_drawn_at_head() {
        let mut doc = Document::from_blocks(parse("<h2>Hi</h2>"));
        doc.move_to_end();
        let lines = document_lines(&doc, true);
        assert_eq!(line_text(&lines[0]), "## Hi▌");
    }

    #[test]
    fn test_bold_chars_are_styled() {
        let doc = Document::from_blocks(parse("<p><strong>x</strong>y</p>"));
        let lines = document_lines(&doc, false);
        assert!(lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[0].spans[2].style.add_modifier.contains(Modifier::BOLD));
    }
}
