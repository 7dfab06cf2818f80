//! # Rich-text document model
//!
//! A document is a non-empty list of blocks. Each block carries a kind
//! (paragraph, heading, list item) and a sequence of characters, each with
//! its own inline marks. Consecutive list items of the same kind form one
//! list when serialized.
//!
//! Positions are `(block, offset)` pairs where `offset` counts characters,
//! not bytes.

/// Inline formatting mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Strike,
}

/// Set of inline marks on one character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Strike => self.strike,
        }
    }

    pub fn with(mut self, mark: Mark, on: bool) -> Self {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Strike => self.strike = on,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledChar {
    pub ch: char,
    pub marks: Marks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading(u8),
    BulletItem,
    OrderedItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub kind: BlockKind,
    pub chars: Vec<StyledChar>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            chars: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.ch).collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Commands exposed by the editor toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleBold,
    ToggleItalic,
    ToggleStrike,
    ToggleHeading(u8),
    ToggleBulletList,
    ToggleOrderedList,
}

impl Command {
    /// Toolbar order
    pub const TOOLBAR: [Command; 6] = [
        Command::ToggleBold,
        Command::ToggleItalic,
        Command::ToggleStrike,
        Command::ToggleHeading(2),
        Command::ToggleBulletList,
        Command::ToggleOrderedList,
    ];

    pub fn glyph(&self) -> String {
        match self {
            Self::ToggleBold => "B".to_string(),
            Self::ToggleItalic => "I".to_string(),
            Self::ToggleStrike => "S".to_string(),
            Self::ToggleHeading(level) => format!("H{level}"),
            Self::ToggleBulletList => "•".to_string(),
            Self::ToggleOrderedList => "1.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor is where the selection started, head is where the cursor is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn cursor(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn from(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> Position {
        self.anchor.max(self.head)
    }
}

/// Editable document with a selection and pending marks for the next insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
    selection: Selection,
    stored_marks: Option<Marks>,
}

impl Default for Document {
    fn default() -> Self {
        Self::from_blocks(Vec::new())
    }
}

impl Document {
    /// Build a document; an empty block list becomes a single empty paragraph
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::new(BlockKind::Paragraph));
        }
        Self {
            blocks,
            selection: Selection::default(),
            stored_marks: None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Plain text of the whole document, blocks separated by newlines
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn clamp(&self, pos: Position) -> Position {
        let block = pos.block.min(self.blocks.len() - 1);
        let offset = pos.offset.min(self.blocks[block].len());
        Position::new(block, offset)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::range(self.clamp(selection.anchor), self.clamp(selection.head));
        self.stored_marks = None;
    }

    pub fn select_all(&mut self) {
        let last = self.blocks.len() - 1;
        self.set_selection(Selection::range(
            Position::new(0, 0),
            Position::new(last, self.blocks[last].len()),
        ));
    }

    fn end_position(&self) -> Position {
        let last = self.blocks.len() - 1;
        Position::new(last, self.blocks[last].len())
    }

    /// Place a collapsed cursor at the end of the document
    pub fn move_to_end(&mut self) {
        self.set_selection(Selection::cursor(self.end_position()));
    }

    pub fn move_left(&mut self) {
        let pos = self.selection.head;
        let next = if pos.offset > 0 {
            Position::new(pos.block, pos.offset - 1)
        } else if pos.block > 0 {
            Position::new(pos.block - 1, self.blocks[pos.block - 1].len())
        } else {
            pos
        };
        self.set_selection(Selection::cursor(next));
    }

    pub fn move_right(&mut self) {
        let pos = self.selection.head;
        let next = if pos.offset < self.blocks[pos.block].len() {
            Position::new(pos.block, pos.offset + 1)
        } else if pos.block + 1 < self.blocks.len() {
            Position::new(pos.block + 1, 0)
        } else {
            pos
        };
        self.set_selection(Selection::cursor(next));
    }

    pub fn move_up(&mut self) {
        let pos = self.selection.head;
        if pos.block > 0 {
            self.set_selection(Selection::cursor(Position::new(pos.block - 1, pos.offset)));
        }
    }

    pub fn move_down(&mut self) {
        let pos = self.selection.head;
        self.set_selection(Selection::cursor(Position::new(pos.block + 1, pos.offset)));
    }

    /// Extend the selection one character to the left or right
    pub fn extend_selection(&mut self, forward: bool) {
        let anchor = self.selection.anchor;
        if forward {
            self.move_right();
        } else {
            self.move_left();
        }
        let head = self.selection.head;
        self.selection = Selection::range(anchor, head);
    }

    /// Characters in `[from, to)`, visited per block
    fn for_each_in_range(&self, mut f: impl FnMut(&StyledChar)) {
        let (from, to) = (self.selection.from(), self.selection.to());
        for b in from.block..=to.block {
            let block = &self.blocks[b];
            let start = if b == from.block { from.offset } else { 0 };
            let end = if b == to.block { to.offset } else { block.len() };
            block.chars[start..end].iter().for_each(&mut f);
        }
    }

    /// Marks that apply at a collapsed cursor
    fn marks_at_cursor(&self) -> Marks {
        if let Some(stored) = self.stored_marks {
            return stored;
        }
        let pos = self.selection.head;
        let block = &self.blocks[pos.block];
        if pos.offset > 0 {
            block.chars[pos.offset - 1].marks
        } else {
            block.chars.first().map(|c| c.marks).unwrap_or_default()
        }
    }

    /// Whether `mark` covers the whole selection (or applies at the cursor)
    pub fn mark_active(&self, mark: Mark) -> bool {
        if self.selection.is_collapsed() {
            return self.marks_at_cursor().has(mark);
        }
        let mut any = false;
        let mut all = true;
        self.for_each_in_range(|c| {
            any = true;
            all &= c.marks.has(mark);
        });
        any && all
    }

    fn selected_blocks(&self) -> std::ops::RangeInclusive<usize> {
        self.selection.from().block..=self.selection.to().block
    }

    /// Whether every selected block has the given kind
    pub fn block_active(&self, kind: BlockKind) -> bool {
        self.selected_blocks().all(|b| self.blocks[b].kind == kind)
    }

    pub fn is_active(&self, command: Command) -> bool {
        match command {
            Command::ToggleBold => self.mark_active(Mark::Bold),
            Command::ToggleItalic => self.mark_active(Mark::Italic),
            Command::ToggleStrike => self.mark_active(Mark::Strike),
            Command::ToggleHeading(level) => self.block_active(BlockKind::Heading(level)),
            Command::ToggleBulletList => self.block_active(BlockKind::BulletItem),
            Command::ToggleOrderedList => self.block_active(BlockKind::OrderedItem),
        }
    }

    /// Apply a toolbar command. Returns true if the document content changed.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::ToggleBold => self.toggle_mark(Mark::Bold),
            Command::ToggleItalic => self.toggle_mark(Mark::Italic),
            Command::ToggleStrike => self.toggle_mark(Mark::Strike),
            Command::ToggleHeading(level) => self.toggle_block(BlockKind::Heading(level.clamp(1, 6))),
            Command::ToggleBulletList => self.toggle_block(BlockKind::BulletItem),
            Command::ToggleOrderedList => self.toggle_block(BlockKind::OrderedItem),
        }
    }

    fn toggle_mark(&mut self, mark: Mark) -> bool {
        let on = !self.mark_active(mark);
        if self.selection.is_collapsed() {
            self.stored_marks = Some(self.marks_at_cursor().with(mark, on));
            return false;
        }
        let (from, to) = (self.selection.from(), self.selection.to());
        for b in from.block..=to.block {
            let block = &mut self.blocks[b];
            let start = if b == from.block { from.offset } else { 0 };
            let end = if b == to.block { to.offset } else { block.len() };
            for c in &mut block.chars[start..end] {
                c.marks = c.marks.with(mark, on);
            }
        }
        true
    }

    fn toggle_block(&mut self, kind: BlockKind) -> bool {
        let target = if self.block_active(kind) {
            BlockKind::Paragraph
        } else {
            kind
        };
        let mut changed = false;
        for b in self.selected_blocks() {
            if self.blocks[b].kind != target {
                self.blocks[b].kind = target;
                changed = true;
            }
        }
        changed
    }

    /// Remove the selected range, leaving a collapsed cursor at its start
    fn delete_selection(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        let (from, to) = (self.selection.from(), self.selection.to());
        let tail: Vec<StyledChar> = self.blocks[to.block].chars[to.offset..].to_vec();
        self.blocks[from.block].chars.truncate(from.offset);
        self.blocks[from.block].chars.extend(tail);
        if to.block > from.block {
            self.blocks.drain(from.block + 1..=to.block);
        }
        self.selection = Selection::cursor(from);
        true
    }

    /// Insert text at the cursor, replacing any selection. `\n` splits blocks.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let marks = self.marks_at_cursor();
        self.delete_selection();
        for ch in text.chars() {
            if ch == '\n' {
                self.split_block();
                continue;
            }
            let pos = self.selection.head;
            self.blocks[pos.block]
                .chars
                .insert(pos.offset, StyledChar { ch, marks });
            self.selection = Selection::cursor(Position::new(pos.block, pos.offset + 1));
        }
        self.stored_marks = Some(marks);
        true
    }

    /// Split the current block at the cursor. List items continue the list,
    /// headings are followed by a paragraph.
    pub fn split_block(&mut self) -> bool {
        self.delete_selection();
        let pos = self.selection.head;
        let current = &mut self.blocks[pos.block];
        let rest = current.chars.split_off(pos.offset);
        let kind = match current.kind {
            BlockKind::Heading(_) => BlockKind::Paragraph,
            other => other,
        };
        self.blocks.insert(pos.block + 1, Block { kind, chars: rest });
        self.selection = Selection::cursor(Position::new(pos.block + 1, 0));
        true
    }

    /// Delete backwards. At the start of a list item or heading the block is
    /// turned back into a paragraph; at the start of a paragraph it is joined
    /// to the previous block.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let pos = self.selection.head;
        if pos.offset > 0 {
            self.blocks[pos.block].chars.remove(pos.offset - 1);
            self.selection = Selection::cursor(Position::new(pos.block, pos.offset - 1));
            return true;
        }
        if self.blocks[pos.block].kind != BlockKind::Paragraph {
            self.blocks[pos.block].kind = BlockKind::Paragraph;
            return true;
        }
        if pos.block == 0 {
            return false;
        }
        let removed = self.blocks.remove(pos.block);
        let prev = &mut self.blocks[pos.block - 1];
        let join_at = prev.len();
        prev.chars.extend(removed.chars);
        self.selection = Selection::cursor(Position::new(pos.block - 1, join_at));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(kind: BlockKind, text: &str) -> Block {
        Block {
            kind,
            chars: text
                .chars()
                .map(|ch| StyledChar {
                    ch,
                    marks: Marks::default(),
                })
                .collect(),
        }
    }

    fn doc(blocks: Vec<Block>) -> Document {
        Document::from_blocks(blocks)
    }

    mod marks {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_toggle_bold_on_range_then_off() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "hello world")]);
            d.set_selection(Selection::range(Position::new(0, 0), Position::new(0, 5)));
            let original = d.blocks().to_vec();

            assert!(d.apply(Command::ToggleBold));
            assert!(d.is_active(Command::ToggleBold));
            assert!(d.blocks()[0].chars[4].marks.bold);
            assert!(!d.blocks()[0].chars[5].marks.bold);

            assert!(d.apply(Command::ToggleBold));
            assert!(!d.is_active(Command::ToggleBold));
            assert_eq!(d.blocks(), original.as_slice());
        }

        #[test]
        fn test_partial_range_is_not_active() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "abcd")]);
            d.set_selection(Selection::range(Position::new(0, 0), Position::new(0, 2)));
            d.apply(Command::ToggleItalic);
            d.set_selection(Selection::range(Position::new(0, 0), Position::new(0, 4)));
            assert!(!d.is_active(Command::ToggleItalic));
        }

        #[test]
        fn test_collapsed_toggle_applies_to_next_insert() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "ab")]);
            d.move_to_end();
            assert!(!d.apply(Command::ToggleStrike));
            assert!(d.is_active(Command::ToggleStrike));
            d.insert_text("c");
            assert!(d.blocks()[0].chars[2].marks.strike);
            assert!(!d.blocks()[0].chars[1].marks.strike);
        }

        #[test]
        fn test_typing_continues_previous_marks() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "")]);
            d.apply(Command::ToggleBold);
            d.insert_text("bo");
            d.set_selection(Selection::cursor(Position::new(0, 2)));
            d.insert_text("ld");
            assert!(d.blocks()[0].chars.iter().all(|c| c.marks.bold));
        }
    }

    mod blocks {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_toggle_heading_twice_restores_paragraph() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "Title")]);
            assert!(d.apply(Command::ToggleHeading(2)));
            assert!(d.is_active(Command::ToggleHeading(2)));
            assert!(!d.is_active(Command::ToggleHeading(1)));
            assert!(d.apply(Command::ToggleHeading(2)));
            assert_eq!(d.blocks()[0].kind, BlockKind::Paragraph);
        }

        #[test]
        fn test_list_toggle_covers_selected_blocks() {
            let mut d = doc(vec![
                plain(BlockKind::Paragraph, "one"),
                plain(BlockKind::Paragraph, "two"),
                plain(BlockKind::Paragraph, "three"),
            ]);
            d.set_selection(Selection::range(Position::new(0, 1), Position::new(1, 1)));
            d.apply(Command::ToggleBulletList);
            let kinds: Vec<_> = d.blocks().iter().map(|b| b.kind).collect();
            assert_eq!(
                kinds,
                vec![BlockKind::BulletItem, BlockKind::BulletItem, BlockKind::Paragraph]
            );
        }

        #[test]
        fn test_switching_list_kind() {
            let mut d = doc(vec![plain(BlockKind::BulletItem, "item")]);
            d.apply(Command::ToggleOrderedList);
            assert_eq!(d.blocks()[0].kind, BlockKind::OrderedItem);
        }

        #[test]
        fn test_heading_level_is_clamped() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "x")]);
            d.apply(Command::ToggleHeading(9));
            assert_eq!(d.blocks()[0].kind, BlockKind::Heading(6));
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_document_has_one_paragraph() {
            let d = Document::default();
            assert_eq!(d.blocks().len(), 1);
            assert_eq!(d.blocks()[0].kind, BlockKind::Paragraph);
        }

        #[test]
        fn test_insert_newline_splits_block() {
            let mut d = Document::default();
            d.insert_text("first\nsecond");
            assert_eq!(d.text(), "first\nsecond");
            assert_eq!(d.selection().head, Position::new(1, 6));
        }

        #[test]
        fn test_split_list_item_continues_list() {
            let mut d = doc(vec![plain(BlockKind::OrderedItem, "ab")]);
            d.set_selection(Selection::cursor(Position::new(0, 1)));
            d.split_block();
            assert_eq!(d.blocks()[1].kind, BlockKind::OrderedItem);
            assert_eq!(d.blocks()[1].text(), "b");
        }

        #[test]
        fn test_split_heading_starts_paragraph() {
            let mut d = doc(vec![plain(BlockKind::Heading(1), "Title")]);
            d.move_to_end();
            d.split_block();
            assert_eq!(d.blocks()[1].kind, BlockKind::Paragraph);
        }

        #[test]
        fn test_backspace_lifts_then_joins() {
            let mut d = doc(vec![
                plain(BlockKind::Paragraph, "ab"),
                plain(BlockKind::BulletItem, "cd"),
            ]);
            d.set_selection(Selection::cursor(Position::new(1, 0)));
            assert!(d.backspace());
            assert_eq!(d.blocks()[1].kind, BlockKind::Paragraph);
            assert!(d.backspace());
            assert_eq!(d.blocks().len(), 1);
            assert_eq!(d.text(), "abcd");
            assert_eq!(d.selection().head, Position::new(0, 2));
        }

        #[test]
        fn test_backspace_at_document_start_is_noop() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "ab")]);
            assert!(!d.backspace());
        }

        #[test]
        fn test_insert_replaces_cross_block_selection() {
            let mut d = doc(vec![
                plain(BlockKind::Paragraph, "hello"),
                plain(BlockKind::Paragraph, "big"),
                plain(BlockKind::Paragraph, "world"),
            ]);
            d.set_selection(Selection::range(Position::new(2, 0), Position::new(0, 5)));
            d.insert_text(" ");
            assert_eq!(d.text(), "hello world");
        }

        #[test]
        fn test_cursor_moves_across_blocks() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "a"), plain(BlockKind::Paragraph, "b")]);
            d.set_selection(Selection::cursor(Position::new(0, 1)));
            d.move_right();
            assert_eq!(d.selection().head, Position::new(1, 0));
            d.move_left();
            assert_eq!(d.selection().head, Position::new(0, 1));
            d.move_down();
            d.move_down();
            assert_eq!(d.selection().head, Position::new(1, 1));
        }

        #[test]
        fn test_extend_selection_keeps_anchor() {
            let mut d = doc(vec![plain(BlockKind::Paragraph, "abc")]);
            d.extend_selection(true);
            d.extend_selection(true);
            assert_eq!(d.selection().anchor, Position::new(0, 0));
            assert_eq!(d.selection().head, Position::new(0, 2));
        }
    }
}
