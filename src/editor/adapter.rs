//! Editor adapter: the only owner of the document engine

use super::document::{Command, Document};
use super::markup;
use std::fmt;

/// Receives freshly serialized markup after every mutation
pub type ChangeCallback = Box<dyn FnMut(&str) + Send>;

/// Wraps the document engine behind a command/query surface.
///
/// Until [`RichTextEditor::initialize`] runs the engine does not exist: every
/// command is a no-op and every query reports inactive.
pub struct RichTextEditor {
    engine: Option<Document>,
    initial: String,
    on_change: ChangeCallback,
}

impl fmt::Debug for RichTextEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextEditor")
            .field("ready", &self.is_ready())
            .field("initial", &self.initial)
            .finish()
    }
}

impl RichTextEditor {
    pub fn new(initial: impl Into<String>, on_change: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            engine: None,
            initial: initial.into(),
            on_change: Box::new(on_change),
        }
    }

    /// Build the engine from the initial markup
    pub fn initialize(&mut self) {
        if self.engine.is_none() {
            let mut doc = Document::from_blocks(markup::parse(&self.initial));
            doc.move_to_end();
            self.engine = Some(doc);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn document(&self) -> Option<&Document> {
        self.engine.as_ref()
    }

    /// Current markup; before initialization this is the initial markup
    pub fn serialized(&self) -> String {
        match &self.engine {
            Some(doc) => markup::serialize(doc.blocks()),
            None => self.initial.clone(),
        }
    }

    pub fn is_active(&self, command: Command) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|doc| doc.is_active(command))
    }

    /// Replace the content without notifying the change callback
    pub fn set_content(&mut self, markup: &str) {
        self.initial = markup.to_string();
        if let Some(doc) = self.engine.as_mut() {
            *doc = Document::from_blocks(markup::parse(markup));
            doc.move_to_end();
        }
    }

    fn emit(&mut self) {
        if let Some(doc) = &self.engine {
            let serialized = markup::serialize(doc.blocks());
            (self.on_change)(&serialized);
        }
    }

    /// Run `f` against the engine and emit markup afterwards.
    /// Returns false when the engine is not ready.
    fn with_engine(&mut self, emit_always: bool, f: impl FnOnce(&mut Document) -> bool) -> bool {
        let Some(doc) = self.engine.as_mut() else {
            return false;
        };
        let changed = f(doc);
        if changed || emit_always {
            self.emit();
        }
        true
    }

    /// Toggle a toolbar command; always emits once the engine is ready
    pub fn toggle(&mut self, command: Command) {
        self.with_engine(true, |doc| doc.apply(command));
    }

    pub fn insert_text(&mut self, text: &str) {
        self.with_engine(false, |doc| doc.insert_text(text));
    }

    pub fn split_block(&mut self) {
        self.with_engine(false, Document::split_block);
    }

    pub fn backspace(&mut self) {
        self.with_engine(false, Document::backspace);
    }

    pub fn move_left(&mut self) {
        self.with_engine(false, |doc| {
            doc.move_left();
            false
        });
    }

    pub fn move_right(&mut self) {
        self.with_engine(false, |doc| {
            doc.move_right();
            false
        });
    }

    pub fn move_up(&mut self) {
        self.with_engine(false, |doc| {
            doc.move_up();
            false
        });
    }

    pub fn move_down(&mut self) {
        self.with_engine(false, |doc| {
            doc.move_down();
            false
        });
    }

    pub fn extend_selection(&mut self, forward: bool) {
        self.with_engine(false, |doc| {
            doc.extend_selection(forward);
            false
        });
    }

    pub fn select_all(&mut self) {
        self.with_engine(false, |doc| {
            doc.select_all();
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::document::{Position, Selection};
    use std::sync::{Arc, Mutex};

    fn recording_editor(initial: &str) -> (RichTextEditor, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let editor = RichTextEditor::new(initial, move |markup: &str| {
            sink.lock().unwrap().push(markup.to_string());
        });
        (editor, seen)
    }

    #[test]
    fn test_not_ready_is_inert() {
        let (mut editor, seen) = recording_editor("<p>hello</p>");
        assert!(!editor.is_ready());
        editor.toggle(Command::ToggleBold);
        editor.insert_text("x");
        assert!(!editor.is_active(Command::ToggleBold));
        assert_eq!(editor.serialized(), "<p>hello</p>");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_emits_serialized_markup() {
        let (mut editor, seen) = recording_editor("<p>hello</p>");
        editor.initialize();
        editor.select_all();
        editor.toggle(Command::ToggleBold);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["<p><strong>hello</strong></p>".to_string()]
        );
        assert!(editor.is_active(Command::ToggleBold));
    }

    #[test]
    fn test_toggle_bold_twice_restores_markup() {
        let (mut editor, seen) = recording_editor("<p>hello world</p>");
        editor.initialize();
        let original = editor.serialized();
        editor.select_all();
        let was_active = editor.is_active(Command::ToggleBold);

        editor.toggle(Command::ToggleBold);
        editor.toggle(Command::ToggleBold);

        assert_eq!(editor.is_active(Command::ToggleBold), was_active);
        assert_eq!(editor.serialized(), original);
        assert_eq!(seen.lock().unwrap().last(), Some(&original));
    }

    #[test]
    fn test_cursor_toggle_still_emits() {
        let (mut editor, seen) = recording_editor("<p>abc</p>");
        editor.initialize();
        editor.toggle(Command::ToggleItalic);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(editor.is_active(Command::ToggleItalic));
    }

    #[test]
    fn test_typing_emits_and_moves_do_not() {
        let (mut editor, seen) = recording_editor("");
        editor.initialize();
        editor.insert_text("Hi");
        editor.move_left();
        editor.split_block();
        assert_eq!(editor.serialized(), "<p>H</p><p>i</p>");
        assert_eq!(seen.lock().unwrap().len(), 2);
        let doc = editor.document().unwrap();
        assert_eq!(doc.selection(), Selection::cursor(Position::new(1, 0)));
    }

    #[test]
    fn test_set_content_is_silent() {
        let (mut editor, seen) = recording_editor("");
        editor.initialize();
        editor.set_content("<h2>Loaded</h2>");
        assert_eq!(editor.serialized(), "<h2>Loaded</h2>");
        assert!(editor.is_active(Command::ToggleHeading(2)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_content_before_ready_seeds_initialization() {
        let (mut editor, _seen) = recording_editor("");
        editor.set_content("<p>later</p>");
        editor.initialize();
        assert_eq!(editor.serialized(), "<p>later</p>");
    }
}
