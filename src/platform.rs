//! Platform-specific key bindings

use crate::editor::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Modifier for form shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const FORM_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const FORM_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Toolbar commands use Alt everywhere; Ctrl+I and Ctrl+M collide with
/// Tab and Enter in most terminals
pub const TOOLBAR_MODIFIER: KeyModifiers = KeyModifiers::ALT;

/// Save shortcut display for form help text
/// Ctrl+S works on all platforms
pub const SAVE_SHORTCUT: &str = "Ctrl+S";

#[cfg(target_os = "macos")]
pub const SELECT_ALL_SHORTCUT: &str = "Cmd+A";

#[cfg(not(target_os = "macos"))]
pub const SELECT_ALL_SHORTCUT: &str = "Ctrl+A";

/// Whether `key` is a save request
pub fn is_save(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('s')
        && (key.modifiers.contains(KeyModifiers::CONTROL)
            || key.modifiers.contains(FORM_MODIFIER))
}

/// Toolbar command bound to `key`, if any
pub fn toolbar_command(key: &KeyEvent) -> Option<Command> {
    if !key.modifiers.contains(TOOLBAR_MODIFIER) {
        return None;
    }
    match key.code {
        KeyCode::Char('b') => Some(Command::ToggleBold),
        KeyCode::Char('i') => Some(Command::ToggleItalic),
        KeyCode::Char('s') => Some(Command::ToggleStrike),
        KeyCode::Char(c @ '1'..='6') => c.to_digit(10).map(|d| Command::ToggleHeading(d as u8)),
        KeyCode::Char('u') => Some(Command::ToggleBulletList),
        KeyCode::Char('o') => Some(Command::ToggleOrderedList),
        _ => None,
    }
}

/// Shortcut hint shown next to a toolbar glyph
pub fn toolbar_hint(command: Command) -> String {
    let key = match command {
        Command::ToggleBold => "b".to_string(),
        Command::ToggleItalic => "i".to_string(),
        Command::ToggleStrike => "s".to_string(),
        Command::ToggleHeading(level) => level.to_string(),
        Command::ToggleBulletList => "u".to_string(),
        Command::ToggleOrderedList => "o".to_string(),
    };
    format!("Alt+{key}")
}

/// Hand `url` to the desktop's default browser
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = url;
        return Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "no known browser launcher on this platform",
        ));
    }
    Ok(())
}
