//! Project create/edit page

use super::field_renderer::{draw_field, draw_select};
use crate::app::AuthoringView;
use crate::state::{Alert, AlertKind, AuthoringMode, Field, Phase};
use crate::ui::components::{wrap_text, BUTTON_HEIGHT};
use crate::ui::editor;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the authoring form with its alert, inputs, toolbar and body editor
pub fn draw_project_form(frame: &mut Frame, area: Rect, view: &AuthoringView) {
    let session = view.controller.session();

    let title = form_title(session.mode(), session.phase());
    let outer = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let notice = page_notice(session.alert(), view.controller.is_read_only());
    let alert_height = notice
        .as_ref()
        .map(|notice| notice_lines(notice, inner.width).len() as u16 + 2)
        .unwrap_or(0);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(alert_height), Constraint::Min(0)])
        .split(inner);

    if let Some(notice) = &notice {
        draw_notice(frame, chunks[0], notice);
    }

    if session.is_loading() {
        let loading = Paragraph::new("Loading project…").style(Style::default().fg(Color::Gray));
        frame.render_widget(loading, chunks[1]);
        return;
    }
    // A failed edit load leaves nothing to edit; the alert says why
    if session.load_error().is_some() && session.loaded_project().is_none() {
        return;
    }

    draw_inputs(frame, chunks[1], view);
}

fn form_title(mode: &AuthoringMode, phase: Phase) -> String {
    let name = match mode {
        AuthoringMode::Create => "Create Project",
        AuthoringMode::Edit { .. } => "Edit Project",
    };
    match phase.activity() {
        Some(activity) => format!(" {name} ({activity}) "),
        None => format!(" {name} "),
    }
}

/// Banner shown above the inputs
#[derive(Debug, PartialEq)]
struct Notice<'a> {
    title: &'a str,
    message: &'a str,
    color: Color,
}

/// The session alert wins; otherwise a read-only edit form explains why input is ignored
fn page_notice(alert: Option<&Alert>, read_only: bool) -> Option<Notice<'_>> {
    if let Some(alert) = alert {
        let color = match alert.kind {
            AlertKind::Success => Color::Green,
            AlertKind::Error => Color::Red,
        };
        return Some(Notice {
            title: alert.title(),
            message: &alert.message,
            color,
        });
    }
    read_only.then_some(Notice {
        title: "Not authorized",
        message: "You cannot edit this project.",
        color: Color::Red,
    })
}

fn notice_lines(notice: &Notice, width: u16) -> Vec<String> {
    wrap_text(notice.message, width.saturating_sub(4) as usize)
}

fn draw_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let lines: Vec<Line> = notice_lines(notice, area.width)
        .into_iter()
        .map(Line::from)
        .collect();
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", notice.title),
            Style::default().fg(notice.color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(notice.color));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_inputs(frame: &mut Frame, area: Rect, view: &AuthoringView) {
    let session = view.controller.session();
    let form = session.form();
    let errors = session.errors();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Name
            Constraint::Length(3),             // Description
            Constraint::Length(3),             // Industry
            Constraint::Length(3),             // Tags
            Constraint::Length(3),             // Banner
            Constraint::Length(BUTTON_HEIGHT), // Toolbar
            Constraint::Min(5),                // Body
        ])
        .split(area);

    for (idx, field) in [Field::Name, Field::Description]
        .into_iter()
        .enumerate()
    {
        draw_field(
            frame,
            chunks[idx],
            field.label(),
            form.text(field).unwrap_or_default(),
            view.focus == field,
            errors.get(field),
        );
    }

    draw_select(
        frame,
        chunks[2],
        Field::Industry.label(),
        form.industry.map(|i| i.label()),
        view.focus == Field::Industry,
        errors.get(Field::Industry),
    );

    for (chunk, field) in [(chunks[3], Field::Tags), (chunks[4], Field::Banner)] {
        draw_field(
            frame,
            chunk,
            field.label(),
            form.text(field).unwrap_or_default(),
            view.focus == field,
            errors.get(field),
        );
    }

    let body_editor = view.controller.editor();
    editor::draw_toolbar(frame, chunks[5], body_editor);
    editor::draw_body(
        frame,
        chunks[6],
        body_editor,
        view.focus == Field::Body,
        errors.get(Field::Body),
    );
}
