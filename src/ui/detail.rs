//! Project detail view

use crate::app::App;
use crate::authoring::ProjectDetailLoader;
use crate::editor::{parse, Document};
use crate::state::Project;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, loader: &ProjectDetailLoader, app: &App) {
    let block = Block::default()
        .title(" Project ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = if loader.is_loading() {
        vec![Line::from(Span::styled(
            "Loading project…",
            Style::default().fg(Color::Gray),
        ))]
    } else if let Some(error) = loader.error() {
        vec![Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        ))]
    } else if let Some(project) = loader.project() {
        let can_edit = loader.can_edit(app.identity.subject().as_deref());
        project_lines(project, can_edit)
    } else {
        Vec::new()
    };

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn project_lines(project: &Project, can_edit: bool) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let updated = project
        .updated_at
        .map(|at| at.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "—".to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                project.industry.label().to_uppercase(),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(format!("  ·  updated {updated}"), dim),
        ]),
        Line::from(Span::styled(
            project.name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(project.description.clone()),
        Line::from(Span::styled(format!("🖼  {}", project.banner), dim)),
        Line::from(
            project
                .tags
                .iter()
                .map(|tag| Span::styled(format!("#{tag} "), Style::default().fg(Color::Blue)))
                .collect::<Vec<_>>(),
        ),
        Line::from(""),
    ];
    lines.extend(
        Document::from_blocks(parse(&project.body))
            .text()
            .lines()
            .map(|l| Line::from(l.to_string())),
    );
    if can_edit {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Press e to edit", dim)));
    }
    lines
}
