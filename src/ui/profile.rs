//! Profile view with info and projects tabs

use super::widgets::render_scrollable_list;
use crate::app::App;
use crate::authoring::ProjectListLoader;
use crate::state::ProfileTab;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

pub fn draw(
    frame: &mut Frame,
    area: Rect,
    tab: ProfileTab,
    list: &ProjectListLoader,
    selected: usize,
    app: &App,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let tabs = Tabs::new(vec!["Info", "Projects"])
        .select(match tab {
            ProfileTab::Info => 0,
            ProfileTab::Projects => 1,
        })
        .block(Block::default().title(" Profile ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    match tab {
        ProfileTab::Info => draw_info(frame, chunks[1], app),
        ProfileTab::Projects => draw_projects(frame, chunks[1], list, selected),
    }
}

fn draw_info(frame: &mut Frame, area: Rect, app: &App) {
    let dim = Style::default().fg(Color::DarkGray);
    let row = |label: &'static str, value: Option<String>| {
        Line::from(vec![
            Span::styled(format!("{label:<10}"), dim),
            Span::raw(value.unwrap_or_else(|| "—".to_string())),
        ])
    };

    let lines = match app.identity.user() {
        Some(user) if app.identity.is_authenticated() => vec![
            row("Name", user.name),
            row("Nickname", user.nickname),
            row("Email", user.email),
            row(
                "Verified",
                user.email_verified
                    .map(|v| if v { "yes" } else { "no" }.to_string()),
            ),
            row("Subject", Some(user.sub)),
        ],
        _ => vec![Line::from(Span::styled("Not signed in.", dim))],
    };

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_projects(frame: &mut Frame, area: Rect, list: &ProjectListLoader, selected: usize) {
    let block = Block::default().title(" My projects ").borders(Borders::ALL);

    let message = if list.is_loading() {
        Some(Span::styled("Loading projects…", Style::default().fg(Color::Gray)))
    } else if let Some(error) = list.error() {
        Some(Span::styled(error.to_string(), Style::default().fg(Color::Red)))
    } else if list.projects().is_empty() {
        Some(Span::styled(
            "No projects yet. Press n to create one.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        None
    };
    if let Some(message) = message {
        frame.render_widget(Paragraph::new(Line::from(message)).block(block), area);
        return;
    }

    let items: Vec<ListItem> = list
        .projects()
        .iter()
        .map(|project| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<14}", project.industry.label()),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(project.name.clone()),
                Span::styled(
                    format!("  {}", project.tags_display()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let list_widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▶ ");
    render_scrollable_list(frame, area, list_widget, Some(selected));
}
