use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::app::{AppState, Mode};

/// Header: app name, board, active agent, then the status (or error) line.
pub fn render_header(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::dim_style());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width as usize;
    let lines = vec![
        title_line(state),
        status_line(state, width),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn board_label(state: &AppState) -> String {
    if !state.board_name.is_empty() {
        state.board_name.clone()
    } else if !state.board_id.is_empty() {
        super::short_id(&state.board_id).to_string()
    } else {
        "no board".to_string()
    }
}

fn title_line(state: &AppState) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            " boardhand ",
            Style::default()
                .fg(Theme::APP_NAME)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        ),
        Span::raw(" "),
    ];
    match state.mode {
        Mode::BoardSelect => spans.push(Span::styled("boards", Theme::dim_style())),
        Mode::Kanban => spans.push(Span::styled(board_label(state), Theme::bold())),
    }
    spans.push(Span::styled("  agent: ", Theme::dim_style()));
    spans.push(Span::styled(
        state.active_agent.label(),
        Style::default().fg(Theme::AGENT).add_modifier(Modifier::BOLD),
    ));
    if state.agent_in_flight {
        spans.push(Span::styled(" (working)", Theme::dim_style()));
    }
    if state.loading {
        spans.push(Span::styled("  loading", Theme::dim_style()));
    }
    Line::from(spans)
}

/// The error wins over the status while one is recorded.
fn status_line(state: &AppState, width: usize) -> Line<'static> {
    let (text, style) = match &state.error {
        Some(err) => (format!("error: {err}"), Style::default().fg(Theme::STATUS_ERROR)),
        None => (state.status.clone(), Theme::dim_style()),
    };
    let text = if text.width() > width.saturating_sub(1) {
        super::truncate(&text, width.saturating_sub(1))
    } else {
        text
    };
    Line::from(Span::styled(format!(" {text}"), style))
}
