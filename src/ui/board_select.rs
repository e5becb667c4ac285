use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use super::theme::Theme;
use crate::app::AppState;
use crate::board::keep_visible;

const FOOTER_HINT: &str = "enter: open   j/k: navigate   r: refresh   ?: help   q: quit";

pub fn render_board_select(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(true))
        .title(Span::styled(" Boards ", Theme::bold()));
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    let mut lines = vec![
        Line::from(Span::styled("Pick a board to begin.", Theme::dim_style())),
        Line::from(""),
    ];

    if state.boards.is_empty() {
        let msg = if state.loading {
            "Loading boards..."
        } else {
            "No boards to display. Press r to retry."
        };
        lines.push(Line::from(Span::styled(msg, Theme::dim_style())));
    } else {
        let rows = usize::from(inner.height.saturating_sub(2)).max(1);
        let start = keep_visible(0, state.board_cursor, rows);
        let width = usize::from(inner.width);
        for (i, board) in state.boards.iter().enumerate().skip(start).take(rows) {
            let selected = i == state.board_cursor;
            let id = format!(" [{}]", super::short_id(&board.id));
            let name = super::truncate(&board.name, width.saturating_sub(2 + id.len()));
            let style = if selected {
                Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Theme::FG)
            };
            lines.push(Line::from(vec![
                Span::styled(if selected { "▸ " } else { "  " }, style),
                Span::styled(name, style),
                Span::styled(id, Theme::dim_style()),
            ]));
        }
    }
    f.render_widget(Paragraph::new(lines), inner);

    f.render_widget(
        Paragraph::new(Span::styled(format!(" {FOOTER_HINT}"), Theme::dim_style())),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentName;
    use crate::board::BoardSummary;
    use crate::ui::test_support::{contains, render_rows};

    #[test]
    fn test_empty_board_list_offers_retry() {
        let mut state = AppState::new(true, None, AgentName::Codex);
        state.loading = false;
        let rows = render_rows(&state, 80, 20);
        assert!(contains(&rows, "No boards to display. Press r to retry."));
        assert!(contains(&rows, "enter: open"));
    }

    #[test]
    fn test_board_rows() {
        let mut state = AppState::new(true, None, AgentName::Codex);
        state.boards = vec![
            BoardSummary { id: "aaaaaaaa1111".into(), name: "Roadmap".into() },
            BoardSummary { id: "bbbbbbbb2222".into(), name: "Ops".into() },
        ];
        state.board_cursor = 1;
        let rows = render_rows(&state, 80, 20);
        assert!(contains(&rows, "  Roadmap [aaaaaaaa]"));
        assert!(contains(&rows, "▸ Ops [bbbbbbbb]"));
    }
}
