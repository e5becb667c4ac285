use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use super::theme::Theme;
use crate::app::{AppState, Focus};
use crate::board::{keep_visible, Card, List};

/// Rows taken by column chrome: two borders, the count line, the separator.
const COLUMN_CHROME: u16 = 4;

/// Number of card rows a column of `height` cells can show.
pub fn card_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(COLUMN_CHROME).max(1))
}

/// Overflow footer, present only when some lists are off screen.
pub fn overflow_hint(active: usize, total: usize, visible: usize) -> Option<String> {
    (total > visible).then(|| format!("{}/{} lists (h/l to scroll)", active + 1, total))
}

pub fn render_board(f: &mut Frame, area: Rect, state: &AppState) {
    let kanban = &state.kanban;
    let lists = kanban.lists();

    if lists.is_empty() {
        let msg = if state.loading {
            "Loading board..."
        } else {
            "This board has no open lists. Press N to create one."
        };
        f.render_widget(
            Paragraph::new(Span::styled(format!(" {msg}"), Theme::dim_style())),
            area,
        );
        return;
    }

    let hint = overflow_hint(kanban.active_list_index(), lists.len(), kanban.visible_columns());
    let (columns_area, footer_area) = if hint.is_some() && area.height > 1 {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let range = kanban.visible_range();
    let visible = &lists[range.clone()];
    let constraints: Vec<Constraint> = visible
        .iter()
        .map(|_| Constraint::Ratio(1, visible.len() as u32))
        .collect();
    let col_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(columns_area);

    let kanban_focused = state.focus == Focus::Kanban;
    for (offset, list) in visible.iter().enumerate() {
        let is_active = range.start + offset == kanban.active_list_index();
        render_column(f, col_areas[offset], list, is_active, kanban_focused, state);
    }

    if let (Some(area), Some(hint)) = (footer_area, hint) {
        f.render_widget(
            Paragraph::new(Span::styled(format!(" {hint}"), Theme::dim_style())),
            area,
        );
    }
}

fn render_column(
    f: &mut Frame,
    area: Rect,
    list: &List,
    is_active: bool,
    kanban_focused: bool,
    state: &AppState,
) {
    let cards = state.kanban.snapshot.cards_in(&list.id);
    let border_color = if is_active {
        Theme::COLUMN_FOCUSED_BORDER
    } else {
        Theme::COLUMN_BORDER
    };
    let title_style = if is_active {
        Theme::bold()
    } else {
        Style::default().fg(Theme::FG)
    };
    let title_width = usize::from(area.width.saturating_sub(4));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if is_active && kanban_focused {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", super::truncate(&list.name, title_width.saturating_sub(2))),
            title_style,
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let count = match cards.len() {
        1 => "1 card".to_string(),
        n => format!("{n} cards"),
    };
    let mut lines = vec![
        Line::from(Span::styled(count, Theme::dim_style())),
        Line::from(Span::styled(
            "─".repeat(usize::from(inner.width)),
            Theme::dim_style(),
        )),
    ];

    let rows = card_rows(area.height);
    let selected = state.kanban.card_cursor(&list.id);
    let start = keep_visible(state.kanban.card_offset(&list.id), selected, rows);
    let context = state.kanban.context_card.as_deref();
    for (i, card) in cards.iter().enumerate().skip(start).take(rows) {
        let is_selected = is_active && i == selected;
        lines.push(card_line(card, is_selected, context == Some(card.id.as_str()), inner.width));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn card_line(card: &Card, is_selected: bool, is_context: bool, width: u16) -> Line<'static> {
    let mut spans = Vec::with_capacity(3);
    spans.push(Span::raw(if is_selected { "> " } else { "  " }));
    let mut used = 2;
    if is_context {
        spans.push(Span::styled("◆ ", Style::default().fg(Theme::CONTEXT_MARKER)));
        used += 2;
    }
    let name_style = if is_selected {
        Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::FG)
    };
    let avail = usize::from(width).saturating_sub(used);
    spans.push(Span::styled(super::truncate(&card.name, avail), name_style));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentName;
    use crate::app::{update, Msg};
    use crate::board::BoardSnapshot;
    use crate::dispatch::Event;
    use crate::input::action::Action;
    use crate::ui::test_support::{contains, render_rows};

    fn state_with(lists: &[(&str, &[&str])], width: u16) -> AppState {
        let mut cards = Vec::new();
        for (list_id, names) in lists {
            for (i, name) in names.iter().enumerate() {
                cards.push(Card {
                    id: format!("{list_id}-{i}"),
                    list_id: list_id.to_string(),
                    name: name.to_string(),
                    ..Card::default()
                });
            }
        }
        let snapshot = BoardSnapshot::new(
            "b1",
            lists
                .iter()
                .map(|(id, _)| List { id: id.to_string(), name: format!("List {id}") })
                .collect(),
            cards,
        );
        let mut state = AppState::new(true, Some("b1".into()), AgentName::Codex);
        update(&mut state, Msg::Resize { width, height: 30 });
        update(
            &mut state,
            Msg::Outcome(Event::BoardDataLoaded {
                board_id: "b1".into(),
                board_name: "Roadmap".into(),
                result: Ok(snapshot),
            }),
        );
        state
    }

    #[test]
    fn test_card_rows_floor() {
        assert_eq!(card_rows(20), 16);
        assert_eq!(card_rows(4), 1);
        assert_eq!(card_rows(0), 1);
    }

    #[test]
    fn test_overflow_hint() {
        assert_eq!(overflow_hint(0, 3, 5), None);
        assert_eq!(overflow_hint(2, 6, 3).as_deref(), Some("3/6 lists (h/l to scroll)"));
    }

    #[test]
    fn test_selected_card_marker() {
        let state = state_with(&[("a", &["Write docs", "Ship"]), ("b", &[])], 80);
        let rows = render_rows(&state, 80, 30);
        assert!(contains(&rows, "> Write docs"));
        assert!(contains(&rows, "  Ship"));
        assert!(contains(&rows, "2 cards"));
    }

    #[test]
    fn test_context_marker_after_open() {
        let mut state = state_with(&[("a", &["Write docs"])], 120);
        update(&mut state, Msg::Action(Action::OpenCard));
        let rows = render_rows(&state, 120, 30);
        assert!(contains(&rows, "> ◆ Write docs"));
    }

    #[test]
    fn test_overflow_footer_rendered() {
        let lists: Vec<(&str, &[&str])> = vec![("a", &[]), ("b", &[]), ("c", &[]), ("d", &[])];
        let state = state_with(&lists, 48);
        let rows = render_rows(&state, 48, 30);
        assert!(contains(&rows, "1/4 lists (h/l to scroll)"));
    }
}
