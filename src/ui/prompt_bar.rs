use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::app::{AppState, Focus};
use crate::prompt::{PromptMode, PromptState};

pub fn render_prompt(f: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Prompt;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(focused));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let prompt = &state.prompt;
    let badge = format!(" {} ", badge_text(prompt, state));
    let badge_width = badge.width() + 1;
    let mut spans = vec![Span::styled(badge, Theme::badge()), Span::raw(" ")];

    match prompt.mode {
        PromptMode::Move => spans.extend(picker_spans(prompt)),
        PromptMode::ConfirmArchiveCard | PromptMode::ConfirmArchiveList => {
            spans.push(Span::styled(
                format!("archive {:?}? (y/n)", prompt.confirm_label),
                Theme::bold(),
            ));
        }
        _ if prompt.buffer.input.is_empty() => {
            spans.push(Span::styled(prompt.mode.placeholder(), Theme::dim_style()));
        }
        _ => spans.push(Span::raw(prompt.buffer.input.clone())),
    }
    f.render_widget(Paragraph::new(Line::from(spans)), inner);

    if focused && prompt.mode.is_text() {
        let before: String = prompt.buffer.input.chars().take(prompt.buffer.cursor).collect();
        let x = inner.x + (badge_width + before.width()) as u16;
        f.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

fn badge_text(prompt: &PromptState, state: &AppState) -> String {
    match prompt.mode {
        PromptMode::Agent => state.active_agent.label().to_string(),
        mode => mode.badge().to_string(),
    }
}

/// Move picker: every list name, the picked one highlighted.
fn picker_spans(prompt: &PromptState) -> Vec<Span<'static>> {
    if prompt.lists.is_empty() {
        return vec![Span::styled("no lists", Theme::dim_style())];
    }
    let mut spans = Vec::new();
    for (i, list) in prompt.lists.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Theme::dim_style()));
        }
        if i == prompt.list_cursor {
            spans.push(Span::styled(
                format!("[{}]", list.name),
                Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(list.name.clone()));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentName;
    use crate::app::Mode;
    use crate::board::List;
    use crate::ui::test_support::{contains, render_rows};

    fn kanban_state() -> AppState {
        let mut state = AppState::new(true, Some("b1".into()), AgentName::Codex);
        state.mode = Mode::Kanban;
        state.loading = false;
        state
    }

    #[test]
    fn test_agent_placeholder() {
        let rows = render_rows(&kanban_state(), 80, 20);
        assert!(contains(&rows, " codex  ask the agent..."));
    }

    #[test]
    fn test_move_picker_highlights_choice() {
        let mut state = kanban_state();
        state.focus = Focus::Prompt;
        state.prompt.start_move(
            vec![
                List { id: "l1".into(), name: "Todo".into() },
                List { id: "l2".into(), name: "Done".into() },
            ],
            1,
        );
        let rows = render_rows(&state, 80, 20);
        assert!(contains(&rows, "Todo | [Done]"));
    }

    #[test]
    fn test_confirm_label() {
        let mut state = kanban_state();
        state.focus = Focus::Prompt;
        state
            .prompt
            .start_confirm(PromptMode::ConfirmArchiveCard, "Old card".into());
        let rows = render_rows(&state, 80, 20);
        assert!(contains(&rows, "archive \"Old card\"? (y/n)"));
    }
}
