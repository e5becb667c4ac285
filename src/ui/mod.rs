pub mod board_select;
pub mod board_view;
pub mod drawer;
pub mod help;
pub mod prompt_bar;
pub mod setup;
pub mod status_bar;
pub mod theme;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::{AppState, Mode};

pub const HEADER_HEIGHT: u16 = 4;
pub const PROMPT_HEIGHT: u16 = 3;
const MIN_PANE_WIDTH: u16 = 30;

/// Width given to the kanban: all of it, or 40% (at least 30 cells) beside the drawer.
pub fn kanban_width(total: u16, drawer_open: bool) -> u16 {
    if !drawer_open {
        return total;
    }
    let share = (u32::from(total) * 2 / 5) as u16;
    share.max(MIN_PANE_WIDTH).min(total)
}

/// Split the main area into the kanban and, when open, the drawer.
pub fn main_split(area: Rect, drawer_open: bool) -> (Rect, Option<Rect>) {
    if !drawer_open {
        return (area, None);
    }
    let kanban = kanban_width(area.width, true);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(kanban), Constraint::Min(0)])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

/// Create a centered rect within `area` using percentage-based sizing with minimums.
pub fn centered_rect(area: Rect, w_pct: u16, h_pct: u16, min_w: u16, min_h: u16) -> Rect {
    let width = (area.width * w_pct / 100).max(min_w).min(area.width);
    let height = (area.height * h_pct / 100).max(min_h).min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Cut `text` to at most `max_width` display cells, ending in `…` when shortened.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let avail = max_width - 1;
    let kept: String = text
        .graphemes(true)
        .scan(0, |w, g| {
            let gw = g.width();
            (*w + gw <= avail).then(|| {
                *w += gw;
                g
            })
        })
        .collect();
    format!("{kept}…")
}

/// First eight characters of a Trello id.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

pub fn render(f: &mut Frame, state: &AppState) {
    if !state.auth_configured {
        setup::render_setup(f, f.area());
        return;
    }

    let footer = match state.mode {
        Mode::Kanban => PROMPT_HEIGHT,
        Mode::BoardSelect => 0,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(footer),
        ])
        .split(f.area());

    status_bar::render_header(f, chunks[0], state);

    match state.mode {
        Mode::BoardSelect => board_select::render_board_select(f, chunks[1], state),
        Mode::Kanban => {
            let (kanban_area, drawer_area) = main_split(chunks[1], state.drawer.open);
            board_view::render_board(f, kanban_area, state);
            if let Some(area) = drawer_area {
                drawer::render_drawer(f, area, state);
            }
            prompt_bar::render_prompt(f, chunks[2], state);
        }
    }

    if state.help_visible {
        help::render_help(f, f.area());
    }
}
