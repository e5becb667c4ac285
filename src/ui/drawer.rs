use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::app::{AppState, Drawer, Focus};

const DETAIL_HEIGHT: u16 = 9;

pub fn render_drawer(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(DETAIL_HEIGHT.min(area.height / 2)),
            Constraint::Min(3),
        ])
        .split(area);

    render_detail(f, chunks[0], &state.drawer);
    render_timeline(f, chunks[1], &state.drawer, state.focus == Focus::Drawer);
}

fn render_detail(f: &mut Frame, area: Rect, drawer: &Drawer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(false))
        .title(Span::styled(" Card Detail ", Theme::bold()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(card) = &drawer.card else {
        f.render_widget(
            Paragraph::new(Span::styled("No card selected.", Theme::dim_style())),
            inner,
        );
        return;
    };

    let desc = card.desc.trim();
    let mut lines = vec![
        Line::from(Span::styled(card.name.clone(), Theme::bold())),
        Line::from(vec![
            Span::styled("list: ", Theme::dim_style()),
            Span::raw(card.list_name.clone()),
        ]),
        Line::from(vec![
            Span::styled("url: ", Theme::dim_style()),
            Span::raw(card.link().unwrap_or("(no url)").to_string()),
        ]),
        Line::from(""),
    ];
    if desc.is_empty() {
        lines.push(Line::from(Span::styled("(no description)", Theme::dim_style())));
    } else {
        lines.extend(desc.lines().map(|l| Line::from(l.to_string())));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_timeline(f: &mut Frame, area: Rect, drawer: &Drawer, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(focused))
        .title(Span::styled(" Timeline ", Theme::bold()));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if drawer.entries.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No output yet. Send a prompt with / or tab.",
                Theme::dim_style(),
            ))
            .wrap(Wrap { trim: false }),
            inner,
        );
        return;
    }

    let lines = transcript_lines(drawer, usize::from(inner.width));
    let height = usize::from(inner.height);
    let start = window_start(lines.len(), height, drawer.scroll);
    let visible: Vec<Line> = lines.into_iter().skip(start).take(height).collect();
    f.render_widget(Paragraph::new(visible), inner);
}

/// First wrapped line to show when `scroll` lines up from the bottom.
pub fn window_start(total: usize, height: usize, scroll: usize) -> usize {
    let bottom = total.saturating_sub(height);
    bottom.saturating_sub(scroll)
}

/// The transcript wrapped to `width`, speaker headers styled.
fn transcript_lines(drawer: &Drawer, width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for (i, entry) in drawer.entries.iter().enumerate() {
        if i > 0 {
            out.push(Line::from(""));
        }
        out.push(Line::from(vec![
            Span::styled(format!("[{}] ", entry.stamp), Theme::dim_style()),
            Span::styled(
                entry.who.clone(),
                Style::default()
                    .fg(Theme::who_color(&entry.who))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        for line in entry.text.lines() {
            out.extend(wrap_line(line, width).into_iter().map(Line::from));
        }
    }
    out
}

/// Hard-wrap one line at `width` display cells, grapheme-safe.
pub fn wrap_line(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.width() <= width {
        return vec![text.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let gw = g.width();
        if used + gw > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push_str(g);
        used += gw;
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
