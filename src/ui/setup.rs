use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};
use ratatui::Frame;

use super::theme::Theme;

const REQUIRED_VARS: &[(&str, &str)] = &[
    ("TRELLO_API_KEY", ""),
    ("TRELLO_API_TOKEN", ""),
    ("TRELLO_BOARD_ID", " (optional)"),
];

/// Static screen shown when Trello credentials are missing. Only quitting works here.
pub fn render_setup(f: &mut Frame, area: Rect) {
    let panel = super::centered_rect(area, 60, 50, 48, 12);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(false))
        .title(Span::styled(" boardhand ", Theme::bold()))
        .padding(Padding::new(2, 2, 1, 1));
    let inner = block.inner(panel);
    f.render_widget(block, panel);

    let mut lines = vec![
        Line::from(Span::styled("trello auth not configured.", Theme::bold())),
        Line::from(""),
        Line::from("Set these in the environment or a .env file:"),
    ];
    for (var, note) in REQUIRED_VARS {
        lines.push(Line::from(vec![
            Span::raw(format!("  {var}")),
            Span::styled(*note, Theme::dim_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("q: quit", Theme::dim_style())));
    f.render_widget(Paragraph::new(lines), inner);
}
