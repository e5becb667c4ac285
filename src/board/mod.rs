pub mod api;
pub mod trello;

use std::collections::HashMap;

/// Width budget for one kanban column, in terminal cells.
pub const COLUMN_WIDTH: u16 = 24;

/// An open board the user can pick in the board selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
}

/// A single column of a board ("list" in Trello terms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub id: String,
    pub name: String,
}

/// A single card. `list_name` is resolved by the API layer from the list collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    pub id: String,
    pub list_id: String,
    pub list_name: String,
    pub name: String,
    pub desc: String,
    pub url: String,
    pub short_url: String,
}

impl Card {
    /// Preferred link for display: the short url, then the full url.
    pub fn link(&self) -> Option<&str> {
        [self.short_url.as_str(), self.url.as_str()]
            .into_iter()
            .find(|u| !u.is_empty())
    }
}

/// Lists and cards of one board as last fetched. Replaced wholesale on every load.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub board_id: String,
    pub lists: Vec<List>,
    pub cards: HashMap<String, Vec<Card>>,
}

impl BoardSnapshot {
    /// Group `cards` by list id, keeping the API order within each list.
    pub fn new(board_id: impl Into<String>, lists: Vec<List>, cards: Vec<Card>) -> Self {
        let mut grouped: HashMap<String, Vec<Card>> = HashMap::with_capacity(lists.len());
        for card in cards {
            grouped.entry(card.list_id.clone()).or_default().push(card);
        }
        Self {
            board_id: board_id.into(),
            lists,
            cards: grouped,
        }
    }

    pub fn cards_in(&self, list_id: &str) -> &[Card] {
        self.cards.get(list_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.cards.values().flatten().find(|c| c.id == card_id)
    }
}

/// Navigation state over a snapshot.
///
/// `active_list` and every entry of `card_cursors` stay inside the bounds of the
/// snapshot they were clamped against; an empty collection pins its index to 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    pub active_list: usize,
    pub scroll_offset: usize,
    pub card_cursors: HashMap<String, usize>,
    /// First visible card row per list.
    pub card_offsets: HashMap<String, usize>,
}

/// The per-session board cache: current snapshot, cursor, and context marker.
#[derive(Debug, Clone, Default)]
pub struct Kanban {
    pub snapshot: BoardSnapshot,
    pub cursor: NavigationCursor,
    /// Id of the card last opened in the drawer. Display marker only.
    pub context_card: Option<String>,
    width: u16,
    rows: usize,
}

impl Kanban {
    /// Replace the snapshot and reset navigation.
    pub fn set_data(&mut self, snapshot: BoardSnapshot) {
        self.snapshot = snapshot;
        self.cursor = NavigationCursor::default();
        self.context_card = None;
        self.clamp();
    }

    pub fn lists(&self) -> &[List] {
        &self.snapshot.lists
    }

    pub fn active_list(&self) -> Option<&List> {
        self.snapshot.lists.get(self.cursor.active_list)
    }

    pub fn active_list_index(&self) -> usize {
        self.cursor.active_list
    }

    /// Cursor position inside `list_id`, defaulting to the first card.
    pub fn card_cursor(&self, list_id: &str) -> usize {
        self.cursor.card_cursors.get(list_id).copied().unwrap_or(0)
    }

    pub fn selected_card(&self) -> Option<&Card> {
        let list = self.active_list()?;
        let cards = self.snapshot.cards_in(&list.id);
        cards.get(self.card_cursor(&list.id))
    }

    /// The card the agent should treat as "current": the opened card if it is
    /// still on the board, else the selection.
    pub fn context_or_selected(&self) -> Option<&Card> {
        self.context_card
            .as_deref()
            .and_then(|id| self.snapshot.find_card(id))
            .or_else(|| self.selected_card())
    }

    pub fn move_prev_list(&mut self) {
        if self.cursor.active_list > 0 {
            self.cursor.active_list -= 1;
            self.ensure_horizontal_scroll();
        }
    }

    pub fn move_next_list(&mut self) {
        if self.cursor.active_list + 1 < self.snapshot.lists.len() {
            self.cursor.active_list += 1;
            self.ensure_horizontal_scroll();
        }
    }

    pub fn move_prev_card(&mut self) {
        let Some(id) = self.active_list().map(|l| l.id.clone()) else {
            return;
        };
        let pos = self.card_cursor(&id);
        if pos > 0 {
            self.cursor.card_cursors.insert(id.clone(), pos - 1);
            self.ensure_vertical_scroll(&id);
        }
    }

    pub fn move_next_card(&mut self) {
        let Some(id) = self.active_list().map(|l| l.id.clone()) else {
            return;
        };
        let pos = self.card_cursor(&id);
        if pos + 1 < self.snapshot.cards_in(&id).len() {
            self.cursor.card_cursors.insert(id.clone(), pos + 1);
            self.ensure_vertical_scroll(&id);
        }
    }

    /// Set the number of card rows a column shows and keep every selection in view.
    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows.max(1);
        let ids: Vec<String> = self.cursor.card_cursors.keys().cloned().collect();
        for id in ids {
            self.ensure_vertical_scroll(&id);
        }
    }

    /// First visible card row of `list_id`.
    pub fn card_offset(&self, list_id: &str) -> usize {
        self.cursor.card_offsets.get(list_id).copied().unwrap_or(0)
    }

    fn ensure_vertical_scroll(&mut self, list_id: &str) {
        let offset = keep_visible(
            self.card_offset(list_id),
            self.card_cursor(list_id),
            self.rows.max(1),
        );
        self.cursor.card_offsets.insert(list_id.to_string(), offset);
    }

    /// Set the width available to the kanban and keep the active list in view.
    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        self.ensure_horizontal_scroll();
    }

    /// Number of list columns that fit side by side.
    pub fn visible_columns(&self) -> usize {
        if self.width == 0 {
            return 1;
        }
        ((self.width / COLUMN_WIDTH) as usize).max(1)
    }

    /// Index range of the lists currently on screen.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self.cursor.scroll_offset;
        let end = (start + self.visible_columns()).min(self.snapshot.lists.len());
        start.min(end)..end
    }

    /// Shift the window by the minimum amount that keeps the active list visible.
    fn ensure_horizontal_scroll(&mut self) {
        let vis = self.visible_columns();
        let active = self.cursor.active_list;
        if active < self.cursor.scroll_offset {
            self.cursor.scroll_offset = active;
        }
        if active >= self.cursor.scroll_offset + vis {
            self.cursor.scroll_offset = active + 1 - vis;
        }
        let last_window = self.snapshot.lists.len().saturating_sub(vis);
        self.cursor.scroll_offset = self.cursor.scroll_offset.min(last_window);
    }

    /// Pull every index back inside the current snapshot.
    pub fn clamp(&mut self) {
        let list_count = self.snapshot.lists.len();
        self.cursor.active_list = self.cursor.active_list.min(list_count.saturating_sub(1));
        let snapshot = &self.snapshot;
        self.cursor.card_cursors.retain(|id, pos| {
            let len = snapshot.cards_in(id).len();
            if len == 0 {
                return false;
            }
            *pos = (*pos).min(len - 1);
            true
        });
        let cursors = &self.cursor.card_cursors;
        self.cursor.card_offsets.retain(|id, _| cursors.contains_key(id));
        let ids: Vec<String> = self.cursor.card_cursors.keys().cloned().collect();
        for id in ids {
            self.ensure_vertical_scroll(&id);
        }
        self.ensure_horizontal_scroll();
    }

    /// Textual board summary handed to the agent along with the user's prompt.
    pub fn context_summary(&self, board_name: &str, board_id: &str) -> String {
        let mut parts = vec![format!("Board: {board_name} (id: {board_id})")];

        if let Some(card) = self.context_or_selected() {
            let desc = card.desc.trim();
            let desc = if desc.is_empty() { "(no description)" } else { desc };
            parts.push(String::new());
            parts.push(format!("Selected Card: {} (id: {})", card.name, card.id));
            parts.push(format!("List: {}", card.list_name));
            parts.push(format!("URL: {}", card.short_url));
            parts.push("Description:".to_string());
            parts.push(desc.to_string());
        }

        parts.push(String::new());
        parts.push("Lists:".to_string());
        for list in &self.snapshot.lists {
            let count = self.snapshot.cards_in(&list.id).len();
            parts.push(format!("  - {} (id: {}, {} cards)", list.name, list.id, count));
        }

        parts.join("\n")
    }
}

/// Shift a window starting at `offset` by the minimum needed to show `selected`
/// within `rows` rows.
pub fn keep_visible(offset: usize, selected: usize, rows: usize) -> usize {
    let rows = rows.max(1);
    if selected < offset {
        selected
    } else if selected >= offset + rows {
        selected + 1 - rows
    } else {
        offset
    }
}
