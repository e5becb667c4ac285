use crate::board::List;

/// A single-line editable text buffer with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    pub input: String,
    pub cursor: usize,
}

impl TextBuffer {
    pub fn new(input: String) -> Self {
        let cursor = input.chars().count();
        Self { input, cursor }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Convert a char index to a byte index.
    fn byte_offset(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn set(&mut self, text: &str) {
        *self = Self::new(text.to_string());
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn is_blank(&self) -> bool {
        self.input.trim().is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.byte_offset(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let byte_idx = self.byte_offset(self.cursor - 1);
            self.input.remove(byte_idx);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_idx = self.byte_offset(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    pub fn delete_word(&mut self) {
        let byte_pos = self.byte_offset(self.cursor);
        let before = &self.input[..byte_pos];
        let trimmed = before.trim_end();
        let start_byte = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let start_char = self.input[..start_byte].chars().count();
        self.input.drain(start_byte..byte_pos);
        self.cursor = start_char;
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.input.chars().count();
    }
}

/// Which operation the prompt bar is collecting input for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptMode {
    #[default]
    Agent,
    Move,
    Rename,
    Comment,
    NewCard,
    NewList,
    ConfirmArchiveCard,
    ConfirmArchiveList,
}

impl PromptMode {
    /// Free-text submodes edit the buffer; the rest are pickers or yes/no.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            PromptMode::Agent
                | PromptMode::Rename
                | PromptMode::Comment
                | PromptMode::NewCard
                | PromptMode::NewList
        )
    }

    pub fn is_confirm(self) -> bool {
        matches!(self, PromptMode::ConfirmArchiveCard | PromptMode::ConfirmArchiveList)
    }

    pub fn badge(self) -> &'static str {
        match self {
            PromptMode::Agent => "agent",
            PromptMode::Move => "move",
            PromptMode::Rename => "rename",
            PromptMode::Comment => "comment",
            PromptMode::NewCard => "card",
            PromptMode::NewList => "list",
            PromptMode::ConfirmArchiveCard | PromptMode::ConfirmArchiveList => "archive",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            PromptMode::Rename => "new name...",
            PromptMode::Comment => "add comment...",
            PromptMode::NewCard => "new card name...",
            PromptMode::NewList => "new list name...",
            _ => "ask the agent...",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptState {
    pub mode: PromptMode,
    pub buffer: TextBuffer,
    /// Lists offered by the move picker, captured when the move starts.
    pub lists: Vec<List>,
    pub list_cursor: usize,
    pub confirm_label: String,
}

impl PromptState {
    /// Back to an empty agent prompt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start_text(&mut self, mode: PromptMode, prefill: &str) {
        self.mode = mode;
        self.buffer.set(prefill);
    }

    pub fn start_move(&mut self, lists: Vec<List>, current: usize) {
        self.mode = PromptMode::Move;
        self.list_cursor = current.min(lists.len().saturating_sub(1));
        self.lists = lists;
    }

    pub fn start_confirm(&mut self, mode: PromptMode, label: String) {
        self.mode = mode;
        self.confirm_label = label;
    }

    pub fn pick_prev(&mut self) {
        self.list_cursor = self.list_cursor.saturating_sub(1);
    }

    pub fn pick_next(&mut self) {
        if self.list_cursor + 1 < self.lists.len() {
            self.list_cursor += 1;
        }
    }

    pub fn picked_list(&self) -> Option<&List> {
        self.lists.get(self.list_cursor)
    }

    /// Trimmed buffer contents, `None` when blank.
    pub fn value(&self) -> Option<String> {
        let v = self.buffer.input.trim();
        (!v.is_empty()).then(|| v.to_string())
    }
}

/// Scratch ids for a multi-step operation; cleared on submit or cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationTarget {
    pub card_id: Option<String>,
    pub list_id: Option<String>,
}

impl OperationTarget {
    pub fn card(id: &str) -> Self {
        Self {
            card_id: Some(id.to_string()),
            list_id: None,
        }
    }

    pub fn list(id: &str) -> Self {
        Self {
            card_id: None,
            list_id: Some(id.to_string()),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(n: usize) -> Vec<List> {
        (0..n)
            .map(|i| List { id: format!("l{i}"), name: format!("List {i}") })
            .collect()
    }

    #[test]
    fn test_buffer_insert_and_cursor() {
        let mut b = TextBuffer::empty();
        b.insert('h');
        b.insert('i');
        assert_eq!(b.input, "hi");
        assert_eq!(b.cursor, 2);
        b.home();
        b.insert('>');
        assert_eq!(b.input, ">hi");
        assert_eq!(b.cursor, 1);
    }

    #[test]
    fn test_buffer_multibyte_editing() {
        let mut b = TextBuffer::new("héllo".into());
        b.move_left();
        b.move_left();
        b.move_left();
        b.backspace();
        assert_eq!(b.input, "hllo");
        b.delete();
        assert_eq!(b.input, "hlo");
        b.end();
        assert_eq!(b.cursor, 3);
    }

    #[test]
    fn test_buffer_delete_word() {
        let mut b = TextBuffer::new("move this card  ".into());
        b.delete_word();
        assert_eq!(b.input, "move this ");
        b.delete_word();
        assert_eq!(b.input, "move ");
    }

    #[test]
    fn test_buffer_blank_detection() {
        assert!(TextBuffer::new("   ".into()).is_blank());
        assert!(!TextBuffer::new(" x ".into()).is_blank());
    }

    #[test]
    fn test_value_is_trimmed() {
        let mut p = PromptState::default();
        p.start_text(PromptMode::Comment, "  lgtm  ");
        assert_eq!(p.value().as_deref(), Some("lgtm"));
        p.buffer.set("   ");
        assert_eq!(p.value(), None);
    }

    #[test]
    fn test_move_picker_bounds() {
        let mut p = PromptState::default();
        p.start_move(lists(3), 1);
        assert_eq!(p.picked_list().map(|l| l.id.as_str()), Some("l1"));
        p.pick_next();
        p.pick_next();
        assert_eq!(p.list_cursor, 2);
        p.pick_prev();
        p.pick_prev();
        p.pick_prev();
        assert_eq!(p.list_cursor, 0);
    }

    #[test]
    fn test_move_picker_start_clamped() {
        let mut p = PromptState::default();
        p.start_move(lists(2), 9);
        assert_eq!(p.list_cursor, 1);
        p.start_move(Vec::new(), 3);
        assert!(p.picked_list().is_none());
    }

    #[test]
    fn test_reset_returns_to_agent() {
        let mut p = PromptState::default();
        p.start_confirm(PromptMode::ConfirmArchiveList, "Done".into());
        p.buffer.set("stale");
        p.reset();
        assert_eq!(p, PromptState::default());
        assert_eq!(p.mode, PromptMode::Agent);
    }

    #[test]
    fn test_mode_kinds() {
        assert!(PromptMode::Agent.is_text());
        assert!(PromptMode::NewList.is_text());
        assert!(!PromptMode::Move.is_text());
        assert!(PromptMode::ConfirmArchiveCard.is_confirm());
        assert!(!PromptMode::Move.is_confirm());
        assert_eq!(PromptMode::NewCard.badge(), "card");
        assert_eq!(PromptMode::Rename.placeholder(), "new name...");
    }
}
