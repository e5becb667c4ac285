use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action::Action;
use crate::agent::AgentName;
use crate::app::{AppState, Focus, Mode};
use crate::prompt::PromptMode;

/// Map a key event to a semantic action.
///
/// Routing order: ctrl+c, the help overlay, global keys, then the table for the
/// current mode and focus.
pub fn map_key(key: KeyEvent, state: &AppState) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if !state.auth_configured {
        return match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        };
    }

    if state.help_visible {
        return match key.code {
            KeyCode::Char('?') | KeyCode::Esc => Action::CloseHelp,
            _ => Action::None,
        };
    }

    if let Some(action) = map_global(key, typing(state)) {
        return action;
    }

    match state.mode {
        Mode::BoardSelect => map_board_select(key),
        Mode::Kanban => match state.focus {
            Focus::Kanban => map_kanban(key),
            Focus::Drawer => map_drawer(key),
            Focus::Prompt => map_prompt(key, state.prompt.mode),
        },
    }
}

/// Whether keystrokes are going into a free-text buffer.
fn typing(state: &AppState) -> bool {
    state.mode == Mode::Kanban && state.focus == Focus::Prompt && state.prompt.mode.is_text()
}

fn map_global(key: KeyEvent, typing: bool) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('?') if !typing => Some(Action::ToggleHelp),
        KeyCode::Char('a') if ctrl => Some(Action::ToggleAgent),
        KeyCode::Char('r') if ctrl => Some(Action::Refresh),
        KeyCode::Char('b') if ctrl => Some(Action::OpenBoardSelector),
        _ => None,
    }
}

fn map_board_select(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevBoard,
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNextBoard,
        KeyCode::Enter => Action::OpenBoard,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

fn map_kanban(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::FocusPrevList,
        KeyCode::Char('l') | KeyCode::Right => Action::FocusNextList,
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNextCard,
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevCard,
        KeyCode::Enter => Action::OpenCard,
        KeyCode::Char('m') => Action::StartMove,
        KeyCode::Char('e') => Action::StartRename,
        KeyCode::Char('c') => Action::StartComment,
        KeyCode::Char('n') => Action::StartNewCard,
        KeyCode::Char('N') => Action::StartNewList,
        KeyCode::Char('x') => Action::StartArchiveCard,
        KeyCode::Char('X') => Action::StartArchiveList,
        KeyCode::Char('/') | KeyCode::Tab => Action::FocusPrompt,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('1') => Action::SelectAgent(AgentName::Codex),
        KeyCode::Char('2') => Action::SelectAgent(AgentName::Claude),
        KeyCode::Char('a') => Action::ToggleAgent,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('b') => Action::OpenBoardSelector,
        _ => Action::None,
    }
}

fn map_drawer(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::CloseDrawer,
        KeyCode::Tab => Action::FocusKanban,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollTranscriptDown,
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollTranscriptUp,
        KeyCode::Char('/') => Action::FocusPrompt,
        KeyCode::Char('m') => Action::StartMove,
        KeyCode::Char('e') => Action::StartRename,
        KeyCode::Char('c') => Action::StartComment,
        KeyCode::Char('x') => Action::StartArchiveCard,
        _ => Action::None,
    }
}

fn map_prompt(key: KeyEvent, mode: PromptMode) -> Action {
    if key.code == KeyCode::Tab {
        return Action::Cancel;
    }
    match mode {
        PromptMode::Move => map_picker(key),
        PromptMode::ConfirmArchiveCard | PromptMode::ConfirmArchiveList => map_confirm(key),
        _ => map_input(key),
    }
}

fn map_picker(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::PickPrevList,
        KeyCode::Char('l') | KeyCode::Right => Action::PickNextList,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

fn map_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') => Action::Submit,
        KeyCode::Char('n') | KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

fn map_input(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char('e') if ctrl => Action::InputEnd,
        KeyCode::Char('w') if ctrl => Action::InputDeleteWord,
        KeyCode::Char(_) if ctrl => Action::None,
        KeyCode::Char(c) => Action::InputChar(c),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Delete => Action::InputDelete,
        KeyCode::Left => Action::InputLeft,
        KeyCode::Right => Action::InputRight,
        KeyCode::Home => Action::InputHome,
        KeyCode::End => Action::InputEnd,
        _ => Action::None,
    }
}

// ---------------------------------------------------------------------------
// Binding registry: the help overlay renders straight from these tables.
// ---------------------------------------------------------------------------

/// A documented keybinding for display in help.
pub struct Binding {
    pub key: &'static str,
    pub description: &'static str,
}

/// A group of related bindings (one section in help).
pub struct BindingGroup {
    pub name: &'static str,
    pub bindings: &'static [Binding],
}

pub const KANBAN_BINDINGS: &[Binding] = &[
    Binding { key: "h/l  ←/→", description: "Move between lists" },
    Binding { key: "j/k  ↑/↓", description: "Move within list" },
    Binding { key: "enter", description: "Open card in drawer" },
    Binding { key: "m", description: "Move card (list picker)" },
    Binding { key: "e", description: "Rename card" },
    Binding { key: "c", description: "Comment on card" },
    Binding { key: "n", description: "New card in current list" },
    Binding { key: "N", description: "New list on board" },
    Binding { key: "x", description: "Archive card (confirm)" },
    Binding { key: "X", description: "Archive list (confirm)" },
    Binding { key: "/ or tab", description: "Ask the agent" },
    Binding { key: "1 / 2 / a", description: "codex / claude / toggle agent" },
    Binding { key: "r", description: "Refresh board" },
    Binding { key: "b", description: "Board selector" },
    Binding { key: "q", description: "Quit" },
];

pub const DRAWER_BINDINGS: &[Binding] = &[
    Binding { key: "j/k", description: "Scroll transcript" },
    Binding { key: "tab", description: "Focus kanban" },
    Binding { key: "/", description: "Ask the agent" },
    Binding { key: "m/e/c/x", description: "Card operations" },
    Binding { key: "esc", description: "Close drawer" },
];

pub const PROMPT_BINDINGS: &[Binding] = &[
    Binding { key: "enter", description: "Submit" },
    Binding { key: "esc / tab", description: "Cancel" },
    Binding { key: "h/l", description: "Pick list (move)" },
    Binding { key: "y / n", description: "Confirm / cancel archive" },
];

pub const BOARD_SELECT_BINDINGS: &[Binding] = &[
    Binding { key: "j/k", description: "Navigate boards" },
    Binding { key: "enter", description: "Open board" },
    Binding { key: "r", description: "Refresh boards" },
    Binding { key: "q", description: "Quit" },
];

pub const GLOBAL_BINDINGS: &[Binding] = &[
    Binding { key: "ctrl+c", description: "Quit" },
    Binding { key: "ctrl+a", description: "Toggle agent" },
    Binding { key: "ctrl+r", description: "Refresh" },
    Binding { key: "ctrl+b", description: "Board selector" },
    Binding { key: "?", description: "Toggle help" },
];

/// All binding groups for the help overlay.
pub const HELP_GROUPS: &[BindingGroup] = &[
    BindingGroup { name: "Kanban", bindings: KANBAN_BINDINGS },
    BindingGroup { name: "Drawer", bindings: DRAWER_BINDINGS },
    BindingGroup { name: "Prompt", bindings: PROMPT_BINDINGS },
    BindingGroup { name: "Boards", bindings: BOARD_SELECT_BINDINGS },
    BindingGroup { name: "Global", bindings: GLOBAL_BINDINGS },
];
