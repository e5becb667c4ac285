use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::agent::actions::parse_reply;
use crate::agent::AgentName;
use crate::board::{BoardSnapshot, BoardSummary, Card, Kanban};
use crate::dispatch::{Dispatcher, Event, Intent, Mutation, MutationKind};
use crate::input::action::Action;
use crate::input::keymap::map_key;
use crate::prompt::{OperationTarget, PromptMode, PromptState};

pub const KANBAN_HINT: &str = "h/l: columns  j/k: cards  enter: open  ?: help";
const DRAWER_HINT: &str = "drawer open  tab: switch focus  esc: close";
const TRANSCRIPT_SCROLL_STEP: usize = 3;

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    BoardSelect,
    Kanban,
}

/// Which region receives keys in kanban mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Kanban,
    Drawer,
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub stamp: String,
    pub who: String,
    pub text: String,
}

/// Side panel: card detail plus the conversation/activity transcript.
#[derive(Debug, Clone, Default)]
pub struct Drawer {
    pub open: bool,
    pub card: Option<Card>,
    pub entries: Vec<TranscriptEntry>,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll: usize,
}

impl Drawer {
    pub fn append(&mut self, who: impl Into<String>, text: &str) {
        self.entries.push(TranscriptEntry {
            stamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            who: who.into(),
            text: text.trim().to_string(),
        });
        self.scroll = 0;
    }

    /// Unwrapped transcript lines: a `[stamp] who` header, the text, a blank separator.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(String::new());
            }
            out.push(format!("[{}] {}", entry.stamp, entry.who));
            out.extend(entry.text.lines().map(str::to_string));
        }
        out
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max = self.lines().len();
        self.scroll = (self.scroll + n).min(max);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }
}

/// Terminal size as last reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

/// Global application state.
pub struct AppState {
    pub mode: Mode,
    pub focus: Focus,
    pub active_agent: AgentName,
    pub status: String,
    pub error: Option<String>,
    pub loading: bool,
    pub agent_in_flight: bool,
    pub auth_configured: bool,

    pub boards: Vec<BoardSummary>,
    pub board_cursor: usize,
    pub board_id: String,
    pub board_name: String,

    pub kanban: Kanban,
    pub drawer: Drawer,
    pub prompt: PromptState,
    pub target: OperationTarget,
    pub pending_prompt: Option<String>,
    pub help_visible: bool,
    pub viewport: Viewport,
    pub should_quit: bool,
}

/// Everything the session reacts to.
#[derive(Debug, Clone)]
pub enum Msg {
    Action(Action),
    Resize { width: u16, height: u16 },
    Outcome(Event),
}

impl AppState {
    pub fn new(auth_configured: bool, board_id: Option<String>, agent: AgentName) -> Self {
        let board_id = board_id.unwrap_or_default();
        let mode = if board_id.is_empty() {
            Mode::BoardSelect
        } else {
            Mode::Kanban
        };
        Self {
            mode,
            focus: Focus::Kanban,
            active_agent: agent,
            status: "loading...".into(),
            error: None,
            loading: auth_configured,
            agent_in_flight: false,
            auth_configured,
            boards: Vec::new(),
            board_cursor: 0,
            board_id,
            board_name: String::new(),
            kanban: Kanban::default(),
            drawer: Drawer::default(),
            prompt: PromptState::default(),
            target: OperationTarget::default(),
            pending_prompt: None,
            help_visible: false,
            viewport: Viewport::default(),
            should_quit: false,
        }
    }

    /// Intents to issue at startup.
    pub fn initial_intents(&self) -> Vec<Intent> {
        if !self.auth_configured {
            return Vec::new();
        }
        if self.board_id.is_empty() {
            vec![Intent::LoadBoards]
        } else {
            vec![Intent::LoadBoardData {
                board_id: self.board_id.clone(),
                board_name: String::new(),
            }]
        }
    }

    pub fn notify(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Record a failure: the error text replaces the status in the header.
    pub fn notify_error(&mut self, status: impl Into<String>, error: impl Into<String>) {
        self.status = status.into();
        self.error = Some(error.into());
    }

    fn board_name_by_id(&self, id: &str) -> Option<&str> {
        self.boards
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.name.as_str())
    }

    fn recalc_layout(&mut self) {
        let width = crate::ui::kanban_width(self.viewport.width, self.drawer.open);
        self.kanban.set_width(width);
        let main = self
            .viewport
            .height
            .saturating_sub(crate::ui::HEADER_HEIGHT + crate::ui::PROMPT_HEIGHT);
        self.kanban.set_rows(crate::ui::board_view::card_rows(main));
    }

    fn set_agent(&mut self, next: AgentName) {
        if self.active_agent == next {
            return;
        }
        self.active_agent = next;
        self.status = format!("agent: {next}");
        let status = self.status.clone();
        self.drawer.append("system", &status);
    }
}

/// Apply one message to the session and return the intents it produces.
pub fn update(state: &mut AppState, msg: Msg) -> Vec<Intent> {
    match msg {
        Msg::Resize { width, height } => {
            state.viewport = Viewport { width, height };
            state.recalc_layout();
            Vec::new()
        }
        Msg::Action(action) => {
            if !state.auth_configured {
                if action == Action::Quit {
                    state.should_quit = true;
                }
                return Vec::new();
            }
            process_action(state, action)
        }
        Msg::Outcome(event) => apply_event(state, event),
    }
}

// ---------------------------------------------------------------------------
// Events from workers
// ---------------------------------------------------------------------------

fn apply_event(state: &mut AppState, event: Event) -> Vec<Intent> {
    match event {
        Event::BoardsLoaded(result) => {
            state.loading = false;
            match result {
                Err(e) => state.notify_error("failed to load boards", e),
                Ok(boards) => {
                    state.error = None;
                    state.board_cursor = state.board_cursor.min(boards.len().saturating_sub(1));
                    state.boards = boards;
                    if state.boards.is_empty() {
                        state.notify("no open boards found");
                    } else {
                        state.notify("select a board");
                    }
                }
            }
            Vec::new()
        }
        Event::BoardDataLoaded {
            board_id,
            board_name,
            result,
        } => {
            state.loading = false;
            match result {
                Err(e) => state.notify_error("failed to load board", e),
                Ok(snapshot) => load_snapshot(state, board_id, board_name, snapshot),
            }
            Vec::new()
        }
        Event::AgentResponded {
            agent,
            prompt,
            result,
        } => agent_responded(state, agent, prompt, result),
        Event::Mutated { kind, result } => mutated(state, kind, result),
    }
}

fn load_snapshot(state: &mut AppState, board_id: String, board_name: String, snapshot: BoardSnapshot) {
    let name = if board_name.is_empty() {
        state.board_name_by_id(&board_id).unwrap_or_default().to_string()
    } else {
        board_name
    };
    if board_id != state.board_id {
        state.drawer.card = None;
    }
    state.board_id = board_id;
    state.board_name = name;
    state.error = None;
    state.mode = Mode::Kanban;

    let no_lists = snapshot.lists.is_empty();
    state.kanban.set_data(snapshot);
    if let Some(open) = state.drawer.card.take() {
        state.drawer.card = Some(
            state
                .kanban
                .snapshot
                .find_card(&open.id)
                .cloned()
                .unwrap_or(open),
        );
    }
    state.recalc_layout();

    if no_lists {
        state.notify("board loaded (no lists)");
    } else {
        state.notify(KANBAN_HINT);
    }
}

fn agent_responded(
    state: &mut AppState,
    agent: AgentName,
    prompt: String,
    result: Result<String, String>,
) -> Vec<Intent> {
    state.agent_in_flight = false;
    let pending = state.pending_prompt.take();

    let reply = match result {
        Err(e) => {
            warn!(%agent, error = %e, "agent request failed");
            state.notify_error("agent failed", e.clone());
            let restore = pending.unwrap_or(prompt);
            if state.prompt.mode == PromptMode::Agent
                && state.prompt.buffer.is_blank()
                && !restore.trim().is_empty()
            {
                state.prompt.buffer.set(&restore);
            }
            state.drawer.append(format!("{agent} error"), &e);
            return Vec::new();
        }
        Ok(reply) => reply,
    };

    state.error = None;
    state.notify(format!("{agent} responded"));
    let parsed = parse_reply(&reply);
    state.drawer.append(agent.label(), &parsed.display);

    if parsed.actions.is_empty() {
        return Vec::new();
    }
    debug!(
        found = parsed.blocks_found,
        valid = parsed.actions.len(),
        "agent requested board actions"
    );
    state.notify(format!("executing {} action(s)...", parsed.actions.len()));
    let board_id = state.board_id.clone();
    parsed
        .actions
        .into_iter()
        .map(|a| Intent::Mutate(a.into_mutation(&board_id)))
        .collect()
}

fn mutated(state: &mut AppState, kind: MutationKind, result: Result<(), String>) -> Vec<Intent> {
    let label = kind.label();
    match result {
        Err(e) => {
            state.notify_error(format!("{label} failed"), e.clone());
            state.drawer.append("system", &format!("{label} failed: {e}"));
            Vec::new()
        }
        Ok(()) => {
            state.error = None;
            state.notify(format!("{label} ok"));
            state.drawer.append("system", &format!("{label} ok"));
            state.loading = true;
            vec![Intent::LoadBoardData {
                board_id: state.board_id.clone(),
                board_name: state.board_name.clone(),
            }]
        }
    }
}

// ---------------------------------------------------------------------------
// Key actions
// ---------------------------------------------------------------------------

fn process_action(state: &mut AppState, action: Action) -> Vec<Intent> {
    match action {
        Action::None => Vec::new(),
        Action::Quit => {
            state.should_quit = true;
            Vec::new()
        }
        Action::ToggleHelp => {
            state.help_visible = !state.help_visible;
            Vec::new()
        }
        Action::CloseHelp => {
            state.help_visible = false;
            Vec::new()
        }
        Action::ToggleAgent => {
            let next = state.active_agent.toggle();
            state.set_agent(next);
            Vec::new()
        }
        Action::SelectAgent(agent) => {
            state.set_agent(agent);
            Vec::new()
        }
        Action::Refresh => refresh(state),
        Action::OpenBoardSelector => {
            if state.focus == Focus::Prompt {
                cancel_prompt(state);
            }
            open_board_selector(state)
        }

        Action::SelectPrevBoard
        | Action::SelectNextBoard
        | Action::OpenBoard => handle_board_select(state, action),

        Action::FocusPrevList
        | Action::FocusNextList
        | Action::SelectPrevCard
        | Action::SelectNextCard
        | Action::OpenCard => {
            handle_navigation(state, action);
            Vec::new()
        }

        Action::StartMove
        | Action::StartRename
        | Action::StartComment
        | Action::StartNewCard
        | Action::StartNewList
        | Action::StartArchiveCard
        | Action::StartArchiveList
        | Action::FocusPrompt => {
            handle_operation_start(state, action);
            Vec::new()
        }

        Action::CloseDrawer
        | Action::FocusKanban
        | Action::ScrollTranscriptUp
        | Action::ScrollTranscriptDown => {
            handle_drawer(state, action);
            Vec::new()
        }

        Action::PickPrevList => {
            state.prompt.pick_prev();
            Vec::new()
        }
        Action::PickNextList => {
            state.prompt.pick_next();
            Vec::new()
        }
        Action::Cancel => {
            cancel_prompt(state);
            Vec::new()
        }
        Action::Submit => submit(state),

        Action::InputChar(_)
        | Action::InputBackspace
        | Action::InputDelete
        | Action::InputLeft
        | Action::InputRight
        | Action::InputHome
        | Action::InputEnd
        | Action::InputDeleteWord => {
            handle_input(state, action);
            Vec::new()
        }
    }
}

fn refresh(state: &mut AppState) -> Vec<Intent> {
    if state.mode == Mode::BoardSelect {
        state.loading = true;
        state.error = None;
        state.notify("refreshing boards...");
        return vec![Intent::LoadBoards];
    }
    if !state.board_id.is_empty() {
        state.loading = true;
        state.error = None;
        state.notify("refreshing board...");
        return vec![Intent::LoadBoardData {
            board_id: state.board_id.clone(),
            board_name: state.board_name.clone(),
        }];
    }
    open_board_selector(state)
}

fn open_board_selector(state: &mut AppState) -> Vec<Intent> {
    state.mode = Mode::BoardSelect;
    if !state.boards.is_empty() {
        state.notify("select a board");
        return Vec::new();
    }
    state.loading = true;
    state.error = None;
    state.notify("loading boards...");
    vec![Intent::LoadBoards]
}

fn handle_board_select(state: &mut AppState, action: Action) -> Vec<Intent> {
    match action {
        Action::SelectPrevBoard => {
            state.board_cursor = state.board_cursor.saturating_sub(1);
        }
        Action::SelectNextBoard => {
            if state.board_cursor + 1 < state.boards.len() {
                state.board_cursor += 1;
            }
        }
        Action::OpenBoard => {
            if let Some(board) = state.boards.get(state.board_cursor).cloned() {
                state.loading = true;
                state.notify(format!("loading {:?}...", board.name));
                info!(board = %board.id, "opening board");
                return vec![Intent::LoadBoardData {
                    board_id: board.id,
                    board_name: board.name,
                }];
            }
        }
        _ => {}
    }
    Vec::new()
}

fn handle_navigation(state: &mut AppState, action: Action) {
    match action {
        Action::FocusPrevList => state.kanban.move_prev_list(),
        Action::FocusNextList => state.kanban.move_next_list(),
        Action::SelectPrevCard => state.kanban.move_prev_card(),
        Action::SelectNextCard => state.kanban.move_next_card(),
        Action::OpenCard => {
            if let Some(card) = state.kanban.selected_card().cloned() {
                state.kanban.context_card = Some(card.id.clone());
                state.drawer.card = Some(card);
                state.drawer.open = true;
                state.focus = Focus::Drawer;
                state.recalc_layout();
                state.notify(DRAWER_HINT);
            }
        }
        _ => {}
    }
}

fn handle_operation_start(state: &mut AppState, action: Action) {
    let card = state
        .kanban
        .selected_card()
        .map(|c| (c.id.clone(), c.name.clone()));
    let list = state
        .kanban
        .active_list()
        .map(|l| (l.id.clone(), l.name.clone()));

    match action {
        Action::FocusPrompt => {
            state.prompt.mode = PromptMode::Agent;
            state.focus = Focus::Prompt;
            state.notify(format!("enter: ask {}  esc: cancel", state.active_agent));
        }
        Action::StartNewList => {
            state.target.clear();
            state.prompt.start_text(PromptMode::NewList, "");
            state.focus = Focus::Prompt;
            state.notify("enter: create list  esc: cancel");
        }
        Action::StartNewCard | Action::StartArchiveList => {
            let Some((list_id, list_name)) = list else {
                state.notify("no list selected");
                return;
            };
            state.target = OperationTarget::list(&list_id);
            if action == Action::StartNewCard {
                state.prompt.start_text(PromptMode::NewCard, "");
                state.notify("enter: create card  esc: cancel");
            } else {
                state
                    .prompt
                    .start_confirm(PromptMode::ConfirmArchiveList, crate::ui::truncate(&list_name, 30));
                state.notify("y: archive list  n/esc: cancel");
            }
            state.focus = Focus::Prompt;
        }
        _ => {
            let Some((card_id, card_name)) = card else {
                state.notify("no card selected");
                return;
            };
            state.target = OperationTarget::card(&card_id);
            match action {
                Action::StartMove => {
                    let lists = state.kanban.lists().to_vec();
                    state.prompt.start_move(lists, state.kanban.active_list_index());
                    state.notify("h/l: pick list  enter: confirm  esc: cancel");
                }
                Action::StartRename => {
                    state.prompt.start_text(PromptMode::Rename, &card_name);
                    state.notify("enter: rename  esc: cancel");
                }
                Action::StartComment => {
                    state.prompt.start_text(PromptMode::Comment, "");
                    state.notify("enter: add comment  esc: cancel");
                }
                _ => {
                    state
                        .prompt
                        .start_confirm(PromptMode::ConfirmArchiveCard, crate::ui::truncate(&card_name, 30));
                    state.notify("y: archive  n/esc: cancel");
                }
            }
            state.focus = Focus::Prompt;
        }
    }
}

fn handle_drawer(state: &mut AppState, action: Action) {
    match action {
        Action::CloseDrawer => {
            state.drawer.open = false;
            state.focus = Focus::Kanban;
            state.recalc_layout();
            state.notify(KANBAN_HINT);
        }
        Action::FocusKanban => state.focus = Focus::Kanban,
        Action::ScrollTranscriptUp => state.drawer.scroll_up(TRANSCRIPT_SCROLL_STEP),
        Action::ScrollTranscriptDown => state.drawer.scroll_down(TRANSCRIPT_SCROLL_STEP),
        _ => {}
    }
}

fn handle_input(state: &mut AppState, action: Action) {
    if !state.prompt.mode.is_text() {
        return;
    }
    let buf = &mut state.prompt.buffer;
    match action {
        Action::InputChar(c) => buf.insert(c),
        Action::InputBackspace => buf.backspace(),
        Action::InputDelete => buf.delete(),
        Action::InputLeft => buf.move_left(),
        Action::InputRight => buf.move_right(),
        Action::InputHome => buf.home(),
        Action::InputEnd => buf.end(),
        Action::InputDeleteWord => buf.delete_word(),
        _ => {}
    }
}

/// Reset the prompt and hand focus back to where it came from.
fn cancel_prompt(state: &mut AppState) {
    state.prompt.reset();
    state.target.clear();
    state.focus = if state.drawer.open {
        Focus::Drawer
    } else {
        Focus::Kanban
    };
    state.notify(KANBAN_HINT);
}

fn submit(state: &mut AppState) -> Vec<Intent> {
    match state.prompt.mode {
        PromptMode::Move => submit_move(state),
        PromptMode::ConfirmArchiveCard => {
            let card_id = state.target.card_id.clone();
            cancel_prompt(state);
            match card_id {
                Some(card_id) => {
                    state.notify("archiving card...");
                    vec![Intent::Mutate(Mutation::ArchiveCard { card_id })]
                }
                None => Vec::new(),
            }
        }
        PromptMode::ConfirmArchiveList => {
            let list_id = state.target.list_id.clone();
            cancel_prompt(state);
            match list_id {
                Some(list_id) => {
                    state.notify("archiving list...");
                    vec![Intent::Mutate(Mutation::ArchiveList { list_id })]
                }
                None => Vec::new(),
            }
        }
        _ => submit_text(state),
    }
}

fn submit_move(state: &mut AppState) -> Vec<Intent> {
    let list_id = state.prompt.picked_list().map(|l| l.id.clone());
    let card_id = state.target.card_id.clone();
    cancel_prompt(state);
    match (card_id, list_id) {
        (Some(card_id), Some(list_id)) => {
            state.notify("moving card...");
            vec![Intent::Mutate(Mutation::MoveCard { card_id, list_id })]
        }
        _ => {
            state.notify("move cancelled");
            Vec::new()
        }
    }
}

fn submit_text(state: &mut AppState) -> Vec<Intent> {
    let Some(value) = state.prompt.value() else {
        state.notify("input is empty");
        return Vec::new();
    };

    let mode = state.prompt.mode;
    if mode == PromptMode::Agent {
        return send_agent_prompt(state, value);
    }

    let card_id = state.target.card_id.clone();
    let list_id = state.target.list_id.clone();
    cancel_prompt(state);

    let (status, mutation) = match (mode, card_id, list_id) {
        (PromptMode::Rename, Some(card_id), _) => (
            "renaming card...",
            Mutation::UpdateCard {
                card_id,
                name: Some(value),
                desc: None,
            },
        ),
        (PromptMode::Comment, Some(card_id), _) => (
            "adding comment...",
            Mutation::AddComment { card_id, text: value },
        ),
        (PromptMode::NewCard, _, Some(list_id)) => (
            "creating card...",
            Mutation::CreateCard { list_id, name: value },
        ),
        (PromptMode::NewList, _, _) => (
            "creating list...",
            Mutation::CreateList {
                board_id: state.board_id.clone(),
                name: value,
            },
        ),
        _ => return Vec::new(),
    };
    state.notify(status);
    vec![Intent::Mutate(mutation)]
}

fn send_agent_prompt(state: &mut AppState, prompt: String) -> Vec<Intent> {
    if state.agent_in_flight {
        state.notify("agent request in progress...");
        return Vec::new();
    }

    let context = state.kanban.context_summary(&state.board_name, &state.board_id);
    state.agent_in_flight = true;
    state.notify(format!("running {}...", state.active_agent));
    state.pending_prompt = Some(prompt.clone());
    state.drawer.append("you", &prompt);
    state.prompt.buffer.clear();

    if !state.drawer.open {
        state.drawer.open = true;
        state.recalc_layout();
    }
    state.focus = Focus::Drawer;

    vec![Intent::AskAgent {
        agent: state.active_agent,
        context,
        prompt,
    }]
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Drain every event the workers have delivered so far.
fn drain_events(
    state: &mut AppState,
    receiver: &mut UnboundedReceiver<Event>,
    dispatcher: &Dispatcher,
) {
    loop {
        match receiver.try_recv() {
            Ok(event) => dispatcher.dispatch_all(update(state, Msg::Outcome(event))),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                warn!("event channel closed unexpectedly");
                break;
            }
        }
    }
}

/// Main TUI application loop.
pub fn run(
    terminal: &mut DefaultTerminal,
    mut state: AppState,
    dispatcher: &Dispatcher,
    mut receiver: UnboundedReceiver<Event>,
) -> color_eyre::Result<()> {
    let size = terminal.size()?;
    update(
        &mut state,
        Msg::Resize {
            width: size.width,
            height: size.height,
        },
    );
    dispatcher.dispatch_all(state.initial_intents());

    loop {
        drain_events(&mut state, &mut receiver, dispatcher);

        terminal.draw(|f| crate::ui::render(f, &state))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = map_key(key, &state);
                    dispatcher.dispatch_all(update(&mut state, Msg::Action(action)));
                }
                TermEvent::Resize(width, height) => {
                    update(&mut state, Msg::Resize { width, height });
                }
                _ => {}
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{List, COLUMN_WIDTH};

    fn card(id: &str, list_id: &str) -> Card {
        Card {
            id: id.into(),
            list_id: list_id.into(),
            list_name: list_id.to_uppercase(),
            name: format!("Card {id}"),
            short_url: format!("https://trello.test/{id}"),
            ..Card::default()
        }
    }

    /// Build a snapshot from `(list_id, card_count)` pairs. Card ids are `<list>-<n>`.
    fn snapshot(board_id: &str, lists: &[(&str, usize)]) -> BoardSnapshot {
        let mut cards = Vec::new();
        for (list_id, n) in lists {
            for i in 0..*n {
                cards.push(card(&format!("{list_id}-{i}"), list_id));
            }
        }
        BoardSnapshot::new(
            board_id,
            lists
                .iter()
                .map(|(id, _)| List { id: id.to_string(), name: id.to_uppercase() })
                .collect(),
            cards,
        )
    }

    fn loaded(result: BoardSnapshot) -> Msg {
        Msg::Outcome(Event::BoardDataLoaded {
            board_id: result.board_id.clone(),
            board_name: "Roadmap".into(),
            result: Ok(result),
        })
    }

    /// A session with board b1 loaded and a sized terminal.
    fn kanban_state(lists: &[(&str, usize)]) -> AppState {
        let mut state = AppState::new(true, Some("b1".into()), AgentName::Codex);
        update(&mut state, Msg::Resize { width: 120, height: 40 });
        update(&mut state, loaded(snapshot("b1", lists)));
        state
    }

    fn act(state: &mut AppState, action: Action) -> Vec<Intent> {
        update(state, Msg::Action(action))
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            act(state, Action::InputChar(c));
        }
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    #[test]
    fn test_initial_state_without_board() {
        let state = AppState::new(true, None, AgentName::Codex);
        assert_eq!(state.mode, Mode::BoardSelect);
        assert_eq!(state.initial_intents(), vec![Intent::LoadBoards]);
        assert!(state.loading);
    }

    #[test]
    fn test_initial_state_with_board() {
        let state = AppState::new(true, Some("b9".into()), AgentName::Claude);
        assert_eq!(state.mode, Mode::Kanban);
        assert_eq!(state.focus, Focus::Kanban);
        assert_eq!(
            state.initial_intents(),
            vec![Intent::LoadBoardData { board_id: "b9".into(), board_name: String::new() }]
        );
    }

    #[test]
    fn test_unconfigured_auth_never_dispatches() {
        let mut state = AppState::new(false, Some("b1".into()), AgentName::Codex);
        assert!(state.initial_intents().is_empty());
        assert!(act(&mut state, Action::Refresh).is_empty());
        assert!(act(&mut state, Action::OpenBoardSelector).is_empty());
        act(&mut state, Action::Quit);
        assert!(state.should_quit);
    }

    // -----------------------------------------------------------------------
    // Board selection
    // -----------------------------------------------------------------------

    #[test]
    fn test_boards_loaded_does_not_change_mode() {
        let mut state = kanban_state(&[("l1", 1)]);
        update(
            &mut state,
            Msg::Outcome(Event::BoardsLoaded(Ok(vec![BoardSummary { id: "b2".into(), name: "Ops".into() }]))),
        );
        assert_eq!(state.mode, Mode::Kanban);
        assert_eq!(state.boards.len(), 1);
    }

    #[test]
    fn test_open_board_waits_for_load() {
        let mut state = AppState::new(true, None, AgentName::Codex);
        update(
            &mut state,
            Msg::Outcome(Event::BoardsLoaded(Ok(vec![
                BoardSummary { id: "b1".into(), name: "Roadmap".into() },
                BoardSummary { id: "b2".into(), name: "Ops".into() },
            ]))),
        );
        assert_eq!(state.status, "select a board");
        act(&mut state, Action::SelectNextBoard);
        act(&mut state, Action::SelectNextBoard);
        let intents = act(&mut state, Action::OpenBoard);
        assert_eq!(
            intents,
            vec![Intent::LoadBoardData { board_id: "b2".into(), board_name: "Ops".into() }]
        );
        assert_eq!(state.mode, Mode::BoardSelect);
        assert_eq!(state.status, "loading \"Ops\"...");

        update(
            &mut state,
            Msg::Outcome(Event::BoardDataLoaded {
                board_id: "b2".into(),
                board_name: "Ops".into(),
                result: Err("trello returned 404 Not Found: ".into()),
            }),
        );
        assert_eq!(state.mode, Mode::BoardSelect);
        assert_eq!(state.status, "failed to load board");

        update(&mut state, loaded(snapshot("b2", &[("l1", 0)])));
        assert_eq!(state.mode, Mode::Kanban);
        assert_eq!(state.board_id, "b2");
    }

    #[test]
    fn test_board_name_resolved_from_board_list() {
        let mut state = AppState::new(true, Some("b2".into()), AgentName::Codex);
        state.boards = vec![BoardSummary { id: "b2".into(), name: "Ops".into() }];
        update(
            &mut state,
            Msg::Outcome(Event::BoardDataLoaded {
                board_id: "b2".into(),
                board_name: String::new(),
                result: Ok(snapshot("b2", &[])),
            }),
        );
        assert_eq!(state.board_name, "Ops");
        assert_eq!(state.status, "board loaded (no lists)");
    }

    #[test]
    fn test_board_selector_reuses_loaded_boards() {
        let mut state = kanban_state(&[("l1", 1)]);
        assert_eq!(act(&mut state, Action::OpenBoardSelector), vec![Intent::LoadBoards]);
        state.boards = vec![BoardSummary { id: "b1".into(), name: "Roadmap".into() }];
        state.mode = Mode::Kanban;
        assert!(act(&mut state, Action::OpenBoardSelector).is_empty());
        assert_eq!(state.mode, Mode::BoardSelect);
    }

    #[test]
    fn test_board_switch_cancels_prompt() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::StartComment);
        assert_eq!(state.focus, Focus::Prompt);
        act(&mut state, Action::OpenBoardSelector);
        assert_eq!(state.mode, Mode::BoardSelect);
        assert_eq!(state.focus, Focus::Kanban);
        assert_eq!(state.target, OperationTarget::default());
        assert_eq!(state.prompt.mode, PromptMode::Agent);
    }

    #[test]
    fn test_refresh_by_mode() {
        let mut state = kanban_state(&[("l1", 1)]);
        assert_eq!(
            act(&mut state, Action::Refresh),
            vec![Intent::LoadBoardData { board_id: "b1".into(), board_name: "Roadmap".into() }]
        );
        state.mode = Mode::BoardSelect;
        assert_eq!(act(&mut state, Action::Refresh), vec![Intent::LoadBoards]);
    }

    // -----------------------------------------------------------------------
    // Snapshot replacement
    // -----------------------------------------------------------------------

    #[test]
    fn test_reload_clamps_cursor_after_list_removed() {
        let mut state = kanban_state(&[("l1", 3), ("l2", 0)]);
        act(&mut state, Action::FocusNextList);
        assert_eq!(state.kanban.active_list_index(), 1);
        update(&mut state, loaded(snapshot("b1", &[("l1", 3)])));
        assert_eq!(state.kanban.active_list_index(), 0);
        assert_eq!(state.kanban.card_cursor("l1"), 0);
    }

    #[test]
    fn test_reload_refreshes_open_drawer_card() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::OpenCard);
        assert_eq!(state.kanban.context_card.as_deref(), Some("l1-0"));
        let mut snap = snapshot("b1", &[("l1", 1)]);
        if let Some(cards) = snap.cards.get_mut("l1") {
            cards[0].name = "Renamed".into();
        }
        update(&mut state, loaded(snap));
        assert_eq!(state.drawer.card.as_ref().map(|c| c.name.as_str()), Some("Renamed"));
        assert!(state.kanban.context_card.is_none());
    }

    // -----------------------------------------------------------------------
    // Navigation and drawer
    // -----------------------------------------------------------------------

    #[test]
    fn test_open_card_focuses_drawer_and_narrows_kanban() {
        let mut state = kanban_state(&[("l1", 2), ("l2", 1), ("l3", 0), ("l4", 0), ("l5", 0)]);
        assert_eq!(state.kanban.visible_columns(), (120 / COLUMN_WIDTH) as usize);
        act(&mut state, Action::SelectNextCard);
        act(&mut state, Action::OpenCard);
        assert_eq!(state.focus, Focus::Drawer);
        assert!(state.drawer.open);
        assert_eq!(state.drawer.card.as_ref().map(|c| c.id.as_str()), Some("l1-1"));
        assert_eq!(state.kanban.visible_columns(), 2);

        act(&mut state, Action::CloseDrawer);
        assert_eq!(state.focus, Focus::Kanban);
        assert_eq!(state.status, KANBAN_HINT);
    }

    #[test]
    fn test_open_card_on_empty_list_is_noop() {
        let mut state = kanban_state(&[("l1", 0)]);
        act(&mut state, Action::OpenCard);
        assert_eq!(state.focus, Focus::Kanban);
        assert!(!state.drawer.open);
    }

    #[test]
    fn test_transcript_scroll() {
        let mut state = kanban_state(&[("l1", 1)]);
        for i in 0..5 {
            state.drawer.append("system", &format!("line {i}"));
        }
        act(&mut state, Action::ScrollTranscriptUp);
        assert_eq!(state.drawer.scroll, 3);
        act(&mut state, Action::ScrollTranscriptDown);
        act(&mut state, Action::ScrollTranscriptDown);
        assert_eq!(state.drawer.scroll, 0);
        state.drawer.scroll = 2;
        state.drawer.append("you", "hi");
        assert_eq!(state.drawer.scroll, 0);
    }

    #[test]
    fn test_agent_selection() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::SelectAgent(AgentName::Codex));
        assert!(state.drawer.entries.is_empty());
        act(&mut state, Action::ToggleAgent);
        assert_eq!(state.active_agent, AgentName::Claude);
        assert_eq!(state.status, "agent: claude");
        assert_eq!(state.drawer.entries.last().map(|e| e.who.as_str()), Some("system"));
    }

    #[test]
    fn test_help_toggle() {
        let mut state = kanban_state(&[]);
        act(&mut state, Action::ToggleHelp);
        assert!(state.help_visible);
        act(&mut state, Action::CloseHelp);
        assert!(!state.help_visible);
        assert_eq!(state.mode, Mode::Kanban);
    }

    // -----------------------------------------------------------------------
    // Prompt operations
    // -----------------------------------------------------------------------

    #[test]
    fn test_operations_need_a_selection() {
        let mut state = kanban_state(&[]);
        for action in [Action::StartMove, Action::StartRename, Action::StartComment, Action::StartArchiveCard] {
            act(&mut state, action);
            assert_eq!(state.status, "no card selected");
            assert_eq!(state.focus, Focus::Kanban);
        }
        for action in [Action::StartNewCard, Action::StartArchiveList] {
            act(&mut state, action);
            assert_eq!(state.status, "no list selected");
            assert_eq!(state.focus, Focus::Kanban);
        }
    }

    #[test]
    fn test_move_card_via_picker() {
        let mut state = kanban_state(&[("l1", 1), ("l2", 0), ("l3", 0)]);
        act(&mut state, Action::StartMove);
        assert_eq!(state.focus, Focus::Prompt);
        assert_eq!(state.prompt.mode, PromptMode::Move);
        assert_eq!(state.target.card_id.as_deref(), Some("l1-0"));
        act(&mut state, Action::PickNextList);
        act(&mut state, Action::PickNextList);
        let intents = act(&mut state, Action::Submit);
        assert_eq!(
            intents,
            vec![Intent::Mutate(Mutation::MoveCard { card_id: "l1-0".into(), list_id: "l3".into() })]
        );
        assert_eq!(state.focus, Focus::Kanban);
        assert_eq!(state.target, OperationTarget::default());
        assert_eq!(state.status, "moving card...");
    }

    #[test]
    fn test_rename_prefills_and_returns_to_drawer() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::OpenCard);
        act(&mut state, Action::StartRename);
        assert_eq!(state.prompt.buffer.input, "Card l1-0");
        act(&mut state, Action::InputDeleteWord);
        type_text(&mut state, "renamed");
        let intents = act(&mut state, Action::Submit);
        assert_eq!(
            intents,
            vec![Intent::Mutate(Mutation::UpdateCard {
                card_id: "l1-0".into(),
                name: Some("Card renamed".into()),
                desc: None,
            })]
        );
        assert_eq!(state.focus, Focus::Drawer);
    }

    #[test]
    fn test_empty_text_submit_rejected() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::StartComment);
        type_text(&mut state, "   ");
        assert!(act(&mut state, Action::Submit).is_empty());
        assert_eq!(state.status, "input is empty");
        assert_eq!(state.focus, Focus::Prompt);
    }

    #[test]
    fn test_new_card_and_list() {
        let mut state = kanban_state(&[("l1", 0), ("l2", 0)]);
        act(&mut state, Action::FocusNextList);
        act(&mut state, Action::StartNewCard);
        type_text(&mut state, "Ship it");
        assert_eq!(
            act(&mut state, Action::Submit),
            vec![Intent::Mutate(Mutation::CreateCard { list_id: "l2".into(), name: "Ship it".into() })]
        );

        act(&mut state, Action::StartNewList);
        type_text(&mut state, " Done ");
        assert_eq!(
            act(&mut state, Action::Submit),
            vec![Intent::Mutate(Mutation::CreateList { board_id: "b1".into(), name: "Done".into() })]
        );
    }

    #[test]
    fn test_archive_confirm_and_cancel() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::StartArchiveCard);
        assert_eq!(state.prompt.confirm_label, "Card l1-0");
        act(&mut state, Action::Cancel);
        assert_eq!(state.focus, Focus::Kanban);
        assert_eq!(state.target, OperationTarget::default());

        act(&mut state, Action::StartArchiveList);
        assert_eq!(
            act(&mut state, Action::Submit),
            vec![Intent::Mutate(Mutation::ArchiveList { list_id: "l1".into() })]
        );
    }

    #[test]
    fn test_typing_ignored_outside_text_modes() {
        let mut state = kanban_state(&[("l1", 1)]);
        act(&mut state, Action::StartMove);
        act(&mut state, Action::InputChar('z'));
        assert!(state.prompt.buffer.input.is_empty());
    }

    // -----------------------------------------------------------------------
    // Agent round trip
    // -----------------------------------------------------------------------

    fn ask(state: &mut AppState, text: &str) -> Vec<Intent> {
        act(state, Action::FocusPrompt);
        type_text(state, text);
        act(state, Action::Submit)
    }

    #[test]
    fn test_agent_submit_opens_drawer() {
        let mut state = kanban_state(&[("l1", 1)]);
        let intents = ask(&mut state, "summarize");
        assert_eq!(intents.len(), 1);
        match &intents[0] {
            Intent::AskAgent { agent, context, prompt } => {
                assert_eq!(*agent, AgentName::Codex);
                assert_eq!(prompt, "summarize");
                assert!(context.starts_with("Board: Roadmap (id: b1)"));
            }
            other => panic!("unexpected intent: {other:?}"),
        }
        assert!(state.agent_in_flight);
        assert!(state.drawer.open);
        assert_eq!(state.focus, Focus::Drawer);
        assert!(state.prompt.buffer.input.is_empty());
        assert_eq!(state.drawer.entries.last().map(|e| e.who.as_str()), Some("you"));
        assert_eq!(state.status, "running codex...");
    }

    #[test]
    fn test_second_agent_submit_is_rejected() {
        let mut state = kanban_state(&[("l1", 1)]);
        assert_eq!(ask(&mut state, "first").len(), 1);
        let entries = state.drawer.entries.len();
        let intents = ask(&mut state, "second");
        assert!(intents.is_empty());
        assert_eq!(state.status, "agent request in progress...");
        assert_eq!(state.drawer.entries.len(), entries);
        assert_eq!(state.prompt.buffer.input, "second");
        assert_eq!(state.pending_prompt.as_deref(), Some("first"));
    }

    #[test]
    fn test_agent_reply_with_actions_dispatches_batch() {
        let mut state = kanban_state(&[("l1", 1), ("l2", 0)]);
        ask(&mut state, "move it");
        let reply = concat!(
            "Moving it. ",
            r#"<action>{"type":"move_card","card_id":"l1-0","list_id":"l2"}</action>"#,
            r#"<action>{"type":"create_list","name":"Done"}</action>"#,
            r#"<action>{"type":"bogus"}</action>"#,
        );
        let intents = update(
            &mut state,
            Msg::Outcome(Event::AgentResponded {
                agent: AgentName::Codex,
                prompt: "move it".into(),
                result: Ok(reply.into()),
            }),
        );
        assert_eq!(
            intents,
            vec![
                Intent::Mutate(Mutation::MoveCard { card_id: "l1-0".into(), list_id: "l2".into() }),
                Intent::Mutate(Mutation::CreateList { board_id: "b1".into(), name: "Done".into() }),
            ]
        );
        assert!(!state.agent_in_flight);
        assert!(state.pending_prompt.is_none());
        assert_eq!(state.status, "executing 2 action(s)...");
        let last = state.drawer.entries.last().unwrap();
        assert_eq!(last.who, "codex");
        assert_eq!(last.text, "Moving it.");
    }

    #[test]
    fn test_agent_reply_without_actions() {
        let mut state = kanban_state(&[("l1", 1)]);
        ask(&mut state, "hello");
        let intents = update(
            &mut state,
            Msg::Outcome(Event::AgentResponded {
                agent: AgentName::Codex,
                prompt: "hello".into(),
                result: Ok("  hi there  ".into()),
            }),
        );
        assert!(intents.is_empty());
        assert_eq!(state.status, "codex responded");
        assert_eq!(state.drawer.entries.last().map(|e| e.text.as_str()), Some("hi there"));
    }

    #[test]
    fn test_agent_failure_restores_prompt() {
        let mut state = kanban_state(&[("l1", 1)]);
        ask(&mut state, "do the thing");
        let intents = update(
            &mut state,
            Msg::Outcome(Event::AgentResponded {
                agent: AgentName::Codex,
                prompt: "do the thing".into(),
                result: Err("agent command failed: exit status: 1".into()),
            }),
        );
        assert!(intents.is_empty());
        assert!(!state.agent_in_flight);
        assert_eq!(state.prompt.buffer.input, "do the thing");
        assert_eq!(state.error.as_deref(), Some("agent command failed: exit status: 1"));
        assert_eq!(state.status, "agent failed");
        assert_eq!(state.drawer.entries.last().map(|e| e.who.as_str()), Some("codex error"));
    }

    #[test]
    fn test_agent_failure_keeps_newer_typing() {
        let mut state = kanban_state(&[("l1", 1)]);
        ask(&mut state, "first");
        act(&mut state, Action::FocusPrompt);
        type_text(&mut state, "draft");
        update(
            &mut state,
            Msg::Outcome(Event::AgentResponded {
                agent: AgentName::Codex,
                prompt: "first".into(),
                result: Err("boom".into()),
            }),
        );
        assert_eq!(state.prompt.buffer.input, "draft");
    }

    // -----------------------------------------------------------------------
    // Mutation completion
    // -----------------------------------------------------------------------

    #[test]
    fn test_successful_mutation_reloads_once() {
        let mut state = kanban_state(&[("l1", 1)]);
        let intents = update(
            &mut state,
            Msg::Outcome(Event::Mutated { kind: MutationKind::CardMove, result: Ok(()) }),
        );
        assert_eq!(
            intents,
            vec![Intent::LoadBoardData { board_id: "b1".into(), board_name: "Roadmap".into() }]
        );
        assert!(state.loading);
        assert_eq!(state.status, "card move ok");
        assert!(state.error.is_none());
    }

    #[test]
    fn test_failed_mutation_keeps_snapshot() {
        let mut state = kanban_state(&[("l1", 2)]);
        act(&mut state, Action::SelectNextCard);
        let intents = update(
            &mut state,
            Msg::Outcome(Event::Mutated {
                kind: MutationKind::ListArchive,
                result: Err("trello returned 401 Unauthorized: ".into()),
            }),
        );
        assert!(intents.is_empty());
        assert_eq!(state.status, "list archive failed");
        assert!(state.error.is_some());
        assert_eq!(state.kanban.card_cursor("l1"), 1);
        assert_eq!(
            state.drawer.entries.last().map(|e| e.text.as_str()),
            Some("list archive failed: trello returned 401 Unauthorized:")
        );
    }

    #[test]
    fn test_resize_reclamps_scroll() {
        let mut state = kanban_state(&[("a", 0), ("b", 0), ("c", 0), ("d", 0), ("e", 0), ("f", 0)]);
        update(&mut state, Msg::Resize { width: COLUMN_WIDTH * 2, height: 30 });
        for _ in 0..5 {
            act(&mut state, Action::FocusNextList);
        }
        assert_eq!(state.kanban.cursor.scroll_offset, 4);
        update(&mut state, Msg::Resize { width: COLUMN_WIDTH * 6, height: 30 });
        assert_eq!(state.kanban.cursor.scroll_offset, 0);
    }
}
