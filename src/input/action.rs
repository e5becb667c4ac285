use crate::agent::AgentName;

/// All possible semantic actions in boardhand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ToggleHelp,
    CloseHelp,
    ToggleAgent,
    SelectAgent(AgentName),
    Refresh,
    OpenBoardSelector,

    // Board selector
    SelectPrevBoard,
    SelectNextBoard,
    OpenBoard,

    // Kanban navigation
    FocusPrevList,
    FocusNextList,
    SelectPrevCard,
    SelectNextCard,
    OpenCard,

    // Operation start
    StartMove,
    StartRename,
    StartComment,
    StartNewCard,
    StartNewList,
    StartArchiveCard,
    StartArchiveList,
    FocusPrompt,

    // Drawer
    CloseDrawer,
    FocusKanban,
    ScrollTranscriptUp,
    ScrollTranscriptDown,

    // Prompt
    PickPrevList,
    PickNextList,
    Submit,
    Cancel,
    InputChar(char),
    InputBackspace,
    InputDelete,
    InputLeft,
    InputRight,
    InputHome,
    InputEnd,
    InputDeleteWord,

    // No-op
    None,
}
