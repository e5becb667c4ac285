//! Intents, events, and the dispatcher that turns one into the other.
//!
//! Every intent runs on its own tokio task with a fixed timeout and sends
//! exactly one [`Event`] back over the loop's channel. Workers own only what
//! the intent carried; they never see the session state.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::agent::{AgentInvoker, AgentName};
use crate::board::api::BoardApi;
use crate::board::{BoardSnapshot, BoardSummary};

pub const LIST_BOARDS_TIMEOUT: Duration = Duration::from_secs(12);
pub const BOARD_DATA_TIMEOUT: Duration = Duration::from_secs(15);
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
pub const AGENT_TIMEOUT: Duration = Duration::from_secs(90);

/// A single board write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    MoveCard { card_id: String, list_id: String },
    UpdateCard { card_id: String, name: Option<String>, desc: Option<String> },
    AddComment { card_id: String, text: String },
    ArchiveCard { card_id: String },
    CreateCard { list_id: String, name: String },
    CreateList { board_id: String, name: String },
    ArchiveList { list_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CardMove,
    CardRename,
    CardComment,
    CardArchive,
    CardCreate,
    ListCreate,
    ListArchive,
}

impl MutationKind {
    pub fn label(self) -> &'static str {
        match self {
            MutationKind::CardMove => "card move",
            MutationKind::CardRename => "card rename",
            MutationKind::CardComment => "card comment",
            MutationKind::CardArchive => "card archive",
            MutationKind::CardCreate => "card create",
            MutationKind::ListCreate => "list create",
            MutationKind::ListArchive => "list archive",
        }
    }
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::MoveCard { .. } => MutationKind::CardMove,
            Mutation::UpdateCard { .. } => MutationKind::CardRename,
            Mutation::AddComment { .. } => MutationKind::CardComment,
            Mutation::ArchiveCard { .. } => MutationKind::CardArchive,
            Mutation::CreateCard { .. } => MutationKind::CardCreate,
            Mutation::CreateList { .. } => MutationKind::ListCreate,
            Mutation::ArchiveList { .. } => MutationKind::ListArchive,
        }
    }
}

/// One asynchronous operation, described by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    LoadBoards,
    LoadBoardData { board_id: String, board_name: String },
    AskAgent { agent: AgentName, context: String, prompt: String },
    Mutate(Mutation),
}

impl Intent {
    pub fn timeout(&self) -> Duration {
        match self {
            Intent::LoadBoards => LIST_BOARDS_TIMEOUT,
            Intent::LoadBoardData { .. } => BOARD_DATA_TIMEOUT,
            Intent::AskAgent { .. } => AGENT_TIMEOUT,
            Intent::Mutate(_) => WRITE_TIMEOUT,
        }
    }
}

/// The single outcome of one intent. Errors are already human-readable.
#[derive(Debug, Clone)]
pub enum Event {
    BoardsLoaded(Result<Vec<BoardSummary>, String>),
    BoardDataLoaded {
        board_id: String,
        board_name: String,
        result: Result<BoardSnapshot, String>,
    },
    AgentResponded {
        agent: AgentName,
        prompt: String,
        result: Result<String, String>,
    },
    Mutated {
        kind: MutationKind,
        result: Result<(), String>,
    },
}

/// Spawns intents on the runtime and funnels their events into the loop's channel.
#[derive(Clone)]
pub struct Dispatcher {
    board: Arc<dyn BoardApi>,
    agent: Arc<dyn AgentInvoker>,
    sender: UnboundedSender<Event>,
    handle: Handle,
}

impl Dispatcher {
    pub fn new(
        board: Arc<dyn BoardApi>,
        agent: Arc<dyn AgentInvoker>,
        sender: UnboundedSender<Event>,
        handle: Handle,
    ) -> Self {
        Self {
            board,
            agent,
            sender,
            handle,
        }
    }

    pub fn dispatch(&self, intent: Intent) {
        debug!(?intent, "dispatching intent");
        let board = Arc::clone(&self.board);
        let agent = Arc::clone(&self.agent);
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let event = run_intent(board.as_ref(), agent.as_ref(), intent).await;
            if sender.send(event).is_err() {
                debug!("event loop gone; dropping event");
            }
        });
    }

    pub fn dispatch_all(&self, intents: impl IntoIterator<Item = Intent>) {
        for intent in intents {
            self.dispatch(intent);
        }
    }
}

/// Await `fut` for at most `limit`, flattening both failure modes into a message.
async fn bounded<T, E, F>(limit: Duration, what: &str, fut: F) -> Result<T, String>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            warn!(%error, "{what} failed");
            Err(error.to_string())
        }
        Err(_) => {
            warn!(?limit, "{what} timed out");
            Err(format!("{what} timed out after {}s", limit.as_secs()))
        }
    }
}

/// Execute one intent to completion and describe the outcome.
pub async fn run_intent(board: &dyn BoardApi, agent: &dyn AgentInvoker, intent: Intent) -> Event {
    let limit = intent.timeout();
    match intent {
        Intent::LoadBoards => {
            let result = bounded(limit, "loading boards", board.list_boards()).await;
            if let Ok(boards) = &result {
                info!(count = boards.len(), "boards loaded");
            }
            Event::BoardsLoaded(result)
        }
        Intent::LoadBoardData { board_id, board_name } => {
            let load = async {
                let lists = board.list_lists(&board_id).await?;
                let cards = board.list_cards(&board_id).await?;
                Ok::<_, crate::board::api::ApiError>(BoardSnapshot::new(board_id.clone(), lists, cards))
            };
            let result = bounded(limit, "loading board", load).await;
            if let Ok(snapshot) = &result {
                info!(board = %board_id, lists = snapshot.lists.len(), "board data loaded");
            }
            Event::BoardDataLoaded {
                board_id,
                board_name,
                result,
            }
        }
        Intent::AskAgent {
            agent: name,
            context,
            prompt,
        } => {
            let result = bounded(limit, "agent request", agent.ask(name, &context, &prompt)).await;
            Event::AgentResponded {
                agent: name,
                prompt,
                result,
            }
        }
        Intent::Mutate(mutation) => {
            let kind = mutation.kind();
            let result = bounded(limit, kind.label(), apply_mutation(board, mutation)).await;
            Event::Mutated { kind, result }
        }
    }
}

async fn apply_mutation(
    board: &dyn BoardApi,
    mutation: Mutation,
) -> Result<(), crate::board::api::ApiError> {
    match mutation {
        Mutation::MoveCard { card_id, list_id } => board.move_card(&card_id, &list_id).await,
        Mutation::UpdateCard { card_id, name, desc } => {
            board
                .update_card(&card_id, name.as_deref(), desc.as_deref())
                .await
        }
        Mutation::AddComment { card_id, text } => board.add_comment(&card_id, &text).await,
        Mutation::ArchiveCard { card_id } => board.archive_card(&card_id).await,
        Mutation::CreateCard { list_id, name } => board.create_card(&list_id, &name).await.map(|_| ()),
        Mutation::CreateList { board_id, name } => {
            board.create_list(&board_id, &name).await.map(|_| ())
        }
        Mutation::ArchiveList { list_id } => board.archive_list(&list_id).await,
    }
}
