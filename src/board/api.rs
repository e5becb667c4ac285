use async_trait::async_trait;
use thiserror::Error;

use super::{BoardSummary, Card, List};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing TRELLO_API_KEY or TRELLO_API_TOKEN")]
    MissingCredentials,
    #[error("board id is required")]
    MissingBoardId,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("trello returned {status}: {body}")]
    Status { status: String, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Remote board operations. Writes report success only; callers re-read the board.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list_boards(&self) -> Result<Vec<BoardSummary>, ApiError>;

    async fn list_lists(&self, board_id: &str) -> Result<Vec<List>, ApiError>;

    /// Open cards of a board with `list_name` resolved.
    async fn list_cards(&self, board_id: &str) -> Result<Vec<Card>, ApiError>;

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), ApiError>;

    async fn update_card(
        &self,
        card_id: &str,
        name: Option<&str>,
        desc: Option<&str>,
    ) -> Result<(), ApiError>;

    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), ApiError>;

    async fn archive_card(&self, card_id: &str) -> Result<(), ApiError>;

    async fn create_card(&self, list_id: &str, name: &str) -> Result<Card, ApiError>;

    async fn create_list(&self, board_id: &str, name: &str) -> Result<List, ApiError>;

    async fn archive_list(&self, list_id: &str) -> Result<(), ApiError>;
}
