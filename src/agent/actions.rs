//! `<action>{json}</action>` blocks embedded in agent replies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::dispatch::Mutation;

static ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<action>(.*?)</action>").expect("action block regex"));

/// A validated board command requested by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    MoveCard { card_id: String, list_id: String },
    UpdateCard { card_id: String, name: Option<String>, desc: Option<String> },
    AddComment { card_id: String, text: String },
    ArchiveCard { card_id: String },
    CreateCard { list_id: String, name: String },
    CreateList { name: String },
    ArchiveList { list_id: String },
}

/// Why a block was dropped. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotJson,
    NotObject,
    MissingType,
    UnknownType(String),
    MissingField(&'static str),
    NotAString(String),
}

/// Borrowed view over one block's JSON object.
struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    /// A non-blank string field. Absent, null, and blank all read as `None`.
    fn optional(&self, key: &str) -> Result<Option<String>, Rejection> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Rejection::NotAString(key.to_string())),
        }
    }

    fn required(&self, key: &'static str) -> Result<String, Rejection> {
        self.optional(key)?.ok_or(Rejection::MissingField(key))
    }
}

impl AgentAction {
    pub fn from_value(value: &Value) -> Result<Self, Rejection> {
        let obj = value.as_object().ok_or(Rejection::NotObject)?;
        let f = Fields(obj);
        let kind = f.optional("type")?.ok_or(Rejection::MissingType)?;
        match kind.as_str() {
            "move_card" => Self::move_card(&f),
            "update_card" => Self::update_card(&f),
            "add_comment" => Ok(AgentAction::AddComment {
                card_id: f.required("card_id")?,
                text: f.required("text")?,
            }),
            "archive_card" => Ok(AgentAction::ArchiveCard {
                card_id: f.required("card_id")?,
            }),
            "create_card" => Ok(AgentAction::CreateCard {
                list_id: f.required("list_id")?,
                name: f.required("name")?,
            }),
            "create_list" => Ok(AgentAction::CreateList {
                name: f.required("name")?,
            }),
            "archive_list" => Ok(AgentAction::ArchiveList {
                list_id: f.required("list_id")?,
            }),
            _ => Err(Rejection::UnknownType(kind)),
        }
    }

    fn move_card(f: &Fields<'_>) -> Result<Self, Rejection> {
        Ok(AgentAction::MoveCard {
            card_id: f.required("card_id")?,
            list_id: f.required("list_id")?,
        })
    }

    fn update_card(f: &Fields<'_>) -> Result<Self, Rejection> {
        let card_id = f.required("card_id")?;
        let name = f.optional("name")?;
        let desc = f.optional("desc")?;
        if name.is_none() && desc.is_none() {
            return Err(Rejection::MissingField("name or desc"));
        }
        Ok(AgentAction::UpdateCard { card_id, name, desc })
    }

    /// The board write this action stands for. `create_list` targets `board_id`.
    pub fn into_mutation(self, board_id: &str) -> Mutation {
        match self {
            AgentAction::MoveCard { card_id, list_id } => Mutation::MoveCard { card_id, list_id },
            AgentAction::UpdateCard { card_id, name, desc } => {
                Mutation::UpdateCard { card_id, name, desc }
            }
            AgentAction::AddComment { card_id, text } => Mutation::AddComment { card_id, text },
            AgentAction::ArchiveCard { card_id } => Mutation::ArchiveCard { card_id },
            AgentAction::CreateCard { list_id, name } => Mutation::CreateCard { list_id, name },
            AgentAction::CreateList { name } => Mutation::CreateList {
                board_id: board_id.to_string(),
                name,
            },
            AgentAction::ArchiveList { list_id } => Mutation::ArchiveList { list_id },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// The reply with every block removed; the raw text when there were none.
    pub display: String,
    pub actions: Vec<AgentAction>,
    pub blocks_found: usize,
}

fn parse_block(payload: &str) -> Result<AgentAction, Rejection> {
    let value: Value = serde_json::from_str(payload.trim()).map_err(|_| Rejection::NotJson)?;
    AgentAction::from_value(&value)
}

/// Split an agent reply into display text and the valid actions, in order.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let mut blocks_found = 0;
    let mut actions = Vec::new();
    for caps in ACTION_RE.captures_iter(raw) {
        blocks_found += 1;
        let payload = caps.get(1).map_or("", |m| m.as_str());
        match parse_block(payload) {
            Ok(action) => actions.push(action),
            Err(reason) => debug!(?reason, block = blocks_found, "dropping action block"),
        }
    }

    if blocks_found == 0 {
        return ParsedReply {
            display: raw.to_string(),
            actions,
            blocks_found,
        };
    }

    ParsedReply {
        display: ACTION_RE.replace_all(raw, "").trim().to_string(),
        actions,
        blocks_found,
    }
}
