//! Wire format: every frame is `{"event": ..., "data": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{bad, AppResult},
    utils::ids,
    vote::{Ballot, Tally},
};

/* ------------ 線段 ------------ */

/// One drawn segment, endpoints normalized to the unit square.
/// Everything besides the coordinates is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[serde(default)]
    pub color: Value,
    #[serde(default)]
    pub size: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brush_type: Option<Value>,
    /// Keys this server does not know about, relayed and replayed as sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stroke {
    pub fn validate(&self) -> AppResult<()> {
        let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if ![self.x0, self.y0, self.x1, self.y1].into_iter().all(unit) {
            return Err(bad("stroke coordinates outside the unit square"));
        }
        if self.color.is_null() || self.size.is_null() {
            return Err(bad("stroke without color or size"));
        }
        Ok(())
    }
}

/* ------------ 聊天 ------------ */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub username: String,
    pub message: String,
    pub timestamp: String,
    pub kind: ChatKind,
}

impl ChatMessage {
    pub fn user(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self::build(username.into(), message.into(), ChatKind::User)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::build("System".into(), message.into(), ChatKind::System)
    }

    fn build(username: String, message: String, kind: ChatKind) -> Self {
        Self { id: ids::message_id(), username, message, timestamp: ids::timestamp(), kind }
    }
}

/* ------------ client → server ------------ */

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    CreateRoom(String),
    GetRooms,
    JoinRoom(JoinRequest),
    LeaveRoom(String),
    Drawing(DrawingEvent),
    ChatMessage(ChatEvent),
    ClearCanvas(String),
    RequestClearCanvas(String),
    VoteClearCanvas(VoteEvent),
}

/// Older clients send just the room name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JoinRequest {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        username: Option<String>,
    },
}

impl JoinRequest {
    pub fn into_parts(self) -> (String, Option<String>) {
        match self {
            JoinRequest::Name(name) => (name, None),
            JoinRequest::Full { name, username } => (name, username),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawingEvent {
    pub room: String,
    pub data: Stroke,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatEvent {
    pub room: String,
    pub message: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEvent {
    pub room: String,
    pub vote: Ballot,
    #[serde(default)]
    pub user_id: Option<String>,
}

pub fn decode(raw: &str) -> AppResult<ClientEvent> {
    serde_json::from_str(raw).map_err(bad)
}

/* ------------ server → client ------------ */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    RoomList(Vec<String>),
    LoadCanvas(Vec<Stroke>),
    LoadChat(Vec<ChatMessage>),
    RoomCreator(bool),
    Drawing(Stroke),
    ChatMessage(ChatMessage),
    ClearCanvas,
    ClearCanvasVote(Tally),
}

impl ServerEvent {
    pub fn encode(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Room names are arbitrary, case-sensitive, and must contain something
/// other than whitespace.
pub fn valid_room(name: &str) -> bool {
    !name.trim().is_empty()
}

#[cfg(test)]
pub(crate) fn stroke(x: f64) -> Stroke {
    Stroke {
        x0: x,
        y0: x,
        x1: x,
        y1: x,
        color: Value::from("#000000"),
        size: Value::from(4),
        opacity: None,
        brush_type: None,
        extra: Map::new(),
    }
}
