use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::render::WordCloudConfig;

/// Timestamp layout used by Telegram exports, e.g. `2021-03-14T09:26:53`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identifier of a message. Exports use integers, but string ids are accepted too.
///
/// `1` and `"1"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageId {
    Int(i64),
    Str(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Int(id) => write!(f, "{id}"),
            MessageId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        MessageId::Int(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::Str(id.to_string())
    }
}

/// The `text` field of a message.
///
/// Plain messages carry a string. Messages with formatting, links or mentions
/// carry a sequence of fragments that has to be flattened before use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Plain(String),
    Composite(Vec<Fragment>),
}

impl Default for MessageText {
    fn default() -> Self {
        MessageText::Plain(String::new())
    }
}

impl From<&str> for MessageText {
    fn from(text: &str) -> Self {
        MessageText::Plain(text.to_string())
    }
}

/// One piece of a composite text field.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Literal text between entities.
    Literal(String),
    /// An annotated entity such as `{"type": "bold", "text": "..."}`.
    Entity(EntityFragment),
    /// Anything else found in the sequence. Contributes no text.
    Opaque(serde_json::Value),
}

/// Only the shape of the JSON value picks the variant: strings are literals,
/// objects are entities, everything else is opaque. Entity metadata never
/// decides whether the text is kept.
impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Fragment::Literal(text),
            serde_json::Value::Object(mut fields) => Fragment::Entity(EntityFragment {
                kind: string_field(fields.remove("type")),
                text: string_field(fields.remove("text")),
            }),
            other => Fragment::Opaque(other),
        })
    }
}

fn string_field(value: Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityFragment {
    /// Entity type (`bold`, `link`, `mention`, ...). Not used for statistics;
    /// `None` when absent or not a string.
    pub kind: Option<String>,
    /// `None` when absent or not a string.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// `message` or `service`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// The raw export timestamp. See [`Message::sent_at`].
    #[serde(default)]
    pub date: Option<String>,
    /// Display name of the author. Will be None for service messages and deleted accounts.
    #[serde(rename = "from", alias = "sender", default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub from_id: Option<MessageId>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub text: MessageText,
    /// Id of the message this one replies to. May point outside the transcript.
    #[serde(rename = "reply_to_message_id", alias = "reply_to_id", default)]
    pub reply_to_id: Option<MessageId>,
}

impl Message {
    /// Parses the export timestamp. Missing or malformed dates yield `None`.
    pub fn sent_at(&self) -> Option<NaiveDateTime> {
        self.date
            .as_deref()
            .and_then(|date| NaiveDateTime::parse_from_str(date, DATE_FORMAT).ok())
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<MessageText, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MessageText>::deserialize(deserializer)?.unwrap_or_default())
}

/// A chat export. Only `messages` is required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<MessageId>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone)]
pub struct StatsOptions {
    /// How many senders `top_responders` reports by default.
    pub top_n: usize,
    /// Canvas settings handed to the renderer.
    pub word_cloud: WordCloudConfig,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            word_cloud: WordCloudConfig::default(),
        }
    }
}
