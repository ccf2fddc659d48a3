use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, Model, Role, Usage};

/// The incremental piece of an assistant message carried by one chunk.
///
/// The first chunk of a stream usually carries only the role; subsequent
/// chunks carry content fragments; the final chunk carries neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Delta {
    /// The role of the message being streamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The next fragment of the message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One candidate completion's slice of a streamed chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Index of this choice in the response.
    pub index: u32,

    /// The incremental update for this choice.
    pub delta: Delta,

    /// Why generation stopped, set only on the closing chunk of a choice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// One server-sent event of a streamed chat completion.
///
/// When usage reporting is requested, the server appends one extra chunk
/// with an empty `choices` array and the `usage` field set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Unique identifier, shared by every chunk of one completion.
    pub id: String,

    /// Object type, `"chat.completion.chunk"` on the wire.
    pub object: String,

    /// Unix timestamp (seconds) of when the completion was created.
    pub created: u64,

    /// The model producing the completion.
    pub model: Model,

    /// The incremental updates; empty on the trailing usage chunk.
    pub choices: Vec<ChunkChoice>,

    /// Token usage, present only on the trailing usage chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionChunk {
    /// The content fragment carried by this chunk, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }

    /// The finish reason carried by this chunk, if any.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.choices.first().and_then(|c| c.finish_reason)
    }

    /// The role announced by this chunk, if any.
    pub fn role(&self) -> Option<Role> {
        self.choices.first().and_then(|c| c.delta.role)
    }
}
