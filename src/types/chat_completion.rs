use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, Model, Turn, Usage};

/// One candidate completion in a non-streaming response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChoice {
    /// Index of this choice in the response.
    pub index: u32,

    /// The generated assistant message.
    pub message: Turn,

    /// Why generation stopped for this choice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// A complete (non-streaming) chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Unique identifier for the completion.
    pub id: String,

    /// Object type, `"chat.completion"` on the wire.
    pub object: String,

    /// Unix timestamp (seconds) of when the completion was created.
    pub created: u64,

    /// The model that produced the completion.
    pub model: Model,

    /// The candidate completions; requests here always ask for one.
    pub choices: Vec<ChatCompletionChoice>,

    /// Token usage for the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// The text of the first choice, if present.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }

    /// The finish reason of the first choice, if present.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.choices.first().and_then(|c| c.finish_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KnownModel, Role};
    use serde_json::json;

    #[test]
    fn deserialization() {
        let json = json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-3.5-turbo",
            "system_fingerprint": "fp_44709d6fcb",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "Hello there, how may I assist you today?"
                    },
                    "logprobs": null,
                    "finish_reason": "stop"
                }
            ],
            "usage": {
                "prompt_tokens": 9,
                "completion_tokens": 12,
                "total_tokens": 21
            }
        });

        let completion: ChatCompletion = serde_json::from_value(json).unwrap();
        assert_eq!(completion.id, "chatcmpl-abc123");
        assert_eq!(completion.model, Model::Known(KnownModel::Gpt35Turbo));
        assert_eq!(
            completion.content(),
            Some("Hello there, how may I assist you today?")
        );
        assert_eq!(completion.finish_reason(), Some(FinishReason::Stop));
        assert_eq!(completion.usage, Some(Usage::new(9, 12)));
        assert_eq!(completion.choices[0].message.role, Role::Assistant);
    }

    #[test]
    fn empty_choices() {
        let json = json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-3.5-turbo",
            "choices": []
        });

        let completion: ChatCompletion = serde_json::from_value(json).unwrap();
        assert_eq!(completion.content(), None);
        assert_eq!(completion.finish_reason(), None);
        assert_eq!(completion.usage, None);
    }
}
