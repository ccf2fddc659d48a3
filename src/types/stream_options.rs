use serde::{Deserialize, Serialize};

/// Options for streaming responses.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamOptions {
    /// When true, the server emits one final chunk carrying token usage for
    /// the whole request, with an empty `choices` array.
    pub include_usage: bool,
}

impl StreamOptions {
    /// Stream options that request the trailing usage chunk.
    pub fn include_usage() -> Self {
        Self {
            include_usage: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serialization() {
        let options = StreamOptions::include_usage();
        let json = to_value(options).unwrap();
        assert_eq!(json, json!({"include_usage": true}));
    }
}
