use serde::{Deserialize, Serialize};

use crate::types::{Model, StreamOptions, Turn};

/// Parameters for a chat completion request.
///
/// The `messages` array is the ordered conversation context, replayed in
/// full on every request: an optional system message first, then the turn
/// history oldest to newest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionParams {
    /// The model that will complete the conversation.
    pub model: Model,

    /// Ordered conversation context.
    pub messages: Vec<Turn>,

    /// The maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature, between 0.0 and 2.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling mass, between 0.0 and 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Custom text sequences that will cause the model to stop generating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Whether to incrementally stream the response using server-sent events.
    pub stream: bool,

    /// Streaming options; only meaningful when `stream` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

impl ChatCompletionParams {
    /// Helper function to validate a float value is within the given range.
    #[inline]
    fn validate_float_range(
        value: f32,
        min: f32,
        max: f32,
        field_name: &str,
    ) -> Result<(), crate::Error> {
        if (min..=max).contains(&value) && value.is_finite() {
            return Ok(());
        }

        if value.is_nan() {
            return Err(crate::Error::validation(
                format!("{field_name} cannot be NaN"),
                Some(field_name.to_string()),
            ));
        }

        Err(crate::Error::validation(
            format!("{field_name} must be between {min} and {max}, got {value}"),
            Some(field_name.to_string()),
        ))
    }

    /// Create new parameters for the given conversation and model.
    pub fn new(messages: Vec<Turn>, model: impl Into<Model>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stop: None,
            stream: false,
            stream_options: None,
        }
    }

    /// Create parameters for a single user message.
    pub fn simple(content: impl Into<String>, model: impl Into<Model>) -> Self {
        Self::new(vec![Turn::user(content)], model)
    }

    /// Set the max_tokens field.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature field.
    pub fn with_temperature(mut self, temperature: f32) -> Result<Self, crate::Error> {
        Self::validate_float_range(temperature, 0.0, 2.0, "temperature")?;
        self.temperature = Some(temperature);
        Ok(self)
    }

    /// Set the top_p field.
    pub fn with_top_p(mut self, top_p: f32) -> Result<Self, crate::Error> {
        Self::validate_float_range(top_p, 0.0, 1.0, "top_p")?;
        self.top_p = Some(top_p);
        Ok(self)
    }

    /// Set the stop sequences field.
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set the stream field.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the stream_options field.
    pub fn with_stream_options(mut self, stream_options: StreamOptions) -> Self {
        self.stream_options = Some(stream_options);
        self
    }
}
