//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! log and drives one request per submitted turn.

use futures::StreamExt;

use crate::accumulating_stream::AccumulatingStream;
use crate::chat::config::ChatConfig;
use crate::client::CompletionBackend;
use crate::error::{Error, Result};
use crate::observability;
use crate::render::Renderer;
use crate::types::{ChatCompletionParams, Model, Transcript, Turn, Usage};

/// A chat session that manages conversation state and API interactions.
///
/// The session owns the append-only turn log and issues exactly one request
/// per submitted turn. A turn that fails or is interrupted leaves the user
/// message in the log; the next request simply carries it along.
pub struct ChatSession<B: CompletionBackend> {
    backend: B,
    config: ChatConfig,
    transcript: Transcript,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of turns in the conversation.
    pub turn_count: usize,
    /// The maximum tokens per response, if set.
    pub max_tokens: Option<u32>,
    /// The system prompt, if any.
    pub system_prompt: Option<String>,
    /// The sampling temperature, if set.
    pub temperature: Option<f32>,
    /// The top-p value, if set.
    pub top_p: Option<f32>,
    /// The configured stop sequences.
    pub stop_sequences: Vec<String>,
    /// Total prompt tokens across all requests.
    pub total_prompt_tokens: u64,
    /// Total completion tokens across all requests.
    pub total_completion_tokens: u64,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Prompt tokens for the last turn, if reported.
    pub last_turn_prompt_tokens: Option<u64>,
    /// Completion tokens for the last turn, if reported.
    pub last_turn_completion_tokens: Option<u64>,
}

impl<B: CompletionBackend> ChatSession<B> {
    /// Creates a new chat session with the given backend and configuration.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            transcript: Transcript::new(),
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to the log
    /// 2. Sends a single streaming request carrying the full log
    /// 3. Renders fragments as they arrive
    /// 4. Adds the complete assistant response to the log
    ///
    /// A blank submission is a no-op: nothing is logged and no request is
    /// made. On failure the user message stays in the log and the error is
    /// returned for the caller to report.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let trimmed = user_input.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        self.transcript.push(Turn::user(trimmed));

        match self.stream_response(renderer).await {
            Ok(()) => {
                observability::SESSION_TURNS.click();
                Ok(())
            }
            Err(err) => {
                if err.is_abort() {
                    observability::SESSION_INTERRUPTS.click();
                } else {
                    observability::SESSION_TURN_FAILURES.click();
                }
                Err(err)
            }
        }
    }

    async fn stream_response(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let params = self.build_params(true);
        let stream = self.backend.stream(params).await?;
        let (mut stream, completion_rx) = AccumulatingStream::new(stream);

        while let Some(result) = stream.next().await {
            if renderer.should_interrupt() {
                return Err(Error::abort("response interrupted"));
            }
            let chunk = result?;
            if let Some(fragment) = chunk.fragment() {
                renderer.print_text(fragment);
            }
        }
        renderer.finish_response();

        let completion = completion_rx
            .await
            .map_err(|_| Error::streaming("accumulated completion was dropped", None))??;

        let content = completion.content().unwrap_or_default().to_string();
        self.transcript.push(Turn::assistant(content));
        self.record_usage(completion.usage);
        Ok(())
    }

    /// Sends a user message and returns the complete response.
    ///
    /// Same contract as [`send_streaming`](Self::send_streaming) but without
    /// incremental rendering: the full assistant message is returned once
    /// the request finishes. Returns `None` for a blank submission.
    pub async fn send(&mut self, user_input: &str) -> Result<Option<String>> {
        let trimmed = user_input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        self.transcript.push(Turn::user(trimmed));

        let params = self.build_params(false);
        match self.backend.complete(params).await {
            Ok(completion) => {
                let content = completion.content().unwrap_or_default().to_string();
                self.transcript.push(Turn::assistant(content.clone()));
                self.record_usage(completion.usage);
                observability::SESSION_TURNS.click();
                Ok(Some(content))
            }
            Err(err) => {
                observability::SESSION_TURN_FAILURES.click();
                Err(err)
            }
        }
    }

    fn build_params(&self, stream: bool) -> ChatCompletionParams {
        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(Turn::system(prompt.clone()));
        }
        messages.extend(self.transcript.snapshot());

        let mut params =
            ChatCompletionParams::new(messages, self.config.model.clone()).with_stream(stream);
        params.max_tokens = self.config.max_tokens;
        params.temperature = self.config.temperature;
        params.top_p = self.config.top_p;
        if !self.config.stop_sequences.is_empty() {
            params.stop = Some(self.config.stop_sequences.clone());
        }
        params
    }

    fn record_usage(&mut self, usage: Option<Usage>) {
        if let Some(usage) = usage {
            self.usage_totals.accumulate(&usage);
        }
        self.last_turn_usage = usage;
        self.request_count = self.request_count.saturating_add(1);
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.transcript = Transcript::new();
    }

    /// Returns the conversation log.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the number of turns in the conversation.
    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt;
    }

    /// Returns the current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config.system_prompt.as_deref()
    }

    /// Sets or clears the maximum tokens per response.
    pub fn set_max_tokens(&mut self, max_tokens: Option<u32>) {
        self.config.max_tokens = max_tokens;
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.config.temperature = temperature;
    }

    /// Sets the top-p value.
    pub fn set_top_p(&mut self, top_p: Option<f32>) {
        self.config.top_p = top_p;
    }

    /// Adds a stop sequence to the persistent list.
    pub fn add_stop_sequence(&mut self, sequence: String) {
        if !self
            .config
            .stop_sequences
            .iter()
            .any(|existing| existing == &sequence)
        {
            self.config.stop_sequences.push(sequence);
        }
    }

    /// Clears all stop sequences.
    pub fn clear_stop_sequences(&mut self) {
        self.config.stop_sequences.clear();
    }

    /// Returns the configured stop sequences.
    pub fn stop_sequences(&self) -> &[String] {
        &self.config.stop_sequences
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            turn_count: self.turn_count(),
            max_tokens: self.config.max_tokens,
            system_prompt: self.config.system_prompt.clone(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stop_sequences: self.config.stop_sequences.clone(),
            total_prompt_tokens: self.usage_totals.prompt_tokens,
            total_completion_tokens: self.usage_totals.completion_tokens,
            total_requests: self.request_count,
            last_turn_prompt_tokens: self.last_turn_usage.map(|usage| usage.prompt_tokens),
            last_turn_completion_tokens: self.last_turn_usage.map(|usage| usage.completion_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FragmentStream;
    use crate::types::{
        ChatCompletion, ChatCompletionChoice, ChatCompletionChunk, ChunkChoice, Delta,
        FinishReason, KnownModel, Role,
    };

    /// Backend that replays a scripted outcome per request.
    struct ScriptedBackend {
        outcomes: std::sync::Mutex<Vec<ScriptedOutcome>>,
    }

    enum ScriptedOutcome {
        Fragments(Vec<String>),
        Failure(Error),
    }

    impl ScriptedBackend {
        fn replying(fragments: &[&str]) -> Self {
            Self {
                outcomes: std::sync::Mutex::new(vec![ScriptedOutcome::Fragments(
                    fragments.iter().map(|s| s.to_string()).collect(),
                )]),
            }
        }

        fn failing(err: Error) -> Self {
            Self {
                outcomes: std::sync::Mutex::new(vec![ScriptedOutcome::Failure(err)]),
            }
        }
    }

    fn fragment_chunk(content: &str) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: "chatcmpl-test".to_string(),
            object: "chat.completion.chunk".to_string(),
            created: 1_700_000_000,
            model: Model::Known(KnownModel::Gpt35Turbo),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta {
                    role: Some(Role::Assistant),
                    content: Some(content.to_string()),
                },
                finish_reason: None,
            }],
            usage: None,
        }
    }

    fn closing_chunk() -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: "chatcmpl-test".to_string(),
            object: "chat.completion.chunk".to_string(),
            created: 1_700_000_000,
            model: Model::Known(KnownModel::Gpt35Turbo),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta::default(),
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: None,
        }
    }

    #[async_trait::async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, params: ChatCompletionParams) -> Result<ChatCompletion> {
            let outcome = self.outcomes.lock().unwrap().remove(0);
            match outcome {
                ScriptedOutcome::Fragments(fragments) => {
                    let content: String = fragments.concat();
                    Ok(ChatCompletion {
                        id: "chatcmpl-test".to_string(),
                        object: "chat.completion".to_string(),
                        created: 1_700_000_000,
                        model: params.model,
                        choices: vec![ChatCompletionChoice {
                            index: 0,
                            message: Turn::assistant(content),
                            finish_reason: Some(FinishReason::Stop),
                        }],
                        usage: Some(Usage::new(10, 5)),
                    })
                }
                ScriptedOutcome::Failure(err) => Err(err),
            }
        }

        async fn stream(&self, _params: ChatCompletionParams) -> Result<FragmentStream> {
            let outcome = self.outcomes.lock().unwrap().remove(0);
            match outcome {
                ScriptedOutcome::Fragments(fragments) => {
                    let mut chunks: Vec<Result<ChatCompletionChunk>> = fragments
                        .iter()
                        .map(|fragment| Ok(fragment_chunk(fragment)))
                        .collect();
                    chunks.push(Ok(closing_chunk()));
                    Ok(Box::pin(futures::stream::iter(chunks)))
                }
                ScriptedOutcome::Failure(err) => Err(err),
            }
        }
    }

    /// Renderer that records fragments for assertions.
    #[derive(Default)]
    struct RecordingRenderer {
        rendered: String,
        interrupt_after: Option<usize>,
        fragments_seen: usize,
    }

    impl Renderer for RecordingRenderer {
        fn print_text(&mut self, text: &str) {
            self.rendered.push_str(text);
            self.fragments_seen += 1;
        }

        fn print_error(&mut self, _error: &str) {}

        fn print_info(&mut self, _info: &str) {}

        fn print_role_header(&mut self, _role: Role) {}

        fn finish_response(&mut self) {}

        fn print_interrupted(&mut self) {}

        fn should_interrupt(&self) -> bool {
            self.interrupt_after
                .is_some_and(|after| self.fragments_seen >= after)
        }
    }

    fn session_with(backend: ScriptedBackend) -> ChatSession<ScriptedBackend> {
        ChatSession::new(backend, ChatConfig::default())
    }

    #[tokio::test]
    async fn streamed_turn_appends_user_then_assistant() {
        let mut session = session_with(ScriptedBackend::replying(&["Hel", "lo ", "there"]));
        let mut renderer = RecordingRenderer::default();

        session
            .send_streaming("Hi", &mut renderer)
            .await
            .unwrap();

        assert_eq!(renderer.rendered, "Hello there");
        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Hi");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Hello there");
    }

    #[tokio::test]
    async fn blank_submission_is_a_no_op() {
        let mut session = session_with(ScriptedBackend::replying(&["never sent"]));
        let mut renderer = RecordingRenderer::default();

        session.send_streaming("   ", &mut renderer).await.unwrap();

        assert!(renderer.rendered.is_empty());
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.stats().total_requests, 0);
    }

    #[tokio::test]
    async fn failed_turn_keeps_the_user_message() {
        let mut session =
            session_with(ScriptedBackend::failing(Error::rate_limit("quota", None)));
        let mut renderer = RecordingRenderer::default();

        let err = session
            .send_streaming("Hi", &mut renderer)
            .await
            .unwrap_err();

        assert!(err.is_rate_limit());
        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Hi");
    }

    #[tokio::test]
    async fn interrupt_discards_the_partial_response() {
        let mut session = session_with(ScriptedBackend::replying(&["one", "two", "three"]));
        let mut renderer = RecordingRenderer {
            interrupt_after: Some(1),
            ..RecordingRenderer::default()
        };

        let err = session
            .send_streaming("Hi", &mut renderer)
            .await
            .unwrap_err();

        assert!(err.is_abort());
        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn non_streaming_send_returns_the_content() {
        let mut session = session_with(ScriptedBackend::replying(&["Hello there"]));

        let content = session.send("Hi").await.unwrap();

        assert_eq!(content.as_deref(), Some("Hello there"));
        assert_eq!(session.turn_count(), 2);
        assert_eq!(session.stats().total_prompt_tokens, 10);
        assert_eq!(session.stats().total_completion_tokens, 5);
    }

    #[tokio::test]
    async fn clear_resets_the_log() {
        let mut session = session_with(ScriptedBackend::replying(&["Hello"]));
        session.send("Hi").await.unwrap();
        assert_eq!(session.turn_count(), 2);

        session.clear();
        assert_eq!(session.turn_count(), 0);
    }

    #[test]
    fn set_model() {
        let backend = ScriptedBackend::replying(&[]);
        let mut session = ChatSession::new(backend, ChatConfig::default());

        assert_eq!(session.model(), &Model::Known(KnownModel::Gpt35Turbo));

        session.set_model(Model::Known(KnownModel::Gpt4o));
        assert_eq!(session.model(), &Model::Known(KnownModel::Gpt4o));
    }

    #[test]
    fn set_system_prompt() {
        let backend = ScriptedBackend::replying(&[]);
        let mut session = ChatSession::new(backend, ChatConfig::default());

        assert!(session.system_prompt().is_none());

        session.set_system_prompt(Some("Be helpful".to_string()));
        assert_eq!(session.system_prompt(), Some("Be helpful"));

        session.set_system_prompt(None);
        assert!(session.system_prompt().is_none());
    }

    #[tokio::test]
    async fn system_prompt_rides_ahead_of_the_history() {
        struct CapturingBackend {
            captured: std::sync::Mutex<Option<ChatCompletionParams>>,
        }

        #[async_trait::async_trait]
        impl CompletionBackend for CapturingBackend {
            async fn complete(&self, params: ChatCompletionParams) -> Result<ChatCompletion> {
                *self.captured.lock().unwrap() = Some(params.clone());
                Ok(ChatCompletion {
                    id: "chatcmpl-test".to_string(),
                    object: "chat.completion".to_string(),
                    created: 1_700_000_000,
                    model: params.model,
                    choices: vec![ChatCompletionChoice {
                        index: 0,
                        message: Turn::assistant("ok"),
                        finish_reason: Some(FinishReason::Stop),
                    }],
                    usage: None,
                })
            }

            async fn stream(&self, _params: ChatCompletionParams) -> Result<FragmentStream> {
                Err(Error::unknown("not used"))
            }
        }

        let backend = CapturingBackend {
            captured: std::sync::Mutex::new(None),
        };
        let config = ChatConfig::default().with_system_prompt("Be terse".to_string());
        let mut session = ChatSession::new(backend, config);

        session.send("Hi").await.unwrap();

        let params = session.backend.captured.lock().unwrap().take().unwrap();
        assert_eq!(params.messages.len(), 2);
        assert_eq!(params.messages[0].role, Role::System);
        assert_eq!(params.messages[0].content, "Be terse");
        assert_eq!(params.messages[1].role, Role::User);
    }
}
