//! Accumulates streamed chunks into a complete completion while passing chunks through.

use std::pin::Pin;

use futures::Stream;

use crate::{
    ChatCompletion, ChatCompletionChoice, ChatCompletionChunk, Error, FinishReason, Model, Role,
    Turn, Usage,
};

/// A stream wrapper that accumulates `ChatCompletionChunk`s into a complete
/// `ChatCompletion`.
///
/// This allows streaming fragments to the user while simultaneously building
/// the final message without buffering. When the stream is fully drained, the
/// accumulated completion is sent via the oneshot channel returned by `new()`.
/// The assembled content is exactly the concatenation, in order, of every
/// fragment that passed through.
pub struct AccumulatingStream {
    inner: Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, Error>> + Send>>,
    completion_tx: Option<tokio::sync::oneshot::Sender<Result<ChatCompletion, Error>>>,
    id: Option<String>,
    created: u64,
    model: Option<Model>,
    role: Option<Role>,
    content: String,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl AccumulatingStream {
    /// Wraps a `ChatCompletionChunk` stream to accumulate chunks into a
    /// `ChatCompletion`.
    ///
    /// Returns the stream and a receiver that will contain the accumulated
    /// completion once the stream is fully drained.
    ///
    /// # Example
    ///
    /// ```
    /// use futures::StreamExt;
    ///
    /// use colloquy::{AccumulatingStream, ChatCompletionChunk};
    ///
    /// # tokio_test::block_on(async {
    /// let chunk: ChatCompletionChunk = serde_json::from_str(
    ///     r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":0,
    ///         "model":"gpt-3.5-turbo",
    ///         "choices":[{"index":0,"delta":{"content":"Hello"},"finish_reason":null}]}"#,
    /// )
    /// .unwrap();
    ///
    /// let (mut stream, rx) = AccumulatingStream::new(futures::stream::iter(vec![Ok(chunk)]));
    /// while let Some(result) = stream.next().await {
    ///     result.unwrap();
    /// }
    ///
    /// let completion = rx.await.unwrap().unwrap();
    /// assert_eq!(completion.content(), Some("Hello"));
    /// # })
    /// ```
    pub fn new<S>(
        stream: S,
    ) -> (
        Self,
        tokio::sync::oneshot::Receiver<Result<ChatCompletion, Error>>,
    )
    where
        S: Stream<Item = Result<ChatCompletionChunk, Error>> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let this = Self {
            inner: Box::pin(stream),
            completion_tx: Some(tx),
            id: None,
            created: 0,
            model: None,
            role: None,
            content: String::new(),
            finish_reason: None,
            usage: None,
        };
        (this, rx)
    }

    fn accumulate_chunk(&mut self, chunk: &ChatCompletionChunk) {
        if self.id.is_none() {
            self.id = Some(chunk.id.clone());
            self.created = chunk.created;
            self.model = Some(chunk.model.clone());
        }
        if let Some(role) = chunk.role() {
            self.role = Some(role);
        }
        if let Some(fragment) = chunk.fragment() {
            self.content.push_str(fragment);
        }
        if let Some(finish_reason) = chunk.finish_reason() {
            self.finish_reason = Some(finish_reason);
        }
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }
    }

    fn finalize(&mut self) -> Result<ChatCompletion, Error> {
        let id = self.id.take().ok_or_else(|| {
            Error::streaming("stream ended before any completion chunk arrived", None)
        })?;
        let model = self.model.take().unwrap_or_else(|| Model::Custom(String::new()));
        let message = Turn::new(
            self.role.unwrap_or(Role::Assistant),
            std::mem::take(&mut self.content),
        );
        Ok(ChatCompletion {
            id,
            object: "chat.completion".to_string(),
            created: self.created,
            model,
            choices: vec![ChatCompletionChoice {
                index: 0,
                message,
                finish_reason: self.finish_reason,
            }],
            usage: self.usage,
        })
    }
}

impl Stream for AccumulatingStream {
    type Item = Result<ChatCompletionChunk, Error>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            std::task::Poll::Ready(Some(Ok(chunk))) => {
                self.accumulate_chunk(&chunk);
                std::task::Poll::Ready(Some(Ok(chunk)))
            }
            std::task::Poll::Ready(Some(Err(e))) => std::task::Poll::Ready(Some(Err(e))),
            std::task::Poll::Ready(None) => {
                if let Some(tx) = self.completion_tx.take() {
                    let _ = tx.send(self.finalize());
                }
                std::task::Poll::Ready(None)
            }
            std::task::Poll::Pending => std::task::Poll::Pending,
        }
    }
}
