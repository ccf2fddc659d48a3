// Public modules
pub mod accumulating_stream;
pub mod chat;
pub mod client;
pub mod credential;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod types;

// Re-exports
pub use accumulating_stream::AccumulatingStream;
pub use client::{CompletionBackend, FragmentStream, OpenAi};
pub use credential::{API_KEY_ENV, ApiKey};
pub use error::{Error, FailureKind, Result};
pub use render::{PlainTextRenderer, Renderer, replay_transcript};
pub use types::*;
