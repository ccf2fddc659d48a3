// Public modules
pub mod chat_completion;
pub mod chat_completion_chunk;
pub mod chat_completion_params;
pub mod finish_reason;
pub mod model;
pub mod role;
pub mod stream_options;
pub mod transcript;
pub mod turn;
pub mod usage;

// Re-exports
pub use chat_completion::{ChatCompletion, ChatCompletionChoice};
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, Delta};
pub use chat_completion_params::ChatCompletionParams;
pub use finish_reason::{FinishReason, FinishReasonParseError};
pub use model::{KnownModel, Model};
pub use role::Role;
pub use stream_options::StreamOptions;
pub use transcript::Transcript;
pub use turn::Turn;
pub use usage::Usage;
