use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use willow_core::{ChatChunk, ChatRequest};

use crate::error::{LlmError, Result};

/// Lazy stream of chat chunks
///
/// The stream terminates with an explicit `ChatChunk::Finish` on
/// success; an `Err` item or an `Error` chunk ends it mid-flight.
pub type ChatStream = Pin<Box<dyn Stream<Item = std::result::Result<ChatChunk, LlmError>> + Send>>;

/// Model capability: a role-tagged history in, a lazy text stream out
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider identifier
    fn provider_id(&self) -> &str;

    /// Open a streaming chat completion
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream>;
}
