//! Model capability for Willow
//!
//! The whole contract is [`ChatProvider`]: a role-tagged message
//! history goes in, a lazy stream of text chunks comes out. The
//! bundled [`OpenAiProvider`] speaks the OpenAI chat completions SSE
//! dialect; anything wire-compatible works unchanged.

pub mod config;
pub mod error;
pub mod openai;
pub mod provider;
pub mod transformer;

pub use config::ProviderConfig;
pub use error::{ConversionError, LlmError, Result};
pub use openai::OpenAiProvider;
pub use provider::{ChatProvider, ChatStream};
pub use transformer::OpenAiTransformer;
