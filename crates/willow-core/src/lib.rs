pub mod chat;
pub mod normalize;
pub mod types;

pub use chat::{ChatChunk, ChatOptions, ChatRequest, FinishReason};
pub use normalize::{
    normalize_model, normalize_title, parse_data_url, DataUrl, DEFAULT_MODEL,
    DEFAULT_SESSION_TITLE, TITLE_MAX_CHARS,
};
pub use types::{Content, ContentPart, Message, Role};
