//! Headless client for the Willow chat server.
//!
//! [`ApiClient`] wraps the HTTP surface; [`ChatTurn`] layers the
//! one-turn-at-a-time conversation flow on top of it.

pub mod client;
pub mod turn;

pub use client::{ApiClient, ChatMessage, SessionDetail, SessionSummary};
pub use turn::{ChatTurn, TurnState, IMAGE_ONLY_TITLE, STREAM_ERROR_TEXT};
