//! 聊天中继处理器
//!
//! 将客户端完整消息历史转发给模型能力，并把模型产出的文本分片
//! 原样透传回客户端：不批处理、不转换、不加结束标记以外的帧。
//! 中继自身无状态，对话持久化由客户端在流结束后调用
//! `POST /api/sessions/{id}/messages` 完成。

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;

use willow_core::{
    normalize_model, parse_data_url, ChatChunk, ChatRequest, Content, ContentPart, DataUrl,
    Message, Role,
};

use crate::error::ApiError;
use crate::state::AppState;

/// 聊天请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub messages: Vec<IncomingMessage>,
    #[serde(default)]
    pub model: Option<String>,
}

/// 客户端消息（含可选内联图片引用）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 将客户端消息转换为模型输入
///
/// 图片引用解析成功时生成多段内容：文本段在前（内容为空则省略），
/// 图片段紧随其后。解析失败时静默丢弃图片，只保留文本。
pub fn to_model_message(msg: &IncomingMessage) -> Message {
    match msg.image_url.as_deref().and_then(parse_data_url) {
        Some(DataUrl { mime_type, data }) => {
            let mut parts = Vec::new();
            if !msg.content.is_empty() {
                parts.push(ContentPart::text(&msg.content));
            }
            parts.push(ContentPart::image(mime_type, data));
            Message::from_parts(msg.role, parts)
        }
        None => Message {
            role: msg.role,
            content: Content::text(&msg.content),
        },
    }
}

/// POST /api/chat
///
/// 响应体为 `text/plain; charset=utf-8` 的连续分片流。流中途失败时
/// 已发出的内容保持不变，响应直接结束（截断）；不做重试，失败替换
/// 文案由客户端处理。
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let model = normalize_model(payload.model.as_deref());
    let messages: Vec<Message> = payload.messages.iter().map(to_model_message).collect();

    tracing::info!(
        "Relaying chat request: model={} messages={}",
        model,
        messages.len()
    );

    let request = ChatRequest::new(model).with_messages(messages).stream();
    let mut stream = state.provider.chat_stream(request).await?;

    let body_stream = async_stream::stream! {
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(ChatChunk::Content { text }) => {
                    yield Ok::<_, Infallible>(Bytes::from(text));
                }
                Ok(ChatChunk::Finish { reason }) => {
                    tracing::debug!("Chat stream finished: {}", reason);
                    break;
                }
                Ok(ChatChunk::Error { message }) => {
                    tracing::warn!("Chat stream failed mid-flight: {}", message);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Chat stream transport error: {}", e);
                    break;
                }
            }
        }
    };

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body_stream),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(content: &str, image_url: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            role: Role::User,
            content: content.to_string(),
            image_url: image_url.map(String::from),
        }
    }

    #[test]
    fn test_text_only_message_passes_through() {
        let msg = to_model_message(&incoming("hello", None));
        assert_eq!(msg.content, Content::text("hello"));
    }

    #[test]
    fn test_valid_image_becomes_part_after_text() {
        let msg = to_model_message(&incoming(
            "what is this?",
            Some("data:image/png;base64,aVZCT1J3"),
        ));

        match msg.content {
            Content::Parts { parts } => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0], ContentPart::text("what is this?"));
                assert_eq!(parts[1], ContentPart::image("image/png", "aVZCT1J3"));
            }
            other => panic!("expected parts, got {:?}", other),
        }
    }

    #[test]
    fn test_image_without_text_is_single_part() {
        let msg = to_model_message(&incoming("", Some("data:image/jpeg;base64,xyz9")));

        match msg.content {
            Content::Parts { parts } => {
                assert_eq!(parts.len(), 1);
                assert!(parts[0].is_image());
            }
            other => panic!("expected parts, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_image_is_dropped() {
        let msg = to_model_message(&incoming("just text", Some("http://not-a-data-url")));
        assert_eq!(msg.content, Content::text("just text"));
    }

    #[test]
    fn test_malformed_image_with_empty_text() {
        let msg = to_model_message(&incoming("", Some("data:broken")));
        assert_eq!(msg.content, Content::text(""));
    }
}
