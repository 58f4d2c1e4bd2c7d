use serde_json::{json, Value};

use willow_core::{ChatChunk, ChatRequest, Content, ContentPart, FinishReason, Message};

use crate::error::ConversionError;

/// OpenAI-compatible schema transformer
///
/// Converts internal requests to the chat completions JSON body and
/// parses SSE data payloads back into chunks. Works with OpenAI and
/// compatible providers.
pub struct OpenAiTransformer;

impl OpenAiTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transform a request to the provider wire format
    pub fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError> {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| self.convert_message(m))
            .collect::<Result<Vec<_>, _>>()?;

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "stream": request.options.stream,
        });

        if let Some(temp) = request.options.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = request.options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        Ok(body)
    }

    /// Parse one SSE `data:` payload into a chunk
    ///
    /// Returns `Ok(None)` for payloads with nothing to forward (for
    /// example role-only deltas).
    pub fn parse_stream_chunk(&self, data: &str) -> Result<Option<ChatChunk>, ConversionError> {
        let data = data.trim();
        if data.is_empty() {
            return Ok(None);
        }
        if data == "[DONE]" {
            return Ok(Some(ChatChunk::finish(FinishReason::Stop)));
        }

        let value: Value = serde_json::from_str(data)?;

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error");
            return Ok(Some(ChatChunk::error(message)));
        }

        let choice = match value.get("choices").and_then(|c| c.get(0)) {
            Some(choice) => choice,
            None => return Ok(None),
        };

        if let Some(text) = choice
            .pointer("/delta/content")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        {
            return Ok(Some(ChatChunk::content(text)));
        }

        if let Some(reason) = choice.get("finish_reason").and_then(Value::as_str) {
            return Ok(Some(ChatChunk::finish(FinishReason::parse(reason))));
        }

        Ok(None)
    }

    fn convert_message(&self, msg: &Message) -> Result<Value, ConversionError> {
        let content = match &msg.content {
            Content::Text { text } => json!(text),
            Content::Parts { parts } => {
                let parts: Vec<Value> = parts.iter().map(|p| self.convert_part(p)).collect();
                json!(parts)
            }
        };

        Ok(json!({
            "role": msg.role.to_string(),
            "content": content,
        }))
    }

    fn convert_part(&self, part: &ContentPart) -> Value {
        match part {
            ContentPart::Text { text } => json!({
                "type": "text",
                "text": text,
            }),
            ContentPart::Image { mime_type, data } => json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", mime_type, data),
                }
            }),
        }
    }
}

impl Default for OpenAiTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use willow_core::Role;

    #[test]
    fn test_transform_text_request() {
        let transformer = OpenAiTransformer::new();
        let request = ChatRequest::new("gpt-4o-mini")
            .with_message(Message::user("Hello"))
            .stream();

        let body = transformer.transform_request(&request).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[test]
    fn test_transform_multipart_message() {
        let transformer = OpenAiTransformer::new();
        let request = ChatRequest::new("gpt-4o").with_message(Message::from_parts(
            Role::User,
            vec![
                ContentPart::text("what is this?"),
                ContentPart::image("image/png", "aWJlcg=="),
            ],
        ));

        let body = transformer.transform_request(&request).unwrap();
        let parts = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/png;base64,aWJlcg=="
        );
    }

    #[test]
    fn test_parse_content_delta() {
        let transformer = OpenAiTransformer::new();
        let chunk = transformer
            .parse_stream_chunk(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#)
            .unwrap();
        assert_eq!(chunk, Some(ChatChunk::content("Hel")));
    }

    #[test]
    fn test_parse_role_only_delta_is_skipped() {
        let transformer = OpenAiTransformer::new();
        let chunk = transformer
            .parse_stream_chunk(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#)
            .unwrap();
        assert_eq!(chunk, None);
    }

    #[test]
    fn test_parse_done_marker() {
        let transformer = OpenAiTransformer::new();
        let chunk = transformer.parse_stream_chunk("[DONE]").unwrap();
        assert_eq!(chunk, Some(ChatChunk::finish(FinishReason::Stop)));
    }

    #[test]
    fn test_parse_finish_reason() {
        let transformer = OpenAiTransformer::new();
        let chunk = transformer
            .parse_stream_chunk(r#"{"choices":[{"delta":{},"finish_reason":"length"}]}"#)
            .unwrap();
        assert_eq!(chunk, Some(ChatChunk::finish(FinishReason::Length)));
    }

    #[test]
    fn test_parse_provider_error() {
        let transformer = OpenAiTransformer::new();
        let chunk = transformer
            .parse_stream_chunk(r#"{"error":{"message":"overloaded"}}"#)
            .unwrap();
        assert_eq!(chunk, Some(ChatChunk::error("overloaded")));
    }

    #[test]
    fn test_parse_invalid_json_is_error() {
        let transformer = OpenAiTransformer::new();
        assert!(transformer.parse_stream_chunk("not json").is_err());
    }
}
