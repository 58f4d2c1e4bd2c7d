use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Wire mirror of a stored message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: "user".to_string(),
            content: content.into(),
            image_url,
            created_at: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: "assistant".to_string(),
            content: content.into(),
            image_url: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct CreateSessionBody<'a> {
    title: &'a str,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct SaveMessagesBody<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    messages: Vec<OutgoingMessage<'a>>,
    model: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn list_sessions(&self) -> anyhow::Result<Vec<SessionSummary>> {
        let response = self
            .client
            .get(format!("{}/api/sessions", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await?;
            anyhow::bail!("Failed to list sessions: {}", text);
        }

        Ok(response.json().await?)
    }

    pub async fn create_session(
        &self,
        title: &str,
        model: &str,
    ) -> anyhow::Result<SessionDetail> {
        let response = self
            .client
            .post(format!("{}/api/sessions", self.base_url))
            .json(&CreateSessionBody { title, model })
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await?;
            anyhow::bail!("Failed to create session: {}", text);
        }

        Ok(response.json().await?)
    }

    pub async fn get_session(&self, id: &str) -> anyhow::Result<SessionDetail> {
        let response = self
            .client
            .get(format!("{}/api/sessions/{}", self.base_url, id))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await?;
            anyhow::bail!("Failed to get session: {}", text);
        }

        Ok(response.json().await?)
    }

    pub async fn delete_session(&self, id: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/sessions/{}", self.base_url, id))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await?;
            anyhow::bail!("Failed to delete session: {}", text);
        }

        Ok(())
    }

    pub async fn save_messages(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> anyhow::Result<()> {
        let response = self
            .client
            .post(format!(
                "{}/api/sessions/{}/messages",
                self.base_url, session_id
            ))
            .json(&SaveMessagesBody { messages })
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await?;
            anyhow::bail!("Failed to save messages: {}", text);
        }

        Ok(())
    }

    /// Streams a chat completion, forwarding each text fragment through `tx`
    /// in arrival order. Returns Err if the connection fails before a clean
    /// end of stream; fragments already sent stay sent.
    pub async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        tx: mpsc::Sender<String>,
    ) -> anyhow::Result<()> {
        let body = ChatBody {
            messages: messages
                .iter()
                .map(|m| OutgoingMessage {
                    role: &m.role,
                    content: &m.content,
                    image_url: m.image_url.as_deref(),
                })
                .collect(),
            model,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await?;
            anyhow::bail!("Chat request failed: {}", text);
        }

        let mut stream = response.bytes_stream();
        let mut decoder = Utf8ChunkDecoder::default();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let text = decoder.push(&chunk);
            if text.is_empty() {
                continue;
            }
            if tx.send(text).await.is_err() {
                return Ok(());
            }
        }

        let tail = decoder.flush();
        if !tail.is_empty() {
            let _ = tx.send(tail).await;
        }

        Ok(())
    }
}

/// Incremental UTF-8 decoder. Transport chunks can split a multi-byte
/// code point; the trailing partial sequence is held back until the
/// next chunk completes it.
#[derive(Debug, Default)]
struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            // error_len() == None means the tail is an incomplete
            // sequence, not garbage; keep it for the next chunk
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        }
    }

    /// Drain whatever is still pending, replacing invalid bytes
    fn flush(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_passes_ascii_through() {
        let mut decoder = Utf8ChunkDecoder::default();
        assert_eq!(decoder.push(b"Hello"), "Hello");
        assert_eq!(decoder.push(b" there"), " there");
        assert_eq!(decoder.flush(), "");
    }

    #[test]
    fn test_decoder_reassembles_split_code_point() {
        // "日本" is six bytes; split mid-way through the second char
        let bytes = "日本".as_bytes();
        let mut decoder = Utf8ChunkDecoder::default();

        assert_eq!(decoder.push(&bytes[..4]), "日");
        assert_eq!(decoder.push(&bytes[4..]), "本");
        assert_eq!(decoder.flush(), "");
    }

    #[test]
    fn test_decoder_holds_partial_tail_until_complete() {
        let bytes = "語".as_bytes();
        let mut decoder = Utf8ChunkDecoder::default();

        assert_eq!(decoder.push(&bytes[..1]), "");
        assert_eq!(decoder.push(&bytes[1..2]), "");
        assert_eq!(decoder.push(&bytes[2..]), "語");
    }

    #[test]
    fn test_decoder_replaces_truly_invalid_bytes() {
        let mut decoder = Utf8ChunkDecoder::default();
        // 0xFF can never start a UTF-8 sequence
        let out = decoder.push(&[b'a', 0xFF, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_decoder_flushes_incomplete_tail_as_replacement() {
        let bytes = "日".as_bytes();
        let mut decoder = Utf8ChunkDecoder::default();
        assert_eq!(decoder.push(&bytes[..2]), "");
        assert_eq!(decoder.flush(), "\u{FFFD}");
    }
}
