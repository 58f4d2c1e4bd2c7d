use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::mpsc;

use willow_core::{DEFAULT_MODEL, TITLE_MAX_CHARS};

use crate::client::{ApiClient, ChatMessage, SessionSummary};

/// Shown in place of the assistant reply when the stream dies mid-turn.
pub const STREAM_ERROR_TEXT: &str = "An error occurred. Please try again.";

/// Session title for a turn that carries an image but no text.
pub const IMAGE_ONLY_TITLE: &str = "Image message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Composing,
    AwaitingSession,
    Streaming,
    Persisting,
}

/// Drives one chat turn at a time against the server: compose, create a
/// session on demand, stream the reply into a placeholder assistant
/// message, then persist the full history.
pub struct ChatTurn {
    api: ApiClient,
    model: String,
    state: TurnState,
    session_id: Option<String>,
    sessions: Vec<SessionSummary>,
    messages: Vec<ChatMessage>,
    pending_image: Option<String>,
}

impl ChatTurn {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            model: DEFAULT_MODEL.to_string(),
            state: TurnState::Idle,
            session_id: None,
            sessions: Vec::new(),
            messages: Vec::new(),
            pending_image: None,
        }
    }

    pub fn with_model(api: ApiClient, model: impl Into<String>) -> Self {
        let mut turn = Self::new(api);
        turn.model = model.into();
        turn
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub async fn refresh_sessions(&mut self) -> anyhow::Result<()> {
        self.sessions = self.api.list_sessions().await?;
        Ok(())
    }

    /// Loads an existing session and makes it current.
    pub async fn select_session(&mut self, id: &str) -> anyhow::Result<()> {
        let detail = self.api.get_session(id).await?;
        self.session_id = Some(detail.id);
        self.messages = detail.messages;
        self.pending_image = None;
        Ok(())
    }

    pub fn new_chat(&mut self) {
        self.session_id = None;
        self.messages.clear();
        self.pending_image = None;
        self.state = TurnState::Idle;
    }

    pub async fn delete_session(&mut self, id: &str) -> anyhow::Result<()> {
        self.api.delete_session(id).await?;
        self.sessions.retain(|s| s.id != id);
        if self.session_id.as_deref() == Some(id) {
            self.session_id = None;
            self.messages.clear();
        }
        Ok(())
    }

    /// Attaches one local image to the next submitted message, encoded as
    /// a data URL. Replaces any previously attached image.
    pub fn attach_image(&mut self, path: &Path) -> anyhow::Result<()> {
        let bytes = std::fs::read(path)?;
        let mime = mime_for_extension(path);
        self.attach_image_data(mime, &bytes);
        Ok(())
    }

    pub fn attach_image_data(&mut self, mime_type: &str, bytes: &[u8]) {
        let encoded = STANDARD.encode(bytes);
        self.pending_image = Some(format!("data:{};base64,{}", mime_type, encoded));
    }

    pub fn has_pending_image(&self) -> bool {
        self.pending_image.is_some()
    }

    /// Runs one full chat turn. Streaming failure replaces the assistant
    /// reply with [`STREAM_ERROR_TEXT`]; the persist step runs either way
    /// and its own failure is not surfaced.
    pub async fn submit(&mut self, input: &str) -> anyhow::Result<()> {
        let text = input.trim();
        if text.is_empty() && self.pending_image.is_none() {
            return Ok(());
        }
        self.state = TurnState::Composing;

        let image_url = self.pending_image.take();
        let user_message = ChatMessage::user(text, image_url);

        if self.session_id.is_none() {
            self.state = TurnState::AwaitingSession;
            let title = if user_message.content.is_empty() {
                IMAGE_ONLY_TITLE.to_string()
            } else {
                user_message
                    .content
                    .chars()
                    .take(TITLE_MAX_CHARS)
                    .collect()
            };
            match self.api.create_session(&title, &self.model).await {
                Ok(session) => {
                    self.session_id = Some(session.id);
                    if let Err(e) = self.refresh_sessions().await {
                        log::warn!("Failed to refresh sessions: {}", e);
                    }
                }
                Err(e) => {
                    // The turn still streams without a session, it just won't persist
                    log::warn!("Failed to create session: {}", e);
                }
            }
        }

        self.messages.push(user_message);
        let history = self.messages.clone();
        self.messages.push(ChatMessage::assistant(""));

        self.state = TurnState::Streaming;
        let (tx, mut rx) = mpsc::channel::<String>(32);
        let api = self.api.clone();
        let model = self.model.clone();
        let stream_task = tokio::spawn(async move {
            api.stream_chat(&history, &model, tx).await
        });

        while let Some(fragment) = rx.recv().await {
            if let Some(last) = self.messages.last_mut() {
                last.content.push_str(&fragment);
            }
        }

        let stream_ok = matches!(stream_task.await, Ok(Ok(())));
        if !stream_ok {
            if let Some(last) = self.messages.last_mut() {
                last.content = STREAM_ERROR_TEXT.to_string();
            }
        }

        self.state = TurnState::Persisting;
        if let Some(session_id) = self.session_id.clone() {
            if let Err(e) = self.api.save_messages(&session_id, &self.messages).await {
                log::warn!("Failed to persist messages: {}", e);
            }
            if let Err(e) = self.refresh_sessions().await {
                log::warn!("Failed to refresh sessions: {}", e);
            }
        }

        self.state = TurnState::Idle;
        Ok(())
    }
}

fn mime_for_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
