use serde::{Deserialize, Serialize};

use crate::types::content::{Content, ContentPart};

/// Message role in a conversation
///
/// The domain is exactly two values; anything else fails to
/// deserialize at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Model-facing message: a role plus text or multipart content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::Text {
                text: content.into(),
            },
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text {
                text: content.into(),
            },
        }
    }

    /// Create a message from parts (multimodal content)
    pub fn from_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: Content::Parts { parts },
        }
    }

    /// All text content concatenated
    pub fn text_content(&self) -> String {
        self.content.text_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text_content(), "Hello!");
    }

    #[test]
    fn test_assistant_message() {
        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text_content(), "Hi there");
    }

    #[test]
    fn test_from_parts() {
        let msg = Message::from_parts(
            Role::User,
            vec![
                ContentPart::text("what is this?"),
                ContentPart::image("image/png", "ZGF0YQ=="),
            ],
        );
        assert_eq!(msg.text_content(), "what is this?");
    }

    #[test]
    fn test_role_serde_domain() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert!(serde_json::from_str::<Role>("\"system\"").is_err());
    }
}
