/// Chat stream chunk
///
/// `Finish` is the explicit end-of-sequence marker; consumers never
/// have to infer completion from connection close.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatChunk {
    /// Text content delta
    Content { text: String },
    /// Stream finished
    Finish { reason: FinishReason },
    /// Error occurred mid-stream
    Error { message: String },
}

impl ChatChunk {
    /// Create a content chunk
    pub fn content(text: impl Into<String>) -> Self {
        Self::Content { text: text.into() }
    }

    /// Create a finish chunk
    pub fn finish(reason: FinishReason) -> Self {
        Self::Finish { reason }
    }

    /// Create an error chunk
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Check if this chunk terminates the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finish { .. } | Self::Error { .. })
    }
}

/// Reason for finishing the generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Completed naturally
    Stop,
    /// Hit token limit
    Length,
    /// Error occurred
    Error,
}

impl FinishReason {
    /// Parse a provider finish_reason string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "length" => Self::Length,
            "error" => Self::Error,
            _ => Self::Stop,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("length"), FinishReason::Length);
        assert_eq!(FinishReason::parse("unknown"), FinishReason::Stop);
    }

    #[test]
    fn test_terminal_chunks() {
        assert!(!ChatChunk::content("Hello").is_terminal());
        assert!(ChatChunk::finish(FinishReason::Stop).is_terminal());
        assert!(ChatChunk::error("boom").is_terminal());
    }
}
