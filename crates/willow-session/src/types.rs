//! # Willow Session Types
//!
//! 定义会话记录、会话摘要和持久化消息等核心类型。
//! 磁盘文件与 API 响应共用同一套类型，字段名统一为 camelCase。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use willow_core::{normalize_model, normalize_title, Role};

/// 持久化消息
///
/// 消息 id 由客户端生成；服务端原样保存。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// 内联图片引用（`data:<mime>;base64,<payload>` 格式）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 客户端提交的消息（写入前规范化为 [`StoredMessage`]）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// RFC 3339 时间戳，缺省时取写入时间
    #[serde(default)]
    pub created_at: Option<String>,
}

impl MessageDraft {
    /// 规范化为持久化消息
    ///
    /// 时间戳解析失败与缺省同样处理：取当前时间。
    pub fn normalize(self) -> StoredMessage {
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        StoredMessage {
            id: self.id,
            role: self.role,
            content: self.content,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// 会话摘要（列表用，不含消息）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 完整会话记录（含消息历史）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<StoredMessage>,
}

impl SessionRecord {
    /// 创建新会话记录
    ///
    /// 标题与模型在此处规范化：标题裁剪到 50 个字符，空值替换为
    /// 默认占位标题；模型缺省时取默认模型。
    pub fn new(title: &str, model: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: normalize_title(title),
            model: normalize_model(model),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// 整体替换消息列表（无部分追加），并更新 updated_at
    pub fn replace_messages(&mut self, messages: Vec<StoredMessage>) {
        self.messages = messages;
        self.updated_at = Utc::now();
    }

    /// 生成摘要
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            model: self.model.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
