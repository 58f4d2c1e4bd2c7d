//! # SessionStore Trait
//!
//! 定义会话存储的统一接口。

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{SessionRecord, SessionSummary, StoredMessage};

/// 会话存储 trait
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 列出会话摘要，按 updated_at 降序（不含消息）
    async fn list_summaries(&self) -> StoreResult<Vec<SessionSummary>>;

    /// 创建新会话（标题与模型在内部规范化，消息列表为空）
    async fn create(&self, title: &str, model: Option<&str>) -> StoreResult<SessionRecord>;

    /// 加载完整会话（含消息）；不存在时返回 SessionNotFound
    async fn get(&self, session_id: &str) -> StoreResult<SessionRecord>;

    /// 删除会话
    ///
    /// 幂等操作：删除不存在的会话同样视为成功。
    async fn delete(&self, session_id: &str) -> StoreResult<()>;

    /// 整体替换会话的消息列表
    ///
    /// 不存在时返回 SessionNotFound，绝不隐式创建会话。
    async fn replace_messages(
        &self,
        session_id: &str,
        messages: Vec<StoredMessage>,
    ) -> StoreResult<()>;
}
