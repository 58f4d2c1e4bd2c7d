//! # JsonStore Implementation
//!
//! 基于 JSON 文件的会话持久化实现。
//!
//! 存储结构:
//! ```text
//! <base_path>/
//! └── sessions/
//!     ├── <session_id>.json      # 完整会话记录（元数据 + 消息）
//!     └── ...
//! ```
//!
//! 摘要索引常驻内存，启动时扫描 sessions 目录重建。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::SessionStore;
use crate::types::{SessionRecord, SessionSummary, StoredMessage};

/// JsonStore 配置
#[derive(Debug, Clone)]
pub struct JsonStoreConfig {
    /// 存储根目录
    pub base_path: PathBuf,
}

impl JsonStoreConfig {
    /// 创建配置
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Default for JsonStoreConfig {
    fn default() -> Self {
        Self::new(crate::default_store_path())
    }
}

/// JsonStore 实现
pub struct JsonStore {
    sessions_path: PathBuf,
    /// 摘要索引: session_id -> SessionSummary
    index: Arc<RwLock<HashMap<String, SessionSummary>>>,
}

impl JsonStore {
    /// 创建新的 JsonStore 实例并重建索引
    pub async fn new(config: JsonStoreConfig) -> StoreResult<Self> {
        let base_path_str = config.base_path.to_string_lossy().to_string();
        let base_path = PathBuf::from(shellexpand::tilde(&base_path_str).as_ref());
        let sessions_path = base_path.join("sessions");

        fs::create_dir_all(&sessions_path).await?;

        let store = Self {
            sessions_path,
            index: Arc::new(RwLock::new(HashMap::new())),
        };

        store.rebuild_index().await?;

        info!("JsonStore initialized at {:?}", base_path);
        Ok(store)
    }

    /// 获取会话文件路径
    fn session_file_path(&self, session_id: &str) -> PathBuf {
        self.sessions_path.join(format!("{}.json", session_id))
    }

    /// 保存记录到文件并更新索引
    async fn save_record(&self, record: &SessionRecord) -> StoreResult<()> {
        let path = self.session_file_path(&record.id);
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&path, content).await?;

        self.index.write().insert(record.id.clone(), record.summary());

        debug!("Saved session: {}", record.id);
        Ok(())
    }

    /// 从文件加载记录
    async fn load_record(&self, session_id: &str) -> StoreResult<SessionRecord> {
        let path = self.session_file_path(session_id);
        if !path.exists() {
            return Err(StoreError::not_found(session_id));
        }

        let content = fs::read_to_string(&path).await?;
        let record: SessionRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// 扫描 sessions 目录重建索引
    async fn rebuild_index(&self) -> StoreResult<()> {
        let mut entries = fs::read_dir(&self.sessions_path).await?;
        let mut count = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<SessionRecord>(&content) {
                Ok(record) => {
                    self.index.write().insert(record.id.clone(), record.summary());
                    count += 1;
                }
                Err(e) => {
                    warn!("Failed to parse session file {:?}: {}", path, e);
                }
            }
        }

        if count > 0 {
            info!("Rebuilt index with {} sessions", count);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonStore {
    async fn list_summaries(&self) -> StoreResult<Vec<SessionSummary>> {
        let mut summaries: Vec<_> = self.index.read().values().cloned().collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn create(&self, title: &str, model: Option<&str>) -> StoreResult<SessionRecord> {
        let record = SessionRecord::new(title, model);
        self.save_record(&record).await?;

        info!("Created session: {}", record.id);
        Ok(record)
    }

    async fn get(&self, session_id: &str) -> StoreResult<SessionRecord> {
        self.load_record(session_id).await
    }

    async fn delete(&self, session_id: &str) -> StoreResult<()> {
        let path = self.session_file_path(session_id);
        if path.exists() {
            fs::remove_file(&path).await?;
            info!("Deleted session: {}", session_id);
        } else {
            // 不存在视为已删除
            debug!("Delete ignored, session not found: {}", session_id);
        }

        self.index.write().remove(session_id);
        Ok(())
    }

    async fn replace_messages(
        &self,
        session_id: &str,
        messages: Vec<StoredMessage>,
    ) -> StoreResult<()> {
        let mut record = self.load_record(session_id).await?;
        record.replace_messages(messages);
        self.save_record(&record).await?;

        debug!(
            "Replaced messages for session {}: {} messages",
            session_id,
            record.messages.len()
        );
        Ok(())
    }
}
