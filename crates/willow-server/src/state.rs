//! 应用状态 - 在 main.rs 中创建并共享给所有 handler

use std::sync::Arc;

use willow_llm::ChatProvider;
use willow_session::SessionStore;

use crate::config::ServerConfig;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 会话存储
    pub store: Arc<dyn SessionStore>,
    /// 模型能力
    pub provider: Arc<dyn ChatProvider>,
    /// 服务器配置
    pub config: ServerConfig,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn ChatProvider>,
        config: ServerConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }
}
