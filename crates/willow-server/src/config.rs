//! 服务器配置

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// LLM API 基础 URL
    pub llm_base_url: String,
    /// LLM API key（可选，以 Bearer 头发送）
    pub llm_api_key: Option<String>,
    /// 默认模型名称
    pub model: String,
    /// 会话存储目录
    pub data_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            llm_base_url: "https://api.openai.com/v1".to_string(),
            llm_api_key: None,
            model: willow_core::DEFAULT_MODEL.to_string(),
            data_dir: willow_session::default_store_path()
                .to_string_lossy()
                .into_owned(),
        }
    }
}

impl ServerConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("WILLOW_HOST").unwrap_or(defaults.host),
            port: std::env::var("WILLOW_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            llm_base_url: std::env::var("LLM_BASE_URL").unwrap_or(defaults.llm_base_url),
            llm_api_key: std::env::var("LLM_API_KEY").ok(),
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            data_dir: std::env::var("WILLOW_DATA_DIR").unwrap_or(defaults.data_dir),
        }
    }
}
