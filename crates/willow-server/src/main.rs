use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use willow_llm::{OpenAiProvider, ProviderConfig};
use willow_session::{JsonStore, JsonStoreConfig};
use willow_server::{run_server, AppState, ServerConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "willow-server")]
#[command(about = "Willow Chat HTTP Server")]
#[command(version)]
struct Cli {
    /// Listen host (overrides env)
    #[arg(long, env = "WILLOW_HOST")]
    host: Option<String>,

    /// Listen port (overrides env)
    #[arg(long, env = "WILLOW_PORT")]
    port: Option<u16>,

    /// LLM API base URL (overrides env)
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    /// LLM API key (overrides env)
    #[arg(long, env = "LLM_API_KEY")]
    api_key: Option<String>,

    /// Default model name (overrides env)
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// Session storage directory (overrides env)
    #[arg(long, env = "WILLOW_DATA_DIR")]
    data_dir: Option<String>,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let filter = match &cli.log {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 配置：环境变量打底，CLI 参数覆盖
    let mut config = ServerConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = cli.llm_base_url {
        config.llm_base_url = url;
    }
    if let Some(key) = cli.api_key {
        config.llm_api_key = Some(key);
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    tracing::info!("Starting Willow server on {}:{}", config.host, config.port);
    tracing::info!("  LLM base URL: {}", config.llm_base_url);
    tracing::info!("  Default model: {}", config.model);
    tracing::info!("  Data dir: {}", config.data_dir);

    // 会话存储
    let store = JsonStore::new(JsonStoreConfig::new(&config.data_dir)).await?;

    // 模型能力
    let mut provider_config = ProviderConfig::new(&config.llm_base_url);
    if let Some(key) = &config.llm_api_key {
        provider_config = provider_config.with_api_key(key);
    }
    let provider = OpenAiProvider::new(provider_config)?;

    let state = AppState::new(Arc::new(store), Arc::new(provider), config);

    run_server(state).await
}
