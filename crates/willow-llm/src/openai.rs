use std::sync::Arc;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Client};

use willow_core::ChatRequest;

use crate::config::ProviderConfig;
use crate::error::{LlmError, Result};
use crate::provider::{ChatProvider, ChatStream};
use crate::transformer::OpenAiTransformer;

/// OpenAI-compatible streaming provider
///
/// Sends one request per call, no retries: a mid-stream failure
/// surfaces as a stream item error and the stream ends.
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: Client,
    transformer: Arc<OpenAiTransformer>,
}

impl OpenAiProvider {
    /// Create a new provider from config
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            config,
            client,
            transformer: Arc::new(OpenAiTransformer::new()),
        })
    }

    /// Get the config
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(key) = &self.config.api_key {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| LlmError::Config(format!("Invalid api key: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        for (key, value) in &self.config.headers {
            let name = header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| LlmError::Config(format!("Invalid header name: {}", e)))?;
            let value = header::HeaderValue::from_str(value)
                .map_err(|e| LlmError::Config(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        "openai"
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream> {
        let mut request = request;
        request.options.stream = true;

        let body = self.transformer.transform_request(&request)?;
        let headers = self.build_headers()?;
        let url = format!("{}/chat/completions", self.config.base_url);

        log::debug!(
            "Opening chat stream: model={} messages={}",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(error_text),
                _ => LlmError::Api {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let transformer = self.transformer.clone();
        let stream = response
            .bytes_stream()
            .eventsource()
            .map_err(|e| LlmError::Stream(e.to_string()))
            .filter_map(move |result| {
                let transformer = transformer.clone();
                async move {
                    match result {
                        Ok(event) => transformer
                            .parse_stream_chunk(&event.data)
                            .map_err(LlmError::Transform)
                            .transpose(),
                        Err(e) => Some(Err(e)),
                    }
                }
            });

        Ok(Box::pin(stream))
    }
}
