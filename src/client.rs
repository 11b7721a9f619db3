//! 生成客户端核心模块
use crate::{
    assembler::Generator,
    config::Config,
    error::{ArtigenError, Result},
    stream::{FragmentStream, StreamWrapper},
    types::{Message, PromptRequest, Role},
    utils::message,
};
use async_trait::async_trait;
use log::error;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, RequestBuilder, Response,
};
use std::sync::Arc;
use tokio::sync::Semaphore;

// ================================================================================================
// 核心客户端模块
// ================================================================================================

/// 流式生成客户端
///
/// 将一次 [`PromptRequest`] 转换为惰性的片段流，或转换为完整
/// 拼接好的字符串。除网络调用外不产生任何副作用，调用之间不保留
/// 状态。
#[derive(Debug, Clone)]
pub struct StreamClient {
    client: Arc<Client>,
    config: Arc<Config>,
    semaphore: Arc<Semaphore>,
    stream_handler: StreamWrapper,
}

impl StreamClient {
    /// 创建一个新的 `StreamClient` 实例
    pub fn new(config: Config) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_keepalive(config.tcp_keepalive)
            .tcp_nodelay(config.tcp_nodelay)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build reqwest client: {}", e);
                Client::new()
            });

        let semaphore = Semaphore::new(config.max_concurrent_requests.unwrap_or(64));

        Self {
            client: Arc::new(client),
            config: Arc::new(config),
            semaphore: Arc::new(semaphore),
            stream_handler: StreamWrapper::new(),
        }
    }

    /// 当前生效的配置
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 构建 API 请求所需的 HTTP 标头
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|e| ArtigenError::InvalidRequest(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// 发送 HTTP 请求并检查状态码
    ///
    /// 非成功状态码读取响应正文后以 [`ArtigenError::Api`] 返回，
    /// 携带状态码与正文，当前请求就此终止。
    async fn send(&self, request_builder: RequestBuilder) -> Result<Response> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ArtigenError::InvalidRequest(format!("Semaphore closed: {}", e)))?;

        let response_result = request_builder.send().await;
        drop(permit);

        let response = response_result?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| String::new());
            Err(ArtigenError::Api { status, body })
        }
    }

    /// 以流式方式执行一次补全请求
    pub async fn stream_request(&self, request: PromptRequest) -> Result<FragmentStream> {
        let endpoint = format!("{}/chat/completions", self.config.api_base);
        let mut headers = self.build_headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let request_builder = self.client.post(&endpoint).headers(headers).json(&request);
        let response = self.send(request_builder).await?;

        Ok(FragmentStream::new(
            self.stream_handler.fragments(response.bytes_stream()),
        ))
    }

    /// 为给定的提示生成流式响应
    pub async fn stream_generate(&self, prompt: &str) -> Result<FragmentStream> {
        let messages = vec![message(Role::User, prompt)];
        self.stream_messages(messages).await
    }

    /// 为给定的消息列表生成流式响应
    pub async fn stream_messages(&self, messages: Vec<Message>) -> Result<FragmentStream> {
        let request = PromptRequest::new(&self.config, messages, true);
        self.stream_request(request).await
    }

    /// 为给定的提示生成完整响应
    ///
    /// 排空内部的片段流后返回拼接结果；结果为空时返回
    /// [`ArtigenError::EmptyResult`]。
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let stream = self.stream_generate(prompt).await?;
        stream.drain().await
    }
}

#[async_trait]
impl Generator for StreamClient {
    async fn stream(&self, prompt: &str) -> Result<FragmentStream> {
        self.stream_generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the bearer token ends up in the request headers.
    #[test]
    fn test_build_headers_bearer_token() {
        let client = StreamClient::new(Config::default().with_api_key("secreto".into()));
        let headers = client.build_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secreto");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    /// Tests that a key with control characters is rejected up front.
    #[test]
    fn test_build_headers_invalid_key() {
        let client = StreamClient::new(Config::default().with_api_key("bad\nkey".into()));
        let result = client.build_headers();
        assert!(matches!(result, Err(ArtigenError::InvalidRequest(_))));
    }
}
