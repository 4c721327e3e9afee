//! LLM 提供商客户端
//!
//! 两个提供商实现同一个 [`ChatProvider`] 接口，由 [`ProviderSelection`] 选择具体实现

pub mod groq_client;
pub mod together_client;

pub use groq_client::GroqClient;
pub use together_client::TogetherClient;

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::{ChatMessage, ChatRequest, Credential, ProviderSelection};

/// 默认请求超时
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// 聊天补全能力
///
/// 实现只负责一次网络调用，不做重试，也不做降级
pub trait ChatProvider: Send + Sync {
    /// 当前实现对应的提供商
    fn selection(&self) -> ProviderSelection;

    /// 发送一次聊天补全请求，返回第一条 choice 的文本
    fn chat_complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> impl Future<Output = AppResult<String>> + Send;

    /// 用最小的请求验证 API Key
    fn verify_key(&self, credential: &Credential) -> impl Future<Output = AppResult<()>> + Send {
        async move {
            let request = ChatRequest::new(
                self.selection().model_id(),
                vec![ChatMessage::user("Test")],
                10,
            );
            self.chat_complete(credential, &request).await.map(|_| ())
        }
    }
}

/// 按配置选择的提供商客户端
pub enum ProviderClient {
    Together(TogetherClient),
    Groq(GroqClient),
}

impl ProviderClient {
    pub fn new(selection: ProviderSelection, timeout: Duration) -> AppResult<Self> {
        let client = match selection {
            ProviderSelection::Together => ProviderClient::Together(TogetherClient::new(timeout)?),
            ProviderSelection::Groq => ProviderClient::Groq(GroqClient::new(timeout)?),
        };
        Ok(client)
    }
}

impl ChatProvider for ProviderClient {
    fn selection(&self) -> ProviderSelection {
        match self {
            ProviderClient::Together(c) => c.selection(),
            ProviderClient::Groq(c) => c.selection(),
        }
    }

    async fn chat_complete(&self, credential: &Credential, request: &ChatRequest) -> AppResult<String> {
        match self {
            ProviderClient::Together(c) => c.chat_complete(credential, request).await,
            ProviderClient::Groq(c) => c.chat_complete(credential, request).await,
        }
    }
}

/// 两个客户端共用的 HTTP 客户端构建
pub(crate) fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Other(format!("创建 HTTP 客户端失败: {}", e)))
}

/// 按 HTTP 状态码归类错误
pub(crate) fn classify_status(provider: ProviderSelection, status: u16, message: String) -> AppError {
    match status {
        401 | 403 => AppError::credential_invalid(provider.name(), message),
        _ => AppError::transport_failed(provider.name(), Some(status), message),
    }
}
