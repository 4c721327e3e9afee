//! Groq 客户端
//!
//! 直接用 `reqwest` 调用 Groq 的聊天补全接口

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{build_http_client, classify_status, ChatProvider};
use crate::error::{AppError, AppResult};
use crate::models::{ChatRequest, Credential, ProviderSelection};

const PROVIDER: ProviderSelection = ProviderSelection::Groq;

/// Groq 客户端
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GroqClient {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(PROVIDER.base_url(), timeout)
    }

    /// 指定 API 基础地址（代理或本地模拟服务）
    pub fn with_base_url(base_url: &str, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

// ---- Groq API 响应结构 ----

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ChatProvider for GroqClient {
    fn selection(&self) -> ProviderSelection {
        PROVIDER
    }

    async fn chat_complete(&self, credential: &Credential, request: &ChatRequest) -> AppResult<String> {
        debug!("调用 Groq API，模型: {}", request.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Groq API 请求失败: {}", e);
                AppError::transport_failed(PROVIDER.name(), None, e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::transport_failed(PROVIDER.name(), Some(status), e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
            warn!("Groq API 返回错误 ({}): {}", status, message);
            return Err(classify_status(PROVIDER, status, message));
        }

        debug!("Groq API 调用成功");
        parse_chat_response(&body)
    }
}

/// 取出第一条 choice 的文本
fn parse_chat_response(body: &str) -> AppResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AppError::malformed_response(PROVIDER.name(), e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::malformed_response(PROVIDER.name(), "响应中没有 choices[0].message.content"))
}
