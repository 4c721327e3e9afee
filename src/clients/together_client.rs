//! Together 客户端
//!
//! Together 提供 OpenAI 兼容端点，直接使用 `async-openai`，只替换 API 基础地址

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use super::{build_http_client, classify_status, ChatProvider};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{ChatMessage, ChatRequest, ChatRole, Credential, ProviderSelection};

const PROVIDER: ProviderSelection = ProviderSelection::Together;

/// Together 客户端
///
/// 每次调用按传入的 Key 构建 `async-openai` 客户端，HTTP 连接池复用
#[derive(Clone)]
pub struct TogetherClient {
    http: reqwest::Client,
}

impl TogetherClient {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
        })
    }

    fn client_for(&self, credential: &Credential) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(credential.expose())
            .with_api_base(PROVIDER.base_url());

        Client::with_config(config).with_http_client(self.http.clone())
    }
}

impl ChatProvider for TogetherClient {
    fn selection(&self) -> ProviderSelection {
        PROVIDER
    }

    async fn chat_complete(&self, credential: &Credential, request: &ChatRequest) -> AppResult<String> {
        debug!("调用 Together API，模型: {}", request.model);

        let openai_request = build_request(request).map_err(map_openai_error)?;

        let response = self
            .client_for(credential)
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| {
                warn!("Together API 调用失败: {}", e);
                map_openai_error(e)
            })?;

        debug!("Together API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::malformed_response(PROVIDER.name(), "响应中没有 choices[0].message.content"))
    }
}

fn build_request(request: &ChatRequest) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let messages = request
        .messages
        .iter()
        .map(to_openai_message)
        .collect::<Result<Vec<_>, _>>()?;

    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(&request.model)
        .messages(messages)
        .max_tokens(request.max_tokens);

    if let Some(temperature) = request.temperature {
        args.temperature(temperature);
    }

    args.build()
}

fn to_openai_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let message = match message.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    };
    Ok(message)
}

fn map_openai_error(error: OpenAIError) -> AppError {
    match error {
        OpenAIError::ApiError(api_error) if is_auth_api_error(&api_error) => {
            AppError::credential_invalid(PROVIDER.name(), api_error.message)
        }
        OpenAIError::ApiError(api_error) => {
            AppError::transport_failed(PROVIDER.name(), None, api_error.message)
        }
        OpenAIError::Reqwest(reqwest_error) => match reqwest_error.status() {
            Some(status) => classify_status(PROVIDER, status.as_u16(), reqwest_error.to_string()),
            None => AppError::transport_failed(PROVIDER.name(), None, reqwest_error.to_string()),
        },
        err @ OpenAIError::JSONDeserialize(..) => {
            AppError::malformed_response(PROVIDER.name(), err.to_string())
        }
        OpenAIError::InvalidArgument(message) => ValidationError::InvalidRequest(message).into(),
        other => AppError::transport_failed(PROVIDER.name(), None, other.to_string()),
    }
}

fn is_auth_api_error(api_error: &ApiError) -> bool {
    let message = api_error.message.to_lowercase();
    let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
    let code = api_error.code.clone().unwrap_or_default().to_lowercase();

    message.contains("unauthorized")
        || message.contains("invalid api key")
        || message.contains("authentication")
        || code.contains("invalid_api_key")
        || error_type.contains("authentication")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn test_build_request_keeps_message_order() {
        let request = ChatRequest::new(
            PROVIDER.model_id(),
            vec![ChatMessage::system("sys"), ChatMessage::user("hola")],
            8000,
        )
        .with_temperature(0.7);

        let built = build_request(&request).unwrap();
        assert_eq!(built.model, PROVIDER.model_id());
        assert_eq!(built.messages.len(), 2);
        assert!(matches!(built.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(built.messages[1], ChatCompletionRequestMessage::User(_)));
        assert_eq!(built.temperature, Some(0.7));
    }

    #[test]
    fn test_invalid_key_api_error_maps_to_credential_invalid() {
        let api_error: ApiError = serde_json::from_value(serde_json::json!({
            "message": "Invalid API key provided",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }))
        .unwrap();
        let err = map_openai_error(OpenAIError::ApiError(api_error));
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::CredentialInvalid { .. })
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_argument_is_not_retried() {
        let err = map_openai_error(OpenAIError::InvalidArgument("messages 不能为空".into()));
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidRequest(_))
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_invalid_argument_stops_retry_after_one_call() {
        use crate::services::RetryPolicy;

        let calls = std::sync::atomic::AtomicU32::new(0);
        let counter = &calls;
        let result: AppResult<String> = RetryPolicy::default()
            .with_unit(Duration::from_millis(1))
            .run("build", move || async move {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Err(map_openai_error(OpenAIError::InvalidArgument("bad".into())))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    #[ignore] // 需要真实 Key：TOGETHER_API_KEY=... cargo test -- --ignored
    async fn test_verify_key_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let key = std::env::var("TOGETHER_API_KEY").unwrap_or_default();
        let client = TogetherClient::new(Duration::from_secs(60)).unwrap();

        let result = client.verify_key(&Credential::new(key)).await;
        assert!(result.is_ok(), "Key 验证失败: {:?}", result);
    }
}
