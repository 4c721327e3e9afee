//! 标题改写 - 业务能力层
//!
//! 失败时退回原标题，不会让条目失败

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::ChatProvider;
use crate::error::{AppError, AppResult};
use crate::models::{ChatMessage, ChatRequest, Credential};
use crate::services::notifier::Notifier;
use crate::services::retry::RetryPolicy;

const REWRITE_MAX_TOKENS: u32 = 50;
const REWRITE_TEMPERATURE: f32 = 0.7;

/// 构建改写标题的提示词
pub fn build_rewrite_prompt(title: &str) -> String {
    format!(
        "Reescribe este título en formato H1 en español de manera pegajosa y que cree duda para seguir leyendo el artículo. Proporciona solo un título reescrito sin explicaciones adicionales: {}",
        title
    )
}

/// 标题改写服务
pub struct TitleRewriter<P: ChatProvider> {
    provider: Arc<P>,
    retry: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl<P: ChatProvider> TitleRewriter<P> {
    pub fn new(provider: Arc<P>, retry: RetryPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider,
            retry,
            notifier,
        }
    }

    /// 改写标题，任何失败都返回原标题
    pub async fn rewrite(&self, title: &str, credential: &Credential) -> String {
        match self.try_rewrite(title, credential).await {
            Ok(new_title) => {
                info!("✏️ 标题已改写: {} → {}", title, new_title);
                new_title
            }
            Err(e) => {
                warn!("⚠️ 标题改写失败，保留原标题: {}", e);
                self.notifier
                    .error(format!("Error al reescribir título: {}", e.user_message()));
                title.to_string()
            }
        }
    }

    /// 带重试的改写调用，错误原样返回
    pub async fn try_rewrite(&self, title: &str, credential: &Credential) -> AppResult<String> {
        let request = ChatRequest::new(
            self.provider.selection().model_id(),
            vec![ChatMessage::user(build_rewrite_prompt(title))],
            REWRITE_MAX_TOKENS,
        )
        .with_temperature(REWRITE_TEMPERATURE);

        debug!("改写标题: {}", title);

        let rewritten = self
            .retry
            .run("改写标题", || self.provider.chat_complete(credential, &request))
            .await?;

        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            return Err(AppError::malformed_response(
                self.provider.selection().name(),
                "改写结果为空",
            ));
        }

        Ok(rewritten.to_string())
    }
}
