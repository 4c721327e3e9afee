//! API Key 验证 - 业务能力层

use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ChatProvider;
use crate::models::Credential;
use crate::services::notifier::Notifier;
use crate::services::retry::RetryPolicy;

/// API Key 验证服务
///
/// 结果只用于展示，不会阻止批处理开始
pub struct KeyVerifier<P: ChatProvider> {
    provider: Arc<P>,
    retry: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl<P: ChatProvider> KeyVerifier<P> {
    pub fn new(provider: Arc<P>, retry: RetryPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider,
            retry,
            notifier,
        }
    }

    /// 验证 Key；失败时通过通知渠道报告原因并返回 false，不会返回错误
    pub async fn verify(&self, credential: &Credential) -> bool {
        let provider_name = self.provider.selection().name();

        if credential.is_empty() {
            self.notifier
                .error(format!("❌ API Key de {} inválida: la clave está vacía", provider_name));
            return false;
        }

        info!("🔑 正在验证 {} API Key...", provider_name);

        let result = self
            .retry
            .run("验证 API Key", || self.provider.verify_key(credential))
            .await;

        match result {
            Ok(()) => {
                self.notifier
                    .success(format!("✅ API Key de {} verificada", provider_name));
                true
            }
            Err(e) => {
                warn!("⚠️ {} API Key 验证失败: {}", provider_name, e);
                self.notifier.error(format!(
                    "Error al verificar API de {}: {}",
                    provider_name,
                    e.user_message()
                ));
                self.notifier
                    .error(format!("❌ API Key de {} inválida", provider_name));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::notifier::{CollectingNotifier, Notice};
    use crate::testutil::ScriptedProvider;
    use std::time::Duration;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default().with_unit(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_valid_key() {
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let notifier = Arc::new(CollectingNotifier::new());
        let verifier = KeyVerifier::new(provider.clone(), fast_retry(), notifier.clone());

        assert!(verifier.verify(&Credential::new("gsk_test")).await);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(requests[0].messages[0].content, "Test");
        assert!(matches!(notifier.notices()[0], Notice::Success(_)));
    }

    #[tokio::test]
    async fn test_rejected_key_returns_false_without_retry() {
        let provider = Arc::new(
            ScriptedProvider::replying("ok")
                .with_script(vec![Err(AppError::credential_invalid("stub", "Invalid API Key"))]),
        );
        let notifier = Arc::new(CollectingNotifier::new());
        let verifier = KeyVerifier::new(provider.clone(), fast_retry(), notifier.clone());

        assert!(!verifier.verify(&Credential::new("bad")).await);
        assert_eq!(provider.call_count(), 1);
        assert!(notifier.errors().iter().any(|e| e.contains("Invalid API Key")));
    }

    #[tokio::test]
    async fn test_unreachable_provider_returns_false_after_retries() {
        let provider = Arc::new(ScriptedProvider::failing());
        let notifier = Arc::new(CollectingNotifier::new());
        let verifier = KeyVerifier::new(provider.clone(), fast_retry(), notifier.clone());

        assert!(!verifier.verify(&Credential::new("gsk_test")).await);
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn test_empty_key_is_not_sent() {
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let notifier = Arc::new(CollectingNotifier::new());
        let verifier = KeyVerifier::new(provider.clone(), fast_retry(), notifier.clone());

        assert!(!verifier.verify(&Credential::new("  ")).await);
        assert_eq!(provider.call_count(), 0);
    }
}
