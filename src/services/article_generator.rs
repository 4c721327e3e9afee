//! 文章生成 - 业务能力层
//!
//! 生成失败时不返回错误，而是返回一段带失败原因的正文，后续渲染和输出照常进行

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::ChatProvider;
use crate::error::AppResult;
use crate::models::{ChatMessage, ChatRequest, Credential, PromptTemplate};
use crate::services::notifier::Notifier;
use crate::services::retry::RetryPolicy;

pub const SYSTEM_PROMPT: &str = "Eres un redactor experto en SEO.";

/// 生成失败时正文的固定前缀
pub const GENERATION_FAILURE_PREFIX: &str = "No se pudo generar el artículo debido a un error";

const GENERATION_MAX_TOKENS: u32 = 8000;
const GENERATION_TEMPERATURE: f32 = 0.7;

/// 无论使用哪个模板都会追加的写作要求
const REMEMBER_BLOCK: &str = "\
Recuerda:
1. El artículo debe tener entre 3 y 5 secciones.
2. El total de palabras debe estar entre 1800 y 2100.
3. En los primeros párrafos, responde a la intención de búsqueda implícita en el título.
4. Asegúrate de que cada H2 o H3 esté completo y bien desarrollado.
5. Incluye listas y tablas para hacer el texto más dinámico y fácil de leer.
6. Las respuestas a las preguntas frecuentes deben ser extensas y detalladas, con al menos 5 párrafos cada una.";

/// 模板 + 标题 + 固定写作要求
pub fn build_article_prompt(template: &PromptTemplate, title: &str) -> String {
    format!("{}\n\nTítulo: {}\n\n{}", template.text(), title, REMEMBER_BLOCK)
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    /// 正文；失败时为错误说明
    pub body: String,
    /// 失败原因（日志用的描述，正文里是西班牙语描述）
    pub failure: Option<String>,
}

/// 文章生成服务
pub struct ArticleGenerator<P: ChatProvider> {
    provider: Arc<P>,
    retry: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl<P: ChatProvider> ArticleGenerator<P> {
    pub fn new(provider: Arc<P>, retry: RetryPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provider,
            retry,
            notifier,
        }
    }

    /// 生成文章正文；失败时正文为错误说明文本
    pub async fn generate(
        &self,
        title: &str,
        template: &PromptTemplate,
        credential: &Credential,
    ) -> ArticleDraft {
        match self.try_generate(title, template, credential).await {
            Ok(body) => {
                info!("📝 文章生成完成: {} ({} 字符)", title, body.chars().count());
                ArticleDraft { body, failure: None }
            }
            Err(e) => {
                warn!("⚠️ 文章生成失败: {}", e);
                let reason = e.user_message();
                self.notifier
                    .error(format!("Error al generar artículo: {}", reason));
                ArticleDraft {
                    body: format!("{}: {}", GENERATION_FAILURE_PREFIX, reason),
                    failure: Some(e.to_string()),
                }
            }
        }
    }

    /// 带重试的生成调用，错误原样返回；返回内容不做任何校验
    pub async fn try_generate(
        &self,
        title: &str,
        template: &PromptTemplate,
        credential: &Credential,
    ) -> AppResult<String> {
        let prompt = build_article_prompt(template, title);
        debug!("生成文章: {}，提示词长度: {} 字符", title, prompt.chars().count());

        let request = ChatRequest::new(
            self.provider.selection().model_id(),
            vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            GENERATION_MAX_TOKENS,
        )
        .with_temperature(GENERATION_TEMPERATURE);

        self.retry
            .run("生成文章", || self.provider.chat_complete(credential, &request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use crate::services::notifier::CollectingNotifier;
    use crate::testutil::ScriptedProvider;
    use std::time::Duration;

    fn generator(
        provider: Arc<ScriptedProvider>,
        notifier: Arc<CollectingNotifier>,
    ) -> ArticleGenerator<ScriptedProvider> {
        ArticleGenerator::new(
            provider,
            RetryPolicy::default().with_unit(Duration::from_millis(1)),
            notifier,
        )
    }

    #[test]
    fn test_prompt_always_has_remember_block() {
        let default = build_article_prompt(&PromptTemplate::Default, "Cómo ahorrar dinero");
        let custom = build_article_prompt(&PromptTemplate::Custom("Habla de jardines".into()), "Rosas");

        assert!(default.contains("\n\nTítulo: Cómo ahorrar dinero\n\nRecuerda:\n1."));
        assert!(custom.starts_with("Habla de jardines\n\nTítulo: Rosas\n\nRecuerda:"));
        assert!(custom.contains("entre 1800 y 2100"));
        assert!(custom.ends_with("con al menos 5 párrafos cada una."));
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_user_turns() {
        let provider = Arc::new(ScriptedProvider::replying("<h2>X</h2><p>...</p>"));
        let notifier = Arc::new(CollectingNotifier::new());

        let draft = generator(provider.clone(), notifier)
            .generate("Cómo ahorrar dinero", &PromptTemplate::Default, &Credential::new("k"))
            .await;

        assert_eq!(draft.body, "<h2>X</h2><p>...</p>");
        assert_eq!(draft.failure, None);

        let request = &provider.requests()[0];
        assert_eq!(request.model, "llama3-groq-70b-8192-tool-use-preview");
        assert_eq!(request.max_tokens, 8000);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, ChatRole::User);
    }

    #[tokio::test]
    async fn test_generate_failure_becomes_visible_body() {
        let provider = Arc::new(ScriptedProvider::failing());
        let notifier = Arc::new(CollectingNotifier::new());

        let draft = generator(provider.clone(), notifier.clone())
            .generate("Cómo ahorrar dinero", &PromptTemplate::Default, &Credential::new("k"))
            .await;

        assert!(draft.body.starts_with(GENERATION_FAILURE_PREFIX));
        assert!(draft.body.contains("service unavailable"));
        assert!(draft.body.contains("se agotaron los 5 intentos"));
        assert!(!draft.body.contains("已重试"));
        assert!(draft.failure.as_deref().unwrap().contains("已重试 5 次"));
        assert!(draft.failure.is_some());
        assert_eq!(provider.call_count(), 5);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_keeps_response_verbatim() {
        let provider = Arc::new(ScriptedProvider::replying("  texto con espacios  \n"));
        let notifier = Arc::new(CollectingNotifier::new());

        let draft = generator(provider, notifier)
            .generate("t", &PromptTemplate::Default, &Credential::new("k"))
            .await;

        assert_eq!(draft.body, "  texto con espacios  \n");
    }
}
