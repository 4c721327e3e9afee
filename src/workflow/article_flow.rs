//! 文章处理流程 - 流程层
//!
//! 核心职责：定义"一个标题"的完整处理流程
//!
//! 流程顺序：
//! 1. 改写标题（可选，失败时保留原标题）
//! 2. 生成正文（失败时正文为错误说明）
//! 3. 渲染 HTML / Markdown

use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ChatProvider;
use crate::models::{Credential, GenerationResult, PromptTemplate};
use crate::services::document_renderer::{render_artifacts, Artifact};
use crate::services::{ArticleGenerator, Notifier, RetryPolicy, TitleRewriter};
use crate::workflow::title_ctx::TitleCtx;

/// 单个标题的处理结果
#[derive(Debug, Clone)]
pub struct ArticleOutcome {
    pub result: GenerationResult,
    /// HTML 和 Markdown 两个产物
    pub artifacts: [Artifact; 2],
}

/// 文章处理流程
///
/// - 决定是否改写、何时生成、何时渲染
/// - 降级策略由各个服务自己决定，流程只负责串联
pub struct ArticleFlow<P: ChatProvider> {
    rewriter: TitleRewriter<P>,
    generator: ArticleGenerator<P>,
    template: PromptTemplate,
    rewrite_titles: bool,
}

impl<P: ChatProvider> ArticleFlow<P> {
    pub fn new(
        provider: Arc<P>,
        retry: RetryPolicy,
        notifier: Arc<dyn Notifier>,
        template: PromptTemplate,
        rewrite_titles: bool,
    ) -> Self {
        Self {
            rewriter: TitleRewriter::new(provider.clone(), retry.clone(), notifier.clone()),
            generator: ArticleGenerator::new(provider, retry, notifier),
            template,
            rewrite_titles,
        }
    }

    pub async fn run(&self, ctx: &TitleCtx, credential: &Credential) -> ArticleOutcome {
        let source_title = ctx.title.as_str();

        // ========== 1. 改写标题 ==========
        let title = if self.rewrite_titles {
            info!("{} ✏️ 正在改写标题...", ctx);
            self.rewriter.rewrite(source_title, credential).await
        } else {
            source_title.to_string()
        };

        // ========== 2. 生成正文 ==========
        info!("{} 🤖 正在生成文章: {}", ctx, title);
        let draft = self
            .generator
            .generate(&title, &self.template, credential)
            .await;

        if let Some(reason) = &draft.failure {
            warn!("{} ⚠️ 生成失败，正文将包含错误说明: {}", ctx, reason);
        }

        // ========== 3. 渲染 ==========
        let artifacts = render_artifacts(&title, &draft.body);
        let [html, markdown] = &artifacts;

        let result = GenerationResult {
            source_title: source_title.to_string(),
            title,
            html_document: html.content.clone(),
            markdown_document: markdown.content.clone(),
            article_body: draft.body,
            error: draft.failure,
        };

        ArticleOutcome { result, artifacts }
    }
}
