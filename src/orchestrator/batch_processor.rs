//! 批量标题处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **入口校验**：API Key 非空，且至少有一个有效标题，否则保持 Idle
//! 2. **顺序处理**：严格按输入顺序逐个处理，不并发
//! 3. **失败隔离**：单个标题出错（包括 panic）只记录该条目，继续下一个
//! 4. **进度汇报**：每个条目结束后报告 `(i+1)/n`，最后一个为 1.0
//! 5. **产物输出**：把每个条目的产物交给 [`ArtifactSink`]

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::clients::ChatProvider;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{parse_titles, Credential, GenerationResult, TitleItem};
use crate::services::{ArtifactSink, Notice, Notifier};
use crate::utils::logging::{log_batch_complete, log_item_start};
use crate::workflow::{ArticleFlow, TitleCtx};

/// 批处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
}

/// 一次批处理的结果
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// 与输入标题一一对应，顺序一致
    pub results: Vec<GenerationResult>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

/// 批量编排器
pub struct BatchOrchestrator<P: ChatProvider, S: ArtifactSink> {
    flow: ArticleFlow<P>,
    sink: S,
    notifier: Arc<dyn Notifier>,
    state: BatchState,
}

impl<P: ChatProvider, S: ArtifactSink> BatchOrchestrator<P, S> {
    pub fn new(flow: ArticleFlow<P>, sink: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            flow,
            sink,
            notifier,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// 以多行文本作为输入（每行一个标题）
    pub async fn run(&mut self, titles_input: &str, credential: &Credential) -> AppResult<BatchReport> {
        self.run_titles(parse_titles(titles_input), credential).await
    }

    /// 处理整批标题
    ///
    /// 只有入口校验失败时返回错误；单个条目的失败记录在对应的结果里
    pub async fn run_titles(
        &mut self,
        titles: Vec<TitleItem>,
        credential: &Credential,
    ) -> AppResult<BatchReport> {
        if let Err(e) = validate(&titles, credential) {
            self.notifier.warning(
                "Por favor, asegúrate de ingresar una API Key válida y al menos un título.".to_string(),
            );
            warn!("⚠️ 批处理未开始: {}", e);
            return Err(e.into());
        }

        self.state = BatchState::Running;
        let total = titles.len();
        info!("🚀 开始批处理，共 {} 个标题", total);

        let mut results = Vec::with_capacity(total);

        for (idx, title) in titles.into_iter().enumerate() {
            let ctx = TitleCtx::new(idx + 1, total, title);
            log_item_start(&ctx);

            let result = match self.process_item(&ctx, credential).await {
                Ok(result) => result,
                Err(e) => {
                    error!("{} ❌ 处理失败: {}", ctx, e);
                    self.notifier.error(format!(
                        "Error al generar el artículo '{}': {}",
                        ctx.title,
                        e.user_message()
                    ));
                    GenerationResult::failed(ctx.title.as_str(), e.to_string())
                }
            };
            results.push(result);

            self.notifier.notify(Notice::Progress(ctx.progress()));
        }

        self.state = BatchState::Completed;

        let report = BatchReport { results };
        log_batch_complete(report.succeeded(), report.failed(), report.total());
        self.notifier
            .success("¡Proceso de generación de artículos completado!".to_string());

        Ok(report)
    }

    /// 处理单个标题，把 panic 也转成该条目的错误
    ///
    /// 产物写入失败时保留已生成的内容，只在结果上记录错误
    async fn process_item(&self, ctx: &TitleCtx, credential: &Credential) -> AppResult<GenerationResult> {
        let work = async {
            let outcome = self.flow.run(ctx, credential).await;
            let mut result = outcome.result;

            match self.sink.store(&outcome.artifacts).await {
                Ok(paths) => {
                    for path in &paths {
                        info!("{} 💾 已保存: {}", ctx, path.display());
                    }
                }
                Err(e) => {
                    error!("{} ❌ 保存产物失败: {}", ctx, e);
                    self.notifier.error(format!(
                        "Error al guardar el artículo '{}': {}",
                        ctx.title,
                        e.user_message()
                    ));
                    result.error = Some(match result.error.take() {
                        Some(previous) => format!("{}; {}", previous, e),
                        None => e.to_string(),
                    });
                }
            }

            result
        };

        match AssertUnwindSafe(work).catch_unwind().await {
            Ok(result) => Ok(result),
            Err(panic) => Err(AppError::Other(format!("处理时发生 panic: {}", panic_message(&panic)))),
        }
    }
}

/// 入口校验
fn validate(titles: &[TitleItem], credential: &Credential) -> Result<(), ValidationError> {
    if credential.is_empty() {
        return Err(ValidationError::EmptyCredential);
    }
    if titles.is_empty() {
        return Err(ValidationError::NoTitles);
    }
    Ok(())
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
