//! # Article Generator
//!
//! 批量生成 SEO 文章的 Rust 应用程序：输入一组标题，调用 Together / Groq
//! 生成正文，输出 HTML 和 Markdown
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 与 LLM 提供商通信，只返回 `Result`，不做降级
//! - `ChatProvider` - 提供商抽象（Together / Groq 两个实现）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个标题
//! - `RetryPolicy` - 随机指数退避重试
//! - `TitleRewriter` / `ArticleGenerator` - 改写标题、生成正文，失败时降级
//! - `document_renderer` - 渲染 HTML / Markdown
//! - `ArtifactWriter` - 写出产物
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个标题"的完整处理流程
//! - `TitleCtx` - 上下文封装（第几个 / 共几个）
//! - `ArticleFlow` - 流程编排（rewrite → generate → render）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理、失败隔离、进度汇报
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub mod testutil;

// 重新导出常用类型
pub use app::App;
pub use clients::{ChatProvider, ProviderClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Credential, GenerationResult, PromptTemplate, ProviderSelection, TitleItem};
pub use orchestrator::{BatchOrchestrator, BatchReport, BatchState};
pub use workflow::{ArticleFlow, TitleCtx};
