//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批标题的调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量标题处理器
//! - 入口校验（API Key、标题列表）
//! - 按顺序遍历标题，每个标题交给 `workflow::ArticleFlow`
//! - 隔离单个标题的失败（包括 panic）
//! - 汇报进度并输出统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<TitleItem>)
//!     ↓
//! workflow::ArticleFlow (处理单个标题)
//!     ↓
//! services (能力层：rewrite / generate / render / write)
//!     ↓
//! clients (基础设施：Together / Groq)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → clients
//! 2. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{BatchOrchestrator, BatchReport, BatchState};
