//! 用户通知 - 业务能力层
//!
//! 服务层通过 [`Notifier`] 向前端报告提示、错误和进度，不关心前端如何展示

use std::sync::Mutex;
use tracing::{error, info, warn};

/// 一条用户可见的通知
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
    /// 批处理进度，取值 (0, 1]
    Progress(f64),
}

/// 通知渠道
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: String) {
        self.notify(Notice::Success(message));
    }

    fn warning(&self, message: String) {
        self.notify(Notice::Warning(message));
    }

    fn error(&self, message: String) {
        self.notify(Notice::Error(message));
    }
}

/// 把通知写进日志（命令行前端使用）
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Success(msg) => info!("✅ {}", msg),
            Notice::Info(msg) => info!("ℹ️ {}", msg),
            Notice::Warning(msg) => warn!("⚠️ {}", msg),
            Notice::Error(msg) => error!("❌ {}", msg),
            Notice::Progress(value) => info!("📊 进度: {:.0}%", value * 100.0),
        }
    }
}

/// 在内存中收集通知，供前端或测试读取
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn progress(&self) -> Vec<f64> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Progress(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
