//! 标题处理上下文
//!
//! 封装"我正在处理这批标题中的第几个"这一信息

use std::fmt::Display;

use crate::models::TitleItem;

/// 标题处理上下文
#[derive(Debug, Clone)]
pub struct TitleCtx {
    /// 在本批中的位置（从1开始）
    pub index: usize,

    /// 本批标题总数
    pub total: usize,

    /// 用户输入的原始标题
    pub title: TitleItem,
}

impl TitleCtx {
    pub fn new(index: usize, total: usize, title: TitleItem) -> Self {
        Self {
            index,
            total,
            title,
        }
    }

    /// 本条目完成后的进度
    pub fn progress(&self) -> f64 {
        self.index as f64 / self.total as f64
    }
}

impl Display for TitleCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文章 {}/{}]", self.index, self.total)
    }
}
