//! 提供商选择与凭证
//!
//! 模型标识只由提供商决定，用户不能单独修改

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// LLM 提供商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProviderSelection {
    /// Together（OpenAI 兼容端点）
    #[default]
    Together,
    /// Groq
    Groq,
}

impl ProviderSelection {
    pub const ALL: [ProviderSelection; 2] = [ProviderSelection::Together, ProviderSelection::Groq];

    /// 提供商固定绑定的模型
    pub fn model_id(self) -> &'static str {
        match self {
            ProviderSelection::Together => "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
            ProviderSelection::Groq => "llama3-groq-70b-8192-tool-use-preview",
        }
    }

    /// 提供商固定绑定的 API 基础地址
    pub fn base_url(self) -> &'static str {
        match self {
            ProviderSelection::Together => "https://api.together.xyz/v1",
            ProviderSelection::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProviderSelection::Together => "Together",
            ProviderSelection::Groq => "Groq",
        }
    }
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderSelection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderSelection::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownProvider(s.to_string()))
    }
}

/// API Key
///
/// 只在内存中持有，不落盘；Debug 输出时隐藏内容
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 取出原始 Key（仅用于请求头）
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(***)")
        }
    }
}
