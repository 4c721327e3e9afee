//! 测试工具：手写的提供商替身
//!
//! 按脚本依次返回结果，并记录收到的所有请求

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::clients::ChatProvider;
use crate::error::{AppError, AppResult};
use crate::models::{ChatRequest, Credential, ProviderSelection};

enum Fallback {
    Reply(String),
    Fail,
}

/// 脚本化的提供商
pub struct ScriptedProvider {
    selection: ProviderSelection,
    responses: Mutex<VecDeque<AppResult<String>>>,
    fallback: Fallback,
    panic_marker: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// 脚本用完后一直返回 `reply`
    pub fn replying(reply: &str) -> Self {
        Self::build(Fallback::Reply(reply.to_string()))
    }

    /// 脚本用完后一直返回网络错误
    pub fn failing() -> Self {
        Self::build(Fallback::Fail)
    }

    fn build(fallback: Fallback) -> Self {
        Self {
            selection: ProviderSelection::Groq,
            responses: Mutex::new(VecDeque::new()),
            fallback,
            panic_marker: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 先按顺序返回这些结果
    pub fn with_script(self, responses: Vec<AppResult<String>>) -> Self {
        *self.responses.lock().unwrap() = responses.into();
        self
    }

    /// 任何消息包含 `marker` 时直接 panic
    pub fn panicking_on(mut self, marker: &str) -> Self {
        self.panic_marker = Some(marker.to_string());
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ChatProvider for ScriptedProvider {
    fn selection(&self) -> ProviderSelection {
        self.selection
    }

    async fn chat_complete(&self, _credential: &Credential, request: &ChatRequest) -> AppResult<String> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(marker) = &self.panic_marker {
            if request.messages.iter().any(|m| m.content.contains(marker.as_str())) {
                panic!("scripted panic on {}", marker);
            }
        }

        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }

        match &self.fallback {
            Fallback::Reply(reply) => Ok(reply.clone()),
            Fallback::Fail => Err(AppError::transport_failed("stub", Some(503), "service unavailable")),
        }
    }
}
