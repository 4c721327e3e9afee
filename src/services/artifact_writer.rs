//! 产物写入服务 - 业务能力层
//!
//! 只负责把渲染好的产物落到输出目录，不关心流程

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::services::document_renderer::Artifact;

/// 产物的去处
pub trait ArtifactSink: Send + Sync {
    /// 保存一篇文章的全部产物，返回保存位置
    fn store(&self, artifacts: &[Artifact]) -> impl Future<Output = AppResult<Vec<PathBuf>>> + Send;
}

/// 写入输出目录
///
/// 同一个 writer 内重名的文章依次加 `_2`、`_3` 后缀，不会互相覆盖
pub struct ArtifactWriter {
    output_dir: PathBuf,
    /// 已经分配出去的文件名
    claimed: Mutex<HashSet<String>>,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 为一篇文章的所有产物分配同一个未被占用的后缀
    fn claim_names(&self, artifacts: &[Artifact]) -> Vec<String> {
        let names: Vec<String> = artifacts
            .iter()
            .map(|artifact| safe_file_name(&artifact.file_name))
            .collect();

        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        let mut n = 1;
        loop {
            let candidates: Vec<String> = names.iter().map(|name| with_suffix(name, n)).collect();
            if candidates.iter().all(|c| !claimed.contains(c)) {
                claimed.extend(candidates.iter().cloned());
                if n > 1 {
                    info!("📎 文件名重复，改用后缀 _{}", n);
                }
                return candidates;
            }
            n += 1;
        }
    }
}

impl ArtifactSink for ArtifactWriter {
    async fn store(&self, artifacts: &[Artifact]) -> AppResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;

        let names = self.claim_names(artifacts);

        let mut written = Vec::with_capacity(artifacts.len());
        for (artifact, name) in artifacts.iter().zip(names) {
            let path = self.output_dir.join(name);
            debug!(
                "写入产物: {} ({}, {} 字节)",
                path.display(),
                artifact.mime,
                artifact.content.len()
            );

            fs::write(&path, artifact.content.as_bytes())
                .await
                .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
            written.push(path);
        }

        Ok(written)
    }
}

/// 丢弃所有产物（只需要内存结果时使用）
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardArtifacts;

impl ArtifactSink for DiscardArtifacts {
    async fn store(&self, _artifacts: &[Artifact]) -> AppResult<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

/// 标题里的路径分隔符不能把文件写到输出目录之外
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    if cleaned.trim_start_matches('.').is_empty() {
        format!("_{}", cleaned)
    } else {
        cleaned
    }
}

/// `Uno.html` → `Uno_2.html`；n 为 1 时不变
fn with_suffix(name: &str, n: usize) -> String {
    if n == 1 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, n, ext),
        _ => format!("{}_{}", name, n),
    }
}
