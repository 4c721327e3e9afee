use crate::error::{AppError, AppResult};
use crate::models::article::{parse_titles, PromptTemplate, TitleItem};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// 读取标题列表（每行一个标题）
///
/// 路径为 `-` 时从标准输入读取
pub async fn load_titles(path: &Path) -> AppResult<Vec<TitleItem>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|e| AppError::file_read_failed("<stdin>", e))?;
        buf
    } else {
        fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?
    };

    let titles = parse_titles(&content);
    tracing::info!("从 {} 读取到 {} 个标题", path.display(), titles.len());

    Ok(titles)
}

/// 读取自定义提示词；未指定文件时使用默认提示词
pub async fn load_prompt_template(path: Option<&Path>) -> AppResult<PromptTemplate> {
    let Some(path) = path else {
        return Ok(PromptTemplate::Default);
    };

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    tracing::info!(
        "使用自定义提示词: {} ({} 字符)",
        path.display(),
        content.chars().count()
    );

    Ok(PromptTemplate::Custom(content))
}
