use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::workflow::TitleCtx;

/// 初始化 tracing
///
/// # 参数
/// - `verbose`: 为 true 时默认级别为 debug
/// - `log_file_path`: 若提供，日志同时追加写入该文件
///
/// `RUST_LOG` 存在时优先使用
pub fn init(verbose: bool, log_file_path: Option<&str>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("无法打开日志文件: {}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .context("tracing 初始化失败")?;

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    fs::write(log_file_path, log_header())
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

fn log_header() -> String {
    format!(
        "{}\n文章生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    )
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - SEO 文章批量生成");
    info!("🤖 提供商: {} ({})", config.provider, config.provider.model_id());
    info!("✏️ 改写标题: {}", if config.rewrite_titles { "是" } else { "否" });
    info!("📂 输出目录: {}", config.output_dir.display());
    info!(
        "🔁 重试: 最多 {} 次，等待 {}-{} 秒",
        config.retry_max_attempts, config.retry_min_wait_secs, config.retry_max_wait_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录标题加载信息
///
/// # 参数
/// - `total`: 标题总数
/// - `source`: 标题来源
pub fn log_titles_loaded(total: usize, source: &str) {
    info!("✓ 从 {} 读取到 {} 个待处理的标题", source, total);
    info!("💡 将按顺序逐个生成\n");
}

/// 记录单个标题开始
pub fn log_item_start(ctx: &TitleCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 📄 {}", ctx, truncate_text(ctx.title.as_str(), 80));
    info!("{}", "─".repeat(60));
}

/// 记录批处理完成信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
pub fn log_batch_complete(success: usize, failed: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批处理完成: 成功 {}/{}，失败 {}", success, total, failed);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Cómo ahorrar", 4), "Cómo...");
        assert_eq!(truncate_text("corto", 10), "corto");
    }

    #[test]
    fn test_log_header() {
        let header = log_header();
        assert!(header.starts_with(&"=".repeat(60)));
        assert!(header.contains("文章生成日志 - "));
        assert!(header.ends_with("\n\n"));
    }

    #[test]
    fn test_init_log_file_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("output.txt");
        let path_str = path.to_str().unwrap();

        fs::write(&path, "old contents").unwrap();
        init_log_file(path_str).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("old contents"));
        assert!(written.contains("文章生成日志"));
    }
}
