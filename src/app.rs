use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ProviderClient;
use crate::config::Config;
use crate::models::{load_prompt_template, load_titles, TitleItem};
use crate::orchestrator::{BatchOrchestrator, BatchReport};
use crate::services::{ArtifactWriter, KeyVerifier, LogNotifier, Notifier};
use crate::utils::logging::{log_startup, log_titles_loaded, print_final_stats};
use crate::workflow::ArticleFlow;

/// 应用主结构
pub struct App {
    config: Config,
    provider: Arc<ProviderClient>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let provider = ProviderClient::new(config.provider, config.request_timeout())
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            config,
            provider: Arc::new(provider),
            notifier: Arc::new(LogNotifier),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchReport> {
        let credential = self.config.credential();

        // Key 验证只给出提示，不阻止后续生成
        if self.config.verify_key && !credential.is_empty() {
            let verifier = KeyVerifier::new(
                self.provider.clone(),
                self.config.retry_policy(),
                self.notifier.clone(),
            );
            if !verifier.verify(&credential).await {
                warn!("⚠️ API Key 验证未通过，仍将尝试生成");
            }
        }

        let titles = load_all_titles(&self.config).await?;
        log_titles_loaded(titles.len(), &self.config.titles_file.display().to_string());

        let template = load_prompt_template(self.config.custom_prompt_file.as_deref())
            .await
            .context("无法读取自定义提示词")?;

        let flow = ArticleFlow::new(
            self.provider.clone(),
            self.config.retry_policy(),
            self.notifier.clone(),
            template,
            self.config.rewrite_titles,
        );
        let writer = ArtifactWriter::new(&self.config.output_dir);
        let mut orchestrator = BatchOrchestrator::new(flow, writer, self.notifier.clone());

        let report = orchestrator
            .run_titles(titles, &credential)
            .await
            .context("批处理未能开始")?;

        print_final_stats(
            report.succeeded(),
            report.failed(),
            report.total(),
            &self.config.output_log_file,
        );

        Ok(report)
    }
}

/// 加载标题
async fn load_all_titles(config: &Config) -> Result<Vec<TitleItem>> {
    info!("\n📁 正在读取标题: {}", config.titles_file.display());
    load_titles(&config.titles_file)
        .await
        .with_context(|| format!("无法读取标题文件 {}", config.titles_file.display()))
}
