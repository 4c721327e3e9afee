use anyhow::Result;
use article_generator::utils::logging;
use article_generator::{App, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let (config, env_warnings) = Config::load()?;

    // 初始化日志
    logging::init_log_file(&config.output_log_file)?;
    logging::init(config.verbose_logging, Some(&config.output_log_file))?;
    for warning in &env_warnings {
        warn!("⚠️ {}", warning);
    }

    // 初始化并运行应用
    let _report = App::initialize(config).await?.run().await?;

    Ok(())
}
