use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{Credential, ProviderSelection};
use crate::services::RetryPolicy;

/// 默认配置文件名（存在时才读取）
pub const DEFAULT_CONFIG_FILE: &str = "article_config.toml";

/// 程序配置文件
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM 提供商
    pub provider: ProviderSelection,
    /// 提供商 API Key
    pub api_key: String,
    /// 标题文件，每行一个标题（"-" 表示标准输入）
    pub titles_file: PathBuf,
    /// 生成的 HTML / Markdown 存放目录
    pub output_dir: PathBuf,
    /// 自定义提示词文件，不设置则使用内置提示词
    pub custom_prompt_file: Option<PathBuf>,
    /// 生成前是否先改写标题
    pub rewrite_titles: bool,
    /// 开始前是否先验证 API Key
    pub verify_key: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 重试配置 ---
    pub retry_min_wait_secs: u32,
    pub retry_max_wait_secs: u32,
    pub retry_max_attempts: u32,
    /// 单次 HTTP 请求超时
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderSelection::Together,
            api_key: String::new(),
            titles_file: PathBuf::from("titles.txt"),
            output_dir: PathBuf::from("articles"),
            custom_prompt_file: None,
            rewrite_titles: false,
            verify_key: true,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            retry_min_wait_secs: 1,
            retry_max_wait_secs: 60,
            retry_max_attempts: 5,
            request_timeout_secs: 300,
        }
    }
}

// API Key 不能出现在日志里
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.credential())
            .field("titles_file", &self.titles_file)
            .field("output_dir", &self.output_dir)
            .field("custom_prompt_file", &self.custom_prompt_file)
            .field("rewrite_titles", &self.rewrite_titles)
            .field("verify_key", &self.verify_key)
            .field("verbose_logging", &self.verbose_logging)
            .field("output_log_file", &self.output_log_file)
            .field("retry_min_wait_secs", &self.retry_min_wait_secs)
            .field("retry_max_wait_secs", &self.retry_max_wait_secs)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// 环境变量覆盖时产生的警告（日志初始化之前无法输出，交给调用方）
pub type EnvWarnings = Vec<String>;

impl Config {
    /// 默认值 + 环境变量；解析警告直接写入日志
    pub fn from_env() -> Self {
        let (config, warnings) = Self::default().apply_env();
        for warning in &warnings {
            warn!("⚠️ {}", warning);
        }
        config
    }

    /// 先读 TOML 配置文件（`ARTICLE_CONFIG`，或当前目录下存在的
    /// `article_config.toml`），再用环境变量覆盖
    ///
    /// 通常在日志初始化之前调用，所以环境变量的解析警告随结果一起返回
    pub fn load() -> AppResult<(Self, EnvWarnings)> {
        let explicit = std::env::var("ARTICLE_CONFIG").ok().map(PathBuf::from);
        let path = match explicit {
            Some(path) => Some(path),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        let base = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        Ok(base.apply_env())
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        debug!("读取配置文件: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                AppError::Config(ConfigError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖当前值，无法解析的值保留原值并记一条警告
    pub fn apply_env(self) -> (Self, EnvWarnings) {
        let mut warnings = EnvWarnings::new();
        let w = &mut warnings;

        let config = Self {
            provider: env_parse("ARTICLE_PROVIDER", self.provider, w),
            api_key: std::env::var("ARTICLE_API_KEY").unwrap_or(self.api_key),
            titles_file: std::env::var("TITLES_FILE").map(PathBuf::from).unwrap_or(self.titles_file),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(self.output_dir),
            custom_prompt_file: std::env::var("CUSTOM_PROMPT_FILE").ok().map(PathBuf::from).or(self.custom_prompt_file),
            rewrite_titles: env_parse("REWRITE_TITLES", self.rewrite_titles, w),
            verify_key: env_parse("VERIFY_KEY", self.verify_key, w),
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging, w),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            retry_min_wait_secs: env_parse("RETRY_MIN_WAIT_SECS", self.retry_min_wait_secs, w),
            retry_max_wait_secs: env_parse("RETRY_MAX_WAIT_SECS", self.retry_max_wait_secs, w),
            retry_max_attempts: env_parse("RETRY_MAX_ATTEMPTS", self.retry_max_attempts, w),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", self.request_timeout_secs, w),
        };

        (config, warnings)
    }

    pub fn credential(&self) -> Credential {
        Credential::new(&self.api_key)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_min_wait_secs,
            self.retry_max_wait_secs,
            self.retry_max_attempts,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: FromStr>(var_name: &str, current: T, warnings: &mut EnvWarnings) -> T {
    match std::env::var(var_name) {
        Ok(raw) => parse_or(var_name, &raw, current, warnings),
        Err(_) => current,
    }
}

fn parse_or<T: FromStr>(var_name: &str, raw: &str, current: T, warnings: &mut EnvWarnings) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            let error = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: raw.to_string(),
                expected_type: std::any::type_name::<T>().to_string(),
            };
            warnings.push(format!("{}，保留原值", error));
            current
        }
    }
}
