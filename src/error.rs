use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 调用 LLM 提供商失败
    #[error("提供商错误: {0}")]
    Provider(#[from] ProviderError),
    /// 重试次数耗尽
    #[error("已重试 {attempts} 次仍然失败: {last_error}")]
    RetryExhausted {
        attempts: u32,
        last_error: Box<AppError>,
    },
    /// 输入校验失败
    #[error("输入校验失败: {0}")]
    Validation(#[from] ValidationError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// LLM 提供商相关错误
#[derive(Debug, Error)]
pub enum ProviderError {
    /// API Key 无效（401 / 403）
    #[error("{provider} 拒绝了 API Key: {message}")]
    CredentialInvalid { provider: String, message: String },
    /// 网络失败或非 2xx 响应
    #[error("{provider} 请求失败 (status={status:?}): {message}")]
    TransportFailure {
        provider: String,
        status: Option<u16>,
        message: String,
    },
    /// 响应缺少必要字段
    #[error("{provider} 返回了无法识别的响应: {message}")]
    MalformedResponse { provider: String, message: String },
}

/// 输入校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("API Key 不能为空")]
    EmptyCredential,
    #[error("至少需要一个有效标题")]
    NoTitles,
    #[error("未知的提供商: {0}")]
    UnknownProvider(String),
    /// 请求本身无法构建，重试也不会成功
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Provider(ProviderError::MalformedResponse {
            provider: String::new(),
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Provider(ProviderError::TransportFailure {
            provider: String::new(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    pub fn credential_invalid(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::CredentialInvalid {
            provider: provider.into(),
            message: message.into(),
        })
    }

    pub fn transport_failed(
        provider: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        AppError::Provider(ProviderError::TransportFailure {
            provider: provider.into(),
            status,
            message: message.into(),
        })
    }

    pub fn malformed_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::MalformedResponse {
            provider: provider.into(),
            message: message.into(),
        })
    }

    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否值得重试
    ///
    /// Key 无效、输入/配置错误重试也不会成功，直接返回
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Provider(ProviderError::CredentialInvalid { .. }) => false,
            AppError::Validation(_) | AppError::Config(_) => false,
            AppError::RetryExhausted { .. } => false,
            AppError::Provider(_) | AppError::File(_) | AppError::Other(_) => true,
        }
    }
}

// ========== 面向用户的描述 ==========

impl AppError {
    /// 西班牙语的错误描述，用于通知和生成的文档
    ///
    /// 日志里仍然使用 `Display`
    pub fn user_message(&self) -> String {
        match self {
            AppError::Provider(ProviderError::CredentialInvalid { provider, message }) => {
                format!("{} rechazó la API Key: {}", provider, message)
            }
            AppError::Provider(ProviderError::TransportFailure {
                provider,
                status: Some(status),
                message,
            }) => format!("{} respondió con el estado HTTP {}: {}", provider, status, message),
            AppError::Provider(ProviderError::TransportFailure {
                provider, message, ..
            }) => format!("no se pudo conectar con {}: {}", provider, message),
            AppError::Provider(ProviderError::MalformedResponse { provider, .. }) => {
                format!("{} devolvió una respuesta no válida", provider)
            }
            AppError::RetryExhausted {
                attempts,
                last_error,
            } => format!(
                "se agotaron los {} intentos. Último error: {}",
                attempts,
                last_error.user_message()
            ),
            AppError::Validation(ValidationError::EmptyCredential) => "la API Key está vacía".to_string(),
            AppError::Validation(ValidationError::NoTitles) => "no hay ningún título válido".to_string(),
            AppError::Validation(ValidationError::UnknownProvider(name)) => {
                format!("proveedor desconocido: {}", name)
            }
            AppError::Validation(ValidationError::InvalidRequest(message)) => {
                format!("solicitud no válida: {}", message)
            }
            AppError::File(FileError::ReadFailed { path, source }) => {
                format!("no se pudo leer el archivo {}: {}", path, source)
            }
            AppError::File(FileError::WriteFailed { path, source }) => {
                format!("no se pudo guardar el archivo {}: {}", path, source)
            }
            AppError::Config(_) => "la configuración no es válida".to_string(),
            AppError::Other(_) => "error inesperado".to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_are_not_retryable() {
        let err = AppError::credential_invalid("Groq", "invalid api key");
        assert!(!err.is_retryable());
        assert!(!AppError::from(ValidationError::NoTitles).is_retryable());
    }

    #[test]
    fn test_transport_errors_are_retryable() {
        assert!(AppError::transport_failed("Together", Some(503), "unavailable").is_retryable());
        assert!(AppError::transport_failed("Together", None, "connection reset").is_retryable());
        assert!(AppError::malformed_response("Groq", "no choices").is_retryable());
    }

    #[test]
    fn test_retry_exhausted_message_carries_last_error() {
        let err = AppError::RetryExhausted {
            attempts: 5,
            last_error: Box::new(AppError::transport_failed("Groq", Some(500), "boom")),
        };
        let message = err.to_string();
        assert!(message.contains('5'));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_user_message_is_spanish_and_keeps_provider_detail() {
        let err = AppError::RetryExhausted {
            attempts: 5,
            last_error: Box::new(AppError::transport_failed("Groq", Some(503), "service unavailable")),
        };
        let message = err.user_message();
        assert_eq!(
            message,
            "se agotaron los 5 intentos. Último error: Groq respondió con el estado HTTP 503: service unavailable"
        );
        assert!(!message.contains("已重试"));

        let err = AppError::Other("处理时发生 panic".to_string());
        assert_eq!(err.user_message(), "error inesperado");
    }

    #[test]
    fn test_invalid_request_is_not_retryable() {
        let err = AppError::from(ValidationError::InvalidRequest("max_tokens".into()));
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "solicitud no válida: max_tokens");
    }
}
