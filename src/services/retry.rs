//! 重试策略 - 随机指数退避
//!
//! 第 k 次失败后的等待时间在 `[min_wait, clamp(2^(k-1), min_wait, max_wait)]` 之间随机取值，
//! 时间单位可配置（生产环境为秒）

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// 重试策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最短等待（单位数）
    pub min_wait: u32,
    /// 最长等待（单位数）
    pub max_wait: u32,
    /// 总尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 时间单位
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_wait: 1,
            max_wait: 60,
            max_attempts: 5,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(min_wait: u32, max_wait: u32, max_attempts: u32) -> Self {
        Self {
            min_wait,
            max_wait: max_wait.max(min_wait),
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// 第 `attempt` 次（从 1 开始）失败后的等待时间
    pub fn wait_for_attempt(&self, attempt: u32) -> Duration {
        let exp = 1u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        let high = exp.clamp(self.min_wait as u64, self.max_wait.max(self.min_wait) as u64) as u32;

        let low = self.unit.saturating_mul(self.min_wait);
        let high = self.unit.saturating_mul(high);
        random_between(low, high)
    }

    /// 执行 `operation`，失败时按策略重试
    ///
    /// 每次调用都是独立的重试预算。不可重试的错误（如 Key 无效）直接返回；
    /// 次数耗尽时返回 [`AppError::RetryExhausted`]，其中带有最后一次的错误
    pub async fn run<T, F, Fut>(&self, operation: &str, mut f: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("{}: 第 {}/{} 次尝试", operation, attempt, max_attempts);

            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("✓ {}: 第 {} 次尝试成功", operation, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => {
                    warn!("{}: 不可重试的错误: {}", operation, e);
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!("{}: 已尝试 {} 次，放弃: {}", operation, attempt, e);
                    return Err(AppError::RetryExhausted {
                        attempts: attempt,
                        last_error: Box::new(e),
                    });
                }
                Err(e) => {
                    let wait = self.wait_for_attempt(attempt);
                    warn!(
                        "{}: 第 {} 次尝试失败: {}，{:.1?} 后重试",
                        operation, attempt, e, wait
                    );
                    sleep(wait).await;
                }
            }
        }
    }
}

/// 在 `[low, high]` 内均匀取值
fn random_between(low: Duration, high: Duration) -> Duration {
    if high <= low {
        return low;
    }
    let span = (high - low).as_nanos().min(u64::MAX as u128) as u64;
    low + Duration::from_nanos(xorshift_seed() % span.saturating_add(1))
}

// 不引入 rand：用当前时间做种子的 xorshift64，退避抖动够用
fn xorshift_seed() -> u64 {
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
        | 1;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_unit(Duration::from_millis(1))
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.min_wait, 1);
        assert_eq!(policy.max_wait, 60);
        assert_eq!(policy.max_attempts, 5);
    }

    #[test]
    fn test_wait_is_bounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.wait_for_attempt(1), Duration::from_secs(1));
        for attempt in 1..=40 {
            let wait = policy.wait_for_attempt(attempt);
            assert!(wait >= Duration::from_secs(1), "attempt {}: {:?}", attempt, wait);
            assert!(wait <= Duration::from_secs(60), "attempt {}: {:?}", attempt, wait);
        }
        for _ in 0..50 {
            assert!(policy.wait_for_attempt(3) <= Duration::from_secs(4));
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_four_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = fast_policy()
            .run("测试", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= 4 {
                    Err(AppError::transport_failed("stub", Some(500), format!("fail {}", n)))
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(assert_ok!(result), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_always_failing_stops_after_five_calls() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: AppResult<()> = fast_policy()
            .run("测试", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::transport_failed("stub", None, "down"))
            })
            .await;

        match assert_err!(result) {
            AppError::RetryExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 5);
                assert!(last_error.to_string().contains("down"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_invalid_credential_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: AppResult<()> = fast_policy()
            .run("测试", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::credential_invalid("stub", "bad key"))
            })
            .await;

        assert!(matches!(result, Err(AppError::Provider(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
