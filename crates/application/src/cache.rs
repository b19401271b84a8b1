//! 键值缓存端口
//!
//! 键为聚合 id 的原始 uuid 字符串，值为聚合行的 JSON 投影。

use async_trait::async_trait;
use domain::DomainError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache encode error: {0}")]
    Encode(String),
}

impl CacheError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<CacheError> for DomainError {
    fn from(err: CacheError) -> Self {
        DomainError::storage("cache", err.to_string())
    }
}

/// 带 TTL 的键值缓存
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入并设置 TTL
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 剩余 TTL；键不存在返回 None
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// 原 TTL 不变地刷新值；键无 TTL 或不存在时回落到 `default_ttl`。
    /// 实现应在一次往返内完成，避免 ttl 读与 set 之间的竞争。
    async fn refresh(&self, key: &str, value: &str, default_ttl: Duration)
        -> Result<(), CacheError>;

    /// 尽力删除；失败由调用方记录日志，不致命
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
