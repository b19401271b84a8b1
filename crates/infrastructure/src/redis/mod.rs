//! Redis 缓存适配器
//!
//! 保留 TTL 的刷新用一段 Lua 脚本在一次往返内完成，
//! 消除 TTL 读取与 SET 之间的竞争窗口。

use application::cache::{CacheError, KeyValueCache};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::time::Duration;

/// TTL > 0 时按剩余 TTL 覆写，否则按默认 TTL 写入
const REFRESH_SCRIPT: &str = r#"
local ttl = redis.call('TTL', KEYS[1])
if ttl > 0 then
    return redis.call('SET', KEYS[1], ARGV[1], 'EX', ttl)
else
    return redis.call('SET', KEYS[1], ARGV[1], 'EX', tonumber(ARGV[2]))
end
"#;

pub struct RedisCache {
    connection: ConnectionManager,
    refresh_script: Script,
}

impl RedisCache {
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            refresh_script: Script::new(REFRESH_SCRIPT),
        }
    }

    /// 建立带自动重连的连接
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|err| CacheError::backend(err.to_string()))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|err| CacheError::backend(err.to_string()))?;
        Ok(Self::new(connection))
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        conn.get(key)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.set_ex(key, value, ttl.as_secs())
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        let mut conn = self.connection.clone();
        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))?;
        // -2 键不存在，-1 无 TTL
        if ttl < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl as u64)))
        }
    }

    async fn refresh(
        &self,
        key: &str,
        value: &str,
        default_ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        self.refresh_script
            .key(key)
            .arg(value)
            .arg(default_ttl.as_secs())
            .invoke_async::<()>(&mut conn)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }
}
