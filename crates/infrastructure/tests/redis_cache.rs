//! 需要真实 Redis 的缓存适配器测试
//!
//! 运行前设置 REDIS_URL。

use application::cache::KeyValueCache;
use infrastructure::RedisCache;
use std::time::Duration;
use uuid::Uuid;

async fn cache() -> RedisCache {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    RedisCache::connect(&url).await.expect("connect redis")
}

#[tokio::test]
#[ignore = "requires redis"]
async fn refresh_preserves_remaining_ttl() {
    let cache = cache().await;
    let key = Uuid::new_v4().to_string();

    cache
        .set(&key, "v1", Duration::from_secs(3_600))
        .await
        .unwrap();
    cache
        .refresh(&key, "v2", Duration::from_secs(86_400))
        .await
        .unwrap();

    assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("v2"));
    // 刷新后剩余 TTL 仍在原 1h 窗口内（±1s）
    let ttl = cache.ttl(&key).await.unwrap().unwrap();
    assert!(ttl <= Duration::from_secs(3_600));
    assert!(ttl >= Duration::from_secs(3_598));

    cache.delete(&key).await.unwrap();
}

#[tokio::test]
#[ignore = "requires redis"]
async fn refresh_of_missing_key_falls_back_to_default_ttl() {
    let cache = cache().await;
    let key = Uuid::new_v4().to_string();

    cache
        .refresh(&key, "value", Duration::from_secs(120))
        .await
        .unwrap();

    let ttl = cache.ttl(&key).await.unwrap().unwrap();
    assert!(ttl <= Duration::from_secs(120));
    assert!(ttl >= Duration::from_secs(118));

    cache.delete(&key).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), None);
}
