//! 进程内限流器
//!
//! 按客户端 IP 的令牌桶：容量 burst，按 rate_per_sec 匀速补充。
//! 由引导流程显式创建并挂在 AppState 上，配套的清扫任务每分钟
//! 驱逐闲置超过 15 分钟的 IP，防止表无界增长。

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::error::ApiError;
use crate::state::AppState;

/// 闲置驱逐阈值
const IDLE_EVICTION: Duration = Duration::from_secs(15 * 60);
/// 清扫周期
const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
    last_seen: Instant,
}

pub struct RateLimiter {
    buckets: RwLock<HashMap<IpAddr, Bucket>>,
    rate_per_sec: f64,
    burst: f64,
}

impl RateLimiter {
    pub fn new(rate_per_sec: f64, burst: f64) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            rate_per_sec,
            burst,
        }
    }

    pub fn allow(&self, ip: IpAddr) -> bool {
        self.allow_at(ip, Instant::now())
    }

    fn allow_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut buckets = match self.buckets.write() {
            Ok(buckets) => buckets,
            // 锁中毒时放行，限流不应把服务打挂
            Err(_) => return true,
        };

        let bucket = buckets.entry(ip).or_insert(Bucket {
            tokens: self.burst,
            refilled_at: now,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.burst);
        bucket.refilled_at = now;
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        if let Ok(mut buckets) = self.buckets.write() {
            buckets
                .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) < IDLE_EVICTION);
        }
    }

    pub fn tracked_ips(&self) -> usize {
        self.buckets.read().map(|b| b.len()).unwrap_or(0)
    }

    /// 启动周期清扫任务
    pub fn start_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_PERIOD);
            loop {
                interval.tick().await;
                limiter.sweep();
            }
        })
    }
}

/// axum 中间件：超出配额直接回 429
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if state.rate_limiter.allow(addr.ip()) {
        next.run(request).await
    } else {
        ApiError::too_many_requests().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn test_burst_then_limit() {
        let limiter = RateLimiter::new(1.0, 5.0);
        let now = Instant::now();

        // 突发额度内的 5 个请求放行
        for i in 0..5 {
            assert!(limiter.allow_at(ip(1), now), "request {} should pass", i + 1);
        }
        // 第 6 个拒绝
        assert!(!limiter.allow_at(ip(1), now));
    }

    #[test]
    fn test_refill_over_time() {
        let limiter = RateLimiter::new(2.0, 2.0);
        let start = Instant::now();

        assert!(limiter.allow_at(ip(2), start));
        assert!(limiter.allow_at(ip(2), start));
        assert!(!limiter.allow_at(ip(2), start));

        // 1 秒补 2 个令牌
        let later = start + Duration::from_secs(1);
        assert!(limiter.allow_at(ip(2), later));
        assert!(limiter.allow_at(ip(2), later));
        assert!(!limiter.allow_at(ip(2), later));
    }

    #[test]
    fn test_rate_bound_over_interval() {
        // r=5/s, b=10：任意 Δ=2s 窗口内放行数不超过 b + r·Δ = 20
        let limiter = RateLimiter::new(5.0, 10.0);
        let start = Instant::now();

        let mut allowed = 0;
        for ms in 0..2_000 {
            if limiter.allow_at(ip(3), start + Duration::from_millis(ms)) {
                allowed += 1;
            }
        }
        assert!(allowed <= 20, "allowed {} > bound", allowed);
        assert!(allowed >= 10);
    }

    #[test]
    fn test_ips_are_isolated() {
        let limiter = RateLimiter::new(1.0, 1.0);
        let now = Instant::now();

        assert!(limiter.allow_at(ip(4), now));
        assert!(!limiter.allow_at(ip(4), now));
        // 另一个 IP 不受影响
        assert!(limiter.allow_at(ip(5), now));
    }

    #[test]
    fn test_sweep_evicts_idle_ips() {
        let limiter = RateLimiter::new(1.0, 1.0);
        let start = Instant::now();

        limiter.allow_at(ip(6), start);
        limiter.allow_at(ip(7), start + Duration::from_secs(14 * 60));
        assert_eq!(limiter.tracked_ips(), 2);

        // 16 分钟后：ip6 闲置超阈值被驱逐，ip7 保留
        limiter.sweep_at(start + Duration::from_secs(16 * 60));
        assert_eq!(limiter.tracked_ips(), 1);

        // 被驱逐的 IP 重新获得完整突发额度
        assert!(limiter.allow_at(ip(6), start + Duration::from_secs(16 * 60)));
    }
}
