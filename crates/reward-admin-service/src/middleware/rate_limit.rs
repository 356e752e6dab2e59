//! 每 IP 限流中间件
//!
//! 进程内令牌桶实现：每个客户端 IP 一个桶，按固定速率补充令牌，
//! 桶空时返回 429。后台任务周期性清理长时间不活跃的桶，
//! 防止桶表随访问 IP 数量无限增长。

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use serde_json::json;
use tracing::{debug, warn};

use crate::state::AppState;

/// 单个 IP 的令牌桶
#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// 每 IP 令牌桶限流器
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    /// 桶容量（突发上限）
    capacity: f64,
    /// 每秒补充的令牌数
    refill_per_sec: f64,
    /// 桶不活跃超过此时长后被清理
    idle_ttl: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        // 每分钟 120 次请求，允许 20 的突发
        Self::new(20.0, 2.0, Duration::from_secs(300))
    }
}

impl RateLimiter {
    pub fn new(capacity: f64, refill_per_sec: f64, idle_ttl: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_per_sec,
            idle_ttl,
        }
    }

    /// 尝试为指定 key 取一个令牌，桶空时返回 false
    pub fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(entry.last_refill).as_secs_f64();
        entry.tokens = (entry.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        entry.last_refill = now;

        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// 清理长时间不活跃的桶，返回清理数量
    pub fn evict_stale(&self) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_refill) < self.idle_ttl);
        before - self.buckets.len()
    }

    /// 当前桶数量
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// 后台清理循环，由 main 在启动时 spawn
    pub async fn run_eviction(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let evicted = self.evict_stale();
            if evicted > 0 {
                debug!(evicted, remaining = self.bucket_count(), "Rate limiter buckets evicted");
            }
        }
    }
}

/// 限流中间件
///
/// 放置在认证中间件之外（未认证请求同样计入限流），
/// 健康探针不参与限流。
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" || path == "/ready" {
        return next.run(request).await;
    }

    let ip = client_ip(request.headers());
    if !state.rate_limiter.try_acquire(&ip) {
        warn!(client_ip = %ip, path = %path, "请求被限流");
        return too_many_requests_response();
    }

    next.run(request).await
}

/// 从请求头解析客户端 IP
///
/// 优先取反向代理注入的 X-Forwarded-For 首个地址，
/// 其次 X-Real-IP，都缺失时归入同一个 "unknown" 桶。
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    "unknown".to_string()
}

/// 生成 429 限流响应
fn too_many_requests_response() -> Response {
    let body = json!({
        "success": false,
        "code": "TOO_MANY_REQUESTS",
        "message": "请求过于频繁，请稍后重试",
        "data": null
    });

    (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_exhaustion() {
        let limiter = RateLimiter::new(3.0, 0.0, Duration::from_secs(60));

        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(!limiter.try_acquire("10.0.0.1"), "第四次请求应被限流");

        // 不同 IP 互不影响
        assert!(limiter.try_acquire("10.0.0.2"));
    }

    #[test]
    fn test_bucket_refill() {
        // 每秒补 1000 个令牌，等待 10ms 即可恢复
        let limiter = RateLimiter::new(1.0, 1000.0, Duration::from_secs(60));

        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(!limiter.try_acquire("10.0.0.1"));

        std::thread::sleep(Duration::from_millis(10));
        assert!(limiter.try_acquire("10.0.0.1"), "补充令牌后应放行");
    }

    #[test]
    fn test_evict_stale_buckets() {
        let limiter = RateLimiter::new(5.0, 1.0, Duration::from_millis(1));

        limiter.try_acquire("10.0.0.1");
        limiter.try_acquire("10.0.0.2");
        assert_eq!(limiter.bucket_count(), 2);

        std::thread::sleep(Duration::from_millis(5));
        let evicted = limiter.evict_stale();
        assert_eq!(evicted, 2);
        assert_eq!(limiter.bucket_count(), 0);
    }

    #[test]
    fn test_client_ip_priority() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.1, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.1");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.2");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
