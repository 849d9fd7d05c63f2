//! Rate limiting middleware.
//!
//! 클라이언트 IP별 Token Bucket 알고리즘으로 로그인/토큰 갱신 시도를 제한합니다.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use super::client_ip::client_ip;
use crate::error::ApiErrorResponse;

/// IP를 식별할 수 없는 요청이 공유하는 버킷 키.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 분당 최대 요청 수 (버킷 용량)
    pub requests_per_minute: u32,
    /// 유휴 버킷 정리 기준
    pub idle_timeout: Duration,
    /// 프록시 헤더로 클라이언트 IP를 식별할지 여부
    pub trust_proxy_headers: bool,
}

impl RateLimitConfig {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            idle_timeout: Duration::from_secs(120),
            trust_proxy_headers: false,
        }
    }

    #[must_use]
    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

/// Token Bucket 구조체.
#[derive(Debug)]
struct TokenBucket {
    /// 현재 토큰 수
    tokens: f64,
    /// 마지막 리필 시간
    last_refill: Instant,
    /// 최대 토큰 수
    max_tokens: f64,
    /// 초당 리필되는 토큰 수
    refill_rate: f64,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let max_tokens = f64::from(config.requests_per_minute.max(1));

        Self {
            tokens: max_tokens,
            last_refill: Instant::now(),
            max_tokens,
            refill_rate: max_tokens / 60.0,
        }
    }

    /// 토큰 소비 시도.
    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();

        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    /// 다음 토큰까지 대기 시간 (초).
    fn time_until_next_token(&self) -> f64 {
        if self.tokens >= 1.0 {
            0.0
        } else {
            (1.0 - self.tokens) / self.refill_rate
        }
    }
}

/// Rate Limiter.
///
/// IP 주소별로 Rate Limiting을 적용합니다.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<IpAddr, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 분당 허용 횟수로 생성.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::new(RateLimitConfig::new(requests_per_minute))
    }

    /// 요청 허용 여부 확인.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut buckets = self.buckets.write().await;

        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(&self.config));

        if bucket.try_acquire() {
            RateLimitResult::Allowed
        } else {
            let retry_after = (bucket.time_until_next_token().ceil() as u64).max(1);
            RateLimitResult::Limited { retry_after }
        }
    }

    /// 유휴 버킷 정리.
    pub async fn cleanup(&self) {
        let mut buckets = self.buckets.write().await;
        let now = Instant::now();
        let idle_timeout = self.config.idle_timeout;

        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < idle_timeout);
    }

    /// 현재 추적 중인 IP 수.
    pub async fn tracked_ips(&self) -> usize {
        self.buckets.read().await.len()
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// Rate Limiting 미들웨어 함수.
///
/// ```rust,ignore
/// let login_limiter = RateLimiter::per_minute(5);
/// Router::new()
///     .route("/login", post(login))
///     .route_layer(middleware::from_fn_with_state(login_limiter, rate_limit_middleware));
/// ```
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(
        request.headers(),
        request.extensions(),
        limiter.config.trust_proxy_headers,
    )
    .unwrap_or(UNKNOWN_CLIENT);

    match limiter.check(ip).await {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Limited { retry_after } => {
            tracing::warn!(
                client_ip = %ip,
                path = %request.uri().path(),
                retry_after,
                "Rate limit exceeded"
            );

            let body = ApiErrorResponse::with_details(
                "RATE_LIMITED",
                "요청이 너무 많습니다. 잠시 후 다시 시도하세요",
                serde_json::json!({ "retry_after": retry_after }),
            );
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// 주기적으로 유휴 버킷을 정리하는 백그라운드 태스크를 시작합니다.
pub fn spawn_cleanup_task(
    limiters: Vec<RateLimiter>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let mut tracked = 0;
            for limiter in &limiters {
                limiter.cleanup().await;
                tracked += limiter.tracked_ips().await;
            }
            tracing::debug!(
                limiters = limiters.len(),
                tracked_ips = tracked,
                "Rate limit buckets cleaned up"
            );
        }
    })
}
