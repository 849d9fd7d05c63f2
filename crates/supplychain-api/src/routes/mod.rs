//! REST API routes.
//!
//! # 엔드포인트
//!
//! - `GET /` - 서비스 정보
//! - `GET /health`, `GET /health/ready` - 헬스 체크
//! - `/api/auth/*` - 로그인, 토큰 갱신, 내 프로필

pub mod auth;
pub mod health;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::state::AppState;

pub use auth::{auth_router, AuthRateLimiters, LoginRequest, LoginResponse, RefreshRequest};
pub use health::{health_check, health_router, HealthResponse, ServiceInfo};

/// API 라우터 생성.
///
/// `rate_limiters`가 `None`이면 로그인/갱신에 rate limiting을 적용하지 않습니다.
pub fn create_api_router(
    state: Arc<AppState>,
    rate_limiters: Option<&AuthRateLimiters>,
) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health::service_info))
        .nest("/health", health_router())
        .nest("/api/auth", auth_router(state, rate_limiters))
}
