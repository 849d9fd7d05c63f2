//! 공급망 REST API 서버의 인증/인가 코어.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Argon2id 비밀번호 해싱
//! - JWT access/refresh 토큰 발급 및 검증
//! - Bearer 인증 추출기와 역할 게이트 미들웨어
//! - 감사 로그
//! - 로그인/토큰 갱신 엔드포인트와 rate limiting
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰, 비밀번호, 역할 게이트
//! - [`audit`]: 감사 이벤트와 출력 대상
//! - [`middleware`]: HTTP 미들웨어
//! - [`repository`]: 사용자 자격증명 저장소
//! - [`app`]: 전체 라우터 조립

pub mod app;
pub mod audit;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use audit::{
    AuditEvent, AuditLogger, AuditSink, BufferedAuditSink, MemoryAuditSink, TracingAuditSink,
};
pub use auth::{
    authorize, require_roles, resolve_bearer, AuthError, AuthUser, Claims, Identity,
    PasswordError, PasswordHasher, RoleGate, TokenCodec, TokenError, TokenKind, TokenPair,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use repository::{CredentialStore, InMemoryCredentialStore};
pub use routes::*;
pub use state::AppState;
