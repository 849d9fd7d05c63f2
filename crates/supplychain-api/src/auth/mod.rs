//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 역할 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`PasswordHasher`]: Argon2id 비밀번호 해싱/검증
//! - [`TokenCodec`]: access/refresh 토큰 발급 및 검증
//! - [`resolve_bearer`], [`AuthUser`]: Authorization 헤더 → 검증된 [`Claims`]
//! - [`authorize`], [`require_roles`]: 엔드포인트별 역할 게이트
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! // 역할 게이트가 붙은 라우트에서 AuthUser 추출기 사용
//! async fn protected_handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.email())
//! }
//! ```

mod error;
mod jwt;
mod middleware;
mod password;
mod roles;

pub use error::AuthError;
pub use jwt::{Claims, Identity, TokenCodec, TokenError, TokenKind, TokenPair};
pub use middleware::{require_roles, resolve_bearer, AuthUser, RoleGate};
pub use password::{PasswordError, PasswordHasher};
pub use roles::authorize;
pub use supplychain_core::{Role, RoleSet};
