//! Axum용 인증 추출기 및 역할 게이트 미들웨어.
//!
//! 보호된 엔드포인트는 모두 [`resolve_bearer`]를 거쳐 검증된 Claims를 얻습니다.
//! 역할 제한이 필요한 라우트는 등록 시점에 [`require_roles`]를 `route_layer`로 붙입니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::AuthError;
use super::jwt::{Claims, TokenCodec, TokenKind};
use super::roles::authorize;
use crate::middleware::client_ip;
use crate::state::AppState;
use supplychain_core::RoleSet;

/// Authorization 헤더 값에서 bearer 토큰 부분만 추출.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authorization 헤더를 검증된 access 토큰 Claims로 해석합니다.
///
/// 헤더가 없거나 `Bearer <token>` 형식이 아니면 `MissingCredential`,
/// 그 외 실패는 토큰 검증 결과를 따릅니다. 역할 검사는 하지 않습니다.
pub fn resolve_bearer(
    authorization: Option<&str>,
    codec: &TokenCodec,
) -> Result<Claims, AuthError> {
    let token = authorization
        .and_then(bearer_token)
        .ok_or(AuthError::MissingCredential)?;

    Ok(codec.decode(token, TokenKind::Access)?)
}

fn resolve_parts(parts: &Parts, codec: &TokenCodec) -> Result<Claims, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MissingCredential))
        .transpose()?;

    resolve_bearer(header, codec)
}

/// 인증된 사용자 추출기.
///
/// 역할 게이트가 이미 검증한 Claims가 있으면 재사용하고, 게이트가 없는
/// 라우트에서는 헤더를 직접 검증합니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.email())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(AuthUser(claims.clone()));
        }

        resolve_parts(parts, &state.codec).map(AuthUser)
    }
}

/// 역할 게이트 미들웨어 상태.
#[derive(Debug, Clone)]
pub struct RoleGate {
    state: Arc<AppState>,
    allowed: RoleSet,
}

impl RoleGate {
    pub fn new(state: Arc<AppState>, allowed: RoleSet) -> Self {
        Self { state, allowed }
    }
}

/// 역할 게이트 미들웨어 함수.
///
/// 인증 → 역할 검사 순으로 수행하고, 통과하면 Claims를 request extensions에
/// 넣어 핸들러로 넘깁니다. 권한 거부는 응답 전에 감사 로그에 기록됩니다.
///
/// ```rust,ignore
/// Router::new()
///     .route("/fabrics", post(add_fabric))
///     .route_layer(middleware::from_fn_with_state(
///         RoleGate::new(state.clone(), RoleSet::only(Role::Supplier)),
///         require_roles,
///     ))
/// ```
pub async fn require_roles(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let claims = match resolve_parts(&parts, &gate.state.codec) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    // nest된 라우터에서는 parts.uri에 접두사가 빠져 있음
    let endpoint = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(parts.uri.path(), |original| original.path());
    let source_ip = client_ip(
        &parts.headers,
        &parts.extensions,
        gate.state.trust_proxy_headers,
    );
    if let Err(err) = authorize(
        &claims,
        gate.allowed,
        endpoint,
        source_ip,
        &gate.state.audit,
    ) {
        return err.into_response();
    }

    parts.extensions.insert(claims);
    next.run(Request::from_parts(parts, body)).await
}
