//! 인증 endpoint.
//!
//! 로그인, 토큰 갱신(회전), 내 프로필 조회를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/auth/login` - 이메일/비밀번호 로그인
//! - `POST /api/auth/refresh` - refresh 토큰으로 새 토큰 쌍 발급
//! - `GET /api/auth/me` - 현재 사용자 프로필

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use supplychain_core::{normalize_email, validate_email, User, UserProfile};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::{
    require_roles, AuthError, AuthUser, Identity, RoleGate, RoleSet, TokenKind, TokenPair,
};
use crate::error::ApiResult;
use crate::middleware::{rate_limit_middleware, ClientIp, RateLimitConfig, RateLimiter};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

fn validate_email_format(value: &str) -> Result<(), ValidationError> {
    if !validate_email(value.trim()) {
        return Err(ValidationError::new("invalid_email")
            .with_message("올바른 이메일 형식이 아닙니다".into()));
    }
    Ok(())
}

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        length(min = 5, max = 100, message = "이메일은 5-100자여야 합니다"),
        custom(function = "validate_email_format")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "비밀번호는 6-100자여야 합니다"))]
    pub password: String,
}

/// 토큰 갱신 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token이 필요합니다"))]
    pub refresh_token: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// 공개 프로필 (비밀번호 해시 제외)
    pub user: UserProfile,
}

/// validator 에러를 하나의 메시지로 합칩니다.
fn validation_error(errors: ValidationErrors) -> AuthError {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();

    AuthError::Validation(messages.join("; "))
}

fn parse_body<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    let Json(request) = payload.map_err(|rejection| AuthError::Validation(rejection.body_text()))?;
    request.validate().map_err(validation_error)?;
    Ok(request)
}

// ==================== 핸들러 ====================

/// 비밀번호 검증을 blocking 풀에서 수행.
///
/// 사용자가 없으면 더미 해시로 같은 비용의 검증을 수행하고 `false`를 반환합니다.
async fn verify_password(
    state: &AppState,
    user: Option<&User>,
    password: String,
) -> Result<bool, AuthError> {
    let hasher = state.hasher.clone();
    let (hash, exists) = match user {
        Some(user) => (user.password_hash.clone(), true),
        None => (state.dummy_hash().to_string(), false),
    };

    let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            AuthError::Internal
        })?;

    Ok(exists && verified)
}

/// 로그인.
///
/// 존재하지 않는 이메일과 틀린 비밀번호는 같은 응답을 반환하며, 어느 쪽이든
/// 실패 감사 기록을 정확히 한 건 남깁니다.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(source_ip): ClientIp,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let request = parse_body(payload)?;
    let email = normalize_email(&request.email)?;

    let user = state.users.find_by_email(&email).await?;
    let verified = verify_password(&state, user.as_ref(), request.password).await?;

    let user = match user {
        Some(user) if verified => user,
        other => {
            let subject_id = other.as_ref().map_or("unknown", |u| u.id.as_str());
            state
                .audit
                .log_authentication(subject_id, &email, false, source_ip);
            tracing::info!(email = %email, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let tokens = state.codec.issue_pair(&Identity::from(&user))?;
    state
        .audit
        .log_authentication(&user.id, &user.email, true, source_ip);
    tracing::info!(subject_id = %user.id, role = %user.role, "Login succeeded");

    Ok(Json(LoginResponse {
        tokens,
        user: user.profile(),
    }))
}

/// 토큰 갱신.
///
/// refresh 종류의 토큰만 허용하며, 매 호출마다 새 refresh 토큰을 발급합니다.
/// 역할은 저장소의 최신 값으로 다시 읽습니다.
///
/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ClientIp(source_ip): ClientIp,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<TokenPair>> {
    let request = parse_body(payload)?;
    let claims = state
        .codec
        .decode(request.refresh_token.trim(), TokenKind::Refresh)?;

    let user = state
        .users
        .find_by_id(claims.subject_id())
        .await?
        .ok_or(AuthError::InvalidToken)?;

    let tokens = state.codec.issue_pair(&Identity::from(&user))?;
    state.audit.log_token_refreshed(&user.id, source_ip);

    Ok(Json(tokens))
}

/// 현재 사용자 프로필.
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .users
        .find_by_id(claims.subject_id())
        .await?
        .ok_or_else(|| AuthError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

    Ok(Json(user.profile()))
}

/// 로그인/갱신 엔드포인트별 rate limiter.
#[derive(Clone)]
pub struct AuthRateLimiters {
    pub login: RateLimiter,
    pub refresh: RateLimiter,
}

impl AuthRateLimiters {
    /// `trust_proxy_headers`가 꺼져 있으면 소켓 피어 주소로만 버킷을 나눕니다.
    pub fn new(login_per_minute: u32, refresh_per_minute: u32, trust_proxy_headers: bool) -> Self {
        let limiter = |per_minute| {
            RateLimiter::new(
                RateLimitConfig::new(per_minute).with_trust_proxy_headers(trust_proxy_headers),
            )
        };

        Self {
            login: limiter(login_per_minute),
            refresh: limiter(refresh_per_minute),
        }
    }

    pub fn all(&self) -> Vec<RateLimiter> {
        vec![self.login.clone(), self.refresh.clone()]
    }
}

/// 인증 라우터 생성.
pub fn auth_router(
    state: Arc<AppState>,
    rate_limiters: Option<&AuthRateLimiters>,
) -> Router<Arc<AppState>> {
    let mut login_route = post(login);
    let mut refresh_route = post(refresh);

    if let Some(limiters) = rate_limiters {
        login_route = login_route.route_layer(axum::middleware::from_fn_with_state(
            limiters.login.clone(),
            rate_limit_middleware,
        ));
        refresh_route = refresh_route.route_layer(axum::middleware::from_fn_with_state(
            limiters.refresh.clone(),
            rate_limit_middleware,
        ));
    }

    Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(
            RoleGate::new(state, RoleSet::any()),
            require_roles,
        ))
        .route("/login", login_route)
        .route("/refresh", refresh_route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use supplychain_core::{NewUser, Role};
    use tower::ServiceExt;

    use crate::audit::{AuditEvent, MemoryAuditSink};
    use crate::repository::InMemoryCredentialStore;
    use crate::state::create_test_state;

    async fn setup() -> (Router, Arc<AppState>, Arc<MemoryAuditSink>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let (state, sink) = create_test_state(store.clone());
        let hash = state.hasher.hash("password123").unwrap();
        store
            .insert(
                NewUser::new("Zahra Hijab", "umkm@example.com", Role::Umkm)
                    .build("u1", hash)
                    .unwrap(),
            )
            .await
            .unwrap();

        let state = Arc::new(state);
        let app = auth_router(state.clone(), None).with_state(state.clone());
        (app, state, sink)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let (app, _, sink) = setup().await;

        let response = app
            .oneshot(json_request(
                "/login",
                serde_json::json!({"email": "UMKM@example.com", "password": "password123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: LoginResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.tokens.token_type, "bearer");
        assert_eq!(body.user.email, "umkm@example.com");
        assert_eq!(body.user.role, Role::Umkm);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            AuditEvent::Authentication { success: true, subject_id, .. } if subject_id == "u1"
        ));
    }

    #[tokio::test]
    async fn test_login_response_omits_password_hash() {
        let (app, _, _) = setup().await;

        let response = app
            .oneshot(json_request(
                "/login",
                serde_json::json!({"email": "umkm@example.com", "password": "password123"}),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert!(body["user"].get("password_hash").is_none());
        assert!(body["access_token"].is_string());
        assert!(body["refresh_token"].is_string());
    }

    #[tokio::test]
    async fn test_login_short_password_is_validation_error() {
        let (app, _, sink) = setup().await;

        let response = app
            .oneshot(json_request(
                "/login",
                serde_json::json!({"email": "umkm@example.com", "password": "123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_login_invalid_email_format() {
        let (app, _, _) = setup().await;

        let response = app
            .oneshot(json_request(
                "/login",
                serde_json::json!({"email": "not-an-email", "password": "password123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_login_malformed_json() {
        let (app, _, _) = setup().await;

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let (app, _, _) = setup().await;

        let response = app
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_me_returns_profile() {
        let (app, state, _) = setup().await;
        let token = state
            .codec
            .issue_access(&Identity::new("u1", "umkm@example.com", Role::Umkm))
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let profile: UserProfile = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.name, "Zahra Hijab");
    }

    #[tokio::test]
    async fn test_me_unknown_subject_is_not_found() {
        let (app, state, _) = setup().await;
        let token = state
            .codec
            .issue_access(&Identity::new("ghost", "ghost@example.com", Role::Umkm))
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_is_invalid() {
        let (app, state, _) = setup().await;
        let token = state
            .codec
            .issue_refresh(&Identity::new("ghost", "ghost@example.com", Role::Umkm))
            .unwrap();

        let response = app
            .oneshot(json_request(
                "/refresh",
                serde_json::json!({"refresh_token": token}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
    }

    #[test]
    fn test_validation_error_message() {
        let request = LoginRequest {
            email: "a@b".to_string(),
            password: "123".to_string(),
        };
        let err = validation_error(request.validate().unwrap_err());
        match err {
            AuthError::Validation(message) => {
                assert!(message.contains("비밀번호는 6-100자여야 합니다"));
                assert!(message.contains("이메일"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
