//! 인증/인가 에러 분류.
//!
//! 클라이언트에 노출되는 메시지는 항상 일반적인 문구이며, 내부 원인은
//! 서버 로그에만 남깁니다.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::jwt::TokenError;
use super::password::PasswordError;
use crate::error::ApiErrorResponse;

/// 인증/인가 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 이메일 또는 비밀번호 불일치 (어느 쪽인지 구분하지 않음)
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,
    #[error("인증 토큰이 필요합니다")]
    MissingCredential,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("토큰이 만료되었습니다")]
    ExpiredToken,
    #[error("접근 권한이 없습니다")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("서버 내부 오류")]
    Internal,
}

impl AuthError {
    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingCredential
            | AuthError::InvalidToken
            | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Encoding(e) => {
                tracing::error!(error = %e, "Token encoding failed");
                AuthError::Internal
            }
            TokenError::Invalid | TokenError::Malformed | TokenError::WrongKind { .. } => {
                AuthError::InvalidToken
            }
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "Password hashing failed");
        AuthError::Internal
    }
}

impl From<supplychain_core::CoreError> for AuthError {
    fn from(err: supplychain_core::CoreError) -> Self {
        use supplychain_core::CoreError;
        match err {
            CoreError::Validation(msg) => AuthError::Validation(msg),
            CoreError::NotFound(msg) => AuthError::NotFound(msg),
            other => {
                tracing::error!(error = %other, "Unexpected core error");
                AuthError::Internal
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ApiErrorResponse::new(self.code(), self.to_string()));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
