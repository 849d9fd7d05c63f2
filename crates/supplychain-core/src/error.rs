//! 공급망 시스템의 핵심 에러 타입.
//!
//! HTTP 계층과 무관한 에러를 정의합니다. 클라이언트에 노출되는 에러 분류는
//! `supplychain-api`의 `AuthError`가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러 (시작 시 치명적)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 입력 값 검증 실패
    #[error("검증 실패: {0}")]
    Validation(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
