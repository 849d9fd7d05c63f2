//! # Supply Chain Core
//!
//! 원단 공급업체(SUPPLIER)와 소규모 의류 생산자(UMKM)를 연결하는
//! 공급망 API의 핵심 타입을 제공합니다.
//!
//! - 역할 및 자격 증명 레코드
//! - 입력 정제 (문자열, 이메일)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod sanitize;

pub use config::{
    AppConfig, AuthConfig, Environment, LoggingConfig, RateLimitSettings, ServerConfig,
};
pub use domain::*;
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, LogConfig, LogFormat, AUDIT_TARGET};
pub use sanitize::{normalize_email, sanitize, validate_email};
