//! 설정 관리.
//!
//! 기본값 → `config/default.toml`(선택) → `SUPPLYCHAIN__*` 환경 변수 순서로
//! 병합하여 [`AppConfig`]를 만듭니다. 프로세스 시작 시 한 번 로드되며
//! 이후에는 읽기 전용으로 공유됩니다.

use std::net::SocketAddr;
use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 개발 환경 전용 서명 키. 운영 환경에서는 절대 사용되지 않습니다.
const DEVELOPMENT_SECRET: &str = "dev-secret-key-change-in-production-12345678901234567890";

/// 운영 환경에서 허용하는 최소 서명 키 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// Access Token 최대 유효 기간 (분, 하루).
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Refresh Token 최대 유효 기간 (일).
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

/// 배포 환경.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// 개발 환경 - 고정 개발 키 허용, 데모 계정 시드
    #[default]
    Development,
    /// 운영 환경 - 서명 키 필수 (fail-closed)
    Production,
}

impl Environment {
    /// 운영 환경 여부.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 배포 환경
    pub environment: Environment,
    /// 서버 설정
    pub server: ServerConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 요청 한도 설정
    pub rate_limit: RateLimitSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// CORS 허용 origin 목록
    pub allowed_origins: Vec<String>,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 클라이언트 IP를 X-Forwarded-For / X-Real-IP에서 읽을지 여부.
    ///
    /// 헤더를 덮어쓰는 리버스 프록시 뒤에서만 켜야 합니다. 끄면 소켓 피어 주소만 사용합니다.
    pub trust_proxy_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:8080".to_string(),
            ],
            request_timeout_secs: 30,
            trust_proxy_headers: false,
        }
    }
}

impl ServerConfig {
    /// 바인딩할 소켓 주소.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 인증 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 토큰 서명 키. [`AuthConfig::resolve_secret`]으로만 꺼내 씁니다.
    pub secret_key: Option<String>,
    /// Access Token 만료 시간 (분)
    pub access_token_ttl_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    pub refresh_token_ttl_days: i64,
    /// 비밀번호 해시 메모리 비용 (KiB)
    pub password_memory_kib: u32,
    /// 비밀번호 해시 반복 횟수
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            access_token_ttl_minutes: 30,
            refresh_token_ttl_days: 7,
            password_memory_kib: 19_456,
            password_iterations: 2,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("password_memory_kib", &self.password_memory_kib)
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

impl AuthConfig {
    /// 서명 키 확정.
    ///
    /// 운영 환경에서 키가 없거나 비어 있거나 [`MIN_SECRET_LEN`]보다 짧으면
    /// `CoreError::Config`를 반환합니다. 개발 환경에서는 고정 개발 키로
    /// 대체하고 경고를 남깁니다.
    pub fn resolve_secret(&self, environment: Environment) -> CoreResult<SecretString> {
        let configured = self
            .secret_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (configured, environment) {
            (Some(secret), Environment::Production) if secret.len() < MIN_SECRET_LEN => {
                Err(CoreError::Config(format!(
                    "auth.secret_key must be at least {} bytes in production",
                    MIN_SECRET_LEN
                )))
            }
            (Some(secret), _) => Ok(SecretString::from(secret.to_string())),
            (None, Environment::Production) => Err(CoreError::Config(
                "auth.secret_key must be set in production (SUPPLYCHAIN__AUTH__SECRET_KEY)"
                    .to_string(),
            )),
            (None, Environment::Development) => {
                tracing::warn!(
                    "auth.secret_key not set, using development key (INSECURE, development only)"
                );
                Ok(SecretString::from(DEVELOPMENT_SECRET.to_string()))
            }
        }
    }
}

/// 요청 한도 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// 요청 한도 적용 여부
    pub enabled: bool,
    /// IP당 분당 로그인 시도 횟수
    pub login_per_minute: u32,
    /// IP당 분당 토큰 갱신 횟수
    pub refresh_per_minute: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            login_per_minute: 5,
            refresh_per_minute: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::build(config::File::from(path.as_ref()).required(false))
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    fn build<S>(file: S) -> CoreResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SUPPLYCHAIN")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&self.auth.access_token_ttl_minutes) {
            return Err(CoreError::Config(format!(
                "auth.access_token_ttl_minutes must be between 1 and {}",
                MAX_ACCESS_TOKEN_TTL_MINUTES
            )));
        }
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&self.auth.refresh_token_ttl_days) {
            return Err(CoreError::Config(format!(
                "auth.refresh_token_ttl_days must be between 1 and {}",
                MAX_REFRESH_TOKEN_TTL_DAYS
            )));
        }
        if self.auth.password_iterations == 0 {
            return Err(CoreError::Config(
                "auth.password_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 운영 환경 여부.
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
