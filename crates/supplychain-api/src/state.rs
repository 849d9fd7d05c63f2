//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//! 서명 키와 해셔 설정은 시작 시 한 번 결정되며 이후 변경되지 않습니다.

use std::sync::Arc;

use secrecy::SecretString;
use supplychain_core::AuthConfig;

use crate::audit::AuditLogger;
use crate::auth::{PasswordError, PasswordHasher, TokenCodec};
use crate::repository::CredentialStore;

/// 존재하지 않는 이메일로 로그인할 때 검증에 쓰는 비밀번호.
const DUMMY_PASSWORD: &str = "timing-equalizer-not-a-real-password";

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 발급/검증기
    pub codec: Arc<TokenCodec>,

    /// 비밀번호 해셔
    pub hasher: PasswordHasher,

    /// 감사 로거
    pub audit: AuditLogger,

    /// 사용자 자격증명 저장소
    pub users: Arc<dyn CredentialStore>,

    /// 감사 로그의 클라이언트 IP를 프록시 헤더에서 읽을지 여부 (기본 false)
    pub trust_proxy_headers: bool,

    /// 미등록 이메일 로그인 시 검증 대상 해시.
    ///
    /// 사용자 존재 여부와 관계없이 같은 해싱 비용을 치르도록 합니다.
    dummy_hash: Arc<str>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 더미 해시를 계산하므로 해셔 설정에 따라 수십 ms가 걸릴 수 있습니다.
    pub fn new(
        codec: TokenCodec,
        hasher: PasswordHasher,
        users: Arc<dyn CredentialStore>,
        audit: AuditLogger,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            codec: Arc::new(codec),
            hasher,
            audit,
            users,
            trust_proxy_headers: false,
            dummy_hash: Arc::from(dummy_hash),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 설정에서 AppState 생성.
    pub fn from_config(
        secret: &SecretString,
        config: &AuthConfig,
        users: Arc<dyn CredentialStore>,
        audit: AuditLogger,
    ) -> Result<Self, PasswordError> {
        Self::new(
            TokenCodec::from_config(secret, config),
            PasswordHasher::from_config(config)?,
            users,
            audit,
        )
    }

    /// 리버스 프록시 뒤에서 X-Forwarded-For / X-Real-IP를 신뢰합니다.
    #[must_use]
    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("codec", &self.codec)
            .field("hasher", &self.hasher)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("started_at", &self.started_at)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 저비용 해셔와 메모리 감사 싱크를 사용합니다.
#[cfg(test)]
pub fn create_test_state(
    users: Arc<dyn CredentialStore>,
) -> (AppState, Arc<crate::audit::MemoryAuditSink>) {
    use crate::audit::MemoryAuditSink;

    let sink = Arc::new(MemoryAuditSink::default());
    let secret = SecretString::from("test-secret-key-that-is-long-enough-for-hs256".to_string());
    let codec = TokenCodec::new(
        &secret,
        chrono::Duration::minutes(30),
        chrono::Duration::days(7),
    );
    let hasher = PasswordHasher::new(1024, 1).expect("valid test params");

    let state = AppState::new(codec, hasher, users, AuditLogger::new(sink.clone()))
        .expect("test state");
    (state, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCredentialStore;

    #[test]
    fn test_dummy_hash_is_verifiable() {
        let (state, _) = create_test_state(Arc::new(InMemoryCredentialStore::new()));
        assert!(state.dummy_hash().starts_with("$argon2id$"));
        assert!(!state.hasher.verify("password123", state.dummy_hash()));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let (state, _) = create_test_state(Arc::new(InMemoryCredentialStore::new()));
        let debug = format!("{:?}", state);
        assert!(!debug.contains("test-secret-key"));
    }
}
