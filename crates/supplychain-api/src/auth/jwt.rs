//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 발급/검증 로직.
//!
//! 토큰은 표준 compact 형식(`header.payload.signature`, 각 세그먼트는
//! base64url)이며 HS256으로 서명됩니다. 페이로드 예시:
//!
//! ```json
//! {
//!   "sub": "u1",
//!   "email": "umkm@example.com",
//!   "role": "UMKM",
//!   "iat": 1738300800,
//!   "exp": 1738302600,
//!   "kind": "access",
//!   "jti": "5f0c..."
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use supplychain_core::{AuthConfig, Role};

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// API 호출용 단기 토큰
    Access,
    /// Access Token 재발급 전용 장기 토큰
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// 토큰에 담을 사용자 식별 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// 사용자 ID
    pub subject_id: String,
    /// 소문자화된 이메일
    pub email: String,
    /// 사용자 역할
    pub role: Role,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            role,
        }
    }
}

impl From<&supplychain_core::User> for Identity {
    fn from(user: &supplychain_core::User) -> Self {
        Self::new(user.id.clone(), user.email.clone(), user.role)
    }
}

/// 와이어 페이로드.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    sub: String,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
    kind: TokenKind,
    jti: String,
}

/// 검증된 토큰 클레임.
///
/// 서명과 만료 검증을 통과한 토큰에서만 생성되며, 외부에서 직접 만들 수
/// 없습니다. [`TokenCodec::decode`]가 유일한 생성 경로입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    identity: Identity,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    kind: TokenKind,
    token_id: String,
}

impl Claims {
    pub fn subject_id(&self) -> &str {
        &self.identity.subject_id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// JWT ID - 토큰 고유 식별자
    pub fn token_id(&self) -> &str {
        &self.token_id
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// 토큰 타입 (항상 "bearer")
    pub token_type: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("유효하지 않은 토큰")]
    Invalid,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("토큰 페이로드에 필수 클레임이 없습니다")]
    Malformed,
    #[error("토큰 종류 불일치: {expected} 토큰이 필요하지만 {actual} 토큰이 제시되었습니다")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },
}

/// 토큰 발급/검증기.
///
/// 프로세스 시작 시 한 번 생성되어 읽기 전용으로 공유됩니다.
/// 서명 키는 생성 시 키 객체로만 변환되어 보관됩니다.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// 새 코덱 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC 서명 키
    /// * `access_ttl` - Access Token 유효 기간
    /// * `refresh_ttl` - Refresh Token 유효 기간
    pub fn new(secret: &SecretString, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        // 시계 오차 허용 없음: now > exp 이면 즉시 만료
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// 인증 설정의 만료 시간으로 생성.
    pub fn from_config(secret: &SecretString, config: &AuthConfig) -> Self {
        Self::new(
            secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        )
    }

    /// Access Token 유효 기간 (초).
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Access Token 발급 (기본 30분).
    pub fn issue_access(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, TokenKind::Access, self.access_ttl)
    }

    /// Refresh Token 발급 (기본 7일).
    pub fn issue_refresh(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, TokenKind::Refresh, self.refresh_ttl)
    }

    /// Access Token + Refresh Token 쌍 발급.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(identity)?,
            refresh_token: self.issue_refresh(identity)?,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl_secs(),
        })
    }

    fn issue(&self, identity: &Identity, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let payload = TokenPayload {
            sub: identity.subject_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key).map_err(TokenError::from)
    }

    /// 토큰 디코딩 및 검증.
    ///
    /// 서명 → 만료 → 필수 클레임 → 토큰 종류 순으로 검사합니다.
    ///
    /// # Errors
    ///
    /// - 서명 불일치, 헤더/세그먼트 형식 오류: `TokenError::Invalid`
    /// - 만료: `TokenError::Expired`
    /// - 서명은 유효하나 `sub`, `email`, `role` 등 클레임 누락: `TokenError::Malformed`
    /// - `expected`와 다른 종류: `TokenError::WrongKind`
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        // 헤더 파싱 실패는 서명 검증 이전 단계: Invalid
        decode_header(token).map_err(|_| TokenError::Invalid)?;

        let data = decode::<TokenPayload>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            },
        )?;

        let payload = data.claims;
        if payload.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: payload.kind,
            });
        }

        let issued_at = DateTime::from_timestamp(payload.iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(payload.exp, 0).ok_or(TokenError::Malformed)?;

        Ok(Claims {
            identity: Identity {
                subject_id: payload.sub,
                email: payload.email,
                role: payload.role,
            },
            issued_at,
            expires_at,
            kind: payload.kind,
            token_id: payload.jti,
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}
