//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use supplychain_core::AuthConfig;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 파라미터: {0}")]
    InvalidParams(String),
}

/// 비밀번호 해셔.
///
/// 작업 비용(메모리, 반복 횟수)은 설정으로 조정합니다. 생성되는 해시는
/// PHC 문자열(`$argon2id$v=19$m=..,t=..,p=..$salt$digest`)로, 알고리즘과
/// 비용 파라미터가 함께 저장되므로 검증 시에는 해시에 기록된 값을 사용합니다.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 작업 비용을 지정하여 생성.
    ///
    /// # Arguments
    ///
    /// * `memory_kib` - 메모리 비용 (KiB)
    /// * `iterations` - 반복 횟수
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 인증 설정에서 생성.
    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Self::new(config.password_memory_kib, config.password_iterations)
    }

    /// 비밀번호 해싱.
    ///
    /// 솔트는 호출마다 새로 생성되므로 같은 비밀번호라도 해시가 다릅니다.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let hash = hasher.hash("password123")?;
    /// // "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| PasswordError::HashingFailed)?;

        Ok(hash.to_string())
    }

    /// 비밀번호 검증.
    ///
    /// 형식이 잘못된 해시는 에러 대신 `false`를 반환합니다.
    /// 다이제스트 비교는 상수 시간으로 수행됩니다.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        // 테스트 속도를 위해 낮은 비용 사용
        PasswordHasher::new(1024, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("password123").unwrap();

        // 자기 기술적 PHC 형식
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

        assert!(hasher.verify("password123", &hash));
        assert!(!hasher.verify("password124", &hash));
    }

    #[test]
    fn test_different_salts() {
        let hasher = hasher();
        let hash1 = hasher.hash("password123").unwrap();
        let hash2 = hasher.hash("password123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("password123", &hash1));
        assert!(hasher.verify("password123", &hash2));
    }

    #[test]
    fn test_malformed_hash_returns_false() {
        let hasher = hasher();
        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$2b$12$hhNT/r20c8CSgQ.aLC0ND.WnFozO1kp81pvEk6iiHvpJXtgluPpFW"));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        // 다른 비용으로 만든 해시도 검증 가능
        let cheap = PasswordHasher::new(512, 1).unwrap().hash("kain-voal").unwrap();
        assert!(hasher().verify("kain-voal", &cheap));
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            PasswordHasher::new(1024, 0),
            Err(PasswordError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_unicode_password() {
        let hasher = hasher();
        let hash = hasher.hash("kata sandi rahasia 🔒").unwrap();
        assert!(hasher.verify("kata sandi rahasia 🔒", &hash));
    }
}
