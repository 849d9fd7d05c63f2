//! 사용자 자격증명 저장소.
//!
//! 로그인 시 이메일로, 인증된 요청에서는 ID로 사용자를 조회합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use supplychain_core::{CoreError, CoreResult, User};
use tokio::sync::RwLock;

/// 사용자 조회 추상화.
///
/// 영속 저장소 구현체는 이 trait만 구현하면 인증 흐름에 바로 연결됩니다.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 이메일로 사용자 조회 (대소문자 무시).
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// ID로 사용자 조회.
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>>;
}

/// 메모리 기반 자격증명 저장소.
///
/// 개발 시드 데이터와 테스트에서 사용합니다.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 추가. 같은 이메일이 이미 있으면 거부합니다.
    pub async fn insert(&self, user: User) -> CoreResult<()> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::Validation(format!(
                "이미 등록된 이메일입니다: {}",
                user.email
            )));
        }

        users.insert(user.id.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = email.trim();
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplychain_core::{NewUser, Role};

    fn user(id: &str, email: &str) -> User {
        NewUser::new("Test User", email, Role::Umkm)
            .build(id, "$argon2id$placeholder")
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_by_email_case_insensitive() {
        let store = InMemoryCredentialStore::new();
        store.insert(user("u1", "umkm@example.com")).await.unwrap();

        let found = store.find_by_email("UMKM@Example.com").await.unwrap();
        assert_eq!(found.unwrap().id, "u1");
        assert!(store.find_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = InMemoryCredentialStore::new();
        store.insert(user("u1", "umkm@example.com")).await.unwrap();

        assert!(store.find_by_id("u1").await.unwrap().is_some());
        assert!(store.find_by_id("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryCredentialStore::new();
        store.insert(user("u1", "umkm@example.com")).await.unwrap();

        let err = store.insert(user("u2", "umkm@example.com")).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.find_by_id("u2").await.unwrap().is_none());
    }
}
