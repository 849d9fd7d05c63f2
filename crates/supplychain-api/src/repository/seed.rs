//! 개발 환경용 데모 계정.

use supplychain_core::{CoreError, CoreResult, NewUser, Role};

use super::users::InMemoryCredentialStore;
use crate::auth::PasswordHasher;

/// 데모 계정 공통 비밀번호.
pub const DEMO_PASSWORD: &str = "password123";

/// 데모 계정 목록 (id, 계정 정보).
fn demo_accounts() -> Vec<(&'static str, NewUser)> {
    vec![
        (
            "u1",
            NewUser::new("Zahra Hijab", "umkm@example.com", Role::Umkm)
                .with_avatar("https://placehold.co/200x200/6366f1/ffffff?text=UMKM"),
        ),
        (
            "s1",
            NewUser::new("Mitra Tekstil Solo", "supplier@example.com", Role::Supplier)
                .with_avatar("https://placehold.co/200x200/4f46e5/ffffff?text=Supplier+1")
                .with_phone("082232316323")
                .with_location("Solo, Jawa Tengah")
                .with_description("Spesialis kain voal dan katun premium sejak 2010."),
        ),
    ]
}

/// 데모 계정을 저장소에 등록합니다.
///
/// 비밀번호 해시는 시작 시점에 계산하므로 해셔 설정이 바뀌어도 항상 검증됩니다.
/// 등록된 계정 수를 반환합니다.
pub async fn seed_demo_users(
    store: &InMemoryCredentialStore,
    hasher: &PasswordHasher,
) -> CoreResult<usize> {
    let password_hash = hasher
        .hash(DEMO_PASSWORD)
        .map_err(|e| CoreError::Internal(e.to_string()))?;

    let mut count = 0;
    for (id, account) in demo_accounts() {
        store.insert(account.build(id, password_hash.clone())?).await?;
        count += 1;
    }

    tracing::info!(count, "Seeded development demo users");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CredentialStore;

    #[tokio::test]
    async fn test_seed_demo_users() {
        let store = InMemoryCredentialStore::new();
        let hasher = PasswordHasher::new(1024, 1).unwrap();

        let count = seed_demo_users(&store, &hasher).await.unwrap();
        assert_eq!(count, 2);

        let supplier = store
            .find_by_email("supplier@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(supplier.role, Role::Supplier);
        assert!(hasher.verify(DEMO_PASSWORD, &supplier.password_hash));
    }

    #[tokio::test]
    async fn test_seed_twice_fails() {
        let store = InMemoryCredentialStore::new();
        let hasher = PasswordHasher::new(1024, 1).unwrap();

        seed_demo_users(&store, &hasher).await.unwrap();
        assert!(seed_demo_users(&store, &hasher).await.is_err());
    }
}
