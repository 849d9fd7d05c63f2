//! 사용자 저장소.
//!
//! 인증 흐름은 [`CredentialStore`] trait에만 의존하며, 라우트 핸들러는
//! 저장소 구현체를 알지 못합니다.

pub mod seed;
pub mod users;

pub use seed::{seed_demo_users, DEMO_PASSWORD};
pub use users::{CredentialStore, InMemoryCredentialStore};
