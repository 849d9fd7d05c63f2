//! 도메인 모델.
//!
//! 인증 코어가 다루는 역할과 자격 증명 레코드를 정의합니다.
//! 원단, 요청, 판매 등 업무 레코드는 외부 데이터 저장소의 책임입니다.

pub mod role;
pub mod user;

pub use role::{Role, RoleSet};
pub use user::{NewUser, User, UserProfile};
