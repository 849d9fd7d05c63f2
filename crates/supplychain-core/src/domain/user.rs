//! 자격 증명 레코드와 공개 프로필.

use serde::{Deserialize, Serialize};

use super::Role;
use crate::error::{CoreError, CoreResult};
use crate::sanitize::{normalize_email, sanitize, sanitize_optional};

const NAME_MAX_LENGTH: usize = 100;
const AVATAR_MAX_LENGTH: usize = 500;
const PHONE_MAX_LENGTH: usize = 20;
const LOCATION_MAX_LENGTH: usize = 200;
const DESCRIPTION_MAX_LENGTH: usize = 500;

/// 사용자 레코드.
///
/// 외부 사용자 저장소가 소유하며, 인증 코어는 로그인 시 읽기만 합니다.
/// `password_hash`는 직렬화되지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// 검증 후 소문자화된 이메일 (대소문자 무시 유일)
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl User {
    /// 공개 프로필 반환 (비밀번호 해시 제외).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
        }
    }
}

/// 사용자 공개 프로필.
///
/// 로그인 응답과 `/api/auth/me`에서 반환됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// 신규 사용자 입력.
///
/// [`NewUser::build`]에서 모든 필드를 정제하고 이메일을 검증합니다.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            avatar: None,
            phone: None,
            location: None,
            description: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 정제 및 검증 후 [`User`] 생성.
    ///
    /// # Errors
    ///
    /// 이름이 비었거나 이메일 형식이 잘못되면 `CoreError::Validation`.
    pub fn build(self, id: impl Into<String>, password_hash: impl Into<String>) -> CoreResult<User> {
        let name = sanitize(&self.name, NAME_MAX_LENGTH);
        if name.is_empty() {
            return Err(CoreError::Validation("name must not be empty".to_string()));
        }

        Ok(User {
            id: id.into(),
            name,
            email: normalize_email(&self.email)?,
            role: self.role,
            password_hash: password_hash.into(),
            avatar: sanitize_optional(self.avatar.as_deref(), AVATAR_MAX_LENGTH),
            phone: sanitize_optional(self.phone.as_deref(), PHONE_MAX_LENGTH),
            location: sanitize_optional(self.location.as_deref(), LOCATION_MAX_LENGTH),
            description: sanitize_optional(self.description.as_deref(), DESCRIPTION_MAX_LENGTH),
        })
    }
}
