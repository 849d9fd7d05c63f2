//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할과 엔드포인트별 허용 역할 집합을 정의합니다.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 소규모 의류 생산자 - 원단 요청, 히잡 생산/판매
    #[serde(rename = "UMKM")]
    Umkm,
    /// 원단 도매업체 - 원단 등록, 요청 승인/거절/배송
    #[serde(rename = "SUPPLIER")]
    Supplier,
}

impl Role {
    /// 전체 역할 목록.
    pub const ALL: [Role; 2] = [Role::Umkm, Role::Supplier];

    /// 와이어 표현 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Umkm => "UMKM",
            Role::Supplier => "SUPPLIER",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Role::Umkm => 0b01,
            Role::Supplier => 0b10,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 허용 역할 집합.
///
/// 라우트 등록 시점에 명시적으로 전달되어 역할 가드가 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// 모든 역할 허용.
    pub fn any() -> Self {
        Self(Role::ALL.iter().fold(0, |acc, r| acc | r.bit()))
    }

    /// 단일 역할만 허용.
    pub fn only(role: Role) -> Self {
        Self(role.bit())
    }

    /// 역할 포함 여부.
    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// 집합에 포함된 역할 순회.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(|r| r.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Supplier).unwrap();
        assert_eq!(json, "\"SUPPLIER\"");

        let parsed: Role = serde_json::from_str("\"UMKM\"").unwrap();
        assert_eq!(parsed, Role::Umkm);

        assert!(serde_json::from_str::<Role>("\"umkm\"").is_err());
    }

    #[test]
    fn test_role_set_membership() {
        let supplier_only = RoleSet::only(Role::Supplier);
        assert!(supplier_only.contains(Role::Supplier));
        assert!(!supplier_only.contains(Role::Umkm));

        let both = RoleSet::any();
        assert!(both.contains(Role::Umkm));
        assert!(both.contains(Role::Supplier));

        assert!(!RoleSet::default().contains(Role::Umkm));
        assert!(!RoleSet::default().contains(Role::Supplier));
    }

    #[test]
    fn test_role_set_display() {
        assert_eq!(RoleSet::any().to_string(), "UMKM, SUPPLIER");
        assert_eq!(RoleSet::only(Role::Umkm).to_string(), "UMKM");
        assert_eq!(RoleSet::default().to_string(), "");
    }
}
