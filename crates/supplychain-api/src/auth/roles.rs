//! 역할 기반 접근 제어.
//!
//! 역할 멤버십만 검사합니다. "자신의 리소스인가" 같은 소유권 검사는
//! Claims의 `subject_id`를 사용해 비즈니스 계층에서 수행합니다.

use std::net::IpAddr;

use supplychain_core::RoleSet;

use super::error::AuthError;
use super::jwt::Claims;
use crate::audit::AuditLogger;

/// 호출자의 역할이 허용 목록에 있는지 확인.
///
/// 거부 시 권한 실패 감사 기록을 먼저 남긴 뒤 `Forbidden`을 반환합니다.
pub fn authorize(
    claims: &Claims,
    allowed: RoleSet,
    endpoint: &str,
    source_ip: Option<IpAddr>,
    audit: &AuditLogger,
) -> Result<(), AuthError> {
    if allowed.contains(claims.role()) {
        return Ok(());
    }

    audit.log_authorization_failure(
        claims.subject_id(),
        claims.email(),
        claims.role(),
        endpoint,
        source_ip,
    );
    tracing::debug!(
        subject_id = claims.subject_id(),
        role = %claims.role(),
        allowed = %allowed,
        endpoint,
        "Role not permitted"
    );

    Err(AuthError::Forbidden)
}
