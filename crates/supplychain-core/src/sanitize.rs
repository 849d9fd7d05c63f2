//! 입력 정제 유틸리티.
//!
//! 모든 인바운드 문자열 필드는 저장 전에 [`sanitize`]를 거치고,
//! 이메일은 [`normalize_email`]로 검증 및 소문자화됩니다.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};

/// 이메일 최대 길이 (문자 수).
pub const EMAIL_MAX_LENGTH: usize = 100;

/// `local@domain.tld` 형태 검사. 최상위 도메인은 2자 이상의 영문자.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// 문자열 정제.
///
/// 널 바이트를 제거하고, `max_length` 문자로 자른 뒤 앞뒤 공백을 제거합니다.
/// 자르기가 공백 제거보다 먼저 적용되므로 결과는 항상 `max_length` 이하이며
/// 두 번 적용해도 결과가 같습니다.
///
/// # Example
///
/// ```
/// use supplychain_core::sanitize::sanitize;
///
/// assert_eq!(sanitize("  Voal\0 Premium  ", 100), "Voal Premium");
/// assert_eq!(sanitize("abcdef", 3), "abc");
/// ```
pub fn sanitize(input: &str, max_length: usize) -> String {
    let truncated: String = input
        .chars()
        .filter(|c| *c != '\0')
        .take(max_length)
        .collect();

    truncated.trim().to_string()
}

/// 선택적 필드 정제. 정제 후 빈 문자열이면 `None`.
pub fn sanitize_optional(input: Option<&str>, max_length: usize) -> Option<String> {
    input
        .map(|s| sanitize(s, max_length))
        .filter(|s| !s.is_empty())
}

/// 이메일 형식 검증.
///
/// 구조만 검사하며 실제 수신 가능 여부는 확인하지 않습니다.
pub fn validate_email(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input)
}

/// 이메일 정제 + 검증 + 소문자화.
///
/// 자격 증명 저장소에는 이 함수를 통과한 이메일만 도달합니다.
pub fn normalize_email(input: &str) -> CoreResult<String> {
    let email = sanitize(input, EMAIL_MAX_LENGTH);
    if !validate_email(&email) {
        return Err(CoreError::Validation("올바른 이메일 형식이 아닙니다".to_string()));
    }
    Ok(email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_strips_null_and_whitespace() {
        assert_eq!(sanitize("\0 hello \0", 100), "hello");
        assert_eq!(sanitize("", 100), "");
        assert_eq!(sanitize("   ", 100), "");
    }

    #[test]
    fn test_sanitize_truncates_before_trim() {
        // 10자로 자른 뒤 공백 제거 → "abc"
        assert_eq!(sanitize("abc       xyz", 10), "abc");
    }

    #[test]
    fn test_sanitize_counts_characters() {
        // 멀티바이트 문자도 한 글자로 계산
        assert_eq!(sanitize("kain sutra ✨✨✨", 12), "kain sutra ✨");
    }

    #[test]
    fn test_sanitize_optional() {
        assert_eq!(sanitize_optional(None, 10), None);
        assert_eq!(sanitize_optional(Some("  "), 10), None);
        assert_eq!(
            sanitize_optional(Some(" Solo, Jawa Tengah "), 200),
            Some("Solo, Jawa Tengah".to_string())
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("first.last+tag@sub.example.co.id"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a@b.c"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@example.com "));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  UMKM@Example.COM ").unwrap(),
            "umkm@example.com"
        );
        assert!(matches!(
            normalize_email("umkm@example"),
            Err(CoreError::Validation(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_sanitize_idempotent(input in ".*", max in 0usize..64) {
            let once = sanitize(&input, max);
            prop_assert_eq!(sanitize(&once, max), once);
        }

        #[test]
        fn prop_sanitize_bounded_and_null_free(input in ".*", max in 0usize..64) {
            let out = sanitize(&input, max);
            prop_assert!(out.chars().count() <= max);
            prop_assert!(!out.contains('\0'));
        }

        #[test]
        fn prop_validate_email_total(input in "\\PC*") {
            // 어떤 입력에도 패닉하지 않음
            let _ = validate_email(&input);
        }

        #[test]
        fn prop_normalized_email_is_lowercase(
            local in "[a-zA-Z0-9._]{1,16}",
            domain in "[a-zA-Z0-9]{1,16}",
            tld in "[a-zA-Z]{2,6}",
        ) {
            let email = format!("{}@{}.{}", local, domain, tld);
            let normalized = normalize_email(&email).unwrap();
            prop_assert_eq!(normalized.clone(), normalized.to_lowercase());
        }
    }
}
