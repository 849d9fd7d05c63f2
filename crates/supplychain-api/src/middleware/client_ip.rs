//! 클라이언트 IP 추출.
//!
//! 감사 로그와 rate limiting이 같은 규칙으로 IP를 식별합니다.
//! 프록시 헤더는 클라이언트가 임의로 넣을 수 있으므로 설정으로 신뢰를
//! 켠 경우에만 읽습니다.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};

use crate::state::AppState;

/// 요청에서 클라이언트 IP 추출.
///
/// 기본은 소켓 피어 주소(`ConnectInfo`)입니다. `trust_proxy_headers`가 켜져
/// 있으면 X-Forwarded-For 첫 번째 주소, X-Real-IP를 먼저 확인합니다.
/// 식별할 수 없으면 `None`.
pub fn client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !trust_proxy_headers {
        return peer;
    }

    proxy_header_ip(headers).or(peer)
}

fn proxy_header_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok());
    if forwarded.is_some() {
        return forwarded;
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// 클라이언트 IP 추출기.
///
/// ```rust,ignore
/// async fn handler(ClientIp(ip): ClientIp) -> String {
///     ip.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".into())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(client_ip(
            &parts.headers,
            &parts.extensions,
            state.trust_proxy_headers,
        )))
    }
}
