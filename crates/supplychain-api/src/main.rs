//! 공급망 API 서버 바이너리.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use supplychain_api::{
    create_app,
    middleware::spawn_cleanup_task,
    repository::{seed_demo_users, InMemoryCredentialStore},
    AppState, AuditLogger, AuthRateLimiters, BufferedAuditSink, TracingAuditSink,
};
use supplychain_core::{init_logging, AppConfig, LogConfig};
use tracing::{error, info, warn};

/// 감사 로그 채널 용량.
const AUDIT_BUFFER: usize = 4096;

/// rate limiter 버킷 정리 주기.
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;
    init_logging(LogConfig::from(&config.logging))?;

    info!(
        environment = ?config.environment,
        "Starting Supply Chain API server..."
    );

    // 운영 환경에서 서명 키가 없거나 짧으면 여기서 종료
    let secret = config
        .auth
        .resolve_secret(config.environment)
        .inspect_err(|e| error!(error = %e, "Refusing to start without a valid signing key"))?;

    let addr = config.server.socket_addr().inspect_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. SUPPLYCHAIN__SERVER__HOST, SUPPLYCHAIN__SERVER__PORT를 확인하세요."
        )
    })?;

    // 감사 로그는 채널을 거쳐 백그라운드에서 출력
    let (audit_sink, audit_task) = BufferedAuditSink::spawn(Arc::new(TracingAuditSink), AUDIT_BUFFER);
    let audit_sink = Arc::new(audit_sink);
    let audit = AuditLogger::new(audit_sink.clone());

    let users = Arc::new(InMemoryCredentialStore::new());
    let state = AppState::from_config(&secret, &config.auth, users.clone(), audit)?
        .with_trust_proxy_headers(config.server.trust_proxy_headers);
    if config.server.trust_proxy_headers {
        warn!("Trusting X-Forwarded-For / X-Real-IP, only safe behind a reverse proxy");
    }

    if config.is_production() {
        info!("Production environment, demo users are not seeded");
    } else {
        seed_demo_users(&users, &state.hasher).await?;
    }

    let state = Arc::new(state);
    info!(version = %state.version, "Application state initialized");

    let rate_limiters = if config.rate_limit.enabled {
        let limiters = AuthRateLimiters::new(
            config.rate_limit.login_per_minute,
            config.rate_limit.refresh_per_minute,
            config.server.trust_proxy_headers,
        );
        spawn_cleanup_task(limiters.all(), RATE_LIMIT_CLEANUP_INTERVAL);
        info!(
            login_per_minute = config.rate_limit.login_per_minute,
            refresh_per_minute = config.rate_limit.refresh_per_minute,
            "Rate limiting enabled"
        );
        Some(limiters)
    } else {
        warn!("Rate limiting DISABLED");
        None
    };

    let app = create_app(state, &config.server, rate_limiters.as_ref());

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown initiated, flushing audit log...");

    let dropped = audit_sink.dropped();
    if dropped > 0 {
        warn!(dropped, "Audit events were dropped due to a full buffer");
    }

    // 마지막 송신자가 해제되면 감사 채널이 닫히고 남은 레코드가 출력됨
    drop(audit_sink);
    if tokio::time::timeout(Duration::from_secs(5), audit_task)
        .await
        .is_err()
    {
        warn!("Audit log flush timed out");
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
