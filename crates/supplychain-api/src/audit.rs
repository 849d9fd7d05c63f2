//! 감사 로그.
//!
//! 인증 시도, 권한 거부, 상태 변경 작업을 호출당 한 건의 구조화 레코드로
//! 남깁니다. 기록은 추가 전용이며 조회 API는 제공하지 않습니다
//! (외부 로그 집계가 `audit` 타겟을 수집한다고 가정).
//!
//! 기록 실패는 절대 요청을 실패시키지 않습니다. [`AuditSink::record`]는
//! 에러를 반환하지 않으며, 운영 환경에서는 [`BufferedAuditSink`]가 채널로
//! 넘긴 뒤 백그라운드 태스크에서 출력합니다.

use std::collections::VecDeque;
use std::future::Future;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use supplychain_core::{Role, AUDIT_TARGET};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 감사 이벤트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// 로그인 시도 (성공/실패)
    Authentication {
        subject_id: String,
        email: String,
        success: bool,
        source_ip: String,
    },
    /// 역할 가드에서 거부된 요청
    AuthorizationFailure {
        subject_id: String,
        email: String,
        role: Role,
        endpoint: String,
        source_ip: String,
    },
    /// 상태 변경 작업 완료
    SensitiveOperation {
        subject_id: String,
        operation: String,
        resource_id: String,
    },
    /// Refresh Token 회전
    TokenRefreshed {
        subject_id: String,
        source_ip: String,
    },
}

/// 감사 레코드 출력 대상.
///
/// 구현체는 블로킹하거나 패닉하지 않아야 합니다.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// `audit` 타겟으로 tracing 이벤트를 내보내는 기본 싱크.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        match event {
            AuditEvent::Authentication {
                subject_id,
                email,
                success: true,
                source_ip,
            } => {
                info!(target: AUDIT_TARGET, event = "auth_success", subject_id = %subject_id, email = %email, source_ip = %source_ip);
            }
            AuditEvent::Authentication {
                subject_id,
                email,
                success: false,
                source_ip,
            } => {
                warn!(target: AUDIT_TARGET, event = "auth_failure", subject_id = %subject_id, email = %email, source_ip = %source_ip);
            }
            AuditEvent::AuthorizationFailure {
                subject_id,
                email,
                role,
                endpoint,
                source_ip,
            } => {
                warn!(target: AUDIT_TARGET, event = "authz_failure", subject_id = %subject_id, email = %email, role = %role, endpoint = %endpoint, source_ip = %source_ip);
            }
            AuditEvent::SensitiveOperation {
                subject_id,
                operation,
                resource_id,
            } => {
                info!(target: AUDIT_TARGET, event = "sensitive_operation", subject_id = %subject_id, operation = %operation, resource_id = %resource_id);
            }
            AuditEvent::TokenRefreshed {
                subject_id,
                source_ip,
            } => {
                info!(target: AUDIT_TARGET, event = "token_refreshed", subject_id = %subject_id, source_ip = %source_ip);
            }
        }
    }
}

/// 메모리 버퍼 싱크.
///
/// 최근 `capacity`건만 보관합니다. 테스트와 로컬 진단용.
#[derive(Debug)]
pub struct MemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    capacity: usize,
}

impl MemoryAuditSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// 보관 중인 이벤트 복사본 (오래된 순).
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // 다른 스레드가 패닉해도 기록은 계속되어야 하므로 poison을 무시
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<AuditEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

/// 채널 기반 비동기 싱크.
///
/// `record`는 `try_send`만 수행하고 즉시 반환합니다. 채널이 가득 차면
/// 이벤트를 버리고 카운터를 올립니다.
#[derive(Debug)]
pub struct BufferedAuditSink {
    sender: mpsc::Sender<AuditEvent>,
    dropped: AtomicU64,
}

impl BufferedAuditSink {
    /// 버퍼 싱크와 배출 태스크 생성.
    ///
    /// 모든 송신자가 drop되면 남은 이벤트를 비운 뒤 태스크가 종료됩니다.
    /// Tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn(inner: Arc<dyn AuditSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<AuditEvent>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                inner.record(&event);
            }
        });

        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            handle,
        )
    }

    /// 버퍼 초과로 버려진 이벤트 수.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AuditSink for BufferedAuditSink {
    fn record(&self, event: &AuditEvent) {
        if self.sender.try_send(event.clone()).is_err() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            // 로그 폭주 방지: 처음과 이후 1000건마다 한 번
            if dropped == 1 || dropped % 1000 == 0 {
                warn!(dropped, "Audit buffer full, dropping events");
            }
        }
    }
}

fn ip_or_unknown(ip: Option<IpAddr>) -> String {
    ip.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 감사 로거.
///
/// 싱크를 `Arc`로 공유하므로 복제 비용이 낮습니다.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// 로그인 시도 기록. 성공/실패 모두 반드시 한 건씩 남깁니다.
    pub fn log_authentication(
        &self,
        subject_id: &str,
        email: &str,
        success: bool,
        source_ip: Option<IpAddr>,
    ) {
        self.sink.record(&AuditEvent::Authentication {
            subject_id: subject_id.to_string(),
            email: email.to_string(),
            success,
            source_ip: ip_or_unknown(source_ip),
        });
    }

    /// 권한 거부 기록.
    pub fn log_authorization_failure(
        &self,
        subject_id: &str,
        email: &str,
        role: Role,
        endpoint: &str,
        source_ip: Option<IpAddr>,
    ) {
        self.sink.record(&AuditEvent::AuthorizationFailure {
            subject_id: subject_id.to_string(),
            email: email.to_string(),
            role,
            endpoint: endpoint.to_string(),
            source_ip: ip_or_unknown(source_ip),
        });
    }

    /// 상태 변경 작업 기록. 변경이 성공한 뒤에 호출해야 합니다.
    pub fn log_sensitive_operation(&self, subject_id: &str, operation: &str, resource_id: &str) {
        self.sink.record(&AuditEvent::SensitiveOperation {
            subject_id: subject_id.to_string(),
            operation: operation.to_string(),
            resource_id: resource_id.to_string(),
        });
    }

    /// 토큰 회전 기록.
    pub fn log_token_refreshed(&self, subject_id: &str, source_ip: Option<IpAddr>) {
        self.sink.record(&AuditEvent::TokenRefreshed {
            subject_id: subject_id.to_string(),
            source_ip: ip_or_unknown(source_ip),
        });
    }

    /// 변경 작업을 실행하고 성공한 경우에만 기록.
    ///
    /// 실패한 변경은 감사 기록을 남기지 않습니다.
    ///
    /// ```rust,ignore
    /// let fabric = audit.record_after(claims.subject_id(), "ADD_FABRIC", &fabric.id, || {
    ///     store.insert_fabric(fabric.clone())
    /// })?;
    /// ```
    pub fn record_after<T, E>(
        &self,
        subject_id: &str,
        operation: &str,
        resource_id: &str,
        mutation: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let result = mutation()?;
        self.log_sensitive_operation(subject_id, operation, resource_id);
        Ok(result)
    }

    /// [`AuditLogger::record_after`]의 비동기 버전.
    pub async fn record_after_async<T, E, Fut>(
        &self,
        subject_id: &str,
        operation: &str,
        resource_id: &str,
        mutation: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let result = mutation.await?;
        self.log_sensitive_operation(subject_id, operation, resource_id);
        Ok(result)
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}
