//! Post-operation audit recording.
//!
//! The lifecycle controller calls `record` only after an operation has
//! succeeded. Recording failures are logged and swallowed: the response has
//! already been earned by the time the audit entry is written, so a broken
//! audit store must never turn a success into a failure.

use serde_json::Value;
use tracing::warn;

use crate::db::{AuditEntry, Store};

pub const ACTION_CREATE_EMPLOYEE: &str = "CREATE_EMPLOYEE";
pub const ACTION_UPDATE_EMPLOYEE: &str = "UPDATE_EMPLOYEE";
pub const ACTION_DELETE_EMPLOYEE: &str = "DELETE_EMPLOYEE";

/// Who performed a request and where it came from. Threaded from the HTTP
/// layer into the lifecycle controller for attribution and audit.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub actor: Option<String>,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn for_actor(actor: &str) -> Self {
        Self {
            actor: Some(actor.to_string()),
            remote_addr: None,
            user_agent: None,
        }
    }
}

#[derive(Clone)]
pub struct AuditRecorder {
    store: Store,
}

impl AuditRecorder {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persist one audit entry. `payload` is included for create/update
    /// actions only; callers pass `None` otherwise.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        action: &str,
        target_id: Option<&str>,
        payload: Option<&Value>,
    ) {
        let entry = AuditEntry {
            recorded_at: chrono::Utc::now().to_rfc3339(),
            actor: ctx.actor.clone(),
            action: action.to_string(),
            target_id: target_id.map(str::to_string),
            payload: payload.map(Value::to_string),
            remote_addr: ctx.remote_addr.clone(),
            user_agent: ctx.user_agent.clone(),
        };

        if let Err(e) = self.store.record_audit(entry).await {
            warn!("Failed to record audit entry for {action}: {e:#}");
        }
    }
}
