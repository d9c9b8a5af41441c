use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use crate::entities::{audit_log, prelude::*};

/// One audit entry, ready to persist.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub recorded_at: String,
    pub actor: Option<String>,
    pub action: String,
    pub target_id: Option<String>,
    pub payload: Option<String>,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

pub struct AuditRepository {
    conn: DatabaseConnection,
}

impl AuditRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(&self, entry: AuditEntry) -> Result<()> {
        let active = audit_log::ActiveModel {
            recorded_at: Set(entry.recorded_at),
            actor: Set(entry.actor),
            action: Set(entry.action),
            target_id: Set(entry.target_id),
            payload: Set(entry.payload),
            remote_addr: Set(entry.remote_addr),
            user_agent: Set(entry.user_agent),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert audit entry")?;
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<audit_log::Model>> {
        AuditLog::find()
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query audit entries")
    }
}
