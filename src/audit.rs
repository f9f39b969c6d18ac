use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::audit_logs;

/// Append an audit record. A failed insert is logged and swallowed so the
/// mutation that triggered it still succeeds.
pub async fn log_audit<C>(
    conn: &C,
    user_id: Option<Uuid>,
    action: &str,
    resource: Option<String>,
    metadata: Option<Value>,
) where
    C: ConnectionTrait,
{
    let entry = audit_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        action: Set(action.to_string()),
        resource: Set(resource),
        metadata: Set(metadata.unwrap_or_else(|| Value::Object(Default::default()))),
        created_at: Set(Utc::now().into()),
    };

    if let Err(err) = entry.insert(conn).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
