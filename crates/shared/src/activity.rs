//! Activity-log collaborator interface.
//!
//! A fire-and-forget audit sink called after successful operations. Failures
//! in the sink must never roll back the operation that triggered them, so
//! callers log and discard errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OutletId, UserId};

/// One audit record describing a user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's display name.
    pub username: String,
    /// Action type, e.g. "CREATE", "REVERSE", "CLOSE".
    pub action_type: String,
    /// Module name, e.g. "ledger", "inventory", "closing".
    pub module: String,
    /// Human-readable description of what happened.
    pub description: String,
    /// The outlet scope.
    pub outlet_id: OutletId,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    /// Creates an event timestamped now.
    #[must_use]
    pub fn now(
        user_id: UserId,
        username: &str,
        action_type: &str,
        module: &str,
        description: String,
        outlet_id: OutletId,
    ) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            action_type: action_type.to_string(),
            module: module.to_string(),
            description,
            outlet_id,
            timestamp: Utc::now(),
        }
    }
}

/// Audit sink for activity records.
pub trait ActivityLog: Send + Sync {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns a message when the sink rejects the event; callers must treat
    /// this as non-fatal.
    fn record(&self, event: ActivityEvent) -> Result<(), String>;
}

/// Activity log that emits structured tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn record(&self, event: ActivityEvent) -> Result<(), String> {
        tracing::info!(
            user = %event.user_id,
            username = %event.username,
            action = %event.action_type,
            module = %event.module,
            outlet = %event.outlet_id,
            "{}",
            event.description
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_now_sets_fields() {
        let user = UserId::new();
        let outlet = OutletId::new();
        let event = ActivityEvent::now(
            user,
            "budi",
            "CREATE",
            "ledger",
            "Posted voucher PUR-202506-00001".to_string(),
            outlet,
        );
        assert_eq!(event.user_id, user);
        assert_eq!(event.outlet_id, outlet);
        assert_eq!(event.action_type, "CREATE");
        assert_eq!(event.module, "ledger");
    }

    #[test]
    fn test_tracing_log_accepts_events() {
        let log = TracingActivityLog;
        let event = ActivityEvent::now(
            UserId::new(),
            "budi",
            "CLOSE",
            "closing",
            "Closed day period".to_string(),
            OutletId::new(),
        );
        assert!(log.record(event).is_ok());
    }
}
