use chrono::{DateTime, Utc};
use grantline_core::SessionIdentity;
use grantline_domain::{AuditEventKind, EventStatus};

/// Fields for one audit event write.
#[derive(Debug, Clone)]
pub struct AuditEventDraft {
    /// Action category tag.
    pub kind: AuditEventKind,
    /// Primary object affected.
    pub object_name: String,
    /// Exact SQL text executed; empty for read-only views.
    pub sql_command: String,
    /// Outcome of the administrative statement.
    pub status: EventStatus,
    /// Free-text detail, empty by default.
    pub message: String,
    /// Acting principal; resolved from the session when absent.
    pub invoked_by: Option<SessionIdentity>,
}

impl AuditEventDraft {
    /// Creates a draft with an empty message and session-resolved identity.
    #[must_use]
    pub fn new(
        kind: AuditEventKind,
        object_name: impl Into<String>,
        sql_command: impl Into<String>,
        status: EventStatus,
    ) -> Self {
        Self {
            kind,
            object_name: object_name.into(),
            sql_command: sql_command.into(),
            status,
            message: String::new(),
            invoked_by: None,
        }
    }

    /// Sets the free-text detail.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Pins the acting principal instead of resolving it from the session.
    #[must_use]
    pub fn with_identity(mut self, identity: SessionIdentity) -> Self {
        self.invoked_by = Some(identity);
        self
    }
}

/// One stored audit trail row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Sequence-assigned event id, strictly increasing in write order.
    pub event_id: i64,
    /// Write time.
    pub event_time: DateTime<Utc>,
    /// Acting user.
    pub invoked_by_user: String,
    /// Acting role.
    pub invoked_by_role: String,
    /// Stored action tag; kept as text so retired tags still read back.
    pub event_type: String,
    /// Primary object affected.
    pub object_name: String,
    /// Exact SQL text executed.
    pub sql_command: String,
    /// Stored outcome value.
    pub status: String,
    /// Free-text detail.
    pub message: String,
}

/// Query parameters for the audit trail view.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    /// Inclusive lower bound on event time.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound on event time.
    pub end_time: Option<DateTime<Utc>>,
    /// Restrict to these action tags; empty means all.
    pub event_types: Vec<AuditEventKind>,
    /// Restrict to one object name.
    pub object_name: Option<String>,
    /// Maximum rows returned; clamped by the reader.
    pub limit: usize,
}

/// Outcome of a best-effort log write.
///
/// Logging is subordinate to the primary administrative action: none of
/// these variants is an error to the caller, but they stay distinguishable
/// so tests and operators can tell "logged" from "id burned, row missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// The row was persisted under the allocated id.
    Recorded {
        /// Allocated and persisted event id.
        event_id: i64,
    },
    /// No id could be allocated; nothing was written.
    AllocationFailed,
    /// An id was allocated but the insert failed. The id is consumed and
    /// will never be reused; the row does not exist.
    WriteFailed {
        /// Allocated, now-burned event id.
        event_id: i64,
    },
}

impl LogOutcome {
    /// Returns the allocated id, if allocation succeeded.
    #[must_use]
    pub fn event_id(&self) -> Option<i64> {
        match self {
            Self::Recorded { event_id } | Self::WriteFailed { event_id } => Some(*event_id),
            Self::AllocationFailed => None,
        }
    }

    /// Returns true when the row was actually persisted.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}
