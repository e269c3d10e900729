use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest known state of a single target, as served to status readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetStatus {
    /// Whether the last probe reached the target
    pub online: bool,

    /// Wall-clock time from dispatch to response (or failure) in milliseconds
    pub latency_ms: u64,

    /// When the probe completed
    pub checked_at: DateTime<Utc>,
}

/// What a single probe observed, before the online/offline classification.
///
/// A server-error response and a transport failure both classify as offline,
/// but they are kept apart here so the log line can tell them apart.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// The HTTP exchange completed and the target answered with this status
    /// code.
    Responded { latency_ms: u64, status: u16 },

    /// The request never produced a response: DNS, connect, TLS or timeout
    /// failure, or a URL the client refused to dial. `latency_ms` is the
    /// elapsed time at which the error surfaced.
    Unreachable { latency_ms: u64, reason: String },
}

impl ProbeOutcome {
    /// Reachability rule: any completed exchange below 500 counts as online,
    /// including 4xx. Server errors and transport failures do not.
    pub fn online(&self) -> bool {
        matches!(self, ProbeOutcome::Responded { status, .. } if *status < 500)
    }

    pub fn latency_ms(&self) -> u64 {
        match self {
            ProbeOutcome::Responded { latency_ms, .. }
            | ProbeOutcome::Unreachable { latency_ms, .. } => *latency_ms,
        }
    }

    /// Fold the outcome into the cacheable status record.
    pub fn into_status(self, checked_at: DateTime<Utc>) -> TargetStatus {
        TargetStatus { online: self.online(), latency_ms: self.latency_ms(), checked_at }
    }
}
