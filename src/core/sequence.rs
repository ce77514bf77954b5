use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one in-flight ranking call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankTicket(u64);

impl RankTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Orders concurrent ranking calls so stale results can be dropped
///
/// A completed call is accepted only if no call issued after it has already
/// been accepted.
#[derive(Debug, Default)]
pub struct RankSequencer {
    issued: AtomicU64,
    accepted: AtomicU64,
}

impl RankSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket before starting a call
    pub fn issue(&self) -> RankTicket {
        RankTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Record a completion; returns false when the result is stale
    pub fn complete(&self, ticket: RankTicket) -> bool {
        let previous = self.accepted.fetch_max(ticket.0, Ordering::SeqCst);
        previous < ticket.0
    }

    /// Sequence number of the newest accepted result
    pub fn latest_accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }
}
