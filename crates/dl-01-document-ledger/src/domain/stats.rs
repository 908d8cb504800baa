//! # Ledger Statistics
//!
//! Status counts over a principal's visible scope.

use crate::domain::entities::{DocumentRecord, RecordStatus};
use crate::domain::value_objects::SequenceNumber;
use serde::{Deserialize, Serialize};

/// Aggregate counts shown by dashboards and the ledger viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total: u64,
    pub pending: u64,
    pub verified: u64,
    pub rejected: u64,
    /// Highest sequence number in scope (0 when nothing is visible).
    pub latest_sequence: SequenceNumber,
}

impl LedgerStats {
    pub fn record(&mut self, record: &DocumentRecord) {
        self.total += 1;
        match record.status {
            RecordStatus::Pending => self.pending += 1,
            RecordStatus::Verified => self.verified += 1,
            RecordStatus::Rejected => self.rejected += 1,
        }
        self.latest_sequence = self.latest_sequence.max(record.sequence_number);
    }

    pub fn reviewed(&self) -> u64 {
        self.verified + self.rejected
    }
}

impl<'a> FromIterator<&'a DocumentRecord> for LedgerStats {
    fn from_iter<I: IntoIterator<Item = &'a DocumentRecord>>(iter: I) -> Self {
        let mut stats = LedgerStats::default();
        for record in iter {
            stats.record(record);
        }
        stats
    }
}
