//! Merge reports returned by the central node.

use serde::{Deserialize, Serialize};

/// Outcome of applying a batch on the central node.
///
/// `received == applied + skipped` for every merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Items in the batch.
    pub received: u64,
    /// Items that created or overwrote a central record.
    pub applied: u64,
    /// Items that lost the timestamp comparison (ties included).
    pub skipped: u64,
}

impl SyncReport {
    /// Creates a report.
    pub fn new(received: u64, applied: u64, skipped: u64) -> Self {
        Self {
            received,
            applied,
            skipped,
        }
    }

    /// The report for a push that had nothing to send.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_json, to_json};

    #[test]
    fn report_round_trip() {
        let report = SyncReport::new(3, 2, 1);
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"received\":3"));
        let back: SyncReport = from_json(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn empty_report_is_all_zero() {
        assert_eq!(SyncReport::empty(), SyncReport::new(0, 0, 0));
    }
}
