use crate::rollup::ParseRecord;
use serde::{Deserialize, Serialize};

/// Parse run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Files found by the scanner
    pub discovered: usize,
    /// Files a worker picked up
    pub attempted: usize,
    pub ok: usize,
    pub failed: usize,
    /// Files never picked up because the run was cancelled
    pub skipped: usize,
    pub total_nodes: usize,
    pub cancelled: bool,
    pub time_ms: u64,
}

impl ParseStats {
    #[must_use]
    pub fn from_records(discovered: usize, records: &[ParseRecord]) -> Self {
        let ok = records.iter().filter(|r| r.ok).count();
        Self {
            discovered,
            attempted: records.len(),
            ok,
            failed: records.len() - ok,
            skipped: discovered.saturating_sub(records.len()),
            total_nodes: records.iter().filter_map(|r| r.node_count).sum(),
            cancelled: false,
            time_ms: 0,
        }
    }
}
