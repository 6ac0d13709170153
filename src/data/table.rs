//! Snapshot to table transformation.
//!
//! Pure functions only: the same snapshot always renders the same rows.

use serde::Serialize;

use super::rtt::{classify, Token};
use crate::source::{Rtt, Snapshot, TargetState};

/// Shown in the Last Success column when a target has never answered.
pub const NO_TIMESTAMP: &str = "--:--:--";

/// Shown in the RTT column when a target has no samples yet.
pub const NO_SAMPLE_LABEL: &str = "-";

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub name: String,
    pub address: String,
    pub last_success: String,
    pub latest_label: String,
    /// Tokens ordered newest first.
    pub history_tokens: Vec<Token>,
    /// Most recent raw sample, kept for sorting and counts.
    #[serde(skip)]
    pub latest: Option<Rtt>,
}

impl RowView {
    /// Whether the most recent check succeeded.
    pub fn is_up(&self) -> bool {
        matches!(self.latest, Some(Rtt::Millis(_)))
    }

    /// Whether the most recent check failed.
    pub fn is_down(&self) -> bool {
        matches!(self.latest, Some(Rtt::Unreachable))
    }

    /// History glyphs as plain text, newest first.
    pub fn history_glyphs(&self) -> String {
        self.history_tokens.iter().map(|t| t.symbol.as_char()).collect()
    }
}

/// Render one target into a row.
pub fn render_row(address: &str, target: &TargetState) -> RowView {
    let latest = target.latest();
    RowView {
        name: target.name.clone(),
        address: address.to_string(),
        last_success: target
            .last_success
            .as_ref()
            .map(|ts| ts.display())
            .unwrap_or_else(|| NO_TIMESTAMP.to_string()),
        latest_label: latest
            .map(|rtt| rtt.to_string())
            .unwrap_or_else(|| NO_SAMPLE_LABEL.to_string()),
        history_tokens: target.history.iter().rev().map(|&rtt| classify(rtt)).collect(),
        latest,
    }
}

/// Render every target, ordered by address.
pub fn render_table(snapshot: &Snapshot) -> Vec<RowView> {
    // BTreeMap iterates in key order
    snapshot
        .iter()
        .map(|(address, target)| render_row(address, target))
        .collect()
}

/// Up/down counts across a rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// Targets with no samples yet.
    pub pending: usize,
}

impl TableSummary {
    pub fn from_rows(rows: &[RowView]) -> Self {
        let mut summary = TableSummary {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.latest {
                Some(Rtt::Millis(_)) => summary.up += 1,
                Some(Rtt::Unreachable) => summary.down += 1,
                None => summary.pending += 1,
            }
        }
        summary
    }
}

/// Aggregates over one target's history, used by the detail overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistoryStats {
    pub samples: usize,
    pub lost: usize,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub avg: Option<f64>,
}

impl HistoryStats {
    pub fn from_history(history: &[Rtt]) -> Self {
        let reachable: Vec<u64> = history.iter().filter_map(|rtt| rtt.millis()).collect();
        let avg = if reachable.is_empty() {
            None
        } else {
            let sum: u128 = reachable.iter().map(|&ms| u128::from(ms)).sum();
            Some(sum as f64 / reachable.len() as f64)
        };
        Self {
            samples: history.len(),
            lost: history.len() - reachable.len(),
            min: reachable.iter().copied().min(),
            max: reachable.iter().copied().max(),
            avg,
        }
    }

    /// Share of failed samples, `0.0..=100.0`.
    pub fn loss_percent(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.lost as f64 * 100.0 / self.samples as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{decode_snapshot, Timestamp};

    fn target(name: &str, history: &[i64]) -> TargetState {
        TargetState {
            name: name.to_string(),
            last_success: Some(Timestamp::Text("t0".to_string())),
            history: history.iter().map(|&raw| Rtt::from_raw(raw).unwrap()).collect(),
            last_update: None,
        }
    }

    #[test]
    fn test_history_is_newest_first() {
        let row = render_row("10.0.0.2", &target("sw", &[10, -1, 55]));
        assert_eq!(
            row.history_tokens,
            vec![
                classify(Rtt::Millis(55)),
                classify(Rtt::Unreachable),
                classify(Rtt::Millis(10)),
            ]
        );
        assert_eq!(row.history_glyphs(), "▃×▁");
    }

    #[test]
    fn test_latest_label() {
        assert_eq!(render_row("a", &target("n", &[5, 12])).latest_label, "12ms");
        assert_eq!(render_row("a", &target("n", &[5, -1])).latest_label, "×");
        assert_eq!(render_row("a", &target("n", &[])).latest_label, NO_SAMPLE_LABEL);
    }

    #[test]
    fn test_last_success_placeholder() {
        let mut state = target("n", &[-1]);
        state.last_success = None;
        let row = render_row("a", &state);
        assert_eq!(row.last_success, NO_TIMESTAMP);
        assert!(row.is_down());
    }

    #[test]
    fn test_end_to_end_row() {
        let json = r#"{"10.0.0.1": {"name":"router","last_success":"t0","history":[5,8,-1,12]}}"#;
        let snapshot = decode_snapshot(json.as_bytes()).unwrap();
        let rows = render_table(&snapshot);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "router");
        assert_eq!(row.address, "10.0.0.1");
        assert_eq!(row.last_success, "t0");
        assert_eq!(row.latest_label, "12ms");
        assert_eq!(
            row.history_tokens,
            vec![
                classify(Rtt::Millis(12)),
                classify(Rtt::Unreachable),
                classify(Rtt::Millis(8)),
                classify(Rtt::Millis(5)),
            ]
        );
    }

    #[test]
    fn test_render_table_is_sorted_and_idempotent() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("192.168.1.1".to_string(), target("gw", &[3]));
        snapshot.insert("10.0.0.1".to_string(), target("core", &[120]));
        snapshot.insert("172.16.0.1".to_string(), target("dmz", &[-1]));

        let first = render_table(&snapshot);
        let second = render_table(&snapshot);
        assert_eq!(first, second);

        let addresses: Vec<&str> = first.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["10.0.0.1", "172.16.0.1", "192.168.1.1"]);
    }

    #[test]
    fn test_empty_snapshot_renders_empty_table() {
        assert!(render_table(&Snapshot::new()).is_empty());
        assert_eq!(TableSummary::from_rows(&[]), TableSummary::default());
    }

    #[test]
    fn test_table_summary() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("a".to_string(), target("a", &[3]));
        snapshot.insert("b".to_string(), target("b", &[3, -1]));
        snapshot.insert("c".to_string(), target("c", &[]));
        snapshot.insert("d".to_string(), target("d", &[-1, 40]));

        let summary = TableSummary::from_rows(&render_table(&snapshot));
        assert_eq!(
            summary,
            TableSummary {
                total: 4,
                up: 2,
                down: 1,
                pending: 1,
            }
        );
    }

    #[test]
    fn test_history_stats() {
        let stats = HistoryStats::from_history(&target("n", &[10, -1, 30, -1]).history);
        assert_eq!(stats.samples, 4);
        assert_eq!(stats.lost, 2);
        assert_eq!(stats.min, Some(10));
        assert_eq!(stats.max, Some(30));
        assert_eq!(stats.avg, Some(20.0));
        assert_eq!(stats.loss_percent(), 50.0);

        let empty = HistoryStats::from_history(&[]);
        assert_eq!(empty.avg, None);
        assert_eq!(empty.loss_percent(), 0.0);
    }
}
