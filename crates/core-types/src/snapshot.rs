use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};

/// The latest observation for one constituent of a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub price: Decimal,
    pub change_pct: Decimal,
    pub volume: u64,
    pub sector_label: String,
}

/// "Now" for a basket of instruments, keyed by instrument identifier.
///
/// Backed by a `BTreeMap` so iteration order, and therefore every result built
/// from a snapshot, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossSectionSnapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl CrossSectionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `instrument_id`.
    pub fn insert(&mut self, instrument_id: impl Into<String>, entry: SnapshotEntry) {
        self.entries.insert(instrument_id.into(), entry);
    }

    pub fn get(&self, instrument_id: &str) -> Option<&SnapshotEntry> {
        self.entries.get(instrument_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in instrument-id order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, SnapshotEntry> {
        self.entries.iter()
    }

    pub fn changes(&self) -> Vec<Decimal> {
        self.entries.values().map(|e| e.change_pct).collect()
    }
}

impl FromIterator<(String, SnapshotEntry)> for CrossSectionSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, SnapshotEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, SnapshotEntry)> for CrossSectionSnapshot {
    fn extend<I: IntoIterator<Item = (String, SnapshotEntry)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(change: Decimal) -> SnapshotEntry {
        SnapshotEntry {
            price: dec!(100),
            change_pct: change,
            volume: 1_000,
            sector_label: "Bank".to_string(),
        }
    }

    #[test]
    fn iterates_in_id_order_both_ways() {
        let snapshot: CrossSectionSnapshot = [
            ("SBIN".to_string(), entry(dec!(0.5))),
            ("AXISBANK".to_string(), entry(dec!(-1.0))),
            ("HDFCBANK".to_string(), entry(dec!(1.5))),
        ]
        .into_iter()
        .collect();

        let forward: Vec<&str> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(forward, vec!["AXISBANK", "HDFCBANK", "SBIN"]);

        let backward: Vec<&str> = snapshot.iter().rev().map(|(id, _)| id.as_str()).collect();
        assert_eq!(backward, vec!["SBIN", "HDFCBANK", "AXISBANK"]);
        assert_eq!(snapshot.iter().len(), 3);
    }

    #[test]
    fn extend_replaces_existing_ids() {
        let mut snapshot = CrossSectionSnapshot::new();
        snapshot.insert("SBIN", entry(dec!(0.5)));
        snapshot.extend([("SBIN".to_string(), entry(dec!(2.0))), ("ITC".to_string(), entry(dec!(0.0)))]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("SBIN").map(|e| e.change_pct), Some(dec!(2.0)));
        assert_eq!(snapshot.changes(), vec![dec!(0.0), dec!(2.0)]);
    }
}
