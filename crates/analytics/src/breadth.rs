use crate::stats::{ZeroDivisorPolicy, advance_decline_ratio, mean, share_pct};
use core_types::{CrossSectionSnapshot, SnapshotEntry};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreadthClassification {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
}

impl BreadthClassification {
    /// First match wins: `> 2` strong bullish, `> 1` bullish, `> 0.5` neutral.
    pub fn from_ratio(ad_ratio: Decimal) -> Self {
        if ad_ratio > dec!(2.0) {
            Self::StrongBullish
        } else if ad_ratio > dec!(1.0) {
            Self::Bullish
        } else if ad_ratio > dec!(0.5) {
            Self::Neutral
        } else {
            Self::Bearish
        }
    }
}

impl std::fmt::Display for BreadthClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::StrongBullish => "Strong Bullish",
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
            Self::Bearish => "Bearish",
        };
        f.write_str(label)
    }
}

/// Advance/decline statistics over one cross-sectional snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadthResult {
    pub advancing: usize,
    pub declining: usize,
    pub unchanged: usize,
    pub ad_ratio: Decimal,
    pub avg_change_pct: Decimal,
    pub classification: BreadthClassification,
    /// Advancing share of the whole basket.
    pub advancing_pct: Decimal,
    pub declining_pct: Decimal,
}

impl BreadthResult {
    pub fn total(&self) -> usize {
        self.advancing + self.declining + self.unchanged
    }
}

/// One row of a top-movers list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mover {
    pub instrument_id: String,
    pub price: Decimal,
    pub change_pct: Decimal,
    pub volume: u64,
}

impl Mover {
    fn from_entry(instrument_id: &str, entry: &SnapshotEntry) -> Self {
        Self {
            instrument_id: instrument_id.to_string(),
            price: entry.price,
            change_pct: entry.change_pct,
            volume: entry.volume,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopMovers {
    /// Highest change first.
    pub gainers: Vec<Mover>,
    /// Lowest change first.
    pub losers: Vec<Mover>,
}

/// Summary of a snapshot of sector indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorOverview {
    pub advancing_sectors: usize,
    pub declining_sectors: usize,
    pub total_sectors: usize,
    pub advancing_pct: Decimal,
    pub declining_pct: Decimal,
    pub avg_change_pct: Decimal,
    pub leader: String,
    pub leader_change_pct: Decimal,
}

/// Breadth of the constituents that share one sector label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorBreadth {
    pub sector_label: String,
    pub members: usize,
    pub advancing: usize,
    pub declining: usize,
    pub avg_change_pct: Decimal,
}

/// A stateless engine computing advance/decline breadth over a basket.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthEngine;

impl BreadthEngine {
    /// `None` for an empty snapshot.
    pub fn calculate(snapshot: &CrossSectionSnapshot) -> Option<BreadthResult> {
        if snapshot.is_empty() {
            tracing::debug!("Empty snapshot; no breadth result");
            return None;
        }

        let changes = snapshot.changes();
        let (advancing, declining, unchanged) = count_directions(&changes);
        let ad_ratio = advance_decline_ratio(advancing, declining, ZeroDivisorPolicy::AdvancingSentinel);

        Some(BreadthResult {
            advancing,
            declining,
            unchanged,
            ad_ratio,
            avg_change_pct: mean(&changes)?,
            classification: BreadthClassification::from_ratio(ad_ratio),
            advancing_pct: share_pct(advancing, changes.len()),
            declining_pct: share_pct(declining, changes.len()),
        })
    }

    /// The `n` best and `n` worst performers of the snapshot.
    ///
    /// Both lists are cut from a single ranking, so with fewer than `2n`
    /// entries an instrument can appear in both.
    pub fn top_movers(snapshot: &CrossSectionSnapshot, n: usize) -> TopMovers {
        let mut ranked: Vec<Mover> = snapshot
            .iter()
            .map(|(id, entry)| Mover::from_entry(id, entry))
            .collect();
        ranked.sort_by(|a, b| b.change_pct.cmp(&a.change_pct));

        let gainers = ranked.iter().take(n).cloned().collect();
        let losers = ranked.iter().rev().take(n).cloned().collect();
        TopMovers { gainers, losers }
    }

    /// Overview of a snapshot whose entries are sector indices. `None` when empty.
    pub fn sector_overview(sectors: &CrossSectionSnapshot) -> Option<SectorOverview> {
        let changes = sectors.changes();
        let (advancing, declining, _) = count_directions(&changes);
        let (leader, leader_entry) = sectors
            .iter()
            .rev()
            .max_by(|(_, a), (_, b)| a.change_pct.cmp(&b.change_pct))?;

        Some(SectorOverview {
            advancing_sectors: advancing,
            declining_sectors: declining,
            total_sectors: changes.len(),
            advancing_pct: share_pct(advancing, changes.len()),
            declining_pct: share_pct(declining, changes.len()),
            avg_change_pct: mean(&changes)?,
            leader: leader.clone(),
            leader_change_pct: leader_entry.change_pct,
        })
    }

    /// Groups constituents by their sector label, ordered by label.
    pub fn sector_breakdown(snapshot: &CrossSectionSnapshot) -> Vec<SectorBreadth> {
        let mut groups: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
        for (_, entry) in snapshot.iter() {
            groups
                .entry(entry.sector_label.as_str())
                .or_default()
                .push(entry.change_pct);
        }

        groups
            .into_iter()
            .filter_map(|(label, changes)| {
                let (advancing, declining, _) = count_directions(&changes);
                Some(SectorBreadth {
                    sector_label: label.to_string(),
                    members: changes.len(),
                    advancing,
                    declining,
                    avg_change_pct: mean(&changes)?,
                })
            })
            .collect()
    }
}

fn count_directions(changes: &[Decimal]) -> (usize, usize, usize) {
    changes.iter().fold((0, 0, 0), |(adv, dec, unch), c| {
        if *c > Decimal::ZERO {
            (adv + 1, dec, unch)
        } else if *c < Decimal::ZERO {
            (adv, dec + 1, unch)
        } else {
            (adv, dec, unch + 1)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(change: Decimal, sector: &str) -> SnapshotEntry {
        SnapshotEntry {
            price: dec!(100),
            change_pct: change,
            volume: 1_000,
            sector_label: sector.to_string(),
        }
    }

    fn basket(advancing: usize, declining: usize, unchanged: usize) -> CrossSectionSnapshot {
        let ups = (0..advancing).map(|i| (format!("UP{i:03}"), entry(dec!(1.5), "Banking")));
        let downs = (0..declining).map(|i| (format!("DN{i:03}"), entry(dec!(-0.5), "IT")));
        let flats = (0..unchanged).map(|i| (format!("FL{i:03}"), entry(dec!(0), "Energy")));
        ups.chain(downs).chain(flats).collect()
    }

    #[test]
    fn three_to_one_is_strong_bullish() {
        let result = BreadthEngine::calculate(&basket(30, 10, 10)).unwrap();

        assert_eq!((result.advancing, result.declining, result.unchanged), (30, 10, 10));
        assert_eq!(result.ad_ratio, dec!(3));
        assert_eq!(result.classification, BreadthClassification::StrongBullish);
        assert_eq!(result.advancing_pct, dec!(60));
        assert_eq!(result.total(), 50);
    }

    #[test]
    fn no_decliners_reports_advancing_count() {
        let result = BreadthEngine::calculate(&basket(20, 0, 30)).unwrap();

        assert_eq!(result.ad_ratio, dec!(20));
        assert_eq!(result.classification, BreadthClassification::StrongBullish);
    }

    #[test]
    fn classification_thresholds_are_exclusive() {
        assert_eq!(BreadthClassification::from_ratio(dec!(2)), BreadthClassification::Bullish);
        assert_eq!(BreadthClassification::from_ratio(dec!(1)), BreadthClassification::Neutral);
        assert_eq!(BreadthClassification::from_ratio(dec!(0.5)), BreadthClassification::Bearish);
        assert_eq!(BreadthClassification::from_ratio(dec!(0)), BreadthClassification::Bearish);
    }

    #[test]
    fn empty_snapshot_has_no_breadth() {
        let empty = CrossSectionSnapshot::new();
        assert_eq!(BreadthEngine::calculate(&empty), None);
        assert_eq!(BreadthEngine::sector_overview(&empty), None);
        assert_eq!(BreadthEngine::top_movers(&empty, 5), TopMovers::default());
    }

    #[test]
    fn top_movers_are_ranked_from_both_ends() {
        let snapshot: CrossSectionSnapshot = [
            ("A", dec!(4)),
            ("B", dec!(-2)),
            ("C", dec!(1)),
            ("D", dec!(-6)),
            ("E", dec!(0)),
        ]
        .into_iter()
        .map(|(id, c)| (id.to_string(), entry(c, "X")))
        .collect();

        let movers = BreadthEngine::top_movers(&snapshot, 2);
        let gainers: Vec<_> = movers.gainers.iter().map(|m| m.instrument_id.as_str()).collect();
        let losers: Vec<_> = movers.losers.iter().map(|m| m.instrument_id.as_str()).collect();

        assert_eq!(gainers, vec!["A", "C"]);
        assert_eq!(losers, vec!["D", "B"]);
    }

    #[test]
    fn sector_overview_names_the_leader() {
        let sectors: CrossSectionSnapshot = [("Auto", dec!(1.2)), ("Bank", dec!(-0.4)), ("IT", dec!(2.5))]
            .into_iter()
            .map(|(id, c)| (id.to_string(), entry(c, id)))
            .collect();

        let overview = BreadthEngine::sector_overview(&sectors).unwrap();
        assert_eq!(overview.advancing_sectors, 2);
        assert_eq!(overview.declining_sectors, 1);
        assert_eq!(overview.leader, "IT");
        assert_eq!(overview.avg_change_pct, dec!(1.1));
    }

    #[test]
    fn tied_sector_leader_is_the_first_label() {
        let sectors: CrossSectionSnapshot = [("Pharma", dec!(1.8)), ("Auto", dec!(1.8)), ("Metal", dec!(-0.2))]
            .into_iter()
            .map(|(id, c)| (id.to_string(), entry(c, id)))
            .collect();

        let overview = BreadthEngine::sector_overview(&sectors).unwrap();
        assert_eq!(overview.leader, "Auto");
        assert_eq!(overview.leader_change_pct, dec!(1.8));
    }

    #[test]
    fn breakdown_groups_by_sector_label() {
        let breakdown = BreadthEngine::sector_breakdown(&basket(2, 3, 1));
        let labels: Vec<_> = breakdown.iter().map(|s| s.sector_label.as_str()).collect();

        assert_eq!(labels, vec!["Banking", "Energy", "IT"]);
        assert_eq!(breakdown[2].declining, 3);
        assert_eq!(breakdown[2].avg_change_pct, dec!(-0.5));
    }
}
