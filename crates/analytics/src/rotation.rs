use crate::stats::{min_max, quantile_linear, rescale_to_percent};
use core_types::CrossSectionSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Relative momentum bucket of a sector within its peer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RotationTier {
    Hot,
    Warm,
    Cool,
    Cold,
}

impl RotationTier {
    /// First match wins. Anything that falls through the first three rules,
    /// including a gap left by skewed thresholds, lands in `Cold`.
    pub fn classify(change_pct: Decimal, strong: Decimal, weak: Decimal) -> Self {
        if change_pct >= strong {
            Self::Hot
        } else if change_pct > Decimal::ZERO {
            Self::Warm
        } else if change_pct > weak {
            Self::Cool
        } else {
            Self::Cold
        }
    }
}

impl std::fmt::Display for RotationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRotation {
    pub sector: String,
    pub change_pct: Decimal,
    /// Position of the change within the peer range, `[0, 100]`.
    pub strength_score: Decimal,
    pub tier: RotationTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationReport {
    /// 75th percentile of the changes.
    pub strong_threshold: Decimal,
    /// 25th percentile of the changes.
    pub weak_threshold: Decimal,
    /// Sorted by change, highest first.
    pub sectors: Vec<SectorRotation>,
}

impl RotationReport {
    pub fn in_tier(&self, tier: RotationTier) -> impl Iterator<Item = &SectorRotation> {
        self.sectors.iter().filter(move |s| s.tier == tier)
    }

    pub fn leaders(&self, n: usize) -> &[SectorRotation] {
        &self.sectors[..n.min(self.sectors.len())]
    }

    pub fn laggards(&self, n: usize) -> &[SectorRotation] {
        &self.sectors[self.sectors.len().saturating_sub(n)..]
    }
}

/// A stateless engine that tiers sectors by their change relative to each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotationEngine;

impl RotationEngine {
    /// `None` for an empty snapshot.
    pub fn classify(sectors: &CrossSectionSnapshot) -> Option<RotationReport> {
        let changes = sectors.changes();
        let strong_threshold = quantile_linear(&changes, dec!(0.75))?;
        let weak_threshold = quantile_linear(&changes, dec!(0.25))?;
        let (min, max) = min_max(&changes)?;

        let mut rows: Vec<SectorRotation> = sectors
            .iter()
            .map(|(sector, entry)| SectorRotation {
                sector: sector.clone(),
                change_pct: entry.change_pct,
                strength_score: rescale_to_percent(entry.change_pct, min, max),
                tier: RotationTier::classify(entry.change_pct, strong_threshold, weak_threshold),
            })
            .collect();
        rows.sort_by(|a, b| b.change_pct.cmp(&a.change_pct));

        tracing::debug!(
            sectors = rows.len(),
            %strong_threshold,
            %weak_threshold,
            "Classified sector rotation"
        );

        Some(RotationReport {
            strong_threshold,
            weak_threshold,
            sectors: rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SnapshotEntry;

    fn sectors(changes: &[(&str, Decimal)]) -> CrossSectionSnapshot {
        changes
            .iter()
            .map(|(name, change)| {
                (
                    name.to_string(),
                    SnapshotEntry {
                        price: dec!(100),
                        change_pct: *change,
                        volume: 0,
                        sector_label: name.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn symmetric_changes_split_into_all_tiers() {
        let snapshot = sectors(&[
            ("A", dec!(5)),
            ("B", dec!(3)),
            ("C", dec!(1)),
            ("D", dec!(-1)),
            ("E", dec!(-3)),
            ("F", dec!(-5)),
        ]);
        let report = RotationEngine::classify(&snapshot).unwrap();

        assert_eq!(report.strong_threshold, dec!(2.5));
        assert_eq!(report.weak_threshold, dec!(-2.5));

        let tiers: Vec<_> = report.sectors.iter().map(|s| (s.sector.as_str(), s.tier)).collect();
        assert_eq!(
            tiers,
            vec![
                ("A", RotationTier::Hot),
                ("B", RotationTier::Hot),
                ("C", RotationTier::Warm),
                ("D", RotationTier::Cool),
                ("E", RotationTier::Cold),
                ("F", RotationTier::Cold),
            ]
        );
        assert_eq!(report.sectors[0].strength_score, dec!(100));
        assert_eq!(report.sectors[5].strength_score, dec!(0));
        assert_eq!(report.sectors[2].strength_score, dec!(60));
    }

    #[test]
    fn identical_changes_score_zero() {
        let report = RotationEngine::classify(&sectors(&[("A", dec!(1)), ("B", dec!(1))])).unwrap();
        assert!(report.sectors.iter().all(|s| s.strength_score.is_zero()));
        assert!(report.sectors.iter().all(|s| s.tier == RotationTier::Hot));
    }

    #[test]
    fn skewed_thresholds_fall_through_to_cold() {
        // Every change is positive, so the weak threshold is above zero.
        let tier = RotationTier::classify(dec!(0), dec!(4), dec!(1));
        assert_eq!(tier, RotationTier::Cold);
    }

    #[test]
    fn empty_snapshot_has_no_report() {
        assert_eq!(RotationEngine::classify(&CrossSectionSnapshot::new()), None);
    }

    #[test]
    fn leaders_and_laggards_slice_the_ranking() {
        let report = RotationEngine::classify(&sectors(&[("A", dec!(2)), ("B", dec!(-1))])).unwrap();
        assert_eq!(report.leaders(3).len(), 2);
        assert_eq!(report.laggards(1)[0].sector, "B");
        assert_eq!(report.in_tier(RotationTier::Hot).count(), 1);
    }
}
