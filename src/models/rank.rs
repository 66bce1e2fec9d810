// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Named rank tiers covering contiguous level ranges.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A named tier covering levels `[min_level, max_level)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct Rank {
    pub name: &'static str,
    /// Inclusive lower bound
    pub min_level: u32,
    /// Exclusive upper bound; `None` for the top tier
    pub max_level: Option<u32>,
}

impl Rank {
    const fn new(name: &'static str, min_level: u32, max_level: u32) -> Self {
        Self {
            name,
            min_level,
            max_level: Some(max_level),
        }
    }

    /// Whether `level` falls inside this rank's interval.
    pub fn contains(&self, level: u32) -> bool {
        level >= self.min_level && self.max_level.map_or(true, |max| level < max)
    }
}

/// All ranks, ascending, tiling `[1, ∞)` without gaps or overlaps.
pub static RANKS: &[Rank] = &[
    Rank::new("E Rank", 1, 20),
    Rank::new("D Rank", 20, 40),
    Rank::new("C Rank", 40, 60),
    Rank::new("B Rank", 60, 80),
    Rank::new("A Rank", 80, 120),
    Rank::new("S Rank", 120, 200),
    Rank::new("National Level", 200, 300),
    Rank::new("Mid Tier Monarch", 300, 400),
    Rank::new("Yogumunt", 400, 500),
    Rank::new("Architect", 500, 650),
    Rank::new("Amtares", 650, 800),
    Rank::new("Ashborn", 800, 1500),
    Rank {
        name: "Sung Jinwo",
        min_level: 1500,
        max_level: None,
    },
];

/// Rank for a level.
///
/// # Panics
/// If `level` is 0. Levels start at 1 and the table covers every level above.
pub fn rank_for_level(level: u32) -> &'static Rank {
    assert!(level >= 1, "levels start at 1, got {level}");
    RANKS
        .iter()
        .find(|rank| rank.contains(level))
        .unwrap_or_else(|| panic!("rank table does not cover level {level}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_tiles_levels_without_gaps() {
        assert_eq!(RANKS[0].min_level, 1);
        for pair in RANKS.windows(2) {
            assert_eq!(
                pair[0].max_level,
                Some(pair[1].min_level),
                "{} must end where {} begins",
                pair[0].name,
                pair[1].name
            );
        }
        assert_eq!(RANKS.last().unwrap().max_level, None);
    }

    #[test]
    fn test_every_level_has_exactly_one_rank() {
        for level in 1..=3000 {
            let matches = RANKS.iter().filter(|r| r.contains(level)).count();
            assert_eq!(matches, 1, "level {level}");
        }
    }

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(rank_for_level(1).name, "E Rank");
        assert_eq!(rank_for_level(19).name, "E Rank");
        assert_eq!(rank_for_level(20).name, "D Rank");
        assert_eq!(rank_for_level(199).name, "S Rank");
        assert_eq!(rank_for_level(200).name, "National Level");
        assert_eq!(rank_for_level(1499).name, "Ashborn");
        assert_eq!(rank_for_level(1500).name, "Sung Jinwo");
        assert_eq!(rank_for_level(u32::MAX).name, "Sung Jinwo");
    }

    #[test]
    #[should_panic(expected = "levels start at 1")]
    fn test_level_zero_is_a_programming_error() {
        rank_for_level(0);
    }
}
