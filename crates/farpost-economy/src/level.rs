//! Level curve and cell allowance.
//!
//! Both functions are pure and monotone: more experience never yields a
//! lower level, and a higher level never yields a smaller allowance.

use std::collections::BTreeMap;

/// The level reached with `xp` cumulative experience.
///
/// The level is the highest 1-based position whose threshold `xp` meets.
/// Crossing several thresholds at once lands on the final level directly.
pub fn level_for_xp(thresholds: &[u64], xp: u64) -> u32 {
    let reached = thresholds.iter().take_while(|t| xp >= **t).count();
    u32::try_from(reached).unwrap_or(u32::MAX).max(1)
}

/// Ownable cells at `level`: the largest unlock whose required level is at
/// or below `level`, or `default` when none applies.
pub fn max_cells_for_level(unlocks: &BTreeMap<u32, u32>, default: u32, level: u32) -> u32 {
    unlocks
        .range(..=level)
        .map(|(_, cells)| *cells)
        .max()
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: [u64; 11] = [
        0, 300, 1200, 2200, 3500, 5200, 7300, 9800, 12800, 16400, 20600,
    ];

    fn unlocks() -> BTreeMap<u32, u32> {
        [(1, 3), (2, 4), (3, 5), (10, 8), (15, 12)]
            .into_iter()
            .collect()
    }

    #[test]
    fn zero_xp_is_level_one() {
        assert_eq!(level_for_xp(&THRESHOLDS, 0), 1);
    }

    #[test]
    fn exact_threshold_reaches_level() {
        assert_eq!(level_for_xp(&THRESHOLDS, 299), 1);
        assert_eq!(level_for_xp(&THRESHOLDS, 300), 2);
    }

    #[test]
    fn large_grant_cascades() {
        assert_eq!(level_for_xp(&THRESHOLDS, 2500), 4);
        assert_eq!(level_for_xp(&THRESHOLDS, u64::MAX), 11);
    }

    #[test]
    fn empty_curve_stays_at_one() {
        assert_eq!(level_for_xp(&[], 5000), 1);
    }

    #[test]
    fn allowance_uses_highest_reached_unlock() {
        let table = unlocks();
        assert_eq!(max_cells_for_level(&table, 3, 1), 3);
        assert_eq!(max_cells_for_level(&table, 3, 3), 5);
        assert_eq!(max_cells_for_level(&table, 3, 9), 5);
        assert_eq!(max_cells_for_level(&table, 3, 10), 8);
    }

    #[test]
    fn allowance_defaults_without_unlocks() {
        assert_eq!(max_cells_for_level(&BTreeMap::new(), 3, 40), 3);
    }
}
