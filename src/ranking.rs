//! Ranking and podium extraction

use crate::models::{DriverWeekendRecord, PodiumEntry};

/// Number of predicted finishers
pub const PODIUM_SIZE: usize = 3;

/// Sort records by composite score, highest first.
///
/// The sort is stable, so drivers with equal scores keep their qualifying
/// order.
pub fn rank(mut records: Vec<DriverWeekendRecord>) -> Vec<DriverWeekendRecord> {
    records.sort_by(|a, b| b.score_value().total_cmp(&a.score_value()));
    records
}

/// Grid position minus predicted position, saturated to the `i32` range
pub fn places_gained(grid_position: u32, predicted_position: u32) -> i32 {
    let change = i64::from(grid_position) - i64::from(predicted_position);
    i32::try_from(change).unwrap_or(if change > 0 { i32::MAX } else { i32::MIN })
}

/// Top finishers with predicted positions and places gained from the grid
pub fn podium(records: Vec<DriverWeekendRecord>) -> Vec<PodiumEntry> {
    rank(records)
        .into_iter()
        .take(PODIUM_SIZE)
        .zip(1u32..)
        .map(|(record, predicted_position)| PodiumEntry {
            predicted_position,
            position_change: places_gained(record.grid_position, predicted_position),
            score: record.score_value(),
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverIdentity, RaceScore, ScoreBreakdown};

    fn scored(name: &str, grid: u32, score: f64) -> DriverWeekendRecord {
        let mut record = DriverWeekendRecord::new(
            DriverIdentity {
                name: name.to_string(),
                code: None,
            },
            "Unknown".to_string(),
            grid,
        );
        record.race_score = Some(RaceScore::Computed(ScoreBreakdown {
            terms: Vec::new(),
            score,
        }));
        record
    }

    fn names(records: &[DriverWeekendRecord]) -> Vec<&str> {
        records.iter().map(|r| r.driver.name.as_str()).collect()
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(vec![
            scored("A", 1, 0.80),
            scored("B", 2, 0.95),
            scored("C", 3, 0.85),
        ]);
        assert_eq!(names(&ranked), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let ranked = rank(vec![
            scored("A", 1, 0.9),
            scored("B", 2, 0.9),
            scored("C", 3, 0.95),
            scored("D", 4, 0.9),
        ]);
        assert_eq!(names(&ranked), vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_degraded_and_unscored_rank_last() {
        let mut degraded = scored("X", 1, 0.0);
        degraded.race_score = Some(RaceScore::Degraded {
            reason: "bad data".to_string(),
        });
        let mut unscored = scored("Y", 2, 0.0);
        unscored.race_score = None;

        let ranked = rank(vec![degraded, unscored, scored("Z", 3, 0.5)]);
        assert_eq!(names(&ranked), vec!["Z", "X", "Y"]);
    }

    #[test]
    fn test_podium_positions_and_changes() {
        let entries = podium(vec![
            scored("A", 1, 0.80),
            scored("B", 5, 0.95),
            scored("C", 2, 0.85),
            scored("D", 3, 0.70),
        ]);

        assert_eq!(entries.len(), PODIUM_SIZE);
        let summary: Vec<(&str, u32, i32)> = entries
            .iter()
            .map(|e| (e.record.driver.name.as_str(), e.predicted_position, e.position_change))
            .collect();
        assert_eq!(summary, vec![("B", 1, 4), ("C", 2, 0), ("A", 3, -2)]);
    }

    #[test]
    fn test_places_gained_saturates() {
        assert_eq!(places_gained(5, 1), 4);
        assert_eq!(places_gained(1, 3), -2);
        assert_eq!(places_gained(3_000_000_000, 1), i32::MAX);
        assert_eq!(places_gained(u32::MAX, 2), i32::MAX);
    }

    #[test]
    fn test_podium_with_huge_grid_position() {
        use crate::data::parser::parse_position;

        let grid = parse_position("3000000000");
        assert_eq!(grid, 3_000_000_000);
        let entries = podium(vec![scored("A", grid, 0.9)]);
        assert_eq!(entries[0].position_change, i32::MAX);
    }

    #[test]
    fn test_podium_with_fewer_drivers() {
        let entries = podium(vec![scored("A", 1, 0.5), scored("B", 2, 0.6)]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].record.driver.name, "B");
        assert_eq!(entries[0].position_change, 1);
    }
}
