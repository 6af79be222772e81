//! Session performance
//!
//! Turns raw session times and positions into comparative scores. Times are
//! expressed as a gap to the session's best time and mapped onto a floored
//! linear scale, so one slow lap cannot sink a driver entirely.

use serde::{Deserialize, Serialize};

use crate::models::{DriverWeekendRecord, WeekendFormat};

/// Score for a driver (or a whole session) without a usable time
pub const NEUTRAL_SESSION_SCORE: f64 = 0.75;

/// Lowest score a timed driver can receive
pub const SESSION_SCORE_FLOOR: f64 = 0.7;

/// Score lost per second of gap in practice 1 / 2 and to pole
pub const GAP_SENSITIVITY: f64 = 0.4;

/// Score lost per second of gap in practice 3
pub const P3_GAP_SENSITIVITY: f64 = 0.5;

const SPRINT_SCORE_FLOOR: f64 = 0.6;
const SPRINT_SCORE_STEP: f64 = 0.03;

/// Score given on sprint weekends to drivers without a sprint result
pub const NO_SPRINT_RESULT_SCORE: f64 = 0.7;

/// Free practice sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreePractice {
    P1,
    P2,
    P3,
}

impl FreePractice {
    pub const ALL: [FreePractice; 3] = [Self::P1, Self::P2, Self::P3];

    pub fn index(self) -> usize {
        match self {
            Self::P1 => 0,
            Self::P2 => 1,
            Self::P3 => 2,
        }
    }

    /// Score lost per second of gap to the session best
    pub fn sensitivity(self) -> f64 {
        match self {
            Self::P1 | Self::P2 => GAP_SENSITIVITY,
            Self::P3 => P3_GAP_SENSITIVITY,
        }
    }

    /// Sessions that feed the score for a weekend format
    pub fn scored_in(format: WeekendFormat) -> &'static [FreePractice] {
        match format {
            WeekendFormat::Standard => &Self::ALL,
            WeekendFormat::Sprint => &[Self::P1],
        }
    }
}

/// Fastest valid time, if any
pub fn best_time<I: IntoIterator<Item = Option<f64>>>(times: I) -> Option<f64> {
    times
        .into_iter()
        .flatten()
        .filter(|t| t.is_finite())
        .fold(None, |best: Option<f64>, t| {
            Some(best.map_or(t, |b| b.min(t)))
        })
}

/// Gap of each time to the fastest, `None` where the time is missing
pub fn gaps_to_best(times: &[Option<f64>]) -> Vec<Option<f64>> {
    let best = best_time(times.iter().copied());
    times
        .iter()
        .map(|t| match (t, best) {
            (Some(t), Some(best)) if t.is_finite() => Some(t - best),
            _ => None,
        })
        .collect()
}

/// `max(0.7, 1 - gap * k)`
pub fn gap_score(gap: f64, sensitivity: f64) -> f64 {
    (1.0 - gap * sensitivity).max(SESSION_SCORE_FLOOR)
}

/// Per-driver scores for one session, neutral for untimed drivers
pub fn session_scores(times: &[Option<f64>], sensitivity: f64) -> Vec<f64> {
    gaps_to_best(times)
        .into_iter()
        .map(|gap| gap.map_or(NEUTRAL_SESSION_SCORE, |g| gap_score(g, sensitivity)))
        .collect()
}

/// `max(0.6, 1 - (pos - 1) * 0.03)`, 0.7 without a sprint result
pub fn sprint_position_score(position: Option<u32>) -> f64 {
    match position {
        Some(pos) => {
            let places_lost = f64::from(pos) - 1.0;
            (1.0 - places_lost * SPRINT_SCORE_STEP).max(SPRINT_SCORE_FLOOR)
        }
        None => NO_SPRINT_RESULT_SCORE,
    }
}

/// Fill session scores on merged records
pub struct SessionPerformance;

impl SessionPerformance {
    /// Score the practice sessions the format uses, plus the sprint result on
    /// sprint weekends. Gaps are measured within the merged driver set.
    pub fn apply(records: &mut [DriverWeekendRecord], format: WeekendFormat) {
        for &session in FreePractice::scored_in(format) {
            let times: Vec<Option<f64>> = records
                .iter()
                .map(|r| r.practice_times[session.index()])
                .collect();
            let scores = session_scores(&times, session.sensitivity());

            for (record, score) in records.iter_mut().zip(scores) {
                match session {
                    FreePractice::P1 => record.p1_score = Some(score),
                    FreePractice::P2 => record.p2_score = Some(score),
                    FreePractice::P3 => record.p3_score = Some(score),
                }
            }
        }

        if format.is_sprint() {
            for record in records.iter_mut() {
                record.sprint_position_score = Some(sprint_position_score(record.sprint_position));
            }
        }
    }
}
