//! Race score engine
//!
//! Each driver's composite score is a weighted mean of factor values. Weights
//! shift with the track's overtaking difficulty (OD) and tire degradation (TD),
//! both scaled to 0-1, and with the rain probability R. Wet-weather terms only
//! join the mean when R > 0, so a dry forecast reproduces the dry model
//! exactly. Standard and sprint weekends use different factor sets.

use thiserror::Error;
use tracing::{debug, warn};

use crate::data::features::NEUTRAL_SESSION_SCORE;
use crate::models::{
    DriverWeekendRecord, Factor, FactorTerm, RaceScore, ScoreBreakdown, TrackProfile,
    WeekendFormat,
};

/// Decay of the starting position factor per grid place
const POSITION_DECAY: f64 = 0.15;

/// Reasons a driver's score cannot be computed
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("{} has non-finite weight {weight} or value {value}", factor.label())]
    NonFinite {
        factor: Factor,
        weight: f64,
        value: f64,
    },

    #[error("total factor weight {0} is not positive")]
    NoWeight(f64),
}

/// Track and weather inputs shared by every driver in a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceConditions {
    /// Overtaking difficulty / 10
    pub overtaking: f64,
    /// Tire degradation / 10
    pub degradation: f64,
    /// Rain probability in [0, 1]
    pub rain: f64,
    pub format: WeekendFormat,
}

impl RaceConditions {
    pub fn new(track: &TrackProfile, rain_probability: f64) -> Self {
        Self {
            overtaking: track.overtaking_factor(),
            degradation: track.degradation_factor(),
            rain: rain_probability,
            format: track.format(),
        }
    }

    pub fn is_wet(&self) -> bool {
        self.rain > 0.0
    }
}

/// `exp(-0.15 * (pos - 1))`
pub fn position_factor(grid_position: u32) -> f64 {
    (-POSITION_DECAY * (f64::from(grid_position) - 1.0)).exp()
}

/// `1.0` without a pole gap, else `max(0.7, 1 - 0.5 * gap)`
pub fn qualifying_factor(gap_to_pole: Option<f64>) -> f64 {
    match gap_to_pole {
        Some(gap) => (1.0 - gap * 0.5).max(0.7),
        None => 1.0,
    }
}

/// Weighted-mean scorer for one race
#[derive(Debug, Clone, Copy)]
pub struct RaceScorer {
    conditions: RaceConditions,
}

impl RaceScorer {
    pub fn new(conditions: RaceConditions) -> Self {
        Self { conditions }
    }

    pub fn for_track(track: &TrackProfile, rain_probability: f64) -> Self {
        Self::new(RaceConditions::new(track, rain_probability))
    }

    pub fn conditions(&self) -> &RaceConditions {
        &self.conditions
    }

    /// Active (weight, value) terms for a driver
    pub fn factors(&self, record: &DriverWeekendRecord) -> Vec<FactorTerm> {
        let RaceConditions {
            overtaking: od,
            degradation: td,
            rain: r,
            format,
        } = self.conditions;
        let team = &record.team_traits;
        let driver = &record.driver_traits;

        let grid = record.grid_position;

        let term = |factor, weight, value| FactorTerm {
            factor,
            weight,
            value,
        };

        let mut terms = Vec::with_capacity(10);
        match format {
            WeekendFormat::Standard => {
                terms.push(term(
                    Factor::StartingPosition,
                    (0.30 + 0.05 * od) * (1.0 - 0.3 * r),
                    position_factor(grid),
                ));
                terms.push(term(
                    Factor::QualifyingPace,
                    (0.15 - 0.05 * od) * (1.0 - 0.3 * r),
                    qualifying_factor(record.gap_to_pole),
                ));
                terms.push(term(
                    Factor::Practice2,
                    (0.25 + 0.05 * td) * (1.0 - 0.4 * r),
                    record.p2_score.unwrap_or(NEUTRAL_SESSION_SCORE),
                ));
                terms.push(term(
                    Factor::Practice3,
                    0.10 * (1.0 - 0.4 * r),
                    record.p3_score.unwrap_or(NEUTRAL_SESSION_SCORE),
                ));
                terms.push(term(
                    Factor::TeamRacePace,
                    0.10 * (1.0 - 0.2 * r),
                    team.race_pace_factor,
                ));
                terms.push(term(
                    Factor::TireManagement,
                    (0.10 + 0.05 * td) * (1.0 + 0.2 * r),
                    team.tire_mgmt / 10.0,
                ));
                terms.push(term(
                    Factor::DriverExperience,
                    (0.10 + 0.02 * td) * (1.0 + 0.3 * r),
                    driver.experience,
                ));
            }
            WeekendFormat::Sprint => {
                terms.push(term(
                    Factor::StartingPosition,
                    (0.25 + 0.05 * od) * (1.0 - 0.3 * r),
                    position_factor(grid),
                ));
                terms.push(term(
                    Factor::QualifyingPace,
                    (0.15 - 0.05 * od) * (1.0 - 0.3 * r),
                    qualifying_factor(record.gap_to_pole),
                ));
                terms.push(term(
                    Factor::SprintRace,
                    0.20 * (1.0 - 0.2 * r),
                    record.sprint_position_score.unwrap_or(NEUTRAL_SESSION_SCORE),
                ));
                terms.push(term(
                    Factor::Practice1,
                    0.10 * (1.0 - 0.4 * r),
                    record.p1_score.unwrap_or(NEUTRAL_SESSION_SCORE),
                ));
                terms.push(term(
                    Factor::TeamRacePace,
                    0.10 * (1.0 - 0.2 * r),
                    team.race_pace_factor,
                ));
                terms.push(term(
                    Factor::TireManagement,
                    (0.10 + 0.05 * td) * (1.0 + 0.2 * r),
                    team.tire_mgmt / 10.0,
                ));
                terms.push(term(
                    Factor::DriverSprintAbility,
                    0.15 * (1.0 + 0.1 * r),
                    driver.sprint_performance / 10.0,
                ));
                terms.push(term(
                    Factor::TeamSprintSetup,
                    0.05,
                    team.sprint_performance / 10.0,
                ));
            }
        }

        if self.conditions.is_wet() {
            terms.push(term(
                Factor::DriverWetSkill,
                0.35 * r,
                driver.wet_performance / 10.0,
            ));
            terms.push(term(
                Factor::TeamWetPerformance,
                0.25 * r,
                team.wet_performance / 10.0,
            ));
        }

        terms
    }

    /// Weighted mean of the active terms
    pub fn try_score(
        &self,
        record: &DriverWeekendRecord,
    ) -> std::result::Result<ScoreBreakdown, ScoringError> {
        let terms = self.factors(record);

        if let Some(bad) = terms
            .iter()
            .find(|t| !t.weight.is_finite() || !t.value.is_finite())
        {
            return Err(ScoringError::NonFinite {
                factor: bad.factor,
                weight: bad.weight,
                value: bad.value,
            });
        }

        let total_weight: f64 = terms.iter().map(|t| t.weight).sum();
        if total_weight <= 0.0 {
            return Err(ScoringError::NoWeight(total_weight));
        }

        let weighted: f64 = terms.iter().map(FactorTerm::contribution).sum();
        Ok(ScoreBreakdown {
            terms,
            score: weighted / total_weight,
        })
    }

    /// Score a driver, degrading to the sentinel score on failure
    pub fn score(&self, record: &DriverWeekendRecord) -> RaceScore {
        match self.try_score(record) {
            Ok(breakdown) => {
                debug!("{}: race score {:.4}", record.driver, breakdown.score);
                RaceScore::Computed(breakdown)
            }
            Err(e) => {
                warn!("Error calculating race score for {}: {}", record.driver, e);
                RaceScore::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Score every record in place; returns how many were degraded
    pub fn score_all(&self, records: &mut [DriverWeekendRecord]) -> usize {
        let mut degraded = 0;
        for record in records.iter_mut() {
            let score = self.score(record);
            if score.is_degraded() {
                degraded += 1;
            }
            record.race_score = Some(score);
        }
        degraded
    }
}
