use serde::{Deserialize, Serialize};
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::data::identity::IdentityNormalizer;
use crate::data::merge::{merge_weekend, WeekendRecords, WeekendSessions};
use crate::data::sessions::{
    PracticeSession, QualifyingSession, SprintQualifyingSession, SprintSession,
};
use crate::data::table::SessionTable;
use crate::error::Result;
use crate::metrics::estimate_accuracy;
use crate::models::{PredictionResult, TrackProfile, WeatherOutlook, WeekendFormat};
use crate::ranking::podium;
use crate::reference::ReferenceData;
use crate::scoring::RaceScorer;

/// Run parameters chosen by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceWeekend {
    pub race: String,
    /// 0.0 - 1.0
    pub rain_probability: f64,
}

/// Session export files for one weekend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendFiles {
    pub qualifying: PathBuf,
    pub practice: PathBuf,
    pub sprint: Option<PathBuf>,
    pub sprint_qualifying: Option<PathBuf>,
}

impl WeekendFiles {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(qualifying: P, practice: Q) -> Self {
        Self {
            qualifying: qualifying.into(),
            practice: practice.into(),
            sprint: None,
            sprint_qualifying: None,
        }
    }

    pub fn with_sprint<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.sprint = Some(path.into());
        self
    }

    pub fn with_sprint_qualifying<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.sprint_qualifying = Some(path.into());
        self
    }
}

fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        warn!("Rain probability is NaN, assuming dry");
        return 0.0;
    }
    probability.clamp(0.0, 1.0)
}

/// Top-3 predictor for a single race weekend
#[derive(Debug, Clone)]
pub struct PodiumPredictor<'r> {
    reference: &'r ReferenceData,
    track: TrackProfile,
    rain_probability: f64,
}

impl<'r> PodiumPredictor<'r> {
    /// Unknown races fall back to the default track; rain is clamped to [0, 1]
    pub fn new(reference: &'r ReferenceData, race: &str, rain_probability: f64) -> Self {
        let mut predictor = Self {
            reference,
            track: reference.default_track().clone(),
            rain_probability: 0.0,
        };
        predictor.set_race(race);
        predictor.set_rain_probability(rain_probability);
        predictor
    }

    pub fn for_weekend(reference: &'r ReferenceData, weekend: &RaceWeekend) -> Self {
        Self::new(reference, &weekend.race, weekend.rain_probability)
    }

    pub fn set_race(&mut self, race: &str) {
        self.track = self.reference.track(race).clone();
        info!(
            "Race: {} ({}{})",
            self.track.race,
            self.track.circuit,
            if self.track.is_sprint { ", sprint weekend" } else { "" }
        );
    }

    pub fn set_rain_probability(&mut self, probability: f64) {
        self.rain_probability = clamp_probability(probability);
        info!(
            "Rain probability: {:.0}%",
            self.rain_probability * 100.0
        );
    }

    pub fn track(&self) -> &TrackProfile {
        &self.track
    }

    pub fn format(&self) -> WeekendFormat {
        self.track.format()
    }

    pub fn rain_probability(&self) -> f64 {
        self.rain_probability
    }

    pub fn weekend(&self) -> RaceWeekend {
        RaceWeekend {
            race: self.track.race.clone(),
            rain_probability: self.rain_probability,
        }
    }

    /// Parse and merge already-read session tables.
    ///
    /// Sprint tables are only used on sprint weekends.
    pub fn load_tables(
        &self,
        qualifying: &SessionTable,
        practice: &SessionTable,
        sprint: Option<&SessionTable>,
        sprint_qualifying: Option<&SessionTable>,
    ) -> Result<WeekendRecords> {
        let normalizer = IdentityNormalizer::new(self.reference);
        let format = self.format();

        let mut sessions = WeekendSessions {
            qualifying: QualifyingSession::from_table(qualifying, &normalizer)?,
            practice: PracticeSession::from_table(practice, &normalizer, format)?,
            sprint: None,
            sprint_qualifying: None,
        };

        let mut notices = Vec::new();
        if format.is_sprint() {
            sessions.sprint = sprint
                .map(|t| SprintSession::from_table(t, &normalizer))
                .transpose()?;
            sessions.sprint_qualifying = sprint_qualifying
                .map(|t| SprintQualifyingSession::from_table(t, &normalizer))
                .transpose()?;

            if sessions.sprint.is_none() {
                let message = format!(
                    "{} is a sprint weekend but no sprint race data was provided",
                    self.track.race
                );
                warn!("{}", message);
                notices.push(message);
            }
        } else if sprint.is_some() || sprint_qualifying.is_some() {
            info!(
                "Ignoring sprint data: {} is not a sprint weekend",
                self.track.race
            );
        }

        let mut weekend = merge_weekend(self.reference, format, &sessions)?;

        let mut all_notices = sessions.notices();
        all_notices.append(&mut notices);
        all_notices.append(&mut weekend.notices);
        weekend.notices = all_notices;

        Ok(weekend)
    }

    /// Read the weekend's files and merge them
    pub fn load(&self, files: &WeekendFiles) -> Result<WeekendRecords> {
        info!("Loading data files...");
        let qualifying = SessionTable::read_csv(&files.qualifying, "Qualifying")?;
        let practice = SessionTable::read_csv(&files.practice, "Practice")?;

        let (sprint, sprint_qualifying) = if self.format().is_sprint() {
            (
                read_optional(files.sprint.as_deref(), "Sprint")?,
                read_optional(files.sprint_qualifying.as_deref(), "Sprint Qualifying")?,
            )
        } else {
            (None, None)
        };

        self.load_tables(
            &qualifying,
            &practice,
            sprint.as_ref(),
            sprint_qualifying.as_ref(),
        )
    }

    /// Score, rank and estimate accuracy for a loaded weekend
    pub fn predict(&self, mut weekend: WeekendRecords) -> PredictionResult {
        info!("Predicting top 3 finishers for {}...", self.track.race);
        info!(
            "Weather conditions: {}",
            WeatherOutlook::from_probability(self.rain_probability).description()
        );

        let notices = mem::take(&mut weekend.notices);
        let mut records = weekend.into_records();

        let scorer = RaceScorer::for_track(&self.track, self.rain_probability);
        let degraded_scores = scorer.score_all(&mut records);
        let drivers_scored = records.len();

        let podium = podium(records);
        let accuracy = estimate_accuracy(&podium, self.rain_probability);

        info!(
            "Prediction complete: MSE {:.2}, RMSE {:.2}, confidence {:.1}%",
            accuracy.mse, accuracy.rmse, accuracy.confidence
        );

        PredictionResult {
            race: self.track.race.clone(),
            circuit: self.track.circuit.clone(),
            format: self.format(),
            rain_probability: self.rain_probability,
            podium,
            accuracy,
            drivers_scored,
            degraded_scores,
            notices,
        }
    }

    /// Load and predict in one step
    pub fn run(&self, files: &WeekendFiles) -> Result<PredictionResult> {
        let weekend = self.load(files)?;
        Ok(self.predict(weekend))
    }
}

fn read_optional(path: Option<&Path>, name: &str) -> Result<Option<SessionTable>> {
    path.map(|p| SessionTable::read_csv(p, name)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PodiumError;

    fn quali_table() -> SessionTable {
        SessionTable::from_rows(
            "Qualifying",
            &["Pos", "Driver", "Team", "Q1", "Q2", "Q3"],
            &[
                vec!["1", "VER", "Red Bull", "1:16.000", "1:15.800", "1:15.500"],
                vec!["2", "NOR", "McLaren", "1:16.100", "1:15.900", "1:15.600"],
                vec!["3", "LEC", "Ferrari", "1:16.200", "1:16.000", "1:15.700"],
                vec!["4", "HAM", "Ferrari", "1:16.300", "1:16.100", "1:15.800"],
            ],
        )
    }

    fn practice_table() -> SessionTable {
        SessionTable::from_rows(
            "Practice",
            &["Driver", "FP1", "FP2", "FP3"],
            &[
                vec!["Max Verstappen", "1:18.000", "1:17.500", "1:16.500"],
                vec!["Lando Norris", "1:18.100", "1:17.600", "1:16.600"],
                vec!["Charles Leclerc", "1:18.200", "1:17.700", "1:16.700"],
                vec!["Lewis Hamilton", "1:18.300", "1:17.800", "1:16.800"],
            ],
        )
    }

    #[test]
    fn test_new_clamps_rain_and_falls_back() {
        let reference = ReferenceData::builtin();
        let predictor = PodiumPredictor::new(&reference, "Moon Grand Prix", 1.7);
        assert_eq!(predictor.track().race, "Australian Grand Prix");
        assert_eq!(predictor.rain_probability(), 1.0);

        let predictor = PodiumPredictor::new(&reference, "Miami Grand Prix", -0.2);
        assert_eq!(predictor.format(), WeekendFormat::Sprint);
        assert_eq!(predictor.rain_probability(), 0.0);

        let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", f64::NAN);
        assert_eq!(predictor.rain_probability(), 0.0);
    }

    #[test]
    fn test_for_weekend_uses_run_parameters() {
        let reference = ReferenceData::builtin();
        let weekend = RaceWeekend {
            race: "Miami Grand Prix".to_string(),
            rain_probability: 0.35,
        };
        let predictor = PodiumPredictor::for_weekend(&reference, &weekend);
        assert_eq!(predictor.track().race, "Miami Grand Prix");
        assert_eq!(predictor.format(), WeekendFormat::Sprint);
        assert_eq!(predictor.weekend(), weekend);

        let unknown = RaceWeekend {
            race: "Moon Grand Prix".to_string(),
            rain_probability: 2.0,
        };
        let predictor = PodiumPredictor::for_weekend(&reference, &unknown);
        assert_eq!(
            predictor.weekend(),
            RaceWeekend {
                race: "Australian Grand Prix".to_string(),
                rain_probability: 1.0,
            }
        );
    }

    #[test]
    fn test_predict_standard_weekend() {
        let reference = ReferenceData::builtin();
        let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
        let weekend = predictor
            .load_tables(&quali_table(), &practice_table(), None, None)
            .unwrap();
        let result = predictor.predict(weekend);

        assert_eq!(result.podium.len(), 3);
        assert_eq!(result.drivers_scored, 4);
        assert_eq!(result.degraded_scores, 0);
        assert_eq!(result.winner().unwrap().record.driver.name, "Max Verstappen");
        let positions: Vec<u32> = result.podium.iter().map(|e| e.predicted_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert!(result.notices.is_empty());
    }

    #[test]
    fn test_sprint_weekend_without_sprint_data_is_noted() {
        let reference = ReferenceData::builtin();
        let predictor = PodiumPredictor::new(&reference, "Chinese Grand Prix", 0.0);
        let weekend = predictor
            .load_tables(&quali_table(), &practice_table(), None, None)
            .unwrap();
        assert_eq!(weekend.notices.len(), 1);
        assert!(weekend.notices[0].contains("sprint weekend"));

        let result = predictor.predict(weekend);
        assert_eq!(result.format, WeekendFormat::Sprint);
        assert_eq!(result.notices.len(), 1);
    }

    #[test]
    fn test_prediction_is_reproducible() {
        let reference = ReferenceData::builtin();
        let predictor = PodiumPredictor::new(&reference, "British Grand Prix", 0.4);
        let run = || {
            let weekend = predictor
                .load_tables(&quali_table(), &practice_table(), None, None)
                .unwrap();
            predictor.predict(weekend)
        };

        let first = run();
        let second = run();
        assert_eq!(first.accuracy, second.accuracy);
        let names = |r: &PredictionResult| -> Vec<String> {
            r.podium.iter().map(|e| e.record.driver.name.clone()).collect()
        };
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reference = ReferenceData::builtin();
        let predictor = PodiumPredictor::new(&reference, "Monaco Grand Prix", 0.0);
        let files = WeekendFiles::new("/nonexistent/q.csv", "/nonexistent/p.csv");
        assert!(matches!(predictor.run(&files), Err(PodiumError::Io { .. })));
    }
}
