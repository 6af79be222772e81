use serde::{Deserialize, Serialize};
use std::fmt;

/// Track profile for a race weekend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackProfile {
    pub race: String,
    pub circuit: String,
    pub overtaking_difficulty: u8, // 1-10
    pub tire_degradation: u8,      // 1-10
    pub start_importance: u8,      // 1-10
    pub is_sprint: bool,
}

impl TrackProfile {
    /// Overtaking difficulty scaled to 0-1
    pub fn overtaking_factor(&self) -> f64 {
        self.overtaking_difficulty as f64 / 10.0
    }

    /// Tire degradation scaled to 0-1
    pub fn degradation_factor(&self) -> f64 {
        self.tire_degradation as f64 / 10.0
    }

    pub fn format(&self) -> WeekendFormat {
        if self.is_sprint {
            WeekendFormat::Sprint
        } else {
            WeekendFormat::Standard
        }
    }
}

/// Weekend schedule, selects the weight scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendFormat {
    Standard,
    Sprint,
}

impl WeekendFormat {
    pub fn is_sprint(self) -> bool {
        self == WeekendFormat::Sprint
    }
}

/// Team characteristic bundle (ratings on a 1-10 scale, pace as a multiplier)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamCharacteristics {
    pub race_pace_factor: f64,
    pub tire_mgmt: f64,
    pub start_performance: f64,
    pub wet_performance: f64,
    pub sprint_performance: f64,
}

impl Default for TeamCharacteristics {
    /// Values for a team missing from the reference tables
    fn default() -> Self {
        Self {
            race_pace_factor: 1.0,
            tire_mgmt: 7.0,
            start_performance: 7.0,
            wet_performance: 7.0,
            sprint_performance: 7.5,
        }
    }
}

/// Driver characteristic bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverCharacteristics {
    pub experience: f64,         // 0-1
    pub wet_performance: f64,    // 1-10
    pub sprint_performance: f64, // 1-10
}

impl Default for DriverCharacteristics {
    /// Values for a driver missing from the reference tables
    fn default() -> Self {
        Self {
            experience: 0.85,
            wet_performance: 7.5,
            sprint_performance: 7.5,
        }
    }
}

/// Canonical driver identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverIdentity {
    /// Canonical full name, or the raw input when unresolved
    pub name: String,
    /// Three-letter code when the name is known
    pub code: Option<String>,
}

impl DriverIdentity {
    pub fn is_resolved(&self) -> bool {
        self.code.is_some()
    }
}

impl fmt::Display for DriverIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One driver's merged weekend data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverWeekendRecord {
    pub driver: DriverIdentity,
    pub team: String,
    pub grid_position: u32,

    // Qualifying
    pub best_quali_time: Option<f64>,
    pub gap_to_pole: Option<f64>,

    // Practice
    pub practice_times: [Option<f64>; 3],
    pub p1_score: Option<f64>,
    pub p2_score: Option<f64>,
    pub p3_score: Option<f64>,

    // Sprint weekend only
    pub sprint_position: Option<u32>,
    pub sprint_time_seconds: Option<f64>,
    pub sprint_position_score: Option<f64>,
    pub sprint_quali_position: Option<u32>,
    pub best_sprint_quali_time: Option<f64>,
    pub gap_to_sprint_pole: Option<f64>,

    pub team_traits: TeamCharacteristics,
    pub driver_traits: DriverCharacteristics,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_score: Option<RaceScore>,
}

impl DriverWeekendRecord {
    /// Fresh record seeded from a qualifying row, characteristics at defaults
    pub fn new(driver: DriverIdentity, team: String, grid_position: u32) -> Self {
        Self {
            driver,
            team,
            grid_position,
            best_quali_time: None,
            gap_to_pole: None,
            practice_times: [None; 3],
            p1_score: None,
            p2_score: None,
            p3_score: None,
            sprint_position: None,
            sprint_time_seconds: None,
            sprint_position_score: None,
            sprint_quali_position: None,
            best_sprint_quali_time: None,
            gap_to_sprint_pole: None,
            team_traits: TeamCharacteristics::default(),
            driver_traits: DriverCharacteristics::default(),
            race_score: None,
        }
    }

    /// Composite score used for ranking (unscored records rank as degraded)
    pub fn score_value(&self) -> f64 {
        self.race_score
            .as_ref()
            .map(RaceScore::value)
            .unwrap_or(RaceScore::DEGRADED_SCORE)
    }
}

/// Scoring factor identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    StartingPosition,
    QualifyingPace,
    Practice1,
    Practice2,
    Practice3,
    SprintRace,
    TeamRacePace,
    TireManagement,
    DriverExperience,
    DriverSprintAbility,
    TeamSprintSetup,
    DriverWetSkill,
    TeamWetPerformance,
}

impl Factor {
    pub fn label(self) -> &'static str {
        match self {
            Factor::StartingPosition => "Starting position",
            Factor::QualifyingPace => "Qualifying pace",
            Factor::Practice1 => "Practice 1",
            Factor::Practice2 => "Practice 2 (race pace)",
            Factor::Practice3 => "Practice 3",
            Factor::SprintRace => "Sprint race performance",
            Factor::TeamRacePace => "Team race pace",
            Factor::TireManagement => "Tire management",
            Factor::DriverExperience => "Driver experience",
            Factor::DriverSprintAbility => "Driver sprint ability",
            Factor::TeamSprintSetup => "Team sprint setup",
            Factor::DriverWetSkill => "Driver wet weather skill",
            Factor::TeamWetPerformance => "Team wet weather performance",
        }
    }

    pub fn is_wet(self) -> bool {
        matches!(self, Factor::DriverWetSkill | Factor::TeamWetPerformance)
    }
}

/// A single active term of the weighted mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorTerm {
    pub factor: Factor,
    pub weight: f64,
    pub value: f64,
}

impl FactorTerm {
    pub fn contribution(&self) -> f64 {
        self.weight * self.value
    }
}

/// Active terms plus the resulting weighted mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub terms: Vec<FactorTerm>,
    pub score: f64,
}

impl ScoreBreakdown {
    pub fn total_weight(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }

    /// Each factor's share (percent) of the weighted total
    pub fn shares(&self) -> Vec<(Factor, f64)> {
        let total: f64 = self.terms.iter().map(FactorTerm::contribution).sum();
        self.terms
            .iter()
            .map(|t| {
                let share = if total > 0.0 {
                    t.contribution() / total * 100.0
                } else {
                    0.0
                };
                (t.factor, share)
            })
            .collect()
    }
}

/// Composite race score, either computed or a degraded sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceScore {
    Computed(ScoreBreakdown),
    Degraded { reason: String },
}

impl RaceScore {
    pub const DEGRADED_SCORE: f64 = 0.1;

    pub fn value(&self) -> f64 {
        match self {
            RaceScore::Computed(breakdown) => breakdown.score,
            RaceScore::Degraded { .. } => Self::DEGRADED_SCORE,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RaceScore::Degraded { .. })
    }

    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match self {
            RaceScore::Computed(breakdown) => Some(breakdown),
            RaceScore::Degraded { .. } => None,
        }
    }
}

/// A predicted podium finisher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodiumEntry {
    pub predicted_position: u32,
    /// Grid position minus predicted position (positive = places gained)
    pub position_change: i32,
    pub score: f64,
    pub record: DriverWeekendRecord,
}

/// Synthetic accuracy figures for a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyEstimate {
    pub mse: f64,
    pub rmse: f64,
    /// Percentage, not clamped to 0-100
    pub confidence: f64,
    pub std_dev: f64,
    pub simulated_positions: Vec<f64>,
}

/// Weather outlook derived from rain probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherOutlook {
    Dry,
    LightRain,
    IntermittentRain,
    HeavyRain,
}

impl WeatherOutlook {
    pub fn from_probability(rain: f64) -> Self {
        if rain <= 0.0 {
            WeatherOutlook::Dry
        } else if rain < 0.3 {
            WeatherOutlook::LightRain
        } else if rain < 0.7 {
            WeatherOutlook::IntermittentRain
        } else {
            WeatherOutlook::HeavyRain
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WeatherOutlook::Dry => "Dry conditions",
            WeatherOutlook::LightRain => "Light rain possible",
            WeatherOutlook::IntermittentRain => "Intermittent rain likely",
            WeatherOutlook::HeavyRain => "Heavy rain expected",
        }
    }
}

/// Prediction returned to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub race: String,
    pub circuit: String,
    pub format: WeekendFormat,
    pub rain_probability: f64,
    pub podium: Vec<PodiumEntry>,
    pub accuracy: AccuracyEstimate,
    pub drivers_scored: usize,
    pub degraded_scores: usize,
    pub notices: Vec<String>,
}

impl PredictionResult {
    pub fn mse(&self) -> f64 {
        self.accuracy.mse
    }

    pub fn rmse(&self) -> f64 {
        self.accuracy.rmse
    }

    pub fn confidence(&self) -> f64 {
        self.accuracy.confidence
    }

    pub fn weather(&self) -> WeatherOutlook {
        WeatherOutlook::from_probability(self.rain_probability)
    }

    pub fn winner(&self) -> Option<&PodiumEntry> {
        self.podium.first()
    }
}
