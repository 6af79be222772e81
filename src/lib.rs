//! Podium - race weekend top-3 predictor
//!
//! This library provides:
//! - Session export loading with encoding detection and column discovery
//! - Driver and team name standardization against reference tables
//! - Track- and rain-weighted race scoring for standard and sprint weekends
//! - Top-3 ranking with a seeded accuracy estimate
//!
//! # Example
//!
//! ```no_run
//! use podium::predictor::{PodiumPredictor, WeekendFiles};
//! use podium::reference::ReferenceData;
//!
//! let reference = ReferenceData::builtin();
//! let predictor = PodiumPredictor::new(&reference, "British Grand Prix", 0.3);
//!
//! let files = WeekendFiles::new("qualifying.csv", "practice.csv");
//! let result = predictor.run(&files).unwrap();
//! for entry in &result.podium {
//!     println!("P{} {}", entry.predicted_position, entry.record.driver);
//! }
//! println!("Confidence: {:.1}%", result.confidence());
//! ```

pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod ranking;
pub mod reference;
pub mod scoring;

// Re-export commonly used types
pub use error::{PodiumError, Result};
pub use models::{
    AccuracyEstimate, DriverIdentity, DriverWeekendRecord, Factor, PodiumEntry, PredictionResult,
    RaceScore, ScoreBreakdown, TrackProfile, WeatherOutlook, WeekendFormat,
};
pub use predictor::{PodiumPredictor, RaceWeekend, WeekendFiles};
pub use reference::ReferenceData;
pub use scoring::{RaceConditions, RaceScorer};
