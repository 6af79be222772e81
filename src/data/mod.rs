//! Session data loading, normalization and merging

pub mod features;
pub mod identity;
pub mod merge;
pub mod parser;
pub mod sessions;
pub mod table;

// Re-export commonly used types
pub use features::{
    best_time, gap_score, gaps_to_best, session_scores, sprint_position_score, FreePractice,
    SessionPerformance, NEUTRAL_SESSION_SCORE,
};
pub use identity::IdentityNormalizer;
pub use merge::{merge_weekend, WeekendRecords, WeekendSessions};
pub use parser::{parse_position, parse_race_time, parse_time, GridPositionSource, BACK_OF_GRID};
pub use sessions::{
    PracticeSession, QualifyingSession, SprintQualifyingSession, SprintSession,
};
pub use table::{find_column, SessionTable, DEFAULT_ENCODINGS};
