//! Typed session loaders
//!
//! Each loader discovers its columns in a [`SessionTable`], standardizes
//! driver and team names, and parses times and positions into typed rows.
//! Missing required columns are fatal; missing optional columns are recorded
//! as notices and left empty.

use tracing::{debug, info, warn};

use super::features::{best_time, gaps_to_best};
use super::identity::IdentityNormalizer;
use super::parser::{parse_position, parse_race_time, parse_time};
use super::table::SessionTable;
use crate::error::Result;
use crate::models::{DriverIdentity, WeekendFormat};

pub const POSITION_COLUMNS: &[&str] = &["POS", "Pos", "Position", "POSITION"];
pub const DRIVER_COLUMNS: &[&str] = &["DRIVER", "Driver", "NAME", "Name"];
pub const TEAM_COLUMNS: &[&str] = &["CAR", "Car", "TEAM", "Team", "Constructor"];

pub const QUALIFYING_TIME_COLUMNS: [&[&str]; 3] = [
    &["Q1", "Q1 Time", "Q1TIME"],
    &["Q2", "Q2 Time", "Q2TIME"],
    &["Q3", "Q3 Time", "Q3TIME"],
];

pub const PRACTICE_TIME_COLUMNS: [&[&str]; 3] = [
    &["P1", "P1 Time", "FP1", "Practice 1", "TIME", "Time"],
    &["P2", "P2 Time", "FP2", "Practice 2"],
    &["P3", "P3 Time", "FP3", "Practice 3"],
];

pub const SPRINT_RESULT_COLUMNS: &[&str] = &["TIME", "Time", "TIME/RETIRED", "RESULT", "Result"];

pub const SPRINT_QUALIFYING_TIME_COLUMNS: [&[&str]; 3] = [
    &["Q1", "SQ1", "SQ1 Time"],
    &["Q2", "SQ2", "SQ2 Time"],
    &["Q3", "SQ3", "SQ3 Time"],
];

/// Team recorded when qualifying data has no team column
pub const UNKNOWN_TEAM: &str = "Unknown";

fn notice(notices: &mut Vec<String>, message: String) {
    warn!("{}", message);
    notices.push(message);
}

fn time_columns(table: &SessionTable, candidates: &[&[&str]; 3]) -> [Option<usize>; 3] {
    [
        table.find_column(candidates[0]),
        table.find_column(candidates[1]),
        table.find_column(candidates[2]),
    ]
}

fn row_times(table: &SessionTable, columns: [Option<usize>; 3], row: usize) -> [Option<f64>; 3] {
    columns.map(|col| table.optional_cell(col, row).and_then(parse_time))
}

fn column_label(table: &SessionTable, column: Option<usize>) -> &str {
    column
        .and_then(|c| table.headers().get(c))
        .map(String::as_str)
        .unwrap_or("-")
}

/// One qualifying classification row
#[derive(Debug, Clone, PartialEq)]
pub struct QualifyingRow {
    pub driver: DriverIdentity,
    pub team: String,
    pub position: u32,
    pub times: [Option<f64>; 3],
    pub best_time: Option<f64>,
    pub gap_to_pole: Option<f64>,
}

/// Qualifying session with pole gaps resolved
#[derive(Debug, Clone, Default)]
pub struct QualifyingSession {
    pub rows: Vec<QualifyingRow>,
    pub pole_time: Option<f64>,
    pub notices: Vec<String>,
}

impl QualifyingSession {
    pub fn from_table(table: &SessionTable, normalizer: &IdentityNormalizer) -> Result<Self> {
        let pos_col = table.require_column(POSITION_COLUMNS, "position")?;
        let driver_col = table.require_column(DRIVER_COLUMNS, "driver")?;
        let team_col = table.find_column(TEAM_COLUMNS);
        let q_cols = time_columns(table, &QUALIFYING_TIME_COLUMNS);

        info!(
            "Qualifying columns: position={}, driver={}, team={}, Q1={}, Q2={}, Q3={}",
            column_label(table, Some(pos_col)),
            column_label(table, Some(driver_col)),
            column_label(table, team_col),
            column_label(table, q_cols[0]),
            column_label(table, q_cols[1]),
            column_label(table, q_cols[2]),
        );

        let mut notices = Vec::new();
        if team_col.is_none() {
            notice(
                &mut notices,
                "Car/team information missing from qualifying data".to_string(),
            );
        }
        for (i, col) in q_cols.iter().enumerate() {
            if col.is_none() {
                notice(
                    &mut notices,
                    format!("Q{} data missing from qualifying data", i + 1),
                );
            }
        }

        let mut rows: Vec<QualifyingRow> = (0..table.height())
            .map(|row| {
                let times = row_times(table, q_cols, row);
                QualifyingRow {
                    driver: normalizer.driver_identity(table.cell(driver_col, row)),
                    team: table
                        .optional_cell(team_col, row)
                        .map(|t| normalizer.team(t))
                        .unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
                    position: parse_position(table.cell(pos_col, row)),
                    times,
                    best_time: best_time(times),
                    gap_to_pole: None,
                }
            })
            .collect();

        let best: Vec<Option<f64>> = rows.iter().map(|r| r.best_time).collect();
        for (row, gap) in rows.iter_mut().zip(gaps_to_best(&best)) {
            row.gap_to_pole = gap;
        }
        let pole_time = best_time(best);

        debug!("Qualifying pole time: {:?}", pole_time);

        Ok(Self {
            rows,
            pole_time,
            notices,
        })
    }
}

/// One practice row; times indexed P1..P3
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeRow {
    pub driver: DriverIdentity,
    pub team: Option<String>,
    pub times: [Option<f64>; 3],
}

#[derive(Debug, Clone, Default)]
pub struct PracticeSession {
    pub rows: Vec<PracticeRow>,
    pub notices: Vec<String>,
}

impl PracticeSession {
    /// Load practice times; which missing sessions matter depends on the format
    pub fn from_table(
        table: &SessionTable,
        normalizer: &IdentityNormalizer,
        format: WeekendFormat,
    ) -> Result<Self> {
        let driver_col = table.require_column(DRIVER_COLUMNS, "driver")?;
        let team_col = table.find_column(TEAM_COLUMNS);
        let p_cols = time_columns(table, &PRACTICE_TIME_COLUMNS);

        info!(
            "Practice columns: driver={}, team={}, P1={}, P2={}, P3={}",
            column_label(table, Some(driver_col)),
            column_label(table, team_col),
            column_label(table, p_cols[0]),
            column_label(table, p_cols[1]),
            column_label(table, p_cols[2]),
        );

        let mut notices = Vec::new();
        match format {
            WeekendFormat::Sprint => {
                if p_cols[0].is_none() {
                    notice(&mut notices, "Practice 1 time data missing".to_string());
                }
            }
            WeekendFormat::Standard => {
                for session in [2, 3] {
                    if p_cols[session - 1].is_none() {
                        notice(
                            &mut notices,
                            format!(
                                "Practice {} time data missing for regular race weekend",
                                session
                            ),
                        );
                    }
                }
            }
        }

        let rows = (0..table.height())
            .map(|row| PracticeRow {
                driver: normalizer.driver_identity(table.cell(driver_col, row)),
                team: table.optional_cell(team_col, row).map(|t| normalizer.team(t)),
                times: row_times(table, p_cols, row),
            })
            .collect();

        Ok(Self { rows, notices })
    }
}

/// One sprint race classification row
#[derive(Debug, Clone, PartialEq)]
pub struct SprintRow {
    pub driver: DriverIdentity,
    pub team: Option<String>,
    pub position: u32,
    pub time: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SprintSession {
    pub rows: Vec<SprintRow>,
    pub notices: Vec<String>,
}

impl SprintSession {
    pub fn from_table(table: &SessionTable, normalizer: &IdentityNormalizer) -> Result<Self> {
        let pos_col = table.require_column(POSITION_COLUMNS, "position")?;
        let driver_col = table.require_column(DRIVER_COLUMNS, "driver")?;
        let team_col = table.find_column(TEAM_COLUMNS);
        let time_col = table.find_column(SPRINT_RESULT_COLUMNS);

        info!(
            "Sprint columns: position={}, driver={}, team={}, result={}",
            column_label(table, Some(pos_col)),
            column_label(table, Some(driver_col)),
            column_label(table, team_col),
            column_label(table, time_col),
        );

        let mut notices = Vec::new();
        if time_col.is_none() {
            notice(
                &mut notices,
                "Sprint data has no finish time column".to_string(),
            );
        }

        let rows = (0..table.height())
            .map(|row| SprintRow {
                driver: normalizer.driver_identity(table.cell(driver_col, row)),
                team: table.optional_cell(team_col, row).map(|t| normalizer.team(t)),
                position: parse_position(table.cell(pos_col, row)),
                time: table.optional_cell(time_col, row).and_then(parse_race_time),
            })
            .collect();

        Ok(Self { rows, notices })
    }
}

/// One sprint qualifying (shootout) row
#[derive(Debug, Clone, PartialEq)]
pub struct SprintQualifyingRow {
    pub driver: DriverIdentity,
    pub team: Option<String>,
    pub position: u32,
    pub times: [Option<f64>; 3],
    pub best_time: Option<f64>,
    pub gap_to_pole: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SprintQualifyingSession {
    pub rows: Vec<SprintQualifyingRow>,
    pub pole_time: Option<f64>,
    pub notices: Vec<String>,
}

impl SprintQualifyingSession {
    pub fn from_table(table: &SessionTable, normalizer: &IdentityNormalizer) -> Result<Self> {
        let pos_col = table.require_column(POSITION_COLUMNS, "position")?;
        let driver_col = table.require_column(DRIVER_COLUMNS, "driver")?;
        let team_col = table.find_column(TEAM_COLUMNS);
        let sq_cols = time_columns(table, &SPRINT_QUALIFYING_TIME_COLUMNS);

        info!(
            "Sprint qualifying columns: position={}, driver={}, team={}, SQ1={}, SQ2={}, SQ3={}",
            column_label(table, Some(pos_col)),
            column_label(table, Some(driver_col)),
            column_label(table, team_col),
            column_label(table, sq_cols[0]),
            column_label(table, sq_cols[1]),
            column_label(table, sq_cols[2]),
        );

        let mut notices = Vec::new();
        if sq_cols.iter().all(Option::is_none) {
            notice(
                &mut notices,
                "Sprint qualifying data has no SQ1/SQ2/SQ3 time columns".to_string(),
            );
        }

        let mut rows: Vec<SprintQualifyingRow> = (0..table.height())
            .map(|row| {
                let times = row_times(table, sq_cols, row);
                SprintQualifyingRow {
                    driver: normalizer.driver_identity(table.cell(driver_col, row)),
                    team: table.optional_cell(team_col, row).map(|t| normalizer.team(t)),
                    position: parse_position(table.cell(pos_col, row)),
                    times,
                    best_time: best_time(times),
                    gap_to_pole: None,
                }
            })
            .collect();

        let best: Vec<Option<f64>> = rows.iter().map(|r| r.best_time).collect();
        for (row, gap) in rows.iter_mut().zip(gaps_to_best(&best)) {
            row.gap_to_pole = gap;
        }
        let pole_time = best_time(best);

        Ok(Self {
            rows,
            pole_time,
            notices,
        })
    }
}
