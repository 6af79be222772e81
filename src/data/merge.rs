//! Weekend record merger
//!
//! Qualifying defines the driver set: one record per canonical driver, in
//! qualifying order. Practice and sprint rows are folded into those records by
//! canonical name; rows for drivers that did not qualify are dropped.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::features::SessionPerformance;
use super::sessions::{PracticeSession, QualifyingSession, SprintQualifyingSession, SprintSession};
use crate::error::{PodiumError, Result};
use crate::models::{DriverWeekendRecord, WeekendFormat};
use crate::reference::ReferenceData;

/// All parsed sessions for one weekend
#[derive(Debug, Clone, Default)]
pub struct WeekendSessions {
    pub qualifying: QualifyingSession,
    pub practice: PracticeSession,
    pub sprint: Option<SprintSession>,
    pub sprint_qualifying: Option<SprintQualifyingSession>,
}

impl WeekendSessions {
    /// Notices raised while loading, in session order
    pub fn notices(&self) -> Vec<String> {
        let mut notices = self.qualifying.notices.clone();
        notices.extend(self.practice.notices.iter().cloned());
        if let Some(sprint) = &self.sprint {
            notices.extend(sprint.notices.iter().cloned());
        }
        if let Some(sprint_quali) = &self.sprint_qualifying {
            notices.extend(sprint_quali.notices.iter().cloned());
        }
        notices
    }
}

/// Merged per-driver records indexed by canonical driver name
#[derive(Debug, Clone)]
pub struct WeekendRecords {
    records: Vec<DriverWeekendRecord>,
    index: HashMap<String, usize>,
    pub notices: Vec<String>,
}

impl WeekendRecords {
    fn seed(qualifying: &QualifyingSession) -> Self {
        let mut records = Vec::with_capacity(qualifying.rows.len());
        let mut index = HashMap::with_capacity(qualifying.rows.len());
        let mut notices = Vec::new();

        for row in &qualifying.rows {
            if index.contains_key(&row.driver.name) {
                let message = format!(
                    "Duplicate qualifying entry for {}; keeping the first",
                    row.driver
                );
                warn!("{}", message);
                notices.push(message);
                continue;
            }

            let mut record =
                DriverWeekendRecord::new(row.driver.clone(), row.team.clone(), row.position);
            record.best_quali_time = row.best_time;
            record.gap_to_pole = row.gap_to_pole;

            index.insert(row.driver.name.clone(), records.len());
            records.push(record);
        }

        Self {
            records,
            index,
            notices,
        }
    }

    fn get_mut(&mut self, driver: &str) -> Option<&mut DriverWeekendRecord> {
        let idx = *self.index.get(driver)?;
        self.records.get_mut(idx)
    }

    /// Record for a canonical driver name
    pub fn get(&self, driver: &str) -> Option<&DriverWeekendRecord> {
        self.index.get(driver).and_then(|&idx| self.records.get(idx))
    }

    pub fn records(&self) -> &[DriverWeekendRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [DriverWeekendRecord] {
        &mut self.records
    }

    pub fn into_records(self) -> Vec<DriverWeekendRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn merge_practice(&mut self, practice: &PracticeSession) -> usize {
        let mut unmatched = 0;
        for row in &practice.rows {
            let Some(record) = self.get_mut(&row.driver.name) else {
                unmatched += 1;
                continue;
            };
            for (slot, time) in record.practice_times.iter_mut().zip(row.times) {
                if time.is_some() {
                    *slot = time;
                }
            }
        }
        unmatched
    }

    fn merge_sprint(&mut self, sprint: &SprintSession) -> usize {
        let mut unmatched = 0;
        for row in &sprint.rows {
            let Some(record) = self.get_mut(&row.driver.name) else {
                unmatched += 1;
                continue;
            };
            record.sprint_position = Some(row.position);
            record.sprint_time_seconds = row.time;
        }
        unmatched
    }

    fn merge_sprint_qualifying(&mut self, sprint_quali: &SprintQualifyingSession) -> usize {
        let mut unmatched = 0;
        for row in &sprint_quali.rows {
            let Some(record) = self.get_mut(&row.driver.name) else {
                unmatched += 1;
                continue;
            };
            record.sprint_quali_position = Some(row.position);
            record.gap_to_sprint_pole = row.gap_to_pole;
            record.best_sprint_quali_time = row.best_time;
        }
        unmatched
    }

    /// Attach reference characteristics, defaults for unknown teams and drivers
    fn attach_characteristics(&mut self, reference: &ReferenceData) {
        let mut defaulted = 0;
        for record in &mut self.records {
            match reference.team(&record.team) {
                Some(traits) => record.team_traits = *traits,
                None => {
                    debug!("No team characteristics for {:?}", record.team);
                    defaulted += 1;
                }
            }
            match reference.driver(&record.driver.name) {
                Some(profile) => record.driver_traits = profile.characteristics,
                None => {
                    debug!("No driver characteristics for {:?}", record.driver.name);
                    defaulted += 1;
                }
            }
        }
        if defaulted > 0 {
            info!("{} team/driver lookups fell back to default characteristics", defaulted);
        }
    }
}

/// Join a weekend's sessions into scored-ready driver records
pub fn merge_weekend(
    reference: &ReferenceData,
    format: WeekendFormat,
    sessions: &WeekendSessions,
) -> Result<WeekendRecords> {
    let mut weekend = WeekendRecords::seed(&sessions.qualifying);
    if weekend.is_empty() {
        return Err(PodiumError::NoDrivers {
            table: "Qualifying".to_string(),
        });
    }

    let mut dropped = weekend.merge_practice(&sessions.practice);

    if format.is_sprint() {
        if let Some(sprint) = &sessions.sprint {
            dropped += weekend.merge_sprint(sprint);
        }
        if let Some(sprint_quali) = &sessions.sprint_qualifying {
            dropped += weekend.merge_sprint_qualifying(sprint_quali);
        }
    }

    if dropped > 0 {
        debug!("Dropped {} session rows for drivers absent from qualifying", dropped);
    }

    SessionPerformance::apply(weekend.records_mut(), format);
    weekend.attach_characteristics(reference);

    info!("Data loaded for {} drivers", weekend.len());
    Ok(weekend)
}
