//! Reference data: driver, team and track tables
//!
//! Built once per process (either the built-in season tables or a JSON
//! override) and shared read-only by the normalizer, merger and scorer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{PodiumError, Result};
use crate::models::{DriverCharacteristics, TeamCharacteristics, TrackProfile};

/// Race used when the requested race is unknown
pub const DEFAULT_RACE: &str = "Australian Grand Prix";

/// (code, full name, experience, wet rating, sprint rating)
const DRIVERS: [(&str, &str, f64, f64, f64); 20] = [
    ("VER", "Max Verstappen", 0.98, 9.5, 9.6),
    ("HAM", "Lewis Hamilton", 0.97, 9.7, 9.3),
    ("ALO", "Fernando Alonso", 0.96, 9.6, 8.9),
    ("LEC", "Charles Leclerc", 0.93, 8.2, 9.0),
    ("SAI", "Carlos Sainz", 0.92, 8.5, 8.7),
    ("NOR", "Lando Norris", 0.93, 8.3, 9.1),
    ("RUS", "George Russell", 0.91, 8.6, 8.8),
    ("GAS", "Pierre Gasly", 0.90, 8.4, 8.0),
    ("STR", "Lance Stroll", 0.88, 8.1, 7.8),
    ("ALB", "Alexander Albon", 0.89, 8.0, 8.2),
    ("OCO", "Esteban Ocon", 0.89, 7.9, 7.9),
    ("TSU", "Yuki Tsunoda", 0.87, 7.5, 7.7),
    ("PIA", "Oscar Piastri", 0.89, 7.8, 8.5),
    ("HUL", "Nico Hulkenberg", 0.91, 8.7, 8.0),
    ("LAW", "Liam Lawson", 0.84, 7.6, 7.8),
    ("BEA", "Oliver Bearman", 0.82, 7.4, 7.4),
    ("DOO", "Jack Doohan", 0.82, 7.3, 7.3),
    ("ANT", "Andrea Kimi Antonelli", 0.80, 7.5, 7.7),
    ("BOR", "Gabriel Bortoleto", 0.81, 7.2, 7.5),
    ("HAD", "Isack Hadjar", 0.81, 7.3, 7.4),
];

/// (team, race pace, tire mgmt, start, wet, sprint)
const TEAMS: [(&str, f64, f64, f64, f64, f64); 10] = [
    ("McLaren Mercedes", 1.02, 8.5, 8.0, 8.3, 8.4),
    ("Red Bull Racing Honda RBPT", 1.08, 9.0, 8.5, 9.0, 9.2),
    ("Ferrari", 1.04, 8.7, 7.5, 8.2, 8.6),
    ("Mercedes", 1.03, 8.2, 8.2, 8.8, 8.3),
    ("Racing Bulls Honda RBPT", 0.98, 7.5, 7.0, 7.6, 7.4),
    ("Williams Mercedes", 0.96, 7.0, 7.3, 7.2, 7.0),
    ("Alpine Renault", 0.97, 6.8, 7.4, 7.0, 7.1),
    ("Aston Martin Aramco Mercedes", 1.01, 7.2, 7.6, 7.8, 7.7),
    ("Kick Sauber Ferrari", 0.95, 6.5, 6.8, 6.5, 6.8),
    ("Haas Ferrari", 0.94, 6.0, 6.5, 6.8, 6.7),
];

/// Alias -> canonical team, in substring-matching order
const TEAM_ALIASES: [(&str, &str); 16] = [
    ("McLaren", "McLaren Mercedes"),
    ("McLaren Mercedes", "McLaren Mercedes"),
    ("Red Bull", "Red Bull Racing Honda RBPT"),
    ("Red Bull Racing", "Red Bull Racing Honda RBPT"),
    ("RB", "Racing Bulls Honda RBPT"),
    ("Racing Bulls", "Racing Bulls Honda RBPT"),
    ("VCARB", "Racing Bulls Honda RBPT"),
    ("Williams", "Williams Mercedes"),
    ("Alpine", "Alpine Renault"),
    ("Aston Martin", "Aston Martin Aramco Mercedes"),
    ("Sauber", "Kick Sauber Ferrari"),
    ("Kick Sauber", "Kick Sauber Ferrari"),
    ("Haas", "Haas Ferrari"),
    ("Haas F1 Team", "Haas Ferrari"),
    ("Mercedes", "Mercedes"),
    ("Ferrari", "Ferrari"),
];

/// 2025 calendar: (race, circuit, overtaking, degradation, start, sprint)
const TRACKS: [(&str, &str, u8, u8, u8, bool); 24] = [
    ("Australian Grand Prix", "Albert Park Circuit", 7, 6, 8, false),
    ("Chinese Grand Prix", "Shanghai International Circuit", 5, 6, 6, true),
    ("Japanese Grand Prix", "Suzuka Circuit", 8, 7, 7, false),
    ("Bahrain Grand Prix", "Bahrain International Circuit", 5, 8, 6, false),
    ("Saudi Arabian Grand Prix", "Jeddah Corniche Circuit", 6, 5, 7, false),
    ("Miami Grand Prix", "Miami International Autodrome", 6, 5, 7, true),
    ("Emilia Romagna Grand Prix", "Autodromo Enzo e Dino Ferrari", 8, 6, 7, false),
    ("Monaco Grand Prix", "Circuit de Monaco", 10, 3, 10, false),
    ("Spanish Grand Prix", "Circuit de Barcelona-Catalunya", 7, 7, 7, false),
    ("Canadian Grand Prix", "Circuit Gilles Villeneuve", 4, 6, 6, false),
    ("Austrian Grand Prix", "Red Bull Ring", 4, 7, 6, true),
    ("British Grand Prix", "Silverstone Circuit", 5, 7, 5, false),
    ("Belgian Grand Prix", "Circuit de Spa-Francorchamps", 3, 6, 4, false),
    ("Hungarian Grand Prix", "Hungaroring", 9, 5, 8, false),
    ("Dutch Grand Prix", "Circuit Zandvoort", 8, 5, 7, false),
    ("Italian Grand Prix", "Autodromo Nazionale Monza", 4, 5, 6, false),
    ("Azerbaijan Grand Prix", "Baku City Circuit", 5, 4, 7, true),
    ("Singapore Grand Prix", "Marina Bay Street Circuit", 9, 7, 8, false),
    ("United States Grand Prix", "Circuit of The Americas", 5, 6, 6, true),
    ("Mexican Grand Prix", "Autódromo Hermanos Rodríguez", 6, 4, 7, false),
    ("Brazilian Grand Prix", "Autódromo José Carlos Pace", 4, 6, 5, true),
    ("Las Vegas Grand Prix", "Las Vegas Strip Circuit", 5, 6, 7, false),
    ("Qatar Grand Prix", "Lusail International Circuit", 6, 8, 6, true),
    ("Abu Dhabi Grand Prix", "Yas Marina Circuit", 7, 5, 7, false),
];

/// Driver entry in the reference tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverProfile {
    pub code: String,
    pub name: String,
    #[serde(flatten)]
    pub characteristics: DriverCharacteristics,
}

/// Team entry in the reference tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub name: String,
    #[serde(flatten)]
    pub characteristics: TeamCharacteristics,
}

/// Team name variant and the canonical team it maps to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAlias {
    pub alias: String,
    pub team: String,
}

/// Serialized form of the reference tables (JSON override file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub drivers: Vec<DriverProfile>,
    pub teams: Vec<TeamProfile>,
    pub team_aliases: Vec<TeamAlias>,
    pub tracks: Vec<TrackProfile>,
    #[serde(default = "default_race")]
    pub default_race: String,
}

fn default_race() -> String {
    DEFAULT_RACE.to_string()
}

/// Immutable, indexed reference data
#[derive(Debug, Clone)]
pub struct ReferenceData {
    tables: ReferenceTables,
    drivers_by_code: HashMap<String, usize>,
    drivers_by_name: HashMap<String, usize>,
    teams_by_name: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    tracks_by_race: HashMap<String, usize>,
    default_track: usize,
}

impl ReferenceData {
    /// Built-in 2025 season tables
    pub fn builtin() -> Self {
        let tables = ReferenceTables {
            drivers: DRIVERS
                .iter()
                .map(|&(code, name, experience, wet, sprint)| DriverProfile {
                    code: code.to_string(),
                    name: name.to_string(),
                    characteristics: DriverCharacteristics {
                        experience,
                        wet_performance: wet,
                        sprint_performance: sprint,
                    },
                })
                .collect(),
            teams: TEAMS
                .iter()
                .map(|&(name, pace, tire, start, wet, sprint)| TeamProfile {
                    name: name.to_string(),
                    characteristics: TeamCharacteristics {
                        race_pace_factor: pace,
                        tire_mgmt: tire,
                        start_performance: start,
                        wet_performance: wet,
                        sprint_performance: sprint,
                    },
                })
                .collect(),
            team_aliases: TEAM_ALIASES
                .iter()
                .map(|&(alias, team)| TeamAlias {
                    alias: alias.to_string(),
                    team: team.to_string(),
                })
                .collect(),
            tracks: TRACKS
                .iter()
                .map(|&(race, circuit, od, td, si, sprint)| TrackProfile {
                    race: race.to_string(),
                    circuit: circuit.to_string(),
                    overtaking_difficulty: od,
                    tire_degradation: td,
                    start_importance: si,
                    is_sprint: sprint,
                })
                .collect(),
            default_race: default_race(),
        };

        // The built-in tables are consistent by construction
        Self::index(tables)
    }

    /// Load reference tables from a JSON file, replacing the built-in ones
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PodiumError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_json_str(&content)?;
        info!(
            "Loaded reference data from {:?}: {} drivers, {} teams, {} tracks",
            path,
            data.tables.drivers.len(),
            data.tables.teams.len(),
            data.tables.tracks.len()
        );
        Ok(data)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let tables: ReferenceTables = serde_json::from_str(json)?;
        Self::from_tables(tables)
    }

    /// Validate and index a set of tables
    pub fn from_tables(tables: ReferenceTables) -> Result<Self> {
        if !tables.tracks.iter().any(|t| t.race == tables.default_race) {
            return Err(PodiumError::ReferenceData(format!(
                "default race '{}' is not in the track table",
                tables.default_race
            )));
        }
        for alias in &tables.team_aliases {
            if !tables.teams.iter().any(|t| t.name == alias.team) {
                return Err(PodiumError::ReferenceData(format!(
                    "alias '{}' points at unknown team '{}'",
                    alias.alias, alias.team
                )));
            }
        }
        for track in &tables.tracks {
            for (label, value) in [
                ("overtaking_difficulty", track.overtaking_difficulty),
                ("tire_degradation", track.tire_degradation),
                ("start_importance", track.start_importance),
            ] {
                if !(1..=10).contains(&value) {
                    return Err(PodiumError::ReferenceData(format!(
                        "{} of '{}' must be 1-10, got {}",
                        label, track.race, value
                    )));
                }
            }
        }
        Ok(Self::index(tables))
    }

    fn index(tables: ReferenceTables) -> Self {
        let drivers_by_code = position_index(tables.drivers.iter().map(|d| d.code.as_str()));
        let drivers_by_name = position_index(tables.drivers.iter().map(|d| d.name.as_str()));
        let teams_by_name = position_index(tables.teams.iter().map(|t| t.name.as_str()));
        let aliases = position_index(tables.team_aliases.iter().map(|a| a.alias.as_str()));
        let tracks_by_race = position_index(tables.tracks.iter().map(|t| t.race.as_str()));
        let default_track = tracks_by_race
            .get(&tables.default_race)
            .copied()
            .unwrap_or(0);

        Self {
            tables,
            drivers_by_code,
            drivers_by_name,
            teams_by_name,
            aliases,
            tracks_by_race,
            default_track,
        }
    }

    /// Driver profile by three-letter code
    pub fn driver_by_code(&self, code: &str) -> Option<&DriverProfile> {
        self.drivers_by_code
            .get(code)
            .map(|&i| &self.tables.drivers[i])
    }

    /// Driver profile by canonical full name
    pub fn driver(&self, name: &str) -> Option<&DriverProfile> {
        self.drivers_by_name
            .get(name)
            .map(|&i| &self.tables.drivers[i])
    }

    pub fn is_canonical_driver(&self, name: &str) -> bool {
        self.drivers_by_name.contains_key(name)
    }

    /// Canonical driver names in table order
    pub fn driver_names(&self) -> impl Iterator<Item = &str> {
        self.tables.drivers.iter().map(|d| d.name.as_str())
    }

    pub fn drivers(&self) -> &[DriverProfile] {
        &self.tables.drivers
    }

    /// Characteristics of a canonical team
    pub fn team(&self, name: &str) -> Option<&TeamCharacteristics> {
        self.teams_by_name
            .get(name)
            .map(|&i| &self.tables.teams[i].characteristics)
    }

    pub fn is_canonical_team(&self, name: &str) -> bool {
        self.teams_by_name.contains_key(name)
    }

    /// Canonical team for an exact alias
    pub fn team_alias(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(alias)
            .map(|&i| self.tables.team_aliases[i].team.as_str())
    }

    /// Aliases in substring-matching order
    pub fn team_aliases(&self) -> &[TeamAlias] {
        &self.tables.team_aliases
    }

    pub fn teams(&self) -> &[TeamProfile] {
        &self.tables.teams
    }

    /// Exact track lookup
    pub fn find_track(&self, race: &str) -> Option<&TrackProfile> {
        self.tracks_by_race
            .get(race)
            .map(|&i| &self.tables.tracks[i])
    }

    /// Track profile for a race, falling back to the default track
    pub fn track(&self, race: &str) -> &TrackProfile {
        match self.find_track(race) {
            Some(track) => track,
            None => {
                let fallback = self.default_track();
                warn!(
                    "Unknown race '{}', using {} track profile",
                    race, fallback.race
                );
                fallback
            }
        }
    }

    pub fn default_track(&self) -> &TrackProfile {
        &self.tables.tracks[self.default_track]
    }

    /// Tracks in calendar order
    pub fn tracks(&self) -> &[TrackProfile] {
        &self.tables.tracks
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }
}

/// Key -> row index, first occurrence wins
fn position_index<'a>(keys: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, key) in keys.enumerate() {
        map.entry(key.to_string()).or_insert(i);
    }
    map
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}
