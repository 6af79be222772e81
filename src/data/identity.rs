//! Driver and team name standardization
//!
//! Timing sources disagree on naming: some use three-letter codes, some full
//! names, some sponsor-laden team names. Everything is resolved to the
//! canonical names in [`ReferenceData`], which then serve as join keys.
//! Names that cannot be resolved pass through unchanged.

use crate::models::DriverIdentity;
use crate::reference::ReferenceData;

/// Resolves raw driver and team strings against the reference tables
#[derive(Debug, Clone, Copy)]
pub struct IdentityNormalizer<'r> {
    reference: &'r ReferenceData,
}

impl<'r> IdentityNormalizer<'r> {
    pub fn new(reference: &'r ReferenceData) -> Self {
        Self { reference }
    }

    /// Canonical full name for a driver code, name or partial name
    pub fn driver(&self, raw: &str) -> String {
        if raw.is_empty() {
            return raw.to_string();
        }

        if raw.chars().count() == 3 && raw.to_uppercase() == raw {
            return self
                .reference
                .driver_by_code(raw)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| raw.to_string());
        }

        if self.reference.is_canonical_driver(raw) {
            return raw.to_string();
        }

        self.reference
            .driver_names()
            .find(|name| name.contains(raw))
            .unwrap_or(raw)
            .to_string()
    }

    /// Canonical identity, carrying the driver code when resolved
    pub fn driver_identity(&self, raw: &str) -> DriverIdentity {
        let name = self.driver(raw);
        let code = self.reference.driver(&name).map(|d| d.code.clone());
        DriverIdentity { name, code }
    }

    /// Canonical team name for a team string or alias
    pub fn team(&self, raw: &str) -> String {
        if raw.is_empty() || self.reference.is_canonical_team(raw) {
            return raw.to_string();
        }

        if let Some(team) = self.reference.team_alias(raw) {
            return team.to_string();
        }

        self.reference
            .team_aliases()
            .iter()
            .find(|a| raw.contains(a.alias.as_str()) || a.alias.contains(raw))
            .map(|a| a.team.clone())
            .unwrap_or_else(|| raw.to_string())
    }
}
