use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cycle::errors::CycleError;
use crate::fetch::Character;

/// Text shown in both HP cells of a row that could not be fetched.
pub const UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RowStatus {
    Ok,
    Unavailable { reason: String },
}

/// One rendered line of the HP table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: String,
    pub name: String,
    pub current_hp: String,
    pub max_hp: String,
    pub status: RowStatus,
}

impl ResultRow {
    pub fn unavailable(id: &str, name: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            current_hp: UNAVAILABLE.to_string(),
            max_hp: UNAVAILABLE.to_string(),
            status: RowStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == RowStatus::Ok
    }
}

impl From<Character> for ResultRow {
    fn from(character: Character) -> Self {
        Self {
            id: character.id,
            name: character.name,
            current_hp: character.current_hp,
            max_hp: character.max_hp,
            status: RowStatus::Ok,
        }
    }
}

/// Everything one successful cycle produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Start order of the cycle, from 1.
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub campaign_name: String,
    /// One row per roster member, in completion order.
    pub rows: Vec<ResultRow>,
}

impl CycleReport {
    pub fn unavailable_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_available()).count()
    }
}

/// A cycle that produced no rows, with the context needed to report it.
#[derive(Debug, thiserror::Error)]
#[error("cycle {cycle} started {} failed: {error}", .started_at.format("%Y-%m-%d %H:%M:%S UTC"))]
pub struct CycleFailure {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    #[source]
    pub error: CycleError,
}

/// What the scheduler hands the presenter for each cycle.
pub type CycleOutcome = Result<CycleReport, CycleFailure>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterError;
    use chrono::TimeZone;

    #[test]
    fn test_row_from_character() {
        let row = ResultRow::from(Character {
            id: "100".to_string(),
            name: "Aldric".to_string(),
            current_hp: "10".to_string(),
            max_hp: "20".to_string(),
        });
        assert!(row.is_available());
        assert_eq!(row.current_hp, "10");
    }

    #[test]
    fn test_unavailable_row() {
        let row = ResultRow::unavailable("200", "Mira", "timed out");
        assert!(!row.is_available());
        assert_eq!(row.current_hp, UNAVAILABLE);
        assert_eq!(row.max_hp, UNAVAILABLE);
    }

    #[test]
    fn test_failure_display_has_cycle_and_time() {
        let failure = CycleFailure {
            cycle: 3,
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            error: CycleError::Resolve {
                source: RosterError::Status {
                    seed_id: "100".to_string(),
                    status: 500,
                },
            },
        };
        assert_eq!(
            failure.to_string(),
            "cycle 3 started 2024-05-01 12:30:00 UTC failed: Roster resolution failed: Character API returned HTTP 500 for '100'"
        );
    }

    #[test]
    fn test_row_status_serialization() {
        let json = serde_json::to_string(&RowStatus::Unavailable {
            reason: "gone".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"unavailable","reason":"gone"}"#);
    }
}
