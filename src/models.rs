use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed onboarding pipeline. Columns appear in this order everywhere:
/// the status table, summaries, and the CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    SigningContract,
    Training,
    Oec,
    Stamp,
    Booking,
}

impl Milestone {
    pub const ALL: [Milestone; 5] = [
        Milestone::SigningContract,
        Milestone::Training,
        Milestone::Oec,
        Milestone::Stamp,
        Milestone::Booking,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Milestone::SigningContract => "signing_contract",
            Milestone::Training => "training",
            Milestone::Oec => "oec",
            Milestone::Stamp => "stamp",
            Milestone::Booking => "booking",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Milestone::SigningContract => "Signing Contract",
            Milestone::Training => "Training",
            Milestone::Oec => "OEC",
            Milestone::Stamp => "Stamp",
            Milestone::Booking => "Booking",
        }
    }

    /// Accepts the stable id or the display label, case-insensitively.
    pub fn parse(input: &str) -> Option<Milestone> {
        let needle = input.trim().to_ascii_lowercase();
        Milestone::ALL.into_iter().find(|m| {
            m.id() == needle
                || m.label().to_ascii_lowercase() == needle
                || m.id().replace('_', "-") == needle
        })
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-milestone state. Older exports used "pending" and "select" for the
/// empty state; both decode to `Unset` so legacy blobs normalize on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    #[serde(alias = "pending", alias = "select")]
    Unset,
    Waiting,
    Done,
    Issue,
}

impl Status {
    pub fn parse(input: &str) -> Option<Status> {
        match input.trim().to_ascii_lowercase().as_str() {
            "unset" | "pending" | "select" => Some(Status::Unset),
            "waiting" => Some(Status::Waiting),
            "done" => Some(Status::Done),
            "issue" => Some(Status::Issue),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unset => "unset",
            Status::Waiting => "waiting",
            Status::Done => "done",
            Status::Issue => "issue",
        };
        f.write_str(s)
    }
}

/// One cell of the status table. Exists only once something has been set
/// for the milestone; absence in `StatusMap` means "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    #[serde(default)]
    pub status: Status,
    /// Stored verbatim; expected to be ISO `YYYY-MM-DD` but never validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub updated_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Fixed-size status map, one slot per known milestone. Keeping the slots
/// as named fields makes the column set exhaustive at compile time; the
/// accessors below cover generic iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_contract: Option<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training: Option<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oec: Option<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp: Option<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<StatusEntry>,
}

impl StatusMap {
    pub fn get(&self, milestone: Milestone) -> Option<&StatusEntry> {
        match milestone {
            Milestone::SigningContract => self.signing_contract.as_ref(),
            Milestone::Training => self.training.as_ref(),
            Milestone::Oec => self.oec.as_ref(),
            Milestone::Stamp => self.stamp.as_ref(),
            Milestone::Booking => self.booking.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, milestone: Milestone) -> &mut Option<StatusEntry> {
        match milestone {
            Milestone::SigningContract => &mut self.signing_contract,
            Milestone::Training => &mut self.training,
            Milestone::Oec => &mut self.oec,
            Milestone::Stamp => &mut self.stamp,
            Milestone::Booking => &mut self.booking,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Milestone, &StatusEntry)> {
        Milestone::ALL
            .into_iter()
            .filter_map(|m| self.get(m).map(|entry| (m, entry)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Structured audit action. Display strings are produced by `describe`,
/// keeping the log semantics separate from how they render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Created,
    StatusChanged {
        from: Status,
        to: Status,
    },
    DateUpdated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        to: String,
    },
    NoteUpdated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        to: String,
    },
}

impl Action {
    pub fn describe(&self) -> String {
        match self {
            Action::Created => "Created".to_string(),
            Action::StatusChanged { to, .. } => format!("Status: {to}"),
            Action::DateUpdated { .. } => "Date updated".to_string(),
            Action::NoteUpdated { .. } => "Note updated".to_string(),
        }
    }
}

/// One audit-trail entry. History is append-only and stored newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLog {
    pub id: Uuid,
    /// Milestone display label, or "System" for lifecycle entries.
    pub milestone: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recommended: bool,
    #[serde(default)]
    pub statuses: StatusMap,
    #[serde(default)]
    pub history: Vec<UpdateLog>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Worker {
        Worker {
            id: Uuid::new_v4(),
            name: name.into(),
            recommended: false,
            statuses: StatusMap::default(),
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneCounts {
    pub waiting: usize,
    pub done: usize,
    pub issue: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneBreakdown {
    pub milestone: Milestone,
    #[serde(flatten)]
    pub counts: MilestoneCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReportSummary {
    pub total_workers: usize,
    /// workers × milestone columns; the denominator for progress.
    pub total_slots: usize,
    pub completed: usize,
    pub waiting: usize,
    pub issues: usize,
    pub breakdown: Vec<MilestoneBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    pub worker_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCategory {
    pub name: String,
    pub count: usize,
    pub items: Vec<ReportItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedStats {
    pub recent_completions: Vec<ReportCategory>,
    pub bottlenecks: Vec<ReportCategory>,
    pub critical_issues: Vec<ReportCategory>,
    pub upcoming_arrivals: Vec<ReportItem>,
}

/// Immutable weekly snapshot: the full worker list at save time plus the
/// derived summary and stats, keyed by calendar week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub week: String,
    pub created_at: DateTime<Utc>,
    pub workers: Vec<Worker>,
    pub summary: WeeklyReportSummary,
    pub stats: DetailedStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    /// Absent for externally-authenticated accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub color: String,
}

/// Roster seeded on first run and after an unreadable workers blob.
pub fn default_roster() -> Vec<Worker> {
    let names = [
        "MARILYN GABRIEL",
        "FLORIDA PASION",
        "VICTORIA GUARDA BURCIA",
        "JENNIFER VALENZUELA RAPSING",
        "MARY ANN PORLARES MAGALLON",
        "ALMA YUGA LAPITAN",
        "MA. NIÑA MONTALBAN",
        "MARY JANE QUIATZON",
        "LLANTOS, ALMA OBLINA",
        "MARIA ISABEL LAGAN",
        "JOAN BUSACO GALVEZ",
        "CHARRIE JADE RAMIREZ",
    ];

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut worker = Worker::new(name);
            // Fifth roster entry carries the recommendation flag.
            worker.recommended = i == 4;
            worker
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_pending_decodes_to_unset() {
        let entry: StatusEntry = serde_json::from_str(
            r#"{"status":"pending","updated_by":"ops","timestamp":"2026-08-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.status, Status::Unset);

        let entry: StatusEntry = serde_json::from_str(
            r#"{"status":"select","updated_by":"ops","timestamp":"2026-08-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.status, Status::Unset);
    }

    #[test]
    fn milestone_parse_accepts_id_and_label() {
        assert_eq!(Milestone::parse("training"), Some(Milestone::Training));
        assert_eq!(Milestone::parse("OEC"), Some(Milestone::Oec));
        assert_eq!(
            Milestone::parse("Signing Contract"),
            Some(Milestone::SigningContract)
        );
        assert_eq!(
            Milestone::parse("signing-contract"),
            Some(Milestone::SigningContract)
        );
        assert_eq!(Milestone::parse("visa"), None);
    }

    #[test]
    fn status_map_iterates_in_column_order() {
        let mut map = StatusMap::default();
        assert!(map.is_empty());

        let entry = StatusEntry {
            status: Status::Waiting,
            date: None,
            note: None,
            updated_by: "ops".to_string(),
            timestamp: Utc::now(),
        };
        *map.slot_mut(Milestone::Booking) = Some(entry.clone());
        *map.slot_mut(Milestone::Training) = Some(entry);

        let order: Vec<Milestone> = map.iter().map(|(m, _)| m).collect();
        assert_eq!(order, vec![Milestone::Training, Milestone::Booking]);
    }

    #[test]
    fn action_display_strings() {
        assert_eq!(Action::Created.describe(), "Created");
        assert_eq!(
            Action::StatusChanged {
                from: Status::Unset,
                to: Status::Waiting
            }
            .describe(),
            "Status: waiting"
        );
        assert_eq!(
            Action::DateUpdated {
                from: None,
                to: "2026-09-01".to_string()
            }
            .describe(),
            "Date updated"
        );
        assert_eq!(
            Action::NoteUpdated {
                from: None,
                to: "stuck".to_string()
            }
            .describe(),
            "Note updated"
        );
    }

    #[test]
    fn default_roster_has_twelve_clean_workers() {
        let roster = default_roster();
        assert_eq!(roster.len(), 12);
        assert!(roster.iter().all(|w| w.statuses.is_empty()));
        assert!(roster.iter().all(|w| w.history.is_empty()));
        assert_eq!(roster.iter().filter(|w| w.recommended).count(), 1);
    }
}
