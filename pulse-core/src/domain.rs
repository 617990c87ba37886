//! Snapshot entities for Pulse.
//!
//! Every type here is an immutable, fully-resolved copy of a remote record
//! captured at fetch time. Snapshots are built fresh per command invocation
//! and discarded at process exit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Coarse workflow bucket of an issue, distinct from its human-readable
/// state name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    /// Not yet triaged into a cycle.
    Backlog,
    /// Triaged but not picked up.
    Unstarted,
    /// Actively being worked on.
    Started,
    /// Blocked on something external.
    Blocked,
    /// Done.
    Completed,
    /// Abandoned.
    Canceled,
}

impl StateType {
    /// Parse a wire state-type string. Unknown values resolve to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "backlog" => Some(Self::Backlog),
            "unstarted" => Some(Self::Unstarted),
            "started" => Some(Self::Started),
            "blocked" => Some(Self::Blocked),
            "completed" => Some(Self::Completed),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

/// A fully-resolved issue record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSnapshot {
    /// Opaque upstream identifier.
    pub id: String,
    /// Human-readable key, e.g. `ENG-123`.
    pub identifier: String,
    /// Issue title.
    pub title: String,
    /// Issue description, if any.
    pub description: Option<String>,
    /// Workflow bucket, absent when the state could not be resolved.
    pub state_type: Option<StateType>,
    /// Human-readable state name, absent when unresolved.
    pub state_name: Option<String>,
    /// Priority 0-4, 0 meaning no priority.
    pub priority: u8,
    /// Due date, if set.
    pub due_date: Option<NaiveDate>,
    /// Assignee display name, absent when unassigned or unresolved.
    pub assignee: Option<String>,
    /// Owning project id, absent when the issue has no project.
    pub project_id: Option<String>,
    /// Owning project name.
    pub project_name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Label names attached to the issue.
    pub labels: Vec<String>,
    /// Web URL of the issue, if known.
    pub url: Option<String>,
}

/// A fully-resolved project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    /// Opaque upstream identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Project description, if any.
    pub description: Option<String>,
    /// Workflow state label, e.g. `started`.
    pub state: Option<String>,
    /// Completion percentage, 0-100.
    pub progress: f64,
    /// Target completion date, if set.
    pub target_date: Option<NaiveDate>,
    /// Owning team id, if known.
    pub team_id: Option<String>,
}

/// A team record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    /// Opaque upstream identifier.
    pub id: String,
    /// Team name.
    pub name: String,
    /// Short team key, e.g. `ENG`.
    pub key: String,
    /// Team description, if any.
    pub description: Option<String>,
    /// Whether the team is private.
    pub private: bool,
    /// Number of members, when the upstream reports it.
    pub member_count: Option<u64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, if known.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A team member record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSnapshot {
    /// Opaque upstream identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address, if visible.
    pub email: Option<String>,
    /// Workspace role, if visible.
    pub role: Option<String>,
    /// Whether the account is active.
    pub active: bool,
}

/// A cycle (sprint) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSnapshot {
    /// Opaque upstream identifier.
    pub id: String,
    /// Cycle name; unnamed cycles fall back to their number for display.
    pub name: Option<String>,
    /// Sequential cycle number within the team.
    pub number: u32,
    /// Cycle status, e.g. `active` or `upcoming`.
    pub status: Option<String>,
    /// Start timestamp.
    pub starts_at: Option<DateTime<Utc>>,
    /// End timestamp.
    pub ends_at: Option<DateTime<Utc>>,
    /// Completion percentage, when the upstream reports it.
    pub progress: Option<f64>,
    /// Net scope change since the cycle started.
    pub scope_change: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl CycleSnapshot {
    /// Display name, falling back to `Cycle <number>` for unnamed cycles.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Cycle {}", self.number))
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnapshot {
    /// Comment body, markdown.
    pub body: String,
    /// Author display name, absent when the author could not be resolved.
    pub author: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An initiative record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeSnapshot {
    /// Opaque upstream identifier.
    pub id: String,
    /// Initiative name.
    pub name: String,
    /// Initiative status label.
    pub status: Option<String>,
    /// Initiative description, if any.
    pub description: Option<String>,
}

/// Human-readable label for an issue priority value.
pub fn priority_label(priority: u8) -> &'static str {
    match priority {
        0 => "No priority",
        1 => "Urgent",
        2 => "High",
        3 => "Medium",
        4 => "Low",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::{CycleSnapshot, StateType, priority_label};
    use chrono::Utc;

    #[test]
    fn state_type_parses_known_values() {
        assert_eq!(StateType::parse("backlog"), Some(StateType::Backlog));
        assert_eq!(StateType::parse("unstarted"), Some(StateType::Unstarted));
        assert_eq!(StateType::parse("started"), Some(StateType::Started));
        assert_eq!(StateType::parse("blocked"), Some(StateType::Blocked));
        assert_eq!(StateType::parse("completed"), Some(StateType::Completed));
        assert_eq!(StateType::parse("canceled"), Some(StateType::Canceled));
    }

    #[test]
    fn state_type_rejects_unknown_values() {
        assert_eq!(StateType::parse("triage"), None);
        assert_eq!(StateType::parse(""), None);
    }

    #[test]
    fn state_type_serializes_lowercase() {
        let json = serde_json::to_string(&StateType::Completed).expect("serialize");
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn priority_labels_cover_range() {
        assert_eq!(priority_label(0), "No priority");
        assert_eq!(priority_label(1), "Urgent");
        assert_eq!(priority_label(2), "High");
        assert_eq!(priority_label(3), "Medium");
        assert_eq!(priority_label(4), "Low");
        assert_eq!(priority_label(9), "Unknown");
    }

    #[test]
    fn cycle_display_name_falls_back_to_number() {
        let cycle = CycleSnapshot {
            id: "cyc-1".to_string(),
            name: None,
            number: 7,
            status: Some("active".to_string()),
            starts_at: None,
            ends_at: None,
            progress: None,
            scope_change: 0.0,
            created_at: Utc::now(),
        };
        assert_eq!(cycle.display_name(), "Cycle 7");

        let named = CycleSnapshot {
            name: Some("Q3 Hardening".to_string()),
            ..cycle
        };
        assert_eq!(named.display_name(), "Q3 Hardening");
    }
}
