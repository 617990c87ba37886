//! Project health metrics, risks, and recommendations.
//!
//! The analyzer is a pure function of the fetched snapshots and a caller
//! supplied `now`; it performs no I/O and never reads the clock itself, so
//! identical inputs always produce an identical report.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{IssueSnapshot, ProjectSnapshot, StateType};

/// Overdue-issue count above which the risk is rated high.
pub const OVERDUE_HIGH_THRESHOLD: usize = 5;
/// Blocked-issue count above which the risk is rated high.
pub const BLOCKED_HIGH_THRESHOLD: usize = 3;
/// Per-assignee issue count above which the workload recommendation fires.
pub const WORKLOAD_LIMIT: usize = 5;
/// Progress percentage below which a project counts as behind.
pub const SCHEDULE_PROGRESS_FLOOR: f64 = 50.0;
/// Days-until-target below which the schedule recommendation fires.
pub const SCHEDULE_WINDOW_DAYS: i64 = 30;

/// Recommendation emitted when one assignee carries too many issues.
pub const WORKLOAD_RECOMMENDATION: &str =
    "Consider redistributing work - some team members have too many assignments";
/// Recommendation emitted when a project is behind with a near target date.
pub const SCHEDULE_RECOMMENDATION: &str =
    "Project progress is behind schedule - consider scope adjustment";

/// Risk categories surfaced by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    /// Issues whose due date has passed.
    OverdueIssues,
    /// Issues sitting in a blocked state.
    BlockedIssues,
}

/// Risk severity. The analyzer only ever emits medium or high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    /// Informational.
    Low,
    /// Worth attention.
    Medium,
    /// Needs intervention.
    High,
}

/// A single identified risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    /// Risk category.
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    /// Severity rating.
    pub severity: RiskSeverity,
    /// Number of issues contributing to the risk, always at least 1.
    pub count: usize,
}

/// Completion/blocked/in-progress rates for a project, each 0-100.
///
/// All three rates are NaN when the issue set is empty; the division is
/// left unguarded on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Percentage of issues in a completed state.
    pub completion_rate: f64,
    /// Percentage of issues in a blocked state.
    pub blocked_rate: f64,
    /// Percentage of issues in a started state.
    pub in_progress_rate: f64,
}

/// Derived health report for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Project name.
    pub name: String,
    /// Rate metrics.
    pub metrics: HealthMetrics,
    /// Identified risks, overdue before blocked.
    pub risks: Vec<RiskEntry>,
    /// Recommendation strings, workload before schedule.
    pub recommendations: Vec<String>,
}

/// Derived statistics for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStats {
    /// Total issues in the cycle.
    pub total_issues: usize,
    /// Issues in a completed state.
    pub completed_issues: usize,
    /// Issues in a started state.
    pub in_progress_issues: usize,
    /// Issues in a backlog or unstarted state.
    pub backlog_issues: usize,
    /// Completion percentage; 0 when the cycle has no issues.
    pub completion_rate: f64,
    /// Net scope change since the cycle started.
    pub scope_change: f64,
}

/// Compute the health report for a project from its issue snapshots.
pub fn analyze_project_health(
    project: &ProjectSnapshot,
    issues: &[IssueSnapshot],
    now: DateTime<Utc>,
) -> HealthReport {
    let total = issues.len();
    let completed = count_state(issues, StateType::Completed);
    let blocked = count_state(issues, StateType::Blocked);
    let started = count_state(issues, StateType::Started);

    HealthReport {
        name: project.name.clone(),
        metrics: HealthMetrics {
            completion_rate: rate(completed, total),
            blocked_rate: rate(blocked, total),
            in_progress_rate: rate(started, total),
        },
        risks: identify_risks(issues, now),
        recommendations: build_recommendations(project, issues, now),
    }
}

/// Compute summary statistics for a cycle from its issue snapshots.
pub fn cycle_stats(issues: &[IssueSnapshot], scope_change: f64) -> CycleStats {
    let total = issues.len();
    let completed = count_state(issues, StateType::Completed);
    let in_progress = count_state(issues, StateType::Started);
    let backlog =
        count_state(issues, StateType::Backlog) + count_state(issues, StateType::Unstarted);

    let completion_rate = if total > 0 {
        (completed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    CycleStats {
        total_issues: total,
        completed_issues: completed,
        in_progress_issues: in_progress,
        backlog_issues: backlog,
        completion_rate,
        scope_change,
    }
}

fn count_state(issues: &[IssueSnapshot], state: StateType) -> usize {
    issues
        .iter()
        .filter(|issue| issue.state_type == Some(state))
        .count()
}

fn rate(matched: usize, total: usize) -> f64 {
    (matched as f64 / total as f64) * 100.0
}

fn identify_risks(issues: &[IssueSnapshot], now: DateTime<Utc>) -> Vec<RiskEntry> {
    let mut risks = Vec::new();

    let overdue = issues
        .iter()
        .filter(|issue| is_overdue(issue, now))
        .count();
    if overdue > 0 {
        risks.push(RiskEntry {
            risk_type: RiskType::OverdueIssues,
            severity: severity_for(overdue, OVERDUE_HIGH_THRESHOLD),
            count: overdue,
        });
    }

    let blocked = count_state(issues, StateType::Blocked);
    if blocked > 0 {
        risks.push(RiskEntry {
            risk_type: RiskType::BlockedIssues,
            severity: severity_for(blocked, BLOCKED_HIGH_THRESHOLD),
            count: blocked,
        });
    }

    risks
}

fn severity_for(count: usize, high_threshold: usize) -> RiskSeverity {
    if count > high_threshold {
        RiskSeverity::High
    } else {
        RiskSeverity::Medium
    }
}

fn is_overdue(issue: &IssueSnapshot, now: DateTime<Utc>) -> bool {
    issue
        .due_date
        .map(|due| due.and_time(NaiveTime::MIN).and_utc() < now)
        .unwrap_or(false)
}

fn build_recommendations(
    project: &ProjectSnapshot,
    issues: &[IssueSnapshot],
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let mut per_assignee: HashMap<&str, usize> = HashMap::new();
    for issue in issues {
        if let Some(name) = issue.assignee.as_deref() {
            *per_assignee.entry(name).or_insert(0) += 1;
        }
    }
    // max() of no assignees is None, which simply skips the check.
    if let Some(max_load) = per_assignee.values().copied().max() {
        if max_load > WORKLOAD_LIMIT {
            recommendations.push(WORKLOAD_RECOMMENDATION.to_string());
        }
    }

    if project.progress < SCHEDULE_PROGRESS_FLOOR {
        if let Some(target) = project.target_date {
            let target_instant = target.and_time(NaiveTime::MIN).and_utc();
            let days_until =
                ((target_instant - now).num_milliseconds() as f64 / 86_400_000.0).ceil() as i64;
            if days_until < SCHEDULE_WINDOW_DAYS {
                recommendations.push(SCHEDULE_RECOMMENDATION.to_string());
            }
        }
    }

    recommendations
}
