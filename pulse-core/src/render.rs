//! Text rendering for command output.
//!
//! Commands hand fully-resolved snapshots to these renderers; nothing here
//! reaches back into a gateway. JSON output goes through [`render_json`]
//! instead.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::analysis::{DependencyAnalysis, DuplicateAnalysis};
use crate::candidates::ProjectIssues;
use crate::domain::{
    CommentSnapshot, CycleSnapshot, InitiativeSnapshot, IssueSnapshot, MemberSnapshot,
    ProjectSnapshot, TeamSnapshot, priority_label,
};
use crate::health::{CycleStats, HealthReport, RiskSeverity, RiskType};

const TITLE_WIDTH: usize = 40;
const DESCRIPTION_WIDTH: usize = 30;

/// Render any serializable payload as pretty-printed JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Render a list of teams.
pub fn render_teams_text(teams: &[TeamSnapshot]) -> String {
    let mut output = String::new();
    for team in teams {
        let _ = writeln!(output, "ID: {}", team.id);
        let _ = writeln!(output, "Name: {}", team.name);
        let _ = writeln!(output, "Key: {}", team.key);
        let _ = writeln!(output, "Members: {}", display_count(team.member_count));
        let _ = writeln!(
            output,
            "Description: {}",
            display_truncated(team.description.as_deref(), DESCRIPTION_WIDTH)
        );
        let _ = writeln!(output);
    }
    output
}

/// Render detailed information for one team.
pub fn render_team_detail_text(team: &TeamSnapshot) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Team Information: {}\n", team.name);
    let _ = writeln!(output, "ID: {}", team.id);
    let _ = writeln!(output, "Name: {}", team.name);
    let _ = writeln!(output, "Key: {}", team.key);
    let _ = writeln!(
        output,
        "Description: {}",
        team.description.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(output, "Private: {}", if team.private { "Yes" } else { "No" });
    let _ = writeln!(output, "Created At: {}", format_date_time(team.created_at));
    let _ = writeln!(
        output,
        "Updated At: {}",
        team.updated_at.map(format_date_time).unwrap_or_else(na)
    );
    output
}

/// Render a list of team members.
pub fn render_members_text(members: &[MemberSnapshot]) -> String {
    let mut output = String::new();
    for member in members {
        let _ = writeln!(output, "ID: {}", member.id);
        let _ = writeln!(output, "Name: {}", member.name);
        let _ = writeln!(output, "Email: {}", member.email.as_deref().unwrap_or("N/A"));
        let _ = writeln!(output, "Role: {}", member.role.as_deref().unwrap_or("N/A"));
        let _ = writeln!(output, "Active: {}", if member.active { "Yes" } else { "No" });
        let _ = writeln!(output);
    }
    output
}

/// Render a list of projects.
pub fn render_projects_text(projects: &[ProjectSnapshot]) -> String {
    let mut output = String::new();
    for project in projects {
        let _ = writeln!(output, "ID: {}", project.id);
        let _ = writeln!(output, "Name: {}", project.name);
        let _ = writeln!(output, "Status: {}", project.state.as_deref().unwrap_or("N/A"));
        let _ = writeln!(output, "Progress: {}%", project.progress);
        let _ = writeln!(
            output,
            "Target Date: {}",
            project.target_date.map(format_date).unwrap_or_else(na)
        );
        let _ = writeln!(
            output,
            "Description: {}",
            display_truncated(project.description.as_deref(), DESCRIPTION_WIDTH)
        );
        let _ = writeln!(output);
    }
    output
}

/// Render a one-project summary.
pub fn render_project_detail_text(project: &ProjectSnapshot) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", project.name);
    if let Some(description) = project.description.as_deref() {
        let _ = writeln!(output, "{description}");
    }
    let _ = writeln!(output, "Progress: {}%", project.progress);
    output
}

/// Render a list of cycles.
pub fn render_cycles_text(cycles: &[CycleSnapshot]) -> String {
    let mut output = String::new();
    for cycle in cycles {
        let _ = writeln!(output, "ID: {}", cycle.id);
        let _ = writeln!(output, "Name: {}", cycle.display_name());
        let _ = writeln!(output, "Status: {}", cycle.status.as_deref().unwrap_or("N/A"));
        let _ = writeln!(
            output,
            "Start Date: {}",
            cycle.starts_at.map(format_date_time).unwrap_or_else(na)
        );
        let _ = writeln!(
            output,
            "End Date: {}",
            cycle.ends_at.map(format_date_time).unwrap_or_else(na)
        );
        let _ = writeln!(
            output,
            "Progress: {}",
            cycle
                .progress
                .map(|p| format!("{p}%"))
                .unwrap_or_else(na)
        );
        let _ = writeln!(output);
    }
    output
}

/// Render detailed information for one cycle, including its statistics.
pub fn render_cycle_detail_text(cycle: &CycleSnapshot, stats: &CycleStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Cycle Information: {}\n", cycle.display_name());
    let _ = writeln!(output, "ID: {}", cycle.id);
    let _ = writeln!(output, "Name: {}", cycle.display_name());
    let _ = writeln!(output, "Number: {}", cycle.number);
    let _ = writeln!(output, "Status: {}", cycle.status.as_deref().unwrap_or("N/A"));
    let _ = writeln!(
        output,
        "Start Date: {}",
        cycle.starts_at.map(format_date_time).unwrap_or_else(na)
    );
    let _ = writeln!(
        output,
        "End Date: {}",
        cycle.ends_at.map(format_date_time).unwrap_or_else(na)
    );
    let _ = writeln!(output, "Created At: {}", format_date_time(cycle.created_at));
    let _ = writeln!(output);
    output.push_str(&render_cycle_stats_text(stats));
    output
}

/// Render computed cycle statistics.
pub fn render_cycle_stats_text(stats: &CycleStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Cycle Statistics:");
    let _ = writeln!(output, "Total Issues: {}", stats.total_issues);
    let _ = writeln!(output, "Completed Issues: {}", stats.completed_issues);
    let _ = writeln!(output, "Completion Rate: {:.1}%", stats.completion_rate);
    let _ = writeln!(output, "In Progress Issues: {}", stats.in_progress_issues);
    let _ = writeln!(output, "Backlog Issues: {}", stats.backlog_issues);
    let scope = stats.scope_change;
    let _ = writeln!(
        output,
        "Scope Change: {}",
        if scope > 0.0 {
            format!("+{scope}")
        } else {
            format!("{scope}")
        }
    );
    output
}

/// Render a list of issues.
pub fn render_issues_text(issues: &[IssueSnapshot]) -> String {
    let mut output = String::new();
    for issue in issues {
        let _ = writeln!(output, "ID: {}", issue.identifier);
        let _ = writeln!(output, "Title: {}", truncate(&issue.title, TITLE_WIDTH));
        let _ = writeln!(
            output,
            "Status: {}",
            issue.state_name.as_deref().unwrap_or("N/A")
        );
        let _ = writeln!(
            output,
            "Project: {}",
            issue.project_name.as_deref().unwrap_or("N/A")
        );
        let _ = writeln!(output, "Priority: {}", priority_label(issue.priority));
        let _ = writeln!(
            output,
            "Assignee: {}",
            issue.assignee.as_deref().unwrap_or("Unassigned")
        );
        let _ = writeln!(
            output,
            "Due Date: {}",
            issue.due_date.map(format_date).unwrap_or_else(na)
        );
        let _ = writeln!(output);
    }
    output
}

/// Render detailed information for one issue, including comments.
pub fn render_issue_detail_text(issue: &IssueSnapshot, comments: &[CommentSnapshot]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Issue Information: {} - {}\n",
        issue.identifier, issue.title
    );
    let _ = writeln!(output, "ID: {}", issue.identifier);
    let _ = writeln!(output, "Title: {}", issue.title);
    let _ = writeln!(
        output,
        "Status: {}",
        issue.state_name.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        output,
        "Project: {}",
        issue.project_name.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(output, "Priority: {}", priority_label(issue.priority));
    let _ = writeln!(
        output,
        "Assignee: {}",
        issue.assignee.as_deref().unwrap_or("Unassigned")
    );
    let _ = writeln!(output, "Created At: {}", format_date_time(issue.created_at));
    let _ = writeln!(
        output,
        "Due Date: {}",
        issue.due_date.map(format_date).unwrap_or_else(na)
    );
    let _ = writeln!(output, "\nDescription:");
    let _ = writeln!(
        output,
        "{}",
        issue.description.as_deref().unwrap_or("(No description)")
    );

    if !comments.is_empty() {
        let _ = writeln!(output, "\nComments:");
        for comment in comments {
            let _ = writeln!(
                output,
                "\n[{}] {}:",
                format_date_time(comment.created_at),
                comment.author.as_deref().unwrap_or("Unknown")
            );
            let _ = writeln!(output, "{}", comment.body);
        }
    }
    output
}

/// Render a list of initiatives, one line each.
pub fn render_initiatives_text(initiatives: &[InitiativeSnapshot]) -> String {
    let mut output = String::new();
    for initiative in initiatives {
        let _ = writeln!(
            output,
            "{}: {} ({})",
            initiative.id,
            initiative.name,
            initiative.status.as_deref().unwrap_or("unknown")
        );
    }
    output
}

/// Render a project health report.
pub fn render_health_text(report: &HealthReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Health metrics for {}:", report.name);
    let _ = writeln!(
        output,
        "Completion rate: {:.1}%",
        report.metrics.completion_rate
    );
    let _ = writeln!(output, "Blocked rate: {:.1}%", report.metrics.blocked_rate);
    let _ = writeln!(
        output,
        "In progress rate: {:.1}%",
        report.metrics.in_progress_rate
    );

    if report.risks.is_empty() {
        let _ = writeln!(output, "Risks: none");
    } else {
        let _ = writeln!(output, "Risks:");
        for risk in &report.risks {
            let _ = writeln!(
                output,
                "- {} ({}, {} issues)",
                risk_type_label(risk.risk_type),
                severity_label(risk.severity),
                risk.count
            );
        }
    }

    if report.recommendations.is_empty() {
        let _ = writeln!(output, "Recommendations: none");
    } else {
        let _ = writeln!(output, "Recommendations:");
        for recommendation in &report.recommendations {
            let _ = writeln!(output, "- {recommendation}");
        }
    }
    output
}

/// Render the flattened candidate counts ahead of an analysis call.
pub fn render_candidate_summary(batches: &[ProjectIssues]) -> String {
    let total: usize = batches.iter().map(|batch| batch.issues.len()).sum();
    format!(
        "Collected {total} issues across {} projects.",
        batches.len()
    )
}

/// Render a duplicate-detection analysis.
pub fn render_duplicates_text(analysis: &DuplicateAnalysis) -> String {
    if analysis.duplicate_groups.is_empty() {
        return "No duplicate candidates found.\n".to_string();
    }
    let mut output = String::new();
    for (index, group) in analysis.duplicate_groups.iter().enumerate() {
        let _ = writeln!(output, "Group {}:", index + 1);
        for issue in &group.issues {
            let _ = writeln!(output, "- {} [{}] ({})", issue.title, issue.id, issue.project);
        }
        let _ = writeln!(output, "Reason: {}", group.similarity_reason);
        let _ = writeln!(output, "Recommendation: {}", group.recommendation);
        let _ = writeln!(output);
    }
    output
}

/// Render a dependency-detection analysis.
pub fn render_dependencies_text(analysis: &DependencyAnalysis) -> String {
    if analysis.dependency_groups.is_empty() {
        return "No dependency candidates found.\n".to_string();
    }
    let mut output = String::new();
    for group in &analysis.dependency_groups {
        let primary = &group.primary_issue;
        let _ = writeln!(
            output,
            "{} [{}] ({})",
            primary.title, primary.id, primary.project
        );
        for dependent in &group.dependent_issues {
            let _ = writeln!(
                output,
                "  <- {} [{}] ({})",
                dependent.title, dependent.id, dependent.project
            );
        }
        let _ = writeln!(
            output,
            "Type: {:?} | Risk: {:?}",
            group.dependency_type, group.risk_level
        );
        let _ = writeln!(output, "Reason: {}", group.reason);
        let _ = writeln!(output, "Recommendation: {}", group.recommendation);
        let _ = writeln!(output);
    }
    output
}

/// Truncate display text to `max` characters, appending an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn display_truncated(text: Option<&str>, max: usize) -> String {
    match text {
        Some(text) => truncate(text, max),
        None => "N/A".to_string(),
    }
}

fn display_count(count: Option<u64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_else(na)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_date_time(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}

fn na() -> String {
    "N/A".to_string()
}

fn risk_type_label(risk_type: RiskType) -> &'static str {
    match risk_type {
        RiskType::OverdueIssues => "overdue issues",
        RiskType::BlockedIssues => "blocked issues",
    }
}

fn severity_label(severity: RiskSeverity) -> &'static str {
    match severity {
        RiskSeverity::Low => "low",
        RiskSeverity::Medium => "medium",
        RiskSeverity::High => "high",
    }
}
