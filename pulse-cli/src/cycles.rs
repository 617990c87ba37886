//! The `cycles` command.

use chrono::{NaiveDate, NaiveTime};
use clap::{ArgGroup, Args};
use pulse_core::render::{
    render_cycle_detail_text, render_cycles_text, render_issues_text, render_projects_text,
};
use pulse_core::{CycleSnapshot, ProjectSnapshot, PulseError, Result, cycle_stats};
use std::sync::Arc;

use crate::linear::{CycleDraft, DataGateway};
use crate::output::{OutputArgs, emit};
use crate::resolve::resolve_issues;

/// Arguments for cycle operations.
#[derive(Args, Clone, Debug)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(&["list", "info", "projects", "issues", "create"])
))]
pub struct CyclesArgs {
    /// List active and upcoming cycles.
    #[arg(short, long)]
    pub list: bool,
    /// Restrict --list to one team's cycles.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub team: Option<String>,
    /// Show detailed info and statistics for a cycle.
    #[arg(short, long, value_name = "CYCLE_ID")]
    pub info: Option<String>,
    /// List projects in a cycle.
    #[arg(short, long, value_name = "CYCLE_ID")]
    pub projects: Option<String>,
    /// List issues in a cycle.
    #[arg(long, value_name = "CYCLE_ID")]
    pub issues: Option<String>,
    /// Filter --issues by state name.
    #[arg(short, long, value_name = "STATE")]
    pub status: Option<String>,
    /// Create a new cycle for a team.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub create: Option<String>,
    /// Name for the new cycle.
    #[arg(short, long)]
    pub name: Option<String>,
    /// Start date for the new cycle (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,
    /// End date for the new cycle (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<String>,
    /// Shared output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(serde::Serialize)]
struct CycleDetail {
    cycle: CycleSnapshot,
    stats: pulse_core::CycleStats,
}

/// Execute the `cycles` command.
pub async fn run(gateway: Arc<dyn DataGateway>, args: CyclesArgs) -> Result<()> {
    if args.list {
        let (heading, raws) = match &args.team {
            Some(team) => ("Team Cycles", gateway.team_cycles(team).await?),
            None => ("Active Cycles", gateway.list_active_cycles().await?),
        };
        let cycles: Vec<CycleSnapshot> = raws
            .into_iter()
            .map(|cycle| cycle.into_snapshot())
            .collect();
        let text = format!("{heading}\n\n{}", render_cycles_text(&cycles));
        return emit(&args.output, &cycles, text).await;
    }

    if let Some(id) = &args.info {
        let cycle = gateway.get_cycle(id).await?.into_snapshot();
        let raws = gateway.cycle_issues(id, None).await?;
        let issues = resolve_issues(gateway.clone(), raws).await?;
        let stats = cycle_stats(&issues, cycle.scope_change);
        let text = render_cycle_detail_text(&cycle, &stats);
        let detail = CycleDetail { cycle, stats };
        return emit(&args.output, &detail, text).await;
    }

    if let Some(id) = &args.projects {
        let cycle = gateway.get_cycle(id).await?.into_snapshot();
        let projects: Vec<ProjectSnapshot> = gateway
            .cycle_projects(id)
            .await?
            .into_iter()
            .map(|project| project.into_snapshot())
            .collect();
        let text = format!(
            "Projects in Cycle: {}\n\n{}",
            cycle.display_name(),
            render_projects_text(&projects)
        );
        return emit(&args.output, &projects, text).await;
    }

    if let Some(id) = &args.issues {
        let cycle = gateway.get_cycle(id).await?.into_snapshot();
        let raws = gateway.cycle_issues(id, args.status.as_deref()).await?;
        let issues = resolve_issues(gateway.clone(), raws).await?;
        let status_note = args
            .status
            .as_deref()
            .map(|status| format!(" (Status: {status})"))
            .unwrap_or_default();
        let text = format!(
            "Issues in Cycle: {}{status_note}\n\n{}",
            cycle.display_name(),
            render_issues_text(&issues)
        );
        return emit(&args.output, &issues, text).await;
    }

    if let Some(team_id) = &args.create {
        let draft = build_cycle_draft(team_id, &args)?;
        let cycle = gateway.create_cycle(&draft).await?.into_snapshot();
        let text = format!(
            "Successfully created new cycle: {}\n\nID: {}\nName: {}\nTeam ID: {team_id}\nStart Date: {}\nEnd Date: {}\n",
            cycle.display_name(),
            cycle.id,
            cycle.display_name(),
            cycle
                .starts_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            cycle
                .ends_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        );
        return emit(&args.output, &cycle, text).await;
    }

    Ok(())
}

fn build_cycle_draft(team_id: &str, args: &CyclesArgs) -> Result<CycleDraft> {
    let name = args
        .name
        .as_deref()
        .ok_or_else(|| PulseError::Validation("cycle name is required (--name)".to_string()))?;
    let start = args.start.as_deref().ok_or_else(|| {
        PulseError::Validation("start date is required (--start)".to_string())
    })?;
    let end = args
        .end
        .as_deref()
        .ok_or_else(|| PulseError::Validation("end date is required (--end)".to_string()))?;

    Ok(CycleDraft {
        team_id: team_id.to_string(),
        name: name.to_string(),
        starts_at: parse_date(start)?.and_time(NaiveTime::MIN).and_utc(),
        ends_at: parse_date(end)?.and_time(NaiveTime::MIN).and_utc(),
        description: None,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        PulseError::Validation(format!("invalid date '{value}', expected YYYY-MM-DD"))
    })
}
