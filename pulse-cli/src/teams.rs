//! The `teams` command.

use clap::{ArgGroup, Args};
use pulse_core::render::{
    render_cycles_text, render_members_text, render_projects_text, render_team_detail_text,
    render_teams_text,
};
use pulse_core::{CycleSnapshot, MemberSnapshot, ProjectSnapshot, Result, TeamSnapshot};

use crate::linear::DataGateway;
use crate::output::{OutputArgs, emit};

/// Arguments for team operations.
#[derive(Args, Clone, Debug)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(&["list", "info", "members", "projects", "cycles"])
))]
pub struct TeamsArgs {
    /// List all teams.
    #[arg(short, long)]
    pub list: bool,
    /// Show detailed info for a team.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub info: Option<String>,
    /// List members of a team.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub members: Option<String>,
    /// List projects for a team.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub projects: Option<String>,
    /// List cycles for a team.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub cycles: Option<String>,
    /// Shared output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Execute the `teams` command.
pub async fn run(gateway: &dyn DataGateway, args: TeamsArgs) -> Result<()> {
    if args.list {
        let teams: Vec<TeamSnapshot> = gateway
            .list_teams()
            .await?
            .into_iter()
            .map(|team| team.into_snapshot())
            .collect();
        return emit(&args.output, &teams, render_teams_text(&teams)).await;
    }

    if let Some(id) = &args.info {
        let team = gateway.get_team(id).await?.into_snapshot();
        return emit(&args.output, &team, render_team_detail_text(&team)).await;
    }

    if let Some(id) = &args.members {
        let team = gateway.get_team(id).await?.into_snapshot();
        let members: Vec<MemberSnapshot> = gateway
            .team_members(id)
            .await?
            .into_iter()
            .map(|member| member.into_snapshot())
            .collect();
        let text = format!(
            "Members of Team: {}\n\n{}",
            team.name,
            render_members_text(&members)
        );
        return emit(&args.output, &members, text).await;
    }

    if let Some(id) = &args.projects {
        let team = gateway.get_team(id).await?.into_snapshot();
        let projects: Vec<ProjectSnapshot> = gateway
            .team_projects(id)
            .await?
            .into_iter()
            .map(|project| project.into_snapshot())
            .collect();
        let text = format!(
            "Projects for Team: {}\n\n{}",
            team.name,
            render_projects_text(&projects)
        );
        return emit(&args.output, &projects, text).await;
    }

    if let Some(id) = &args.cycles {
        let team = gateway.get_team(id).await?.into_snapshot();
        let cycles: Vec<CycleSnapshot> = gateway
            .team_cycles(id)
            .await?
            .into_iter()
            .map(|cycle| cycle.into_snapshot())
            .collect();
        let text = format!(
            "Cycles for Team: {}\n\n{}",
            team.name,
            render_cycles_text(&cycles)
        );
        return emit(&args.output, &cycles, text).await;
    }

    Ok(())
}
