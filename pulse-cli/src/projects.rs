//! The `project` command.

use chrono::{DateTime, Utc};
use clap::Args;
use pulse_core::render::{render_health_text, render_project_detail_text};
use pulse_core::{
    ANALYST_PROMPT, PulseError, Result, analysis_payload, analyze_project_health,
};
use std::sync::Arc;

use crate::linear::DataGateway;
use crate::llm::ReasoningGateway;
use crate::output::{OutputArgs, emit};
use crate::resolve::resolve_issues;

/// Arguments for project operations.
#[derive(Args, Clone, Debug)]
pub struct ProjectArgs {
    /// Project ID.
    pub id: String,
    /// Show health metrics instead of the project summary.
    #[arg(long)]
    pub health: bool,
    /// Send the health report to the reasoning model for a narrative
    /// analysis (requires --health).
    #[arg(long, requires = "health")]
    pub analyze: bool,
    /// Shared output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Execute the `project` command.
pub async fn run(
    gateway: Arc<dyn DataGateway>,
    llm: Option<&dyn ReasoningGateway>,
    args: ProjectArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    if args.health {
        let project = gateway.get_project(&args.id).await?.into_snapshot();
        let raws = gateway.project_issues(&args.id).await?;
        let issues = resolve_issues(gateway.clone(), raws).await?;
        let report = analyze_project_health(&project, &issues, now);

        if args.analyze {
            let llm = llm.ok_or_else(|| {
                PulseError::Validation("reasoning gateway is not configured".to_string())
            })?;
            let payload = analysis_payload(&report)?;
            let narrative = llm.complete(ANALYST_PROMPT, &payload, false).await?;
            println!("{narrative}");
            return Ok(());
        }

        return emit(&args.output, &report, render_health_text(&report)).await;
    }

    let project = gateway.get_project(&args.id).await?.into_snapshot();
    emit(&args.output, &project, render_project_detail_text(&project)).await
}
