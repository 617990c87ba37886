//! The `duplicates` and `dependencies` commands.
//!
//! Both fetch every project's issues, flatten them into candidate tuples,
//! and hand the batch to the reasoning gateway. All similarity and
//! dependency inference happens on the remote side; these handlers only
//! assemble inputs and parse the structured response.

use pulse_core::render::{
    render_candidate_summary, render_dependencies_text, render_duplicates_text,
};
use pulse_core::{
    DEPENDENCY_PROMPT, DUPLICATE_PROMPT, ProjectIssues, Result, analysis_payload,
    dependency_candidates, duplicate_candidates, parse_dependency_analysis,
    parse_duplicate_analysis,
};
use std::sync::Arc;

use crate::linear::DataGateway;
use crate::llm::ReasoningGateway;
use crate::output::{OutputArgs, emit};
use crate::resolve::{resolve_issues_in_project, snapshot_base};

/// Execute the `duplicates` command.
pub async fn run_duplicates(
    gateway: Arc<dyn DataGateway>,
    llm: &dyn ReasoningGateway,
    output: &OutputArgs,
) -> Result<()> {
    let batches = duplicate_batches(gateway).await?;
    println!("{}", render_candidate_summary(&batches));

    let candidates = duplicate_candidates(&batches);
    let payload = analysis_payload(&candidates)?;
    let response = llm.complete(DUPLICATE_PROMPT, &payload, true).await?;
    let analysis = parse_duplicate_analysis(&response)?;

    emit(output, &analysis, render_duplicates_text(&analysis)).await
}

/// Execute the `dependencies` command.
pub async fn run_dependencies(
    gateway: Arc<dyn DataGateway>,
    llm: &dyn ReasoningGateway,
    output: &OutputArgs,
) -> Result<()> {
    let batches = dependency_batches(gateway).await?;
    println!("{}", render_candidate_summary(&batches));

    let candidates = dependency_candidates(&batches);
    let payload = analysis_payload(&candidates)?;
    let response = llm.complete(DEPENDENCY_PROMPT, &payload, true).await?;
    let analysis = parse_dependency_analysis(&response)?;

    emit(output, &analysis, render_dependencies_text(&analysis)).await
}

/// Fetch every project's issues without relation resolution; duplicate
/// candidates only need scalar fields.
async fn duplicate_batches(gateway: Arc<dyn DataGateway>) -> Result<Vec<ProjectIssues>> {
    let projects = gateway.list_projects().await?;
    let mut batches = Vec::with_capacity(projects.len());
    for project in projects {
        let raws = gateway.project_issues(&project.id).await?;
        batches.push(ProjectIssues {
            project: project.into_snapshot(),
            issues: raws.into_iter().map(snapshot_base).collect(),
        });
    }
    Ok(batches)
}

/// Fetch every project's issues with state and labels resolved, as the
/// dependency candidates carry workflow detail.
async fn dependency_batches(gateway: Arc<dyn DataGateway>) -> Result<Vec<ProjectIssues>> {
    let projects = gateway.list_projects().await?;
    let mut batches = Vec::with_capacity(projects.len());
    for project in projects {
        let raws = gateway.project_issues(&project.id).await?;
        let project = project.into_snapshot();
        let issues = resolve_issues_in_project(gateway.clone(), &project, raws).await?;
        batches.push(ProjectIssues { project, issues });
    }
    Ok(batches)
}
