//! Issue record normalization.
//!
//! Listing queries return issues with unresolved relations. The resolvers
//! here fan out the relation lookups for each issue concurrently, join them,
//! and produce flat `IssueSnapshot`s in the input order. A lookup that fails
//! degrades to an absent field; only a failure fetching the raw batch itself
//! propagates to the caller.

use pulse_core::{IssueSnapshot, ProjectSnapshot, PulseError, Result, StateType};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::linear::{DataGateway, RawIssue, WorkflowState};

/// Convert a raw issue into a snapshot with no relations resolved.
pub fn snapshot_base(raw: RawIssue) -> IssueSnapshot {
    IssueSnapshot {
        id: raw.id,
        identifier: raw.identifier,
        title: raw.title,
        description: raw.description,
        state_type: None,
        state_name: None,
        priority: raw.priority,
        due_date: raw.due_date,
        assignee: None,
        project_id: None,
        project_name: None,
        created_at: raw.created_at,
        completed_at: raw.completed_at,
        labels: Vec::new(),
        url: raw.url,
    }
}

/// Resolve state, assignee, and project for a batch of raw issues.
pub async fn resolve_issues(
    gateway: Arc<dyn DataGateway>,
    raws: Vec<RawIssue>,
) -> Result<Vec<IssueSnapshot>> {
    let mut tasks = JoinSet::new();
    let total = raws.len();

    for (index, raw) in raws.into_iter().enumerate() {
        let gateway = gateway.clone();
        tasks.spawn(async move { (index, resolve_issue(gateway.as_ref(), raw).await) });
    }

    collect_ordered(tasks, total).await
}

/// Resolve state and labels for issues already known to belong to `project`.
///
/// Used by the dependency-candidate path, where the owning project is the
/// iteration variable and an extra project lookup per issue would be wasted.
pub async fn resolve_issues_in_project(
    gateway: Arc<dyn DataGateway>,
    project: &ProjectSnapshot,
    raws: Vec<RawIssue>,
) -> Result<Vec<IssueSnapshot>> {
    let mut tasks = JoinSet::new();
    let total = raws.len();

    for (index, raw) in raws.into_iter().enumerate() {
        let gateway = gateway.clone();
        let project_id = project.id.clone();
        let project_name = project.name.clone();
        tasks.spawn(async move {
            let (state, labels) = tokio::join!(
                gateway.issue_state(&raw.id),
                gateway.issue_labels(&raw.id)
            );
            let state = degraded(state, &raw.id, "state").flatten();
            let labels = degraded(labels, &raw.id, "labels").unwrap_or_default();

            let mut snapshot = snapshot_base(raw);
            apply_state(&mut snapshot, state);
            snapshot.labels = labels;
            snapshot.project_id = Some(project_id);
            snapshot.project_name = Some(project_name);
            (index, snapshot)
        });
    }

    collect_ordered(tasks, total).await
}

async fn resolve_issue(gateway: &dyn DataGateway, raw: RawIssue) -> IssueSnapshot {
    let (state, assignee, project) = tokio::join!(
        gateway.issue_state(&raw.id),
        gateway.issue_assignee(&raw.id),
        gateway.issue_project(&raw.id)
    );
    let state = degraded(state, &raw.id, "state").flatten();
    let assignee = degraded(assignee, &raw.id, "assignee").flatten();
    let project = degraded(project, &raw.id, "project").flatten();

    let mut snapshot = snapshot_base(raw);
    apply_state(&mut snapshot, state);
    snapshot.assignee = assignee.map(|user| user.name);
    if let Some(project) = project {
        snapshot.project_id = Some(project.id);
        snapshot.project_name = Some(project.name);
    }
    snapshot
}

fn apply_state(snapshot: &mut IssueSnapshot, state: Option<WorkflowState>) {
    if let Some(state) = state {
        snapshot.state_type = StateType::parse(&state.state_type);
        snapshot.state_name = Some(state.name);
    }
}

fn degraded<T>(result: Result<T>, issue_id: &str, relation: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{relation} lookup failed for issue {issue_id}: {err}");
            None
        }
    }
}

async fn collect_ordered(
    mut tasks: JoinSet<(usize, IssueSnapshot)>,
    total: usize,
) -> Result<Vec<IssueSnapshot>> {
    let mut slots: Vec<Option<IssueSnapshot>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, snapshot) =
            joined.map_err(|err| PulseError::Gateway(format!("resolution task failed: {err}")))?;
        slots[index] = Some(snapshot);
    }
    Ok(slots.into_iter().flatten().collect())
}
