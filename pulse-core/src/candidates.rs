//! Cross-project candidate extraction for duplicate/dependency analysis.
//!
//! The extractor only flattens already-fetched per-project issue batches
//! into lightweight tuples for the reasoning gateway; similarity and
//! dependency inference happen entirely on the other side of that call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{IssueSnapshot, ProjectSnapshot};

/// One project together with its fetched issues.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectIssues {
    /// The owning project.
    pub project: ProjectSnapshot,
    /// Issues belonging to the project, in fetch order.
    pub issues: Vec<IssueSnapshot>,
}

/// Candidate tuple for duplicate detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCandidate {
    /// Issue id.
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Issue description, if any.
    pub description: Option<String>,
    /// Owning project id.
    pub project_id: String,
    /// Owning project name.
    pub project_name: String,
}

/// Candidate tuple for dependency detection, carrying workflow detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCandidate {
    /// Issue id.
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Issue description, if any.
    pub description: Option<String>,
    /// Owning project id.
    pub project_id: String,
    /// Owning project name.
    pub project_name: String,
    /// Human-readable state name, absent when unresolved.
    pub state: Option<String>,
    /// Priority 0-4.
    pub priority: u8,
    /// Label names attached to the issue.
    pub labels: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Flatten per-project batches into duplicate-detection candidates.
///
/// Project and issue order are preserved; projects with no issues simply
/// contribute nothing.
pub fn duplicate_candidates(batches: &[ProjectIssues]) -> Vec<DuplicateCandidate> {
    batches
        .iter()
        .flat_map(|batch| {
            batch.issues.iter().map(|issue| DuplicateCandidate {
                id: issue.id.clone(),
                title: issue.title.clone(),
                description: issue.description.clone(),
                project_id: batch.project.id.clone(),
                project_name: batch.project.name.clone(),
            })
        })
        .collect()
}

/// Flatten per-project batches into dependency-detection candidates.
pub fn dependency_candidates(batches: &[ProjectIssues]) -> Vec<DependencyCandidate> {
    batches
        .iter()
        .flat_map(|batch| {
            batch.issues.iter().map(|issue| DependencyCandidate {
                id: issue.id.clone(),
                title: issue.title.clone(),
                description: issue.description.clone(),
                project_id: batch.project.id.clone(),
                project_name: batch.project.name.clone(),
                state: issue.state_name.clone(),
                priority: issue.priority,
                labels: issue.labels.clone(),
                created_at: issue.created_at,
                completed_at: issue.completed_at,
            })
        })
        .collect()
}
