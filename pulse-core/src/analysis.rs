//! Prompts and response contracts for the reasoning gateway.
//!
//! The gateway itself is a dumb `complete` call; everything that gives an
//! analysis its shape lives here: the system prompts, the JSON schemas they
//! demand, and the strict parsers that refuse free-form responses.

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};

/// System prompt for narrative project analysis.
pub const ANALYST_PROMPT: &str = "You are a project management analyst. Analyze the provided \
project data and generate insights about progress, risks, and recommendations.";

/// System prompt for duplicate detection. The response must follow the
/// `duplicate_groups` schema parsed by [`parse_duplicate_analysis`].
pub const DUPLICATE_PROMPT: &str = r#"You are an expert at analyzing project issues and identifying potential duplicates.
Focus on:
- Semantic similarity between issue titles and descriptions
- Issues with similar goals or outcomes across different projects
- Provide specific issue IDs and reasoning for potential duplicates
Format output as JSON with structure:
{
  "duplicate_groups": [
    {
      "issues": [{"id": string, "title": string, "project": string}],
      "similarity_reason": string,
      "recommendation": string
    }
  ]
}"#;

/// System prompt for dependency detection. The response must follow the
/// `dependency_groups` schema parsed by [`parse_dependency_analysis`].
pub const DEPENDENCY_PROMPT: &str = r#"You are an expert at analyzing project issues and identifying potential dependencies between them.
Focus on:
- Technical dependencies based on issue descriptions and titles
- Sequential dependencies based on logical workflow
- Cross-project dependencies that might affect delivery
- Resource dependencies based on assignees and teams
Format output as JSON with structure:
{
  "dependency_groups": [
    {
      "primary_issue": {"id": string, "title": string, "project": string},
      "dependent_issues": [{"id": string, "title": string, "project": string}],
      "dependency_type": "technical|sequential|resource",
      "reason": string,
      "risk_level": "low|medium|high",
      "recommendation": string
    }
  ]
}"#;

/// A reference to an issue inside an analysis response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    /// Issue id.
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Owning project name.
    pub project: String,
}

/// One group of suspected duplicate issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The issues suspected to duplicate each other.
    pub issues: Vec<IssueRef>,
    /// Why the group was flagged.
    pub similarity_reason: String,
    /// Suggested action.
    pub recommendation: String,
}

/// Parsed duplicate-detection response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateAnalysis {
    /// Suspected duplicate groups, possibly empty.
    pub duplicate_groups: Vec<DuplicateGroup>,
}

/// Kind of dependency between issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// One issue's implementation requires another's.
    Technical,
    /// Workflow ordering.
    Sequential,
    /// Shared people or teams.
    Resource,
}

/// Risk level attached to a dependency group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Unlikely to affect delivery.
    Low,
    /// Worth tracking.
    Medium,
    /// Likely to affect delivery.
    High,
}

/// One dependency relationship between a primary issue and its dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    /// The issue others depend on.
    pub primary_issue: IssueRef,
    /// Issues depending on the primary.
    pub dependent_issues: Vec<IssueRef>,
    /// Kind of dependency.
    pub dependency_type: DependencyKind,
    /// Why the dependency was flagged.
    pub reason: String,
    /// Delivery risk rating.
    pub risk_level: RiskLevel,
    /// Suggested action.
    pub recommendation: String,
}

/// Parsed dependency-detection response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyAnalysis {
    /// Detected dependency groups, possibly empty.
    pub dependency_groups: Vec<DependencyGroup>,
}

/// Serialize an analysis payload as pretty-printed JSON for the user turn.
pub fn analysis_payload<T: Serialize + ?Sized>(items: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Parse a duplicate-detection response. A response that is not valid JSON
/// matching the advertised schema is a gateway failure, not data.
pub fn parse_duplicate_analysis(raw: &str) -> Result<DuplicateAnalysis> {
    serde_json::from_str(raw)
        .map_err(|err| PulseError::Gateway(format!("malformed duplicate analysis response: {err}")))
}

/// Parse a dependency-detection response, with the same strictness.
pub fn parse_dependency_analysis(raw: &str) -> Result<DependencyAnalysis> {
    serde_json::from_str(raw).map_err(|err| {
        PulseError::Gateway(format!("malformed dependency analysis response: {err}"))
    })
}
