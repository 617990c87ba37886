//! Linear data gateway.
//!
//! All tracker access goes through the [`DataGateway`] trait so command
//! handlers and the issue normalizer can be exercised with in-memory doubles.
//! The production implementation speaks GraphQL over HTTPS via `reqwest`.

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::{
    CommentSnapshot, CycleSnapshot, InitiativeSnapshot, MemberSnapshot, ProjectSnapshot,
    PulseError, Result, TeamSnapshot,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Default GraphQL endpoint for the tracker.
pub const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";
/// Page size requested for every listing query.
const FIRST_PAGE: i64 = 100;
/// Request timeout applied to every gateway call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Future type returned by gateway trait methods.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Configuration for the tracker gateway, passed in explicitly so no
/// constructor ever reads the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// GraphQL endpoint URL.
    pub api_url: String,
    /// API key sent as the `Authorization` header.
    pub api_key: String,
}

/// Equality filter for issue listings. Empty fields are not sent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Match issues belonging to this team id.
    pub team: Option<String>,
    /// Match issues belonging to this project id.
    pub project: Option<String>,
    /// Match issues belonging to this cycle id.
    pub cycle: Option<String>,
    /// Match issues whose state name equals this value.
    pub status: Option<String>,
    /// Match issues assigned to this user id.
    pub assignee: Option<String>,
}

impl IssueFilter {
    /// Whether no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.team.is_none()
            && self.project.is_none()
            && self.cycle.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
    }

    /// Build the GraphQL filter object, or `None` when empty.
    pub fn to_graphql(&self) -> Option<Value> {
        let mut filter = serde_json::Map::new();
        if let Some(team) = &self.team {
            filter.insert("team".to_string(), json!({ "id": { "eq": team } }));
        }
        if let Some(project) = &self.project {
            filter.insert("project".to_string(), json!({ "id": { "eq": project } }));
        }
        if let Some(cycle) = &self.cycle {
            filter.insert("cycle".to_string(), json!({ "id": { "eq": cycle } }));
        }
        if let Some(status) = &self.status {
            filter.insert("state".to_string(), json!({ "name": { "eq": status } }));
        }
        if let Some(assignee) = &self.assignee {
            filter.insert("assignee".to_string(), json!({ "id": { "eq": assignee } }));
        }
        if filter.is_empty() {
            None
        } else {
            Some(Value::Object(filter))
        }
    }

    /// Describe the filter for text headings, e.g. ` (team: t1, status: Done)`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(team) = &self.team {
            parts.push(format!("team: {team}"));
        }
        if let Some(project) = &self.project {
            parts.push(format!("project: {project}"));
        }
        if let Some(cycle) = &self.cycle {
            parts.push(format!("cycle: {cycle}"));
        }
        if let Some(status) = &self.status {
            parts.push(format!("status: {status}"));
        }
        if let Some(assignee) = &self.assignee {
            parts.push(format!("assignee: {assignee}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

/// An issue as returned by listing queries: scalar fields only, relations
/// unresolved. The normalizer turns this into an `IssueSnapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIssue {
    /// Opaque upstream identifier.
    pub id: String,
    /// Human-readable key, e.g. `ENG-123`.
    pub identifier: String,
    /// Issue title.
    pub title: String,
    /// Issue description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority 0-4, 0 meaning none.
    #[serde(default)]
    pub priority: u8,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Web URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// A workflow state relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Opaque upstream identifier.
    pub id: String,
    /// Human-readable state name.
    pub name: String,
    /// Coarse state-type string, e.g. `started`.
    #[serde(rename = "type")]
    pub state_type: String,
}

/// A user relation (assignee, comment author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Opaque upstream identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A project relation on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Opaque upstream identifier.
    pub id: String,
    /// Project name.
    pub name: String,
}

/// A project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    /// Opaque upstream identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Project description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow state label.
    #[serde(default)]
    pub state: Option<String>,
    /// Completion percentage.
    #[serde(default)]
    pub progress: f64,
    /// Target completion date.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Owning team id.
    #[serde(default)]
    pub team_id: Option<String>,
}

impl RawProject {
    /// Convert into the core snapshot type.
    pub fn into_snapshot(self) -> ProjectSnapshot {
        ProjectSnapshot {
            id: self.id,
            name: self.name,
            description: self.description,
            state: self.state,
            progress: self.progress,
            target_date: self.target_date,
            team_id: self.team_id,
        }
    }
}

/// A team record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    /// Opaque upstream identifier.
    pub id: String,
    /// Team name.
    pub name: String,
    /// Short team key.
    pub key: String,
    /// Team description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the team is private.
    #[serde(default)]
    pub private: bool,
    /// Member count, when reported.
    #[serde(default)]
    pub member_count: Option<u64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RawTeam {
    /// Convert into the core snapshot type.
    pub fn into_snapshot(self) -> TeamSnapshot {
        TeamSnapshot {
            id: self.id,
            name: self.name,
            key: self.key,
            description: self.description,
            private: self.private,
            member_count: self.member_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A team member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMember {
    /// Opaque upstream identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Workspace role.
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the account is active.
    #[serde(default)]
    pub active: bool,
}

impl RawMember {
    /// Convert into the core snapshot type.
    pub fn into_snapshot(self) -> MemberSnapshot {
        MemberSnapshot {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            active: self.active,
        }
    }
}

/// A cycle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCycle {
    /// Opaque upstream identifier.
    pub id: String,
    /// Cycle name.
    #[serde(default)]
    pub name: Option<String>,
    /// Sequential cycle number.
    pub number: u32,
    /// Cycle status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Start timestamp.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End timestamp.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Completion percentage.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Net scope change since the cycle started.
    #[serde(default)]
    pub scope_changes: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl RawCycle {
    /// Convert into the core snapshot type.
    pub fn into_snapshot(self) -> CycleSnapshot {
        CycleSnapshot {
            id: self.id,
            name: self.name,
            number: self.number,
            status: self.status,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            progress: self.progress,
            scope_change: self.scope_changes,
            created_at: self.created_at,
        }
    }
}

/// An initiative record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInitiative {
    /// Opaque upstream identifier.
    pub id: String,
    /// Initiative name.
    pub name: String,
    /// Initiative status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Initiative description.
    #[serde(default)]
    pub description: Option<String>,
}

impl RawInitiative {
    /// Convert into the core snapshot type.
    pub fn into_snapshot(self) -> InitiativeSnapshot {
        InitiativeSnapshot {
            id: self.id,
            name: self.name,
            status: self.status,
            description: self.description,
        }
    }
}

/// A comment record with its author pre-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    /// Comment body, markdown.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Author, absent for system comments.
    #[serde(default)]
    pub user: Option<UserRef>,
}

impl RawComment {
    /// Convert into the core snapshot type.
    pub fn into_snapshot(self) -> CommentSnapshot {
        CommentSnapshot {
            body: self.body,
            author: self.user.map(|user| user.name),
            created_at: self.created_at,
        }
    }
}

/// Fields for creating an issue.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    /// Issue title.
    pub title: String,
    /// Owning team id.
    pub team_id: String,
    /// Issue description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning project id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Owning cycle id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<String>,
    /// Assignee user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    /// Priority 0-4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

/// Fields for creating a cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleDraft {
    /// Owning team id.
    pub team_id: String,
    /// Cycle name.
    pub name: String,
    /// Start timestamp.
    pub starts_at: DateTime<Utc>,
    /// End timestamp.
    pub ends_at: DateTime<Utc>,
    /// Cycle description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tracker operations consumed by commands and the normalizer.
pub trait DataGateway: Send + Sync {
    /// List issues matching a filter, first page only.
    fn list_issues<'a>(&'a self, filter: &'a IssueFilter) -> GatewayFuture<'a, Vec<RawIssue>>;
    /// Fetch one issue by id.
    fn get_issue<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawIssue>;
    /// Create an issue.
    fn create_issue<'a>(&'a self, draft: &'a IssueDraft) -> GatewayFuture<'a, RawIssue>;
    /// Move an issue to another workflow state.
    fn update_issue_state<'a>(
        &'a self,
        id: &'a str,
        state_id: &'a str,
    ) -> GatewayFuture<'a, RawIssue>;
    /// Resolve an issue's workflow state relation.
    fn issue_state<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<WorkflowState>>;
    /// Resolve an issue's assignee relation.
    fn issue_assignee<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<UserRef>>;
    /// Resolve an issue's project relation.
    fn issue_project<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<ProjectRef>>;
    /// Resolve an issue's label names.
    fn issue_labels<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<String>>;
    /// Fetch an issue's comments.
    fn issue_comments<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawComment>>;
    /// List all projects.
    fn list_projects<'a>(&'a self) -> GatewayFuture<'a, Vec<RawProject>>;
    /// Fetch one project by id.
    fn get_project<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawProject>;
    /// List a project's issues.
    fn project_issues<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawIssue>>;
    /// List all teams.
    fn list_teams<'a>(&'a self) -> GatewayFuture<'a, Vec<RawTeam>>;
    /// Fetch one team by id.
    fn get_team<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawTeam>;
    /// List a team's members.
    fn team_members<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawMember>>;
    /// List a team's projects.
    fn team_projects<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawProject>>;
    /// List a team's cycles.
    fn team_cycles<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawCycle>>;
    /// List active and upcoming cycles across all teams.
    fn list_active_cycles<'a>(&'a self) -> GatewayFuture<'a, Vec<RawCycle>>;
    /// Fetch one cycle by id.
    fn get_cycle<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawCycle>;
    /// List a cycle's projects.
    fn cycle_projects<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawProject>>;
    /// List a cycle's issues, optionally filtered by state name.
    fn cycle_issues<'a>(
        &'a self,
        id: &'a str,
        status: Option<&'a str>,
    ) -> GatewayFuture<'a, Vec<RawIssue>>;
    /// Create a cycle.
    fn create_cycle<'a>(&'a self, draft: &'a CycleDraft) -> GatewayFuture<'a, RawCycle>;
    /// List all initiatives.
    fn list_initiatives<'a>(&'a self) -> GatewayFuture<'a, Vec<RawInitiative>>;
}

const ISSUE_FIELDS: &str = "id identifier title description priority dueDate createdAt completedAt url";
const PROJECT_FIELDS: &str = "id name description state progress targetDate teamId";
const CYCLE_FIELDS: &str = "id name number status startsAt endsAt progress scopeChanges createdAt";
const TEAM_FIELDS: &str = "id name key description private memberCount createdAt updatedAt";

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct IssuesData<T> {
    issues: Nodes<T>,
}

#[derive(Deserialize)]
struct IssueData<T> {
    issue: Option<T>,
}

#[derive(Deserialize)]
struct ProjectsData {
    projects: Nodes<RawProject>,
}

#[derive(Deserialize)]
struct ProjectData<T> {
    project: Option<T>,
}

#[derive(Deserialize)]
struct TeamsData {
    teams: Nodes<RawTeam>,
}

#[derive(Deserialize)]
struct TeamData<T> {
    team: Option<T>,
}

#[derive(Deserialize)]
struct CyclesData {
    cycles: Nodes<RawCycle>,
}

#[derive(Deserialize)]
struct CycleData<T> {
    cycle: Option<T>,
}

#[derive(Deserialize)]
struct InitiativesData {
    initiatives: Nodes<RawInitiative>,
}

#[derive(Deserialize)]
struct IssueStateNode {
    state: Option<WorkflowState>,
}

#[derive(Deserialize)]
struct IssueAssigneeNode {
    assignee: Option<UserRef>,
}

#[derive(Deserialize)]
struct IssueProjectNode {
    project: Option<ProjectRef>,
}

#[derive(Deserialize)]
struct IssueLabelsNode {
    labels: Nodes<LabelName>,
}

#[derive(Deserialize)]
struct LabelName {
    name: String,
}

#[derive(Deserialize)]
struct IssueCommentsNode {
    comments: Nodes<RawComment>,
}

#[derive(Deserialize)]
struct IssuesNode {
    issues: Nodes<RawIssue>,
}

#[derive(Deserialize)]
struct ProjectsNode {
    projects: Nodes<RawProject>,
}

#[derive(Deserialize)]
struct MembersNode {
    members: Nodes<RawMember>,
}

#[derive(Deserialize)]
struct CyclesNode {
    cycles: Nodes<RawCycle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: IssuePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueUpdateData {
    issue_update: IssuePayload,
}

#[derive(Deserialize)]
struct IssuePayload {
    issue: Option<RawIssue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycleCreateData {
    cycle_create: CyclePayload,
}

#[derive(Deserialize)]
struct CyclePayload {
    cycle: Option<RawCycle>,
}

/// Reqwest-backed tracker gateway.
pub struct LinearGateway {
    client: Client,
    config: ApiConfig,
}

impl LinearGateway {
    /// Build a gateway from explicit configuration.
    #[cfg_attr(test, allow(dead_code))]
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pulse-cli")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| PulseError::Gateway(err.to_string()))?;
        Ok(Self { client, config })
    }

    async fn post<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        log::debug!("tracker request: {}", query_name(query));
        let request = GraphqlRequest { query, variables };
        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| PulseError::Gateway(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::Gateway(format!(
                "tracker returned {status}: {body}"
            )));
        }

        let envelope = response
            .json::<GraphqlEnvelope<T>>()
            .await
            .map_err(|err| PulseError::Gateway(err.to_string()))?;
        if let Some(error) = envelope.errors.first() {
            return Err(PulseError::Gateway(error.message.clone()));
        }
        envelope
            .data
            .ok_or_else(|| PulseError::Gateway("response carried no data".to_string()))
    }

    async fn fetch_issues(&self, filter: &IssueFilter) -> Result<Vec<RawIssue>> {
        let query = format!(
            "query Issues($filter: IssueFilter, $first: Int!) {{ issues(filter: $filter, first: $first) {{ nodes {{ {ISSUE_FIELDS} }} }} }}"
        );
        let data: IssuesData<RawIssue> = self
            .post(
                &query,
                json!({ "filter": filter.to_graphql(), "first": FIRST_PAGE }),
            )
            .await?;
        Ok(data.issues.nodes)
    }

    async fn fetch_issue(&self, id: &str) -> Result<RawIssue> {
        let query = format!(
            "query Issue($id: String!) {{ issue(id: $id) {{ {ISSUE_FIELDS} }} }}"
        );
        let data: IssueData<RawIssue> = self.post(&query, json!({ "id": id })).await?;
        data.issue
            .ok_or_else(|| PulseError::NotFound(format!("issue {id}")))
    }

    async fn fetch_issue_relation<T: DeserializeOwned>(&self, id: &str, selection: &str) -> Result<T> {
        let query = format!("query IssueRelation($id: String!) {{ issue(id: $id) {{ {selection} }} }}");
        let data: IssueData<T> = self.post(&query, json!({ "id": id })).await?;
        data.issue
            .ok_or_else(|| PulseError::NotFound(format!("issue {id}")))
    }
}

impl DataGateway for LinearGateway {
    fn list_issues<'a>(&'a self, filter: &'a IssueFilter) -> GatewayFuture<'a, Vec<RawIssue>> {
        Box::pin(self.fetch_issues(filter))
    }

    fn get_issue<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawIssue> {
        Box::pin(self.fetch_issue(id))
    }

    fn create_issue<'a>(&'a self, draft: &'a IssueDraft) -> GatewayFuture<'a, RawIssue> {
        Box::pin(async move {
            let query = format!(
                "mutation IssueCreate($input: IssueCreateInput!) {{ issueCreate(input: $input) {{ issue {{ {ISSUE_FIELDS} }} }} }}"
            );
            let data: IssueCreateData = self.post(&query, json!({ "input": draft })).await?;
            data.issue_create
                .issue
                .ok_or_else(|| PulseError::Gateway("issue creation returned no issue".to_string()))
        })
    }

    fn update_issue_state<'a>(
        &'a self,
        id: &'a str,
        state_id: &'a str,
    ) -> GatewayFuture<'a, RawIssue> {
        Box::pin(async move {
            let query = format!(
                "mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) {{ issueUpdate(id: $id, input: $input) {{ issue {{ {ISSUE_FIELDS} }} }} }}"
            );
            let data: IssueUpdateData = self
                .post(&query, json!({ "id": id, "input": { "stateId": state_id } }))
                .await?;
            data.issue_update
                .issue
                .ok_or_else(|| PulseError::NotFound(format!("issue {id}")))
        })
    }

    fn issue_state<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<WorkflowState>> {
        Box::pin(async move {
            let node: IssueStateNode = self
                .fetch_issue_relation(id, "state { id name type }")
                .await?;
            Ok(node.state)
        })
    }

    fn issue_assignee<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<UserRef>> {
        Box::pin(async move {
            let node: IssueAssigneeNode =
                self.fetch_issue_relation(id, "assignee { id name }").await?;
            Ok(node.assignee)
        })
    }

    fn issue_project<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<ProjectRef>> {
        Box::pin(async move {
            let node: IssueProjectNode =
                self.fetch_issue_relation(id, "project { id name }").await?;
            Ok(node.project)
        })
    }

    fn issue_labels<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<String>> {
        Box::pin(async move {
            let node: IssueLabelsNode = self
                .fetch_issue_relation(id, "labels { nodes { name } }")
                .await?;
            Ok(node.labels.nodes.into_iter().map(|label| label.name).collect())
        })
    }

    fn issue_comments<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawComment>> {
        Box::pin(async move {
            let node: IssueCommentsNode = self
                .fetch_issue_relation(id, "comments { nodes { body createdAt user { id name } } }")
                .await?;
            Ok(node.comments.nodes)
        })
    }

    fn list_projects<'a>(&'a self) -> GatewayFuture<'a, Vec<RawProject>> {
        Box::pin(async move {
            let query =
                format!("query Projects {{ projects {{ nodes {{ {PROJECT_FIELDS} }} }} }}");
            let data: ProjectsData = self.post(&query, Value::Null).await?;
            Ok(data.projects.nodes)
        })
    }

    fn get_project<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawProject> {
        Box::pin(async move {
            let query = format!(
                "query Project($id: String!) {{ project(id: $id) {{ {PROJECT_FIELDS} }} }}"
            );
            let data: ProjectData<RawProject> = self.post(&query, json!({ "id": id })).await?;
            data.project
                .ok_or_else(|| PulseError::NotFound(format!("project {id}")))
        })
    }

    fn project_issues<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawIssue>> {
        Box::pin(async move {
            let query = format!(
                "query ProjectIssues($id: String!) {{ project(id: $id) {{ issues {{ nodes {{ {ISSUE_FIELDS} }} }} }} }}"
            );
            let data: ProjectData<IssuesNode> = self.post(&query, json!({ "id": id })).await?;
            let node = data
                .project
                .ok_or_else(|| PulseError::NotFound(format!("project {id}")))?;
            Ok(node.issues.nodes)
        })
    }

    fn list_teams<'a>(&'a self) -> GatewayFuture<'a, Vec<RawTeam>> {
        Box::pin(async move {
            let query = format!("query Teams {{ teams {{ nodes {{ {TEAM_FIELDS} }} }} }}");
            let data: TeamsData = self.post(&query, Value::Null).await?;
            Ok(data.teams.nodes)
        })
    }

    fn get_team<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawTeam> {
        Box::pin(async move {
            let query =
                format!("query Team($id: String!) {{ team(id: $id) {{ {TEAM_FIELDS} }} }}");
            let data: TeamData<RawTeam> = self.post(&query, json!({ "id": id })).await?;
            data.team
                .ok_or_else(|| PulseError::NotFound(format!("team {id}")))
        })
    }

    fn team_members<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawMember>> {
        Box::pin(async move {
            let query = format!(
                "query TeamMembers($id: String!) {{ team(id: $id) {{ members {{ nodes {{ id name email role active }} }} }} }}"
            );
            let data: TeamData<MembersNode> = self.post(&query, json!({ "id": id })).await?;
            let node = data
                .team
                .ok_or_else(|| PulseError::NotFound(format!("team {id}")))?;
            Ok(node.members.nodes)
        })
    }

    fn team_projects<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawProject>> {
        Box::pin(async move {
            let query = format!(
                "query TeamProjects($id: String!) {{ team(id: $id) {{ projects {{ nodes {{ {PROJECT_FIELDS} }} }} }} }}"
            );
            let data: TeamData<ProjectsNode> = self.post(&query, json!({ "id": id })).await?;
            let node = data
                .team
                .ok_or_else(|| PulseError::NotFound(format!("team {id}")))?;
            Ok(node.projects.nodes)
        })
    }

    fn team_cycles<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawCycle>> {
        Box::pin(async move {
            let query = format!(
                "query TeamCycles($id: String!) {{ team(id: $id) {{ cycles {{ nodes {{ {CYCLE_FIELDS} }} }} }} }}"
            );
            let data: TeamData<CyclesNode> = self.post(&query, json!({ "id": id })).await?;
            let node = data
                .team
                .ok_or_else(|| PulseError::NotFound(format!("team {id}")))?;
            Ok(node.cycles.nodes)
        })
    }

    fn list_active_cycles<'a>(&'a self) -> GatewayFuture<'a, Vec<RawCycle>> {
        Box::pin(async move {
            let query = format!(
                "query ActiveCycles($filter: CycleFilter) {{ cycles(filter: $filter) {{ nodes {{ {CYCLE_FIELDS} }} }} }}"
            );
            let data: CyclesData = self
                .post(
                    &query,
                    json!({ "filter": { "status": { "in": ["active", "upcoming"] } } }),
                )
                .await?;
            Ok(data.cycles.nodes)
        })
    }

    fn get_cycle<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawCycle> {
        Box::pin(async move {
            let query =
                format!("query Cycle($id: String!) {{ cycle(id: $id) {{ {CYCLE_FIELDS} }} }}");
            let data: CycleData<RawCycle> = self.post(&query, json!({ "id": id })).await?;
            data.cycle
                .ok_or_else(|| PulseError::NotFound(format!("cycle {id}")))
        })
    }

    fn cycle_projects<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawProject>> {
        Box::pin(async move {
            let query = format!(
                "query CycleProjects($id: String!) {{ cycle(id: $id) {{ projects {{ nodes {{ {PROJECT_FIELDS} }} }} }} }}"
            );
            let data: CycleData<ProjectsNode> = self.post(&query, json!({ "id": id })).await?;
            let node = data
                .cycle
                .ok_or_else(|| PulseError::NotFound(format!("cycle {id}")))?;
            Ok(node.projects.nodes)
        })
    }

    fn cycle_issues<'a>(
        &'a self,
        id: &'a str,
        status: Option<&'a str>,
    ) -> GatewayFuture<'a, Vec<RawIssue>> {
        Box::pin(async move {
            let query = format!(
                "query CycleIssues($id: String!, $filter: IssueFilter) {{ cycle(id: $id) {{ issues(filter: $filter) {{ nodes {{ {ISSUE_FIELDS} }} }} }} }}"
            );
            let filter = status.map(|status| json!({ "state": { "name": { "eq": status } } }));
            let data: CycleData<IssuesNode> = self
                .post(&query, json!({ "id": id, "filter": filter }))
                .await?;
            let node = data
                .cycle
                .ok_or_else(|| PulseError::NotFound(format!("cycle {id}")))?;
            Ok(node.issues.nodes)
        })
    }

    fn create_cycle<'a>(&'a self, draft: &'a CycleDraft) -> GatewayFuture<'a, RawCycle> {
        Box::pin(async move {
            let query = format!(
                "mutation CycleCreate($input: CycleCreateInput!) {{ cycleCreate(input: $input) {{ cycle {{ {CYCLE_FIELDS} }} }} }}"
            );
            let data: CycleCreateData = self.post(&query, json!({ "input": draft })).await?;
            data.cycle_create
                .cycle
                .ok_or_else(|| PulseError::Gateway("cycle creation returned no cycle".to_string()))
        })
    }

    fn list_initiatives<'a>(&'a self) -> GatewayFuture<'a, Vec<RawInitiative>> {
        Box::pin(async move {
            let query =
                "query Initiatives { initiatives { nodes { id name status description } } }";
            let data: InitiativesData = self.post(query, Value::Null).await?;
            Ok(data.initiatives.nodes)
        })
    }
}

/// Extract the operation name of a query for debug logging.
fn query_name(query: &str) -> &str {
    query
        .split_whitespace()
        .nth(1)
        .map(|name| name.split('(').next().unwrap_or(name))
        .unwrap_or("unnamed")
}
