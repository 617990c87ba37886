//! Hand-rolled gateway doubles shared by command and resolver tests.

use chrono::{DateTime, Utc};
use pulse_core::PulseError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::linear::{
    CycleDraft, DataGateway, GatewayFuture, IssueDraft, IssueFilter, ProjectRef, RawComment,
    RawCycle, RawInitiative, RawIssue, RawMember, RawProject, RawTeam, UserRef, WorkflowState,
};
use crate::llm::{ReasoningFuture, ReasoningGateway};

fn fixed_instant() -> DateTime<Utc> {
    "2026-03-01T10:00:00Z".parse().expect("timestamp")
}

/// Build a raw issue with scalar fields only.
pub fn raw_issue(id: &str, title: &str) -> RawIssue {
    RawIssue {
        id: id.to_string(),
        identifier: format!("ENG-{id}"),
        title: title.to_string(),
        description: None,
        priority: 0,
        due_date: None,
        created_at: fixed_instant(),
        completed_at: None,
        url: Some(format!("https://tracker.example/ENG-{id}")),
    }
}

/// Build a raw project.
pub fn raw_project(id: &str, name: &str) -> RawProject {
    RawProject {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        state: Some("started".to_string()),
        progress: 40.0,
        target_date: None,
        team_id: Some("team-1".to_string()),
    }
}

/// Build a raw team.
pub fn raw_team(id: &str, name: &str) -> RawTeam {
    RawTeam {
        id: id.to_string(),
        name: name.to_string(),
        key: name.chars().take(3).collect::<String>().to_uppercase(),
        description: None,
        private: false,
        member_count: Some(3),
        created_at: fixed_instant(),
        updated_at: None,
    }
}

/// Build a raw cycle.
pub fn raw_cycle(id: &str, number: u32) -> RawCycle {
    RawCycle {
        id: id.to_string(),
        name: None,
        number,
        status: Some("active".to_string()),
        starts_at: Some(fixed_instant()),
        ends_at: None,
        progress: Some(10.0),
        scope_changes: 0.0,
        created_at: fixed_instant(),
    }
}

/// In-memory tracker gateway with per-test data and failure switches.
#[derive(Default)]
pub struct StubGateway {
    /// Issues returned by `list_issues`.
    pub issues: Vec<RawIssue>,
    /// Teams returned by `list_teams`.
    pub teams: Vec<RawTeam>,
    /// Projects returned by `list_projects`.
    pub projects: Vec<RawProject>,
    /// Cycles returned by `list_active_cycles`.
    pub cycles: Vec<RawCycle>,
    /// Initiatives returned by `list_initiatives`.
    pub initiatives: Vec<RawInitiative>,
    /// Members per team id.
    pub members: HashMap<String, Vec<RawMember>>,
    /// Projects per team id.
    pub team_projects: HashMap<String, Vec<RawProject>>,
    /// Cycles per team id.
    pub team_cycles: HashMap<String, Vec<RawCycle>>,
    /// Projects per cycle id.
    pub cycle_projects: HashMap<String, Vec<RawProject>>,
    /// Issues per cycle id.
    pub cycle_issues: HashMap<String, Vec<RawIssue>>,
    /// Issues per project id.
    pub project_issues: HashMap<String, Vec<RawIssue>>,
    /// Comments per issue id.
    pub comments: HashMap<String, Vec<RawComment>>,
    /// Workflow state per issue id.
    pub states: HashMap<String, WorkflowState>,
    /// Assignee per issue id.
    pub assignees: HashMap<String, UserRef>,
    /// Project relation per issue id.
    pub issue_projects: HashMap<String, ProjectRef>,
    /// Labels per issue id.
    pub labels: HashMap<String, Vec<String>>,
    /// Issue ids whose assignee lookup fails.
    pub failing_assignees: HashSet<String>,
    /// Issue ids whose state lookup fails.
    pub failing_states: HashSet<String>,
    /// Filter captured by the last `list_issues` call.
    pub last_filter: Mutex<Option<IssueFilter>>,
    /// Status captured by the last `cycle_issues` call.
    pub last_cycle_status: Mutex<Option<String>>,
    /// Drafts captured by `create_issue`.
    pub created_issues: Mutex<Vec<IssueDraft>>,
    /// Drafts captured by `create_cycle`.
    pub created_cycles: Mutex<Vec<CycleDraft>>,
    /// State moves captured by `update_issue_state`.
    pub state_updates: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    /// Register a workflow state for an issue id.
    pub fn set_state(&mut self, issue_id: &str, name: &str, state_type: &str) {
        self.states.insert(
            issue_id.to_string(),
            WorkflowState {
                id: format!("st-{issue_id}"),
                name: name.to_string(),
                state_type: state_type.to_string(),
            },
        );
    }

    /// Register an assignee for an issue id.
    pub fn set_assignee(&mut self, issue_id: &str, name: &str) {
        self.assignees.insert(
            issue_id.to_string(),
            UserRef {
                id: format!("usr-{name}"),
                name: name.to_string(),
            },
        );
    }

    /// Register a project relation for an issue id.
    pub fn set_project(&mut self, issue_id: &str, project_id: &str, name: &str) {
        self.issue_projects.insert(
            issue_id.to_string(),
            ProjectRef {
                id: project_id.to_string(),
                name: name.to_string(),
            },
        );
    }

    /// Register labels for an issue id.
    pub fn set_labels(&mut self, issue_id: &str, labels: &[&str]) {
        self.labels.insert(
            issue_id.to_string(),
            labels.iter().map(|label| label.to_string()).collect(),
        );
    }

    /// Make the assignee lookup fail for an issue id.
    pub fn fail_assignee_for(&mut self, issue_id: &str) {
        self.failing_assignees.insert(issue_id.to_string());
    }

    /// Make the state lookup fail for an issue id.
    pub fn fail_state_for(&mut self, issue_id: &str) {
        self.failing_states.insert(issue_id.to_string());
    }

    fn find_issue(&self, id: &str) -> Option<RawIssue> {
        self.issues
            .iter()
            .chain(self.project_issues.values().flatten())
            .chain(self.cycle_issues.values().flatten())
            .find(|issue| issue.id == id || issue.identifier == id)
            .cloned()
    }
}

impl DataGateway for StubGateway {
    fn list_issues<'a>(&'a self, filter: &'a IssueFilter) -> GatewayFuture<'a, Vec<RawIssue>> {
        *self.last_filter.lock().expect("filter lock") = Some(filter.clone());
        let issues = self.issues.clone();
        Box::pin(async move { Ok(issues) })
    }

    fn get_issue<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawIssue> {
        let found = self.find_issue(id);
        Box::pin(async move {
            found.ok_or_else(|| PulseError::NotFound(format!("issue {id}")))
        })
    }

    fn create_issue<'a>(&'a self, draft: &'a IssueDraft) -> GatewayFuture<'a, RawIssue> {
        self.created_issues
            .lock()
            .expect("created issues lock")
            .push(draft.clone());
        let mut issue = raw_issue("new-1", &draft.title);
        issue.description = draft.description.clone();
        issue.priority = draft.priority.unwrap_or(0);
        Box::pin(async move { Ok(issue) })
    }

    fn update_issue_state<'a>(
        &'a self,
        id: &'a str,
        state_id: &'a str,
    ) -> GatewayFuture<'a, RawIssue> {
        self.state_updates
            .lock()
            .expect("state updates lock")
            .push((id.to_string(), state_id.to_string()));
        let found = self.find_issue(id);
        Box::pin(async move {
            found.ok_or_else(|| PulseError::NotFound(format!("issue {id}")))
        })
    }

    fn issue_state<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<WorkflowState>> {
        let failing = self.failing_states.contains(id);
        let state = self.states.get(id).cloned();
        Box::pin(async move {
            if failing {
                Err(PulseError::Gateway("state lookup failed".to_string()))
            } else {
                Ok(state)
            }
        })
    }

    fn issue_assignee<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<UserRef>> {
        let failing = self.failing_assignees.contains(id);
        let assignee = self.assignees.get(id).cloned();
        Box::pin(async move {
            if failing {
                Err(PulseError::Gateway("assignee lookup failed".to_string()))
            } else {
                Ok(assignee)
            }
        })
    }

    fn issue_project<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Option<ProjectRef>> {
        let project = self.issue_projects.get(id).cloned();
        Box::pin(async move { Ok(project) })
    }

    fn issue_labels<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<String>> {
        let labels = self.labels.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(labels) })
    }

    fn issue_comments<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawComment>> {
        let comments = self.comments.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(comments) })
    }

    fn list_projects<'a>(&'a self) -> GatewayFuture<'a, Vec<RawProject>> {
        let projects = self.projects.clone();
        Box::pin(async move { Ok(projects) })
    }

    fn get_project<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawProject> {
        let found = self.projects.iter().find(|p| p.id == id).cloned();
        Box::pin(async move {
            found.ok_or_else(|| PulseError::NotFound(format!("project {id}")))
        })
    }

    fn project_issues<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawIssue>> {
        let known = self.projects.iter().any(|p| p.id == id);
        let issues = self.project_issues.get(id).cloned().unwrap_or_default();
        Box::pin(async move {
            if known {
                Ok(issues)
            } else {
                Err(PulseError::NotFound(format!("project {id}")))
            }
        })
    }

    fn list_teams<'a>(&'a self) -> GatewayFuture<'a, Vec<RawTeam>> {
        let teams = self.teams.clone();
        Box::pin(async move { Ok(teams) })
    }

    fn get_team<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawTeam> {
        let found = self.teams.iter().find(|t| t.id == id).cloned();
        Box::pin(async move {
            found.ok_or_else(|| PulseError::NotFound(format!("team {id}")))
        })
    }

    fn team_members<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawMember>> {
        let members = self.members.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(members) })
    }

    fn team_projects<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawProject>> {
        let projects = self.team_projects.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(projects) })
    }

    fn team_cycles<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawCycle>> {
        let cycles = self.team_cycles.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(cycles) })
    }

    fn list_active_cycles<'a>(&'a self) -> GatewayFuture<'a, Vec<RawCycle>> {
        let cycles = self.cycles.clone();
        Box::pin(async move { Ok(cycles) })
    }

    fn get_cycle<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, RawCycle> {
        let found = self.cycles.iter().find(|c| c.id == id).cloned();
        Box::pin(async move {
            found.ok_or_else(|| PulseError::NotFound(format!("cycle {id}")))
        })
    }

    fn cycle_projects<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Vec<RawProject>> {
        let projects = self.cycle_projects.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(projects) })
    }

    fn cycle_issues<'a>(
        &'a self,
        id: &'a str,
        status: Option<&'a str>,
    ) -> GatewayFuture<'a, Vec<RawIssue>> {
        *self.last_cycle_status.lock().expect("status lock") = status.map(str::to_string);
        let issues = self.cycle_issues.get(id).cloned().unwrap_or_default();
        Box::pin(async move { Ok(issues) })
    }

    fn create_cycle<'a>(&'a self, draft: &'a CycleDraft) -> GatewayFuture<'a, RawCycle> {
        self.created_cycles
            .lock()
            .expect("created cycles lock")
            .push(draft.clone());
        let mut cycle = raw_cycle("new-cycle", 1);
        cycle.name = Some(draft.name.clone());
        cycle.starts_at = Some(draft.starts_at);
        cycle.ends_at = Some(draft.ends_at);
        Box::pin(async move { Ok(cycle) })
    }

    fn list_initiatives<'a>(&'a self) -> GatewayFuture<'a, Vec<RawInitiative>> {
        let initiatives = self.initiatives.clone();
        Box::pin(async move { Ok(initiatives) })
    }
}

/// Canned reasoning gateway that records every call.
#[derive(Default)]
pub struct StubReasoner {
    /// Response returned from every `complete` call.
    pub response: String,
    /// When set, `complete` fails with a gateway error.
    pub fail: bool,
    /// Captured `(system_prompt, user_payload, json_response)` calls.
    pub calls: Mutex<Vec<(String, String, bool)>>,
}

impl StubReasoner {
    /// A reasoner answering with a fixed response.
    pub fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            ..Self::default()
        }
    }
}

impl ReasoningGateway for StubReasoner {
    fn complete<'a>(
        &'a self,
        system_prompt: &'a str,
        user_payload: &'a str,
        json_response: bool,
    ) -> ReasoningFuture<'a, String> {
        self.calls.lock().expect("calls lock").push((
            system_prompt.to_string(),
            user_payload.to_string(),
            json_response,
        ));
        let result = if self.fail {
            Err(PulseError::Gateway("completion failed".to_string()))
        } else {
            Ok(self.response.clone())
        };
        Box::pin(async move { result })
    }
}
