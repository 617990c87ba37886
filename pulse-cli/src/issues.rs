//! The `issues` command.

use clap::{ArgGroup, Args};
use pulse_core::render::{render_issue_detail_text, render_issues_text};
use pulse_core::{CommentSnapshot, IssueSnapshot, PulseError, Result, StateType};
use serde::Serialize;
use std::sync::Arc;

use crate::linear::{DataGateway, IssueDraft, IssueFilter};
use crate::output::{OutputArgs, emit};
use crate::resolve::{resolve_issues, snapshot_base};

/// Arguments for issue operations.
#[derive(Args, Clone, Debug)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(&["list", "info", "create", "move_issue"])
))]
pub struct IssuesArgs {
    /// List issues.
    #[arg(short, long)]
    pub list: bool,
    /// Filter --list by team id.
    #[arg(short, long, value_name = "TEAM_ID")]
    pub team: Option<String>,
    /// Filter --list by project id.
    #[arg(short, long, value_name = "PROJECT_ID")]
    pub project: Option<String>,
    /// Filter --list by cycle id.
    #[arg(short, long, value_name = "CYCLE_ID")]
    pub cycle: Option<String>,
    /// Filter --list by state name.
    #[arg(short, long, value_name = "STATE")]
    pub status: Option<String>,
    /// Filter --list by assignee user id.
    #[arg(short, long, value_name = "USER_ID")]
    pub assignee: Option<String>,
    /// Show detailed info for an issue.
    #[arg(short, long, value_name = "ISSUE_ID")]
    pub info: Option<String>,
    /// Create a new issue.
    #[arg(long)]
    pub create: bool,
    /// Title for the new issue.
    #[arg(long)]
    pub title: Option<String>,
    /// Description for the new issue.
    #[arg(long)]
    pub desc: Option<String>,
    /// Team ID for the new issue.
    #[arg(long, value_name = "TEAM_ID")]
    pub team_id: Option<String>,
    /// Project ID for the new issue.
    #[arg(long, value_name = "PROJECT_ID")]
    pub project_id: Option<String>,
    /// Cycle ID for the new issue.
    #[arg(long, value_name = "CYCLE_ID")]
    pub cycle_id: Option<String>,
    /// Assignee ID for the new issue.
    #[arg(long, value_name = "USER_ID")]
    pub assignee_id: Option<String>,
    /// Priority for the new issue (0: none, 1: urgent, 2: high, 3: medium, 4: low).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
    pub priority: Option<u8>,
    /// Move an issue to a different state.
    #[arg(long = "move", value_name = "ISSUE_ID")]
    pub move_issue: Option<String>,
    /// Target state ID for --move.
    #[arg(long, value_name = "STATE_ID")]
    pub to_state: Option<String>,
    /// Shared output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

impl IssuesArgs {
    fn filter(&self) -> IssueFilter {
        IssueFilter {
            team: self.team.clone(),
            project: self.project.clone(),
            cycle: self.cycle.clone(),
            status: self.status.clone(),
            assignee: self.assignee.clone(),
        }
    }
}

#[derive(Serialize)]
struct IssueDetail {
    issue: IssueSnapshot,
    comments: Vec<CommentSnapshot>,
}

/// Execute the `issues` command.
pub async fn run(gateway: Arc<dyn DataGateway>, args: IssuesArgs) -> Result<()> {
    if args.list {
        let filter = args.filter();
        let raws = gateway.list_issues(&filter).await?;
        let issues = resolve_issues(gateway.clone(), raws).await?;
        let text = format!(
            "Issues{}\n\n{}",
            filter.describe(),
            render_issues_text(&issues)
        );
        return emit(&args.output, &issues, text).await;
    }

    if let Some(id) = &args.info {
        let raw = gateway.get_issue(id).await?;
        let comments: Vec<CommentSnapshot> = gateway
            .issue_comments(&raw.id)
            .await?
            .into_iter()
            .map(|comment| comment.into_snapshot())
            .collect();
        let mut issues = resolve_issues(gateway.clone(), vec![raw]).await?;
        let issue = issues.pop().ok_or_else(|| {
            PulseError::Gateway("issue resolution returned no snapshot".to_string())
        })?;
        let text = render_issue_detail_text(&issue, &comments);
        let detail = IssueDetail { issue, comments };
        return emit(&args.output, &detail, text).await;
    }

    if args.create {
        let draft = build_issue_draft(&args)?;
        let created = snapshot_base(gateway.create_issue(&draft).await?);
        let text = format!(
            "Successfully created new issue: {}\n\nID: {}\nTitle: {}\nURL: {}\n",
            created.identifier,
            created.identifier,
            created.title,
            created.url.as_deref().unwrap_or("N/A"),
        );
        return emit(&args.output, &created, text).await;
    }

    if let Some(id) = &args.move_issue {
        let state_id = args.to_state.as_deref().ok_or_else(|| {
            PulseError::Validation("target state is required (--to-state)".to_string())
        })?;
        let raw = gateway.get_issue(id).await?;
        let previous_state = gateway.issue_state(&raw.id).await.ok().flatten();
        let updated = gateway.update_issue_state(&raw.id, state_id).await?;
        let new_state = gateway.issue_state(&updated.id).await.ok().flatten();

        let mut issue = snapshot_base(updated);
        if let Some(state) = &new_state {
            issue.state_type = StateType::parse(&state.state_type);
            issue.state_name = Some(state.name.clone());
        }
        let text = format!(
            "Successfully moved issue {} from \"{}\" to \"{}\"\n\nID: {}\nTitle: {}\nStatus: {}\nURL: {}\n",
            issue.identifier,
            previous_state
                .as_ref()
                .map(|state| state.name.as_str())
                .unwrap_or("Unknown"),
            new_state
                .as_ref()
                .map(|state| state.name.as_str())
                .unwrap_or("Unknown"),
            issue.identifier,
            issue.title,
            issue.state_name.as_deref().unwrap_or("Unknown"),
            issue.url.as_deref().unwrap_or("N/A"),
        );
        return emit(&args.output, &issue, text).await;
    }

    Ok(())
}

fn build_issue_draft(args: &IssuesArgs) -> Result<IssueDraft> {
    let title = args
        .title
        .as_deref()
        .ok_or_else(|| PulseError::Validation("issue title is required (--title)".to_string()))?;
    let team_id = args
        .team_id
        .as_deref()
        .ok_or_else(|| PulseError::Validation("team id is required (--team-id)".to_string()))?;

    Ok(IssueDraft {
        title: title.to_string(),
        team_id: team_id.to_string(),
        description: args.desc.clone(),
        project_id: args.project_id.clone(),
        cycle_id: args.cycle_id.clone(),
        assignee_id: args.assignee_id.clone(),
        priority: args.priority,
    })
}

#[cfg(test)]
mod tests {
    use super::{IssuesArgs, run};
    use crate::output::OutputArgs;
    use crate::testutil::{StubGateway, raw_issue};
    use pulse_core::PulseError;
    use std::sync::Arc;

    fn args() -> IssuesArgs {
        IssuesArgs {
            list: false,
            team: None,
            project: None,
            cycle: None,
            status: None,
            assignee: None,
            info: None,
            create: false,
            title: None,
            desc: None,
            team_id: None,
            project_id: None,
            cycle_id: None,
            assignee_id: None,
            priority: None,
            move_issue: None,
            to_state: None,
            output: OutputArgs::default(),
        }
    }

    #[tokio::test]
    async fn list_passes_filters_to_the_gateway() {
        let stub = Arc::new(StubGateway {
            issues: vec![raw_issue("iss-1", "Fix login")],
            ..StubGateway::default()
        });

        run(
            stub.clone(),
            IssuesArgs {
                list: true,
                team: Some("team-1".to_string()),
                status: Some("Done".to_string()),
                ..args()
            },
        )
        .await
        .expect("issues list");

        let filter = stub.last_filter.lock().expect("filter").clone().expect("set");
        assert_eq!(filter.team.as_deref(), Some("team-1"));
        assert_eq!(filter.status.as_deref(), Some("Done"));
        assert!(filter.project.is_none());
    }

    #[tokio::test]
    async fn info_resolves_issue_and_comments() {
        let mut stub = StubGateway {
            issues: vec![raw_issue("iss-1", "Fix login")],
            ..StubGateway::default()
        };
        stub.set_state("iss-1", "In Review", "started");
        stub.comments.insert("iss-1".to_string(), Vec::new());

        run(
            Arc::new(stub),
            IssuesArgs {
                info: Some("iss-1".to_string()),
                ..args()
            },
        )
        .await
        .expect("issue info");
    }

    #[tokio::test]
    async fn info_accepts_the_human_identifier() {
        let stub = StubGateway {
            issues: vec![raw_issue("iss-1", "Fix login")],
            ..StubGateway::default()
        };

        run(
            Arc::new(stub),
            IssuesArgs {
                info: Some("ENG-iss-1".to_string()),
                ..args()
            },
        )
        .await
        .expect("issue info by identifier");
    }

    #[tokio::test]
    async fn info_of_unknown_issue_is_not_found() {
        let err = run(
            Arc::new(StubGateway::default()),
            IssuesArgs {
                info: Some("iss-404".to_string()),
                ..args()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PulseError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_requires_title_and_team() {
        let stub = Arc::new(StubGateway::default());

        let err = run(
            stub.clone(),
            IssuesArgs {
                create: true,
                title: Some("New issue".to_string()),
                ..args()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PulseError::Validation(_)));
        assert!(stub.created_issues.lock().expect("drafts").is_empty());
    }

    #[tokio::test]
    async fn create_sends_the_full_draft() {
        let stub = Arc::new(StubGateway::default());

        run(
            stub.clone(),
            IssuesArgs {
                create: true,
                title: Some("New issue".to_string()),
                team_id: Some("team-1".to_string()),
                desc: Some("Details".to_string()),
                priority: Some(2),
                ..args()
            },
        )
        .await
        .expect("create issue");

        let drafts = stub.created_issues.lock().expect("drafts");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "New issue");
        assert_eq!(drafts[0].team_id, "team-1");
        assert_eq!(drafts[0].description.as_deref(), Some("Details"));
        assert_eq!(drafts[0].priority, Some(2));
    }

    #[tokio::test]
    async fn move_requires_a_target_state() {
        let err = run(
            Arc::new(StubGateway::default()),
            IssuesArgs {
                move_issue: Some("iss-1".to_string()),
                ..args()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PulseError::Validation(_)));
    }

    #[tokio::test]
    async fn move_updates_state_through_the_gateway() {
        let mut stub = StubGateway {
            issues: vec![raw_issue("iss-1", "Fix login")],
            ..StubGateway::default()
        };
        stub.set_state("iss-1", "Done", "completed");
        let stub = Arc::new(stub);

        run(
            stub.clone(),
            IssuesArgs {
                move_issue: Some("iss-1".to_string()),
                to_state: Some("st-done".to_string()),
                ..args()
            },
        )
        .await
        .expect("move issue");

        let updates = stub.state_updates.lock().expect("updates");
        assert_eq!(updates.as_slice(), &[("iss-1".to_string(), "st-done".to_string())]);
    }
}
