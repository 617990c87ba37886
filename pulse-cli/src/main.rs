#![deny(missing_docs)]
//! Pulse command-line interface.
//!
//! Queries a project tracker for teams, cycles, issues, projects, and
//! initiatives, computes project health reports, and optionally forwards
//! data to a reasoning model for narrative or structured analysis.

mod cycles;
mod initiatives;
mod insights;
mod issues;
mod linear;
mod llm;
mod output;
mod projects;
mod resolve;
mod teams;
#[cfg(test)]
mod testutil;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use pulse_core::{PulseError, Result};
use std::sync::Arc;

use crate::linear::{ApiConfig, DataGateway, LinearGateway};
use crate::llm::{LlmConfig, OpenAiGateway, ReasoningGateway};
use crate::output::OutputArgs;

#[cfg_attr(test, allow(dead_code))]
pub(crate) type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "pulse", version, about = "Project tracker CLI with health analytics")]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Gateway configuration, shared by every subcommand.
#[derive(Args, Clone, Debug)]
struct ApiArgs {
    /// Tracker GraphQL endpoint.
    #[arg(long, env = "LINEAR_API_URL", default_value = linear::DEFAULT_API_URL, global = true)]
    api_url: String,
    /// Tracker API key.
    #[arg(long, env = "LINEAR_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Completion endpoint base URL.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = llm::DEFAULT_LLM_URL, global = true)]
    llm_url: String,
    /// Completion API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    llm_key: Option<String>,
    /// Completion model name.
    #[arg(long, env = "PULSE_MODEL", default_value = llm::DEFAULT_MODEL, global = true)]
    llm_model: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Team operations.
    Teams(teams::TeamsArgs),
    /// Cycle operations.
    Cycles(cycles::CyclesArgs),
    /// Issue operations.
    Issues(issues::IssuesArgs),
    /// Project summary and health analysis.
    Project(projects::ProjectArgs),
    /// List and analyze initiatives.
    Initiatives(initiatives::InitiativesArgs),
    /// Detect likely duplicate issues across all projects.
    Duplicates {
        /// Shared output options.
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Detect likely dependencies between issues across all projects.
    Dependencies {
        /// Shared output options.
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

#[cfg(test)]
fn main() {}

async fn run(cli: Cli) -> Result<()> {
    let gateway = data_gateway(&cli.api)?;

    match cli.command {
        Commands::Teams(args) => teams::run(gateway.as_ref(), args).await,
        Commands::Cycles(args) => cycles::run(gateway, args).await,
        Commands::Issues(args) => issues::run(gateway, args).await,
        Commands::Project(args) => {
            let reasoner = if args.analyze {
                Some(reasoning_gateway(&cli.api)?)
            } else {
                None
            };
            projects::run(
                gateway,
                reasoner.as_ref().map(|r| r as &dyn ReasoningGateway),
                args,
                Utc::now(),
            )
            .await
        }
        Commands::Initiatives(args) => {
            let reasoner = if args.analyze {
                Some(reasoning_gateway(&cli.api)?)
            } else {
                None
            };
            initiatives::run(
                gateway.as_ref(),
                reasoner.as_ref().map(|r| r as &dyn ReasoningGateway),
                args,
            )
            .await
        }
        Commands::Duplicates { output } => {
            let reasoner = reasoning_gateway(&cli.api)?;
            insights::run_duplicates(gateway, &reasoner, &output).await
        }
        Commands::Dependencies { output } => {
            let reasoner = reasoning_gateway(&cli.api)?;
            insights::run_dependencies(gateway, &reasoner, &output).await
        }
    }
}

fn data_gateway(api: &ApiArgs) -> Result<Arc<dyn DataGateway>> {
    let api_key = api.api_key.clone().ok_or_else(|| {
        PulseError::Validation(
            "tracker API key is required (--api-key or LINEAR_API_KEY)".to_string(),
        )
    })?;
    let gateway = LinearGateway::new(ApiConfig {
        api_url: api.api_url.clone(),
        api_key,
    })?;
    Ok(Arc::new(gateway))
}

fn reasoning_gateway(api: &ApiArgs) -> Result<OpenAiGateway> {
    let api_key = api.llm_key.clone().ok_or_else(|| {
        PulseError::Validation(
            "completion API key is required (--llm-key or OPENAI_API_KEY)".to_string(),
        )
    })?;
    OpenAiGateway::new(LlmConfig {
        base_url: api.llm_url.clone(),
        api_key,
        model: api.llm_model.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, run};
    use clap::{CommandFactory, Parser};
    use pulse_core::PulseError;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    fn parse(argv: &[&str]) -> Cli {
        let mut full = vec!["pulse", "--api-key", "test-key"];
        full.extend_from_slice(argv);
        Cli::try_parse_from(full).expect("parse")
    }

    #[test]
    fn parses_teams_list() {
        let cli = parse(&["teams", "--list"]);
        match cli.command {
            Commands::Teams(args) => assert!(args.list),
            _ => panic!("expected teams command"),
        }
    }

    #[test]
    fn teams_requires_exactly_one_action() {
        let result = Cli::try_parse_from(["pulse", "teams"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["pulse", "teams", "--list", "--info", "team-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_issue_list_filters() {
        let cli = parse(&[
            "issues", "--list", "--team", "team-1", "--status", "Done",
        ]);
        match cli.command {
            Commands::Issues(args) => {
                assert!(args.list);
                assert_eq!(args.team.as_deref(), Some("team-1"));
                assert_eq!(args.status.as_deref(), Some("Done"));
            }
            _ => panic!("expected issues command"),
        }
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let result = Cli::try_parse_from([
            "pulse", "issues", "--create", "--title", "t", "--team-id", "x", "--priority", "9",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn project_analyze_requires_health() {
        let result = Cli::try_parse_from(["pulse", "project", "prj-1", "--analyze"]);
        assert!(result.is_err());

        let cli = parse(&["project", "prj-1", "--health", "--analyze"]);
        match cli.command {
            Commands::Project(args) => {
                assert!(args.health);
                assert!(args.analyze);
            }
            _ => panic!("expected project command"),
        }
    }

    #[test]
    fn api_args_accept_global_position() {
        let cli = Cli::try_parse_from([
            "pulse", "teams", "--list", "--api-key", "k", "--llm-model", "gpt-4o-mini",
        ])
        .expect("parse");
        assert_eq!(cli.api.api_key.as_deref(), Some("k"));
        assert_eq!(cli.api.llm_model, "gpt-4o-mini");
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
        LOCK.get_or_init(|| std::sync::Mutex::new(()))
            .lock()
            .expect("env lock")
    }

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::remove_var(key) };
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(prev) = self.prev.take() {
                unsafe { std::env::set_var(self.key, prev) };
            }
        }
    }

    #[tokio::test]
    async fn missing_tracker_key_is_a_validation_error() {
        let _lock = env_lock();
        let _guard = EnvGuard::unset("LINEAR_API_KEY");
        let cli = Cli::try_parse_from(["pulse", "teams", "--list"]).expect("parse");
        let err = run(cli).await.unwrap_err();
        assert!(matches!(err, PulseError::Validation(_)));
        assert!(err.to_string().contains("LINEAR_API_KEY"));
    }

    #[tokio::test]
    async fn missing_completion_key_is_a_validation_error() {
        let _lock = env_lock();
        let _guard = EnvGuard::unset("OPENAI_API_KEY");
        let cli =
            Cli::try_parse_from(["pulse", "--api-key", "k", "duplicates"]).expect("parse");
        let err = run(cli).await.unwrap_err();
        assert!(matches!(err, PulseError::Validation(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
