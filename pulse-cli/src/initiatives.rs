//! The `initiatives` command.

use clap::Args;
use pulse_core::render::render_initiatives_text;
use pulse_core::{
    ANALYST_PROMPT, InitiativeSnapshot, PulseError, Result, analysis_payload,
};

use crate::linear::DataGateway;
use crate::llm::ReasoningGateway;
use crate::output::{OutputArgs, emit};

/// Arguments for initiative operations.
#[derive(Args, Clone, Debug)]
pub struct InitiativesArgs {
    /// Send the initiative list to the reasoning model for analysis.
    #[arg(short, long)]
    pub analyze: bool,
    /// Shared output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Execute the `initiatives` command.
pub async fn run(
    gateway: &dyn DataGateway,
    llm: Option<&dyn ReasoningGateway>,
    args: InitiativesArgs,
) -> Result<()> {
    let initiatives: Vec<InitiativeSnapshot> = gateway
        .list_initiatives()
        .await?
        .into_iter()
        .map(|initiative| initiative.into_snapshot())
        .collect();

    if args.analyze {
        let llm = llm.ok_or_else(|| {
            PulseError::Validation("reasoning gateway is not configured".to_string())
        })?;
        let payload = analysis_payload(&initiatives)?;
        let narrative = llm.complete(ANALYST_PROMPT, &payload, false).await?;
        println!("{narrative}");
        return Ok(());
    }

    emit(
        &args.output,
        &initiatives,
        render_initiatives_text(&initiatives),
    )
    .await
}
