use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hireflow_application::{PipelineBoard, TransitionOutcome};
use hireflow_core::pipeline::PipelineStage;
use hireflow_infrastructure::ConfigService;

use super::utils::backend;

#[derive(Args)]
pub struct StageArgs {
    /// Job whose board holds the candidate
    #[arg(long)]
    job: String,

    candidate_id: String,

    /// Target stage (introduced, review, first_interview, second_interview, offer, complete)
    stage: PipelineStage,
}

pub async fn execute(args: StageArgs, config_service: &ConfigService) -> Result<()> {
    let board = PipelineBoard::new(backend(config_service)?);
    board.reload(&args.job).await?;

    match board.move_candidate(&args.candidate_id, args.stage).await {
        Ok(TransitionOutcome::Unchanged) => {
            println!("{} is already in {}", args.candidate_id, args.stage.label());
        }
        Ok(TransitionOutcome::Moved { from, to }) => {
            println!(
                "{} {}: {} → {}",
                "✓".green(),
                args.candidate_id,
                from.label(),
                to.label().bold()
            );
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e.alert_message().red());
            return Err(e.into());
        }
    }

    Ok(())
}
