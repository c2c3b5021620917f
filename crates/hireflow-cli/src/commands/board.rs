use anyhow::Result;
use clap::Args;
use colored::Colorize;
use hireflow_application::PipelineBoard;
use hireflow_infrastructure::ConfigService;
use tokio_util::sync::CancellationToken;

use super::utils::backend;

#[derive(Args)]
pub struct BoardArgs {
    #[arg(long)]
    job: String,

    /// Keep reloading on the configured interval until Ctrl-C
    #[arg(long)]
    watch: bool,
}

pub async fn execute(args: BoardArgs, config_service: &ConfigService) -> Result<()> {
    let config = config_service.get_config();
    let board = PipelineBoard::new(backend(config_service)?);

    let count = board.reload(&args.job).await?;
    println!("📋 {} candidate(s) for job {}", count, args.job);
    print_board(&board).await;

    if !args.watch {
        return Ok(());
    }

    let Some(interval) = config.pipeline.auto_refresh_interval() else {
        println!("{}", "Auto-refresh is disabled (pipeline.auto_refresh_secs = 0)".yellow());
        return Ok(());
    };

    let cancel = CancellationToken::new();
    let refresh = board.spawn_auto_refresh(args.job.as_str(), interval, cancel.clone());
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                println!();
                print_board(&board).await;
            }
        }
    }

    cancel.cancel();
    let _ = refresh.await;
    Ok(())
}

async fn print_board(board: &PipelineBoard) {
    for (stage, candidates) in board.buckets().await {
        println!("{} ({})", stage.label().bold(), candidates.len());
        for candidate in candidates {
            let activity = &candidate.activity;
            println!(
                "  {} {}  {}",
                candidate.id.dimmed(),
                candidate.name,
                format!(
                    "eval {} · debate {} · conversations {}",
                    activity.evaluation_count, activity.debate_count, activity.conversation_count
                )
                .dimmed()
            );
        }
    }
}
