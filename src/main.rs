use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_reconcile::{
    config::Config,
    errors::WorkflowError,
    matching::NameNormalizer,
    models::{ChannelId, Decision, EpgDataId},
    services::{
        AssignmentWriter, JsonFileAssignmentWriter, MemoryAssignmentWriter, ResolutionWorkflow,
    },
    snapshot::CatalogSnapshot,
};

#[derive(Parser)]
#[command(name = "epg-reconcile")]
#[command(version)]
#[command(about = "Match channels against EPG data and resolve ambiguous matches")]
#[command(long_about = None)]
struct Cli {
    /// Catalog snapshot (JSON) to reconcile
    #[arg(short, long, value_name = "FILE")]
    snapshot: String,

    /// Configuration file path (defaults to $CONFIG_FILE or epg-reconcile.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Channel ids to analyze, comma separated (defaults to every channel)
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    channels: Vec<ChannelId>,

    /// Review decisions as a JSON object of channel id to EPG entry id (null skips)
    #[arg(short, long, value_name = "FILE")]
    decisions: Option<String>,

    /// Write committed assignments to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Commit the session; without it the session is discarded
    #[arg(long)]
    commit: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("epg_reconcile={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting EPG reconciliation v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    let snapshot = Arc::new(
        CatalogSnapshot::load(&cli.snapshot)
            .await
            .with_context(|| format!("Failed to load snapshot {}", cli.snapshot))?,
    );
    let selection = if cli.channels.is_empty() {
        snapshot.channel_ids()
    } else {
        cli.channels.clone()
    };

    let normalizer = Arc::new(NameNormalizer::new(&config.matching)?);
    let memory_writer = MemoryAssignmentWriter::new();
    let writer: Arc<dyn AssignmentWriter> = match &cli.output {
        Some(path) => Arc::new(JsonFileAssignmentWriter::new(path)),
        None => Arc::new(memory_writer.clone()),
    };
    let mut workflow = ResolutionWorkflow::new(normalizer, config.workflow.clone(), writer);

    let pending = workflow.open(Arc::clone(&snapshot), &selection);
    let mut progress = pending.progress();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let update = *progress.borrow_and_update();
            info!(
                "Analyzed {}/{} channels ({:.0}%)",
                update.processed,
                update.total,
                update.percentage()
            );
        }
    });
    let outcome = pending.finish().await;
    let _ = watcher.await;
    workflow.apply_analysis(outcome)?;

    if let Some(path) = &cli.decisions {
        apply_decisions(&mut workflow, path).await?;
    }

    let Some(review) = workflow.review() else {
        anyhow::bail!("Workflow left review unexpectedly");
    };
    println!("{}", review.summary());
    for item in review
        .review_items(&snapshot.epg_sources)
        .into_iter()
        .filter(|item| !item.decision.is_decided())
    {
        println!("\n[{}] {} needs review:", item.channel_id, item.channel_name);
        for candidate in &item.candidates {
            println!(
                "  {:>6}  {:<32} {} ({})",
                candidate.epg_data_id, candidate.tvg_id, candidate.name, candidate.source_label
            );
        }
    }

    if !cli.commit {
        workflow.discard()?;
        info!("Dry run complete; pass --commit to emit assignments");
        return Ok(());
    }

    match workflow.commit().await {
        Ok(report) => {
            info!(
                "Committed {} assignments at {}",
                report.written, report.committed_at
            );
            if cli.output.is_none() {
                if let Some(batch) = memory_writer.last_batch().await {
                    println!("{}", serde_json::to_string_pretty(&batch)?);
                }
            }
        }
        Err(WorkflowError::NothingToAssign) => {
            warn!("Nothing to assign; session left open and discarded");
            workflow.close();
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

async fn apply_decisions(workflow: &mut ResolutionWorkflow, path: &str) -> Result<()> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read decisions file {path}"))?;
    let decisions: BTreeMap<ChannelId, Option<EpgDataId>> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse decisions file {path}"))?;

    for (channel_id, choice) in decisions {
        match workflow.resolve(channel_id, Decision::from(choice)) {
            Ok(assignable) => info!(
                "Channel {} resolved; {} channels assignable",
                channel_id, assignable
            ),
            Err(e) => warn!("Ignoring decision for channel {}: {}", channel_id, e),
        }
    }
    Ok(())
}
