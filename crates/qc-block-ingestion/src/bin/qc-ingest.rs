//! qc-ingest: replay a file of blocks through the ingestion pipeline

use anyhow::{bail, Context, Result};
use clap::Parser;
use qc_block_ingestion::adapters::{
    BroadcastNotifier, FixedTimeSource, InMemoryBlockStore, SystemTimeSource,
};
use qc_block_ingestion::logging::{init_logging, LoggingConfig};
use qc_block_ingestion::ports::TimeSource;
use qc_block_ingestion::replay::{network_clock, replay_blocks, ReplayFile};
use qc_block_ingestion::{
    BehaviorFlags, BlockIngestionService, IngestionConfig, IngestionDependencies,
};
use shared_types::DisplayHash;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Replay blocks from a JSON file and report what the pipeline made of them
#[derive(Parser, Debug)]
#[command(name = "qc-ingest")]
#[command(about = "Feed a JSON file of blocks through the block ingestion pipeline")]
struct Args {
    /// Replay file with `checkpoints` and `blocks`
    path: PathBuf,

    /// Skip the proof-of-work target check
    #[arg(long)]
    no_pow_check: bool,

    /// Treat every block as linking to a checkpoint
    #[arg(long)]
    fast_add: bool,

    /// Validate without changing any state
    #[arg(long)]
    dry_run: bool,

    /// Pin adjusted time to this unix timestamp instead of the system clock
    #[arg(long)]
    now: Option<u64>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::from_env();
    logging.json_logs |= args.json_logs;
    init_logging(&logging)?;

    let config = IngestionConfig::from_env();
    if !config.is_valid() {
        bail!("invalid ingestion configuration: {config:?}");
    }

    let replay = ReplayFile::load(&args.path)
        .with_context(|| format!("loading {}", args.path.display()))?;
    info!(
        blocks = replay.blocks.len(),
        checkpoints = replay.checkpoints.len(),
        time_samples = replay.time_samples.len(),
        "Loaded replay file"
    );

    let mut flags = BehaviorFlags::NONE;
    if args.no_pow_check {
        flags = flags.with_no_pow_check();
    }
    if args.fast_add {
        flags = flags.with_fast_add();
    }
    if args.dry_run {
        flags = flags.with_dry_run();
    }

    let store = Arc::new(InMemoryBlockStore::new());
    let notifier = Arc::new(BroadcastNotifier::new());
    let deps = IngestionDependencies::reference(config, store, notifier, replay.checkpoints);
    let service = BlockIngestionService::new(deps);

    let local: Arc<dyn TimeSource> = match args.now {
        Some(now) => Arc::new(FixedTimeSource::new(now)),
        None => Arc::new(SystemTimeSource),
    };
    let clock = network_clock(local, &replay.time_samples);
    if clock.offset() != 0 {
        info!(offset_secs = clock.offset(), "Applying peer time offset");
    }

    let report = replay_blocks(&service, replay.blocks, &clock, flags);

    println!("accepted: {}", report.accepted);
    println!("orphaned: {}", report.orphaned);
    println!("rejected: {}", report.rejected.len());
    for (hash, reason) in &report.rejected {
        println!("  {} {}", DisplayHash(*hash).short(), reason);
    }
    match service.best_tip() {
        Some(tip) => println!("best tip: {} at height {}", DisplayHash(tip.hash), tip.height),
        None => println!("best tip: none"),
    }
    println!("orphans pending: {}", service.orphan_count());

    Ok(())
}
