//! Host/guest battle simulator.
//!
//! Runs a host and a guest over the in-memory transport, plays a scripted
//! battle and checks that both peers end with the same convergence root.
mod plan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::{AbilityTableLoader, ConfigLoader, ContentFactory, RosterLoader};
use battle_core::AbsoluteSide;
use battle_runtime::{
    EventBus, GuestReplicator, HostPublisher, HostSession, ReplicationConfig, WireFormat,
    memory_pair,
};
use clap::Parser;

/// Simulate a replicated battle between a host and a guest
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Run a host and a guest and compare their battle state", long_about = None)]
#[command(version)]
struct Cli {
    /// Session seed for the host random source (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds; every living combatant casts each of its abilities once per round
    #[arg(long, default_value_t = 5)]
    rounds: usize,

    /// Battle configuration (TOML); defaults to the bundled file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ability table (RON); defaults to the embedded table
    #[arg(long)]
    abilities: Option<PathBuf>,

    /// Roster (RON); defaults to the embedded roster
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Wire format; defaults to BATTLE_WIRE_FORMAT or json
    #[arg(long)]
    wire: Option<WireFormat>,

    #[arg(long, default_value_t = 1)]
    battle_id: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut battle_config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ContentFactory::bundled().load_config()?,
    };
    if let Some(seed) = cli.seed {
        battle_config.seed = Some(seed);
    }
    let abilities = match &cli.abilities {
        Some(path) => AbilityTableLoader::load(path)?,
        None => AbilityTableLoader::load_embedded()?,
    };
    let roster = match &cli.roster {
        Some(path) => RosterLoader::load(path)?,
        None => RosterLoader::load_embedded()?,
    };

    let mut replication = ReplicationConfig::from_env();
    if let Some(wire) = cli.wire {
        replication.wire_format = wire;
    }
    tracing::info!(
        battle_id = cli.battle_id,
        seed = ?battle_config.seed,
        wire = %replication.wire_format,
        rounds = cli.rounds,
        "starting simulation"
    );

    let host_state = roster
        .build(cli.battle_id, AbsoluteSide::Host)
        .context("failed to build the host battle")?;
    let guest_state = roster
        .build(cli.battle_id, AbsoluteSide::Guest)
        .context("failed to build the guest battle")?;

    let bus = EventBus::with_capacity(replication.event_buffer_size);
    let (tx, mut rx) = memory_pair(replication.channel_capacity);
    let publisher = HostPublisher::new(tx, replication.wire_format, bus.clone());
    let mut host = HostSession::new(host_state, abilities, battle_config, publisher);
    let mut guest = GuestReplicator::new(guest_state, replication, bus);

    let guest_task = tokio::spawn(async move {
        let summary = guest.run(&mut rx).await;
        (guest, summary)
    });

    let tally = plan::play(&mut host, cli.rounds).await?;
    let host_root = host.convergence_root();
    let persisted = host.finish();
    drop(host);

    let (guest, summary) = guest_task.await.context("guest task panicked")?;
    let guest_root = guest.convergence_root();

    println!("casts:        {}", tally.casts);
    println!("outcomes:     {}", tally.emitted);
    println!("no target:    {}", tally.no_target);
    println!("rejected:     {}", tally.rejected);
    println!(
        "guest:        {} applied, {} duplicates, {} dropped",
        summary.applied, summary.duplicates, summary.dropped
    );
    println!("host root:    {}", hex::encode(host_root));
    println!("guest root:   {}", hex::encode(guest_root));
    for entry in &persisted {
        println!(
            "persisted:    {} {} x{}",
            entry.combatant,
            entry.kind.as_str(),
            entry.stacks
        );
    }

    if host_root != guest_root {
        anyhow::bail!("host and guest diverged");
    }
    println!("converged");
    Ok(())
}
