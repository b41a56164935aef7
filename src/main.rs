use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleet_beacons::core::{AgentStatus, Position};
use fleet_beacons::sim::KinematicBody;
use fleet_beacons::transport::Channels;
use fleet_beacons::{beacon, Agent, BeaconRecord, Coordinator, Settings};

#[derive(Parser)]
#[command(name = "fleet-beacons")]
#[command(version)]
#[command(about = "Розподіл флоту роботів між кластерами маяків")]
struct Cli {
    /// Файл налаштувань (TOML); обов'язковий лише якщо вказаний явно
    #[arg(long, env = "FLEET_CONFIG")]
    config: Option<PathBuf>,

    /// Скільки секунд працювати; 0 означає до Ctrl-C
    #[arg(long, default_value = "30")]
    duration: u64,

    /// Детальне логування
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from("Settings.toml"), false),
    };
    let settings = Settings::load(&path, required)
        .with_context(|| format!("Не вдалося завантажити налаштування з {}", path.display()))?;
    settings.validate()?;

    let fleet = settings.fleet();
    info!(
        agents = fleet.len(),
        beacons = settings.swarm.beacons.len(),
        "Налаштування завантажено"
    );

    let channels = Channels::new(settings.swarm.broadcast_capacity);
    let (status_tx, mut status_rx) = mpsc::channel::<AgentStatus>(fleet.len().max(1) * 4);
    let mut tasks = JoinSet::new();

    // Агенти підписуються раніше, ніж координатор щось опублікує.
    let step = Duration::from_millis(settings.agent.time_step_ms);
    for (i, id) in fleet.iter().enumerate() {
        let start = Position::new(i as f64 * settings.swarm.sector_size, 0.0);
        let body = KinematicBody::new(start, 0.0, step);
        let agent = Agent::new(id.clone(), &settings.agent);
        let rx = channels.destinations.subscribe();
        let tx = status_tx.clone();
        let id = id.clone();
        tasks.spawn(async move {
            if let Err(e) = agent.run(body, rx, tx).await {
                error!(agent_id = %id, "Агент зупинився: {}", e);
            }
        });
    }
    drop(status_tx);

    let coordinator = Coordinator::new(&settings.coordinator, fleet.clone());
    let inbox = channels.beacons.subscribe();
    let outbox = channels.destinations.clone();
    tasks.spawn(async move {
        if let Err(e) = coordinator.run(inbox, outbox).await {
            error!("Координатор зупинився: {}", e);
        }
    });

    let beacon_period = Duration::from_millis(settings.swarm.beacon_period_ms);
    for b in &settings.swarm.beacons {
        tasks.spawn(beacon::run(
            BeaconRecord::from(b),
            channels.beacons.clone(),
            beacon_period,
        ));
    }

    let deadline = async {
        if cli.duration == 0 {
            std::future::pending::<()>().await
        } else {
            tokio::time::sleep(Duration::from_secs(cli.duration)).await
        }
    };
    tokio::pin!(deadline);

    let mut latest: BTreeMap<String, AgentStatus> = BTreeMap::new();
    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Час роботи вичерпано");
                break;
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!("Не вдалося слухати Ctrl-C: {}", e);
                }
                info!("Перервано");
                break;
            }
            status = status_rx.recv() => match status {
                Some(s) => {
                    info!(
                        agent_id = %s.agent_id,
                        state = ?s.state,
                        target = s.target.as_deref().unwrap_or("-"),
                        "Статус у ({:.2}, {:.2})",
                        s.position.x,
                        s.position.y
                    );
                    latest.insert(s.agent_id.clone(), s);
                }
                None => {
                    warn!("Усі агенти зупинились");
                    break;
                }
            },
        }
    }

    tasks.shutdown().await;

    for id in &fleet {
        match latest.get(id) {
            Some(s) => info!(
                agent_id = %id,
                state = ?s.state,
                target = s.target.as_deref().unwrap_or("-"),
                "Підсумок"
            ),
            None => info!(agent_id = %id, "Підсумок: ціль не отримано"),
        }
    }
    Ok(())
}
