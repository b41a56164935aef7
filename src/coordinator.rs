//! Центральний координатор: на вході маяки, на виході по одній цілі на агента.
//!
//! ```text
//! тік ─┬─ не час ─> пропуск
//!       └─ час ─> зібрати звіти ─> BeaconRegistry ─> ClusterEngine
//!                  ─> allocate ─> dispatch ─> рядки DESTINO
//! ```

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::allocation::{allocate, AllocationPlan};
use crate::cluster::ClusterEngine;
use crate::core::{AgentId, BeaconRecord, Cluster, DestinationAssignment, SwarmError};
use crate::dispatch::dispatch;
use crate::registry::BeaconRegistry;
use crate::settings::CoordinatorSettings;
use crate::transport::{drain, publish};
use crate::wire::Message;

/// Таймер на тіках, що вирішує, коли час для перерозподілу.
///
/// Час рахується як сума тривалостей тіків, а не за годинником. Перший тік
/// завжди запускає перерозподіл.
#[derive(Debug, Clone)]
pub struct ReassignClock {
    step_ms: u64,
    period_ms: u64,
    elapsed_ms: u64,
    last_ms: Option<u64>,
}

impl ReassignClock {
    pub fn new(step_ms: u64, period_ms: u64) -> Self {
        Self {
            step_ms,
            period_ms,
            elapsed_ms: 0,
            last_ms: None,
        }
    }

    /// Просуває таймер на один тік; повертає, чи запускати перерозподіл.
    pub fn tick(&mut self) -> bool {
        self.elapsed_ms += self.step_ms;
        let due = self
            .last_ms
            .map_or(true, |last| self.elapsed_ms - last >= self.period_ms);
        if due {
            self.last_ms = Some(self.elapsed_ms);
        }
        due
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Результат одного циклу перерозподілу.
#[derive(Debug, Clone)]
pub struct Reassignment {
    pub at: Duration,
    pub beacons: Vec<BeaconRecord>,
    pub clusters: Vec<Cluster>,
    pub plan: AllocationPlan,
    pub assignments: Vec<DestinationAssignment>,
}

/// Стан робочого циклу координатора.
pub struct Coordinator {
    fleet: Vec<AgentId>,
    registry: BeaconRegistry,
    engine: ClusterEngine,
    clock: ReassignClock,
    step: Duration,
}

impl Coordinator {
    pub fn new(settings: &CoordinatorSettings, mut fleet: Vec<AgentId>) -> Self {
        fleet.truncate(settings.max_robots);
        Self {
            fleet,
            registry: BeaconRegistry::new(settings.max_beacons),
            engine: ClusterEngine::new(settings.epsilon, settings.max_clusters),
            clock: ReassignClock::new(settings.time_step_ms, settings.reassign_period_ms),
            step: Duration::from_millis(settings.time_step_ms),
        }
    }

    pub fn fleet(&self) -> &[AgentId] {
        &self.fleet
    }

    /// Просуває таймер перерозподілу на один тік.
    pub fn tick(&mut self) -> bool {
        self.clock.tick()
    }

    /// Перебудовує реєстр зі звітів `reports` і обчислює цілі цього циклу.
    /// Повертає `None`, якщо жоден коректний маяк не звітував або не
    /// утворилось жодного кластера.
    pub fn reassign<I, S>(&mut self, reports: I) -> Option<Reassignment>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.clear();
        for report in reports {
            self.registry.ingest(report.as_ref());
        }
        if self.registry.is_empty() {
            debug!("Жоден маяк не звітував, цикл пропущено");
            return None;
        }

        let beacons = self.registry.snapshot().to_vec();
        let at = self.clock.elapsed();
        info!(
            elapsed_s = at.as_secs_f64(),
            beacons = beacons.len(),
            "Перерозподіл"
        );

        let clusters = self.engine.cluster(&beacons);
        if clusters.is_empty() {
            debug!("Кластери не утворились, цикл пропущено");
            return None;
        }
        for c in &clusters {
            info!(
                cluster = c.id,
                beacons = c.len(),
                "Центроїд ({:.2}, {:.2})",
                c.centroid.x,
                c.centroid.y
            );
        }

        let plan = allocate(&clusters, self.fleet.len());
        for c in &clusters {
            info!(cluster = c.id, robots = plan.agents_for(c.id), "Розподілено");
        }

        let assignments = dispatch(&plan, &clusters, &self.fleet);
        Some(Reassignment {
            at,
            beacons,
            clusters,
            plan,
            assignments,
        })
    }

    /// Крутить координатор на власному тіку, доки канал маяків не закриється.
    pub async fn run(
        mut self,
        mut inbox: broadcast::Receiver<String>,
        outbox: broadcast::Sender<String>,
    ) -> Result<(), SwarmError> {
        info!(fleet = self.fleet.len(), "Координатор запущено, слухаємо маяки");
        let mut interval = tokio::time::interval(self.step);

        loop {
            interval.tick().await;
            if !self.tick() {
                continue;
            }
            let reports = drain(&mut inbox, "beacons")?;
            let Some(cycle) = self.reassign(reports) else {
                continue;
            };
            for assignment in cycle.assignments {
                info!(
                    agent_id = %assignment.agent_id,
                    cluster = assignment.cluster_id,
                    "Призначення ({:.2}, {:.2})",
                    assignment.target.x,
                    assignment.target.y
                );
                publish(&outbox, Message::from(assignment).encode());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;
    use crate::transport::Channels;

    fn settings() -> CoordinatorSettings {
        CoordinatorSettings::default()
    }

    fn fleet(n: usize) -> Vec<AgentId> {
        (1..=n).map(|i| format!("PIONEER{i}")).collect()
    }

    #[test]
    fn test_clock_first_tick_due_then_every_period() {
        let mut clock = ReassignClock::new(32, 10_000);
        assert!(clock.tick());
        let mut skipped = 0;
        while !clock.tick() {
            skipped += 1;
        }
        // Наступний перерозподіл, коли від першого тіку набереться 10 000 мс.
        assert_eq!(skipped, 312);
        assert_eq!(clock.elapsed(), Duration::from_millis(32 * 314));
    }

    #[test]
    fn test_no_reports_skips_cycle() {
        let mut coord = Coordinator::new(&settings(), fleet(3));
        assert!(coord.reassign(Vec::<String>::new()).is_none());
        assert!(coord.reassign(["BALIZA,broken"]).is_none());
    }

    #[test]
    fn test_registry_rebuilt_each_cycle() {
        let mut coord = Coordinator::new(&settings(), fleet(2));
        let first = coord.reassign(["BALIZA,A,0,0", "BALIZA,B,50,50"]).unwrap();
        assert_eq!(first.clusters.len(), 2);

        let second = coord.reassign(["BALIZA,B,50,50"]).unwrap();
        assert_eq!(second.beacons.len(), 1);
        assert_eq!(second.clusters[0].centroid, Position::new(50.0, 50.0));
        assert!(second.assignments.iter().all(|a| a.cluster_id == 0));
    }

    #[test]
    fn test_later_report_overrides_earlier_in_same_drain() {
        let mut coord = Coordinator::new(&settings(), fleet(1));
        let cycle = coord.reassign(["BALIZA,A,0,0", "BALIZA,A,3,4"]).unwrap();
        assert_eq!(cycle.assignments[0].target, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_fleet_capped_by_max_robots() {
        let mut s = settings();
        s.max_robots = 2;
        let coord = Coordinator::new(&s, fleet(5));
        assert_eq!(coord.fleet().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_publishes_destinations() {
        let channels = Channels::new(64);
        let mut agent_rx = channels.destinations.subscribe();
        let coord = Coordinator::new(&settings(), fleet(2));
        let inbox = channels.beacons.subscribe();

        publish(&channels.beacons, "BALIZA,A,1.00,2.00".into());
        let handle = tokio::spawn(coord.run(inbox, channels.destinations.clone()));

        let first = agent_rx.recv().await.unwrap();
        let second = agent_rx.recv().await.unwrap();
        assert_eq!(first, "DESTINO,PIONEER1,CLUSTER0,1.00,2.00");
        assert_eq!(second, "DESTINO,PIONEER2,CLUSTER0,1.00,2.00");

        drop(channels);
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(SwarmError::ChannelClosed("beacons"))));
    }
}
