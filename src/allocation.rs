//! Пропорційний розподіл флоту між кластерами.

use crate::core::Cluster;

/// Кількість агентів, запланована для кожного кластера, за номером кластера.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllocationPlan {
    per_cluster: Vec<usize>,
}

impl AllocationPlan {
    pub fn from_counts(per_cluster: Vec<usize>) -> Self {
        Self { per_cluster }
    }

    /// Агенти, заплановані для `cluster_id`; нуль для невідомих номерів.
    pub fn agents_for(&self, cluster_id: usize) -> usize {
        self.per_cluster.get(cluster_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.per_cluster.iter().sum()
    }

    pub fn counts(&self) -> &[usize] {
        &self.per_cluster
    }
}

/// Ділить `total_agents` між кластерами методом найбільших залишків.
///
/// Спершу кожен кластер отримує цілу частину своєї квоти
/// `size / total_size * total_agents`. Нестачу роздаємо по одному агенту
/// кластеру з найбільшою дробовою частиною; при рівності перемагає менший
/// номер, і жоден кластер не отримує більше одного додаткового агента.
///
/// Якщо кластери зовсім не містять маяків, агентів ділимо порівну цілочисельно,
/// а залишок лишається без призначення.
pub fn allocate(clusters: &[Cluster], total_agents: usize) -> AllocationPlan {
    if clusters.is_empty() {
        return AllocationPlan::default();
    }

    let total_beacons: usize = clusters.iter().map(Cluster::len).sum();
    if total_beacons == 0 {
        return AllocationPlan::from_counts(vec![total_agents / clusters.len(); clusters.len()]);
    }

    let mut counts = Vec::with_capacity(clusters.len());
    let mut remainders: Vec<Option<f64>> = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let quota = (cluster.len() as f64 / total_beacons as f64) * total_agents as f64;
        let base = quota.floor();
        counts.push(base as usize);
        remainders.push(Some(quota - base));
    }

    let shortfall = total_agents.saturating_sub(counts.iter().sum());
    for _ in 0..shortfall {
        let mut best: Option<(usize, f64)> = None;
        for (c, rem) in remainders.iter().enumerate() {
            if let Some(rem) = *rem {
                if best.map_or(true, |(_, b)| rem > b) {
                    best = Some((c, rem));
                }
            }
        }
        match best {
            Some((c, _)) => {
                counts[c] += 1;
                remainders[c] = None;
            }
            None => break,
        }
    }

    AllocationPlan::from_counts(counts)
}
