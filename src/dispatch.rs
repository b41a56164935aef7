//! Перетворює план розподілу на одну ціль для кожного агента.

use crate::allocation::AllocationPlan;
use crate::core::{AgentId, Cluster, DestinationAssignment};

/// Обходить кластери за номером і роздає агентів у порядку флоту.
///
/// Кожен кластер бере стільки послідовних агентів, скільки йому дає план,
/// з центроїдом кластера як ціллю. Місця понад розмір флоту відкидаються,
/// тож жоден агент не призначається двічі.
pub fn dispatch(
    plan: &AllocationPlan,
    clusters: &[Cluster],
    fleet: &[AgentId],
) -> Vec<DestinationAssignment> {
    let mut ordered: Vec<&Cluster> = clusters.iter().collect();
    ordered.sort_by_key(|c| c.id);

    let mut agents = fleet.iter();
    let mut assignments = Vec::with_capacity(fleet.len());

    'clusters: for cluster in ordered {
        for _ in 0..plan.agents_for(cluster.id) {
            let Some(agent) = agents.next() else {
                break 'clusters;
            };
            assignments.push(DestinationAssignment {
                agent_id: agent.clone(),
                cluster_id: cluster.id,
                target: cluster.centroid,
            });
        }
    }

    assignments
}
