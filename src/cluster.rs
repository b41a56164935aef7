//! Однопрохідна кластеризація маяків за радіусом.
//!
//! Кожен ще не розподілений маяк, у порядку реєстру, відкриває новий кластер
//! і поглинає всі наступні вільні маяки, що лежать строго ближче `epsilon` до
//! зародка. Належність перевіряється лише відносно зародка, тому кластер не є
//! транзитивним замиканням відношення сусідства.

use crate::core::{BeaconRecord, Cluster, Position};

/// Групує маяки не більше ніж у `max_clusters` кластерів.
#[derive(Debug, Clone, Copy)]
pub struct ClusterEngine {
    pub epsilon: f64,
    pub max_clusters: usize,
}

impl ClusterEngine {
    pub fn new(epsilon: f64, max_clusters: usize) -> Self {
        Self {
            epsilon,
            max_clusters,
        }
    }

    /// Номери кластерів ідуть у порядку реєстру. Після досягнення ліміту нові
    /// кластери не відкриваються, а непоглинуті маяки лишаються поза кластерами.
    pub fn cluster(&self, beacons: &[BeaconRecord]) -> Vec<Cluster> {
        let mut assigned: Vec<Option<usize>> = vec![None; beacons.len()];
        let mut clusters = Vec::new();

        for seed in 0..beacons.len() {
            if clusters.len() >= self.max_clusters {
                break;
            }
            if assigned[seed].is_some() {
                continue;
            }

            let id = clusters.len();
            assigned[seed] = Some(id);
            let mut members = vec![seed];
            let origin = &beacons[seed].position;

            for (j, beacon) in beacons.iter().enumerate().skip(seed + 1) {
                if assigned[j].is_none() && origin.distance_to(&beacon.position) < self.epsilon {
                    assigned[j] = Some(id);
                    members.push(j);
                }
            }

            let centroid = centroid(beacons, &members);
            clusters.push(Cluster {
                id,
                members,
                centroid,
            });
        }

        clusters
    }
}

/// Середнє арифметичне позицій членів; для порожньої множини — початок координат.
pub fn centroid(beacons: &[BeaconRecord], members: &[usize]) -> Position {
    if members.is_empty() {
        return Position::ORIGIN;
    }
    let (sx, sy) = members.iter().fold((0.0, 0.0), |(sx, sy), &i| {
        (sx + beacons[i].position.x, sy + beacons[i].position.y)
    });
    let n = members.len() as f64;
    Position::new(sx / n, sy / n)
}
