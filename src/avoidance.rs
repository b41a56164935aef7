//! Реактивне уникнення перешкод за датчиками відстані.

use crate::core::WheelBias;
use crate::settings::AgentSettings;

/// Зважена сума наближення з кожного датчика у зміщення лівого та правого колеса.
#[derive(Debug, Clone)]
pub struct ObstacleAvoidance {
    /// Ваги `[left, right]` для кожного датчика, з тими ж індексами, що й показники.
    weights: Vec<[f64; 2]>,
    max_sensor_value: f64,
    sensor_range: f64,
    min_distance: f64,
}

impl ObstacleAvoidance {
    pub fn new(
        weights: Vec<[f64; 2]>,
        max_sensor_value: f64,
        sensor_range: f64,
        min_distance: f64,
    ) -> Self {
        Self {
            weights,
            max_sensor_value,
            sensor_range,
            min_distance,
        }
    }

    pub fn from_settings(s: &AgentSettings) -> Self {
        Self::new(
            s.sensor_weights.clone(),
            s.max_sensor_value,
            s.sensor_range,
            s.min_distance,
        )
    }

    pub fn sensor_count(&self) -> usize {
        self.weights.len()
    }

    /// Оцінка відстані до перешкоди за сирим показником, `None`, якщо нічого
    /// не виявлено.
    pub fn distance(&self, raw: f64) -> Option<f64> {
        (raw > 0.0).then(|| (self.sensor_range * (1.0 - raw / self.max_sensor_value)).max(0.0))
    }

    /// Коефіцієнт наближення в `[0, 1]`: нуль на `min_distance` і далі,
    /// лінійно зростає до одиниці при контакті.
    pub fn modulation(&self, raw: f64) -> f64 {
        match self.distance(raw) {
            Some(d) if d < self.min_distance => 1.0 - d / self.min_distance,
            _ => 0.0,
        }
    }

    /// Сумує вектори ваг датчиків, помножені на їхні коефіцієнти наближення.
    ///
    /// Показники понад таблицю ваг ігноруються; відсутні вважаються такими,
    /// що нічого не виявили.
    pub fn compute_bias(&self, readings: &[f64]) -> WheelBias {
        self.weights
            .iter()
            .zip(readings)
            .fold(WheelBias::default(), |acc, (w, &raw)| {
                let m = self.modulation(raw);
                WheelBias {
                    left: acc.left + w[0] * m,
                    right: acc.right + w[1] * m,
                }
            })
    }
}
