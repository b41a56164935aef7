//! Поєднує рух до цілі з уникненням перешкод у швидкості коліс.

use crate::core::{WheelBias, WheelCommand};
use crate::settings::AgentSettings;

#[derive(Debug, Clone, Copy)]
pub struct MotionBlender {
    pub max_speed: f64,
    pub cruise_ratio: f64,
    pub threshold: f64,
}

impl MotionBlender {
    pub fn new(max_speed: f64, cruise_ratio: f64, threshold: f64) -> Self {
        Self {
            max_speed,
            cruise_ratio,
            threshold,
        }
    }

    pub fn from_settings(s: &AgentSettings) -> Self {
        Self::new(s.max_speed, s.cruise_ratio, s.wheel_weight_threshold)
    }

    fn cruise(&self) -> f64 {
        self.max_speed * self.cruise_ratio
    }

    /// Зміщення понад поріг розвертає робота на місці і перекриває запит на
    /// поворот; ліве зміщення перевіряється першим. Інакше крейсерська
    /// швидкість з диференційним поворотом.
    pub fn blend(&self, bias: WheelBias, turn: f64) -> WheelCommand {
        let cruise = self.cruise();
        let (left, right) = if bias.left > self.threshold {
            (cruise, -cruise)
        } else if bias.right > self.threshold {
            (-cruise, cruise)
        } else {
            (cruise - turn, cruise + turn)
        };
        WheelCommand {
            left: left.clamp(-self.max_speed, self.max_speed),
            right: right.clamp(-self.max_speed, self.max_speed),
        }
    }
}
