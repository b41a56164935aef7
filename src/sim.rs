//! Ідеальне тіло з диференційним приводом, коли справжнього робота немає.

use std::time::Duration;

use crate::agent::Body;
use crate::core::{Position, WheelCommand};

/// Радіус колеса Pioneer 3-DX (м).
pub const WHEEL_RADIUS: f64 = 0.0975;
/// Колія Pioneer 3-DX (м).
pub const AXLE_TRACK: f64 = 0.33;

/// Модель одноколісника, що інтегрує один період керування на кожну команду коліс.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    position: Position,
    heading: f64,
    dt: f64,
    wheels: WheelCommand,
    readings: Vec<f64>,
    leds: Vec<bool>,
}

impl KinematicBody {
    pub fn new(position: Position, heading: f64, step: Duration) -> Self {
        Self {
            position,
            heading,
            dt: step.as_secs_f64(),
            wheels: WheelCommand::STOP,
            readings: vec![0.0; 16],
            leds: vec![false; 3],
        }
    }

    /// Показники датчиків відстані, що повертатимуться відтепер.
    pub fn set_readings(&mut self, readings: Vec<f64>) {
        self.readings = readings;
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn wheel_speeds(&self) -> WheelCommand {
        self.wheels
    }

    pub fn leds(&self) -> &[bool] {
        &self.leds
    }
}

impl Body for KinematicBody {
    fn position(&self) -> Position {
        self.position
    }

    fn compass(&self) -> [f64; 3] {
        [self.heading.sin(), 0.0, self.heading.cos()]
    }

    fn range_readings(&self) -> Vec<f64> {
        self.readings.clone()
    }

    fn set_wheel_speeds(&mut self, command: WheelCommand) {
        self.wheels = command;
        let v = WHEEL_RADIUS * (command.left + command.right) / 2.0;
        let omega = WHEEL_RADIUS * (command.right - command.left) / AXLE_TRACK;
        self.heading += omega * self.dt;
        self.position.x += v * self.heading.cos() * self.dt;
        self.position.y += v * self.heading.sin() * self.dt;
    }

    fn set_led(&mut self, index: usize, on: bool) {
        if let Some(led) = self.leds.get_mut(index) {
            *led = on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body() -> KinematicBody {
        KinematicBody::new(Position::ORIGIN, 0.0, Duration::from_secs(1))
    }

    #[test]
    fn test_straight_line() {
        let mut b = body();
        b.set_wheel_speeds(WheelCommand {
            left: 2.0,
            right: 2.0,
        });
        assert_relative_eq!(b.position().x, 2.0 * WHEEL_RADIUS);
        assert_relative_eq!(b.position().y, 0.0);
    }

    #[test]
    fn test_spin_in_place() {
        let mut b = body();
        b.set_wheel_speeds(WheelCommand {
            left: -1.0,
            right: 1.0,
        });
        assert_eq!(b.position(), Position::ORIGIN);
        assert_relative_eq!(b.heading(), 2.0 * WHEEL_RADIUS / AXLE_TRACK);
        assert_relative_eq!(b.pose().heading, b.heading());
    }

    #[test]
    fn test_leds() {
        let mut b = body();
        b.set_led(1, true);
        b.set_led(7, true);
        assert_eq!(b.leds(), &[false, true, false]);
    }
}
