//! Рух до цілі для одного агента.

use std::f64::consts::{PI, TAU};

use crate::core::{NavState, Pose, Position};

/// Ціль, до якої агент зараз рухається.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub label: String,
    pub position: Position,
}

/// Що контролер хоче від коліс на цьому кроці.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guidance {
    /// Цілі ще немає.
    Wait,
    /// На місці: стоїмо незалежно від усього іншого.
    Hold { distance: f64 },
    /// Їдемо з поворотом `turn` (додатний = проти годинникової стрілки).
    Steer { turn: f64, distance: f64 },
}

/// Машина станів Idle → Seeking → Arrived з пропорційним регулятором курсу.
///
/// Отримана ціль зберігається, доки її не замінить новіша.
#[derive(Debug, Clone)]
pub struct NavigationController {
    target: Option<Target>,
    state: NavState,
    kp_angle: f64,
    stop_distance: f64,
}

impl NavigationController {
    pub fn new(kp_angle: f64, stop_distance: f64) -> Self {
        Self {
            target: None,
            state: NavState::Idle,
            kp_angle,
            stop_distance,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Замінює ціль. Завжди повертає в `Seeking`; прибуття перевіряється
    /// на наступному оновленні.
    pub fn assign(&mut self, label: impl Into<String>, position: Position) {
        self.target = Some(Target {
            label: label.into(),
            position,
        });
        self.state = NavState::Seeking;
    }

    pub fn update(&mut self, pose: &Pose) -> Guidance {
        let Some(target) = &self.target else {
            return Guidance::Wait;
        };

        let distance = pose.position.distance_to(&target.position);
        if distance < self.stop_distance {
            self.state = NavState::Arrived;
            return Guidance::Hold { distance };
        }

        self.state = NavState::Seeking;
        let turn = self.kp_angle * heading_error(pose, &target.position);
        Guidance::Steer { turn, distance }
    }
}

/// Знаковий кут від поточного курсу до напрямку на `goal`, у `(-π, π]`.
pub fn heading_error(pose: &Pose, goal: &Position) -> f64 {
    let bearing = (goal.y - pose.position.y).atan2(goal.x - pose.position.x);
    normalize_angle(bearing - pose.heading)
}

/// Загортає кут у `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Орієнтація з вектора півночі компаса, як він встановлений на роботі.
pub fn orientation_from_compass(north: [f64; 3]) -> f64 {
    north[0].atan2(north[2])
}
