use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace};

use crate::avoidance::ObstacleAvoidance;
use crate::core::{AgentId, AgentStatus, NavState, Pose, Position, SwarmError, WheelCommand};
use crate::motion::MotionBlender;
use crate::navigation::{orientation_from_compass, Guidance, NavigationController, Target};
use crate::settings::AgentSettings;
use crate::transport::drain;
use crate::wire::Message;

/// Датчики та виконавчі механізми одного робота.
pub trait Body {
    /// Позиція з GPS у світовій площині.
    fn position(&self) -> Position;
    /// Вектор півночі від компаса.
    fn compass(&self) -> [f64; 3];
    /// Сирі показники датчиків відстані, у порядку датчиків.
    fn range_readings(&self) -> Vec<f64>;
    fn set_wheel_speeds(&mut self, command: WheelCommand);
    fn set_led(&mut self, _index: usize, _on: bool) {}

    fn pose(&self) -> Pose {
        Pose {
            position: self.position(),
            heading: orientation_from_compass(self.compass()),
        }
    }
}

/// Біжучий вогник: кожні `period` кроків увімкнений світлодіод зсувається на одне місце.
#[derive(Debug, Clone)]
pub struct StatusLeds {
    count: usize,
    period: u32,
    counter: u32,
    lit: usize,
}

/// Перемикання світлодіодів від [`StatusLeds::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedChange {
    pub off: usize,
    pub on: usize,
}

impl StatusLeds {
    pub fn new(count: usize, period: u32) -> Self {
        Self {
            count,
            period,
            counter: 0,
            lit: 0,
        }
    }

    pub fn advance(&mut self) -> Option<LedChange> {
        if self.count == 0 || self.period == 0 {
            return None;
        }
        self.counter += 1;
        if self.counter < self.period {
            return None;
        }
        self.counter = 0;
        let off = self.lit;
        self.lit = (self.lit + 1) % self.count;
        Some(LedChange { off, on: self.lit })
    }
}

/// Результат одного кроку керування.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    pub command: WheelCommand,
    pub leds: Option<LedChange>,
}

/// Мобільний робот, що виконує призначення координатора.
pub struct Agent {
    id: AgentId,
    nav: NavigationController,
    avoidance: ObstacleAvoidance,
    blender: MotionBlender,
    leds: StatusLeds,
    step: Duration,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, settings: &AgentSettings) -> Self {
        Self {
            id: id.into(),
            nav: NavigationController::new(settings.kp_angle, settings.stop_distance),
            avoidance: ObstacleAvoidance::from_settings(settings),
            blender: MotionBlender::from_settings(settings),
            leds: StatusLeds::new(settings.led_count, settings.led_period),
            step: Duration::from_millis(settings.time_step_ms),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> NavState {
        self.nav.state()
    }

    pub fn target(&self) -> Option<&Target> {
        self.nav.target()
    }

    /// Застосовує рядок з каналу призначень, якщо він адресований цьому агенту.
    /// Повертає, чи змінилась ціль.
    pub fn handle_line(&mut self, line: &str) -> bool {
        match Message::decode(line) {
            Ok(Message::Destination(d)) if d.agent_id == self.id => {
                info!(
                    agent_id = %self.id,
                    "Нова ціль {} ({:.2}, {:.2})",
                    d.label(),
                    d.target.x,
                    d.target.y
                );
                self.nav.assign(d.label(), d.target);
                true
            }
            Ok(_) => false,
            Err(e) => {
                trace!(agent_id = %self.id, error = %e, "Ігноруємо некоректне повідомлення");
                false
            }
        }
    }

    /// Один крок керування з поточної пози та показників датчиків.
    pub fn step(&mut self, pose: &Pose, readings: &[f64]) -> StepOutput {
        let before = self.nav.state();
        match self.nav.update(pose) {
            Guidance::Wait => StepOutput {
                command: WheelCommand::STOP,
                leds: None,
            },
            Guidance::Hold { distance } => {
                if before != NavState::Arrived {
                    info!(
                        agent_id = %self.id,
                        distance,
                        "Досягнуто {} у ({:.2}, {:.2})",
                        self.target_label(),
                        pose.position.x,
                        pose.position.y
                    );
                }
                StepOutput {
                    command: WheelCommand::STOP,
                    leds: None,
                }
            }
            Guidance::Steer { turn, distance } => {
                let bias = self.avoidance.compute_bias(readings);
                let command = self.blender.blend(bias, turn);
                debug!(
                    agent_id = %self.id,
                    x = pose.position.x,
                    y = pose.position.y,
                    distance,
                    target = %self.target_label(),
                    "Рух до цілі"
                );
                StepOutput {
                    command,
                    leds: self.leds.advance(),
                }
            }
        }
    }

    /// Зчитує датчики тіла, робить крок і керує його приводами.
    pub fn step_body<B: Body>(&mut self, body: &mut B) -> StepOutput {
        let pose = body.pose();
        let readings = body.range_readings();
        let out = self.step(&pose, &readings);
        if let Some(change) = out.leds {
            body.set_led(change.off, false);
            body.set_led(change.on, true);
        }
        body.set_wheel_speeds(out.command);
        out
    }

    pub fn status(&self, position: Position) -> AgentStatus {
        AgentStatus {
            agent_id: self.id.clone(),
            state: self.nav.state(),
            position,
            target: self.nav.target().map(|t| t.label.clone()),
        }
    }

    fn target_label(&self) -> &str {
        self.nav.target().map_or("-", |t| t.label.as_str())
    }

    /// Цикл керування: на кожному кроці вичитуємо канал призначень і їдемо.
    ///
    /// Звіт про статус надсилається при кожній зміні стану навігації або цілі.
    pub async fn run<B: Body>(
        mut self,
        mut body: B,
        mut rx: broadcast::Receiver<String>,
        tx: mpsc::Sender<AgentStatus>,
    ) -> Result<(), SwarmError> {
        info!(
            agent_id = %self.id,
            sensors = self.avoidance.sensor_count(),
            "Агента запущено, очікуємо ціль"
        );
        let mut interval = tokio::time::interval(self.step);
        let mut last = self.status(body.position());

        loop {
            interval.tick().await;
            for line in drain(&mut rx, "destinations")? {
                self.handle_line(&line);
            }
            self.step_body(&mut body);

            let status = self.status(body.position());
            if status.state != last.state || status.target != last.target {
                if tx.send(status.clone()).await.is_err() {
                    return Err(SwarmError::ChannelClosed("status"));
                }
                last = status;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WheelBias;
    use crate::sim::KinematicBody;
    use approx::assert_relative_eq;

    fn agent(id: &str) -> Agent {
        Agent::new(id, &AgentSettings::default())
    }

    fn pose(x: f64, y: f64, heading: f64) -> Pose {
        Pose {
            position: Position::new(x, y),
            heading,
        }
    }

    #[test]
    fn test_initial_state() {
        let mut a = agent("PIONEER1");
        assert_eq!(a.state(), NavState::Idle);
        let out = a.step(&pose(0.0, 0.0, 0.0), &[0.0; 16]);
        assert_eq!(out.command, WheelCommand::STOP);
    }

    #[test]
    fn test_filters_by_agent_id() {
        let mut a = agent("PIONEER2");
        assert!(!a.handle_line("DESTINO,PIONEER1,CLUSTER0,1.00,1.00"));
        assert!(!a.handle_line("DESTINO,PIONEER2,1.00,1.00"));
        assert!(!a.handle_line("BALIZA,PIONEER2,1.00,1.00"));
        assert_eq!(a.state(), NavState::Idle);

        assert!(a.handle_line("DESTINO,PIONEER2,CLUSTER3,4.00,5.00"));
        assert_eq!(a.state(), NavState::Seeking);
        let target = a.target().unwrap();
        assert_eq!(target.label, "CLUSTER3");
        assert_eq!(target.position, Position::new(4.0, 5.0));
    }

    #[test]
    fn test_accepts_agent_id_longer_than_beacon_names() {
        let id = "AGENT_WITH_A_NAME_LONGER_THAN_31_CHARS";
        let mut a = agent(id);
        assert!(a.handle_line(&format!("DESTINO,{id},CLUSTER0,3.00,4.00")));
        assert_eq!(a.state(), NavState::Seeking);
        assert_eq!(a.target().unwrap().position, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_last_message_of_a_burst_wins() {
        let mut a = agent("PIONEER1");
        for line in [
            "DESTINO,PIONEER1,CLUSTER0,1.00,1.00",
            "DESTINO,PIONEER2,CLUSTER0,9.00,9.00",
            "DESTINO,PIONEER1,CLUSTER1,2.00,2.00",
        ] {
            a.handle_line(line);
        }
        assert_eq!(a.target().unwrap().label, "CLUSTER1");
    }

    #[test]
    fn test_arrival_stops_despite_obstacles() {
        let mut a = agent("PIONEER1");
        a.handle_line("DESTINO,PIONEER1,CLUSTER0,10.00,0.00");
        let out = a.step(&pose(9.51, 0.0, 0.0), &[1024.0; 16]);
        assert_eq!(a.state(), NavState::Arrived);
        assert_eq!(out.command, WheelCommand::STOP);
    }

    #[test]
    fn test_obstacle_overrides_goal_turn() {
        let mut a = agent("PIONEER1");
        // Ціль прямо праворуч: сильний запит на поворот за годинниковою стрілкою.
        a.handle_line("DESTINO,PIONEER1,CLUSTER0,0.00,-10.00");
        let mut readings = [0.0; 16];
        readings[3] = 1024.0;
        let out = a.step(&pose(0.0, 0.0, 0.0), &readings);

        let cruise = 5.24 * 0.8;
        assert_relative_eq!(out.command.left, cruise);
        assert_relative_eq!(out.command.right, -cruise);
        let expected = MotionBlender::from_settings(&AgentSettings::default()).blend(
            WheelBias {
                left: 600.0,
                right: 0.0,
            },
            0.0,
        );
        assert_eq!(out.command, expected);
    }

    #[test]
    fn test_front_obstacle_spins_body_in_place() {
        let mut a = agent("PIONEER1");
        let mut body = KinematicBody::new(Position::ORIGIN, 0.0, Duration::from_millis(32));
        a.handle_line("DESTINO,PIONEER1,CLUSTER0,10.00,0.00");
        let mut readings = vec![0.0; 16];
        readings[3] = 1024.0;
        body.set_readings(readings);

        let out = a.step_body(&mut body);
        let cruise = 5.24 * 0.8;
        assert_relative_eq!(out.command.left, cruise);
        assert_relative_eq!(out.command.right, -cruise);
        assert_eq!(body.wheel_speeds(), out.command);
        // Колеса в протифазі: робот лише обертається за годинниковою стрілкою.
        assert_eq!(body.position(), Position::ORIGIN);
        assert!(body.heading() < 0.0);
        assert_eq!(a.state(), NavState::Seeking);
    }

    #[test]
    fn test_status_leds_cycle() {
        let mut leds = StatusLeds::new(3, 2);
        assert_eq!(leds.advance(), None);
        assert_eq!(leds.advance(), Some(LedChange { off: 0, on: 1 }));
        assert_eq!(leds.advance(), None);
        assert_eq!(leds.advance(), Some(LedChange { off: 1, on: 2 }));
        leds.advance();
        assert_eq!(leds.advance(), Some(LedChange { off: 2, on: 0 }));
        assert_eq!(StatusLeds::new(0, 2).advance(), None);
    }

    #[test]
    fn test_drives_kinematic_body_to_target() {
        let settings = AgentSettings::default();
        let mut a = Agent::new("PIONEER1", &settings);
        let mut body = KinematicBody::new(Position::ORIGIN, 0.0, Duration::from_millis(32));
        a.handle_line("DESTINO,PIONEER1,CLUSTER0,3.00,2.00");

        for _ in 0..5_000 {
            a.step_body(&mut body);
            if a.state() == NavState::Arrived {
                break;
            }
        }
        assert_eq!(a.state(), NavState::Arrived);
        assert!(body.position().distance_to(&Position::new(3.0, 2.0)) < settings.stop_distance);
        assert_eq!(body.wheel_speeds(), WheelCommand::STOP);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_status_changes() {
        let (dest_tx, dest_rx) = broadcast::channel(16);
        let (status_tx, mut status_rx) = mpsc::channel(16);
        let a = agent("PIONEER1");
        let body = KinematicBody::new(Position::ORIGIN, 0.0, Duration::from_millis(32));
        let handle = tokio::spawn(a.run(body, dest_rx, status_tx));

        dest_tx
            .send("DESTINO,PIONEER1,CLUSTER0,0.20,0.00".to_string())
            .unwrap();
        let first = status_rx.recv().await.unwrap();
        assert_eq!(first.target.as_deref(), Some("CLUSTER0"));

        drop(dest_tx);
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(SwarmError::ChannelClosed("destinations"))));
    }
}
