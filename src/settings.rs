//! Конфігурація виконання з `Settings.toml` та змінних `FLEET_*`.

use std::path::Path;

use serde::Deserialize;

use crate::core::{AgentId, BeaconRecord, SwarmError};
use crate::wire::is_valid_agent_id;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub coordinator: CoordinatorSettings,
    pub agent: AgentSettings,
    pub swarm: SwarmSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoordinatorSettings {
    /// Тривалість одного тіку координатора.
    pub time_step_ms: u64,
    /// Накопичений час тіків між двома перерозподілами.
    pub reassign_period_ms: u64,
    /// Радіус кластеризації навколо маяка-зародка.
    pub epsilon: f64,
    pub max_beacons: usize,
    pub max_clusters: usize,
    pub max_robots: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            time_step_ms: 32,
            reassign_period_ms: 10_000,
            epsilon: 9.5,
            max_beacons: 50,
            max_clusters: 20,
            max_robots: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub time_step_ms: u64,
    /// Межа швидкості колеса (рад/с).
    pub max_speed: f64,
    /// Частка `max_speed` для крейсерського руху та різких поворотів.
    pub cruise_ratio: f64,
    /// Пропорційний коефіцієнт від похибки курсу до команди повороту.
    pub kp_angle: f64,
    pub stop_distance: f64,
    /// Перешкоди, ближчі за цю відстань, починають зміщувати колеса.
    pub min_distance: f64,
    pub max_sensor_value: f64,
    /// Відстань, що відповідає показнику нульової інтенсивності.
    pub sensor_range: f64,
    pub wheel_weight_threshold: f64,
    pub led_count: usize,
    /// Кроків керування між двома зсувами світлодіода.
    pub led_period: u32,
    /// Зміщення `[left, right]` для кожного датчика відстані, у порядку датчиків.
    pub sensor_weights: Vec<[f64; 2]>,
}

/// Таблиця зміщень Pioneer 3-DX з 16 сонарами; заднє кільце не використовується.
pub const PIONEER_SENSOR_WEIGHTS: [[f64; 2]; 16] = [
    [150.0, 0.0],
    [200.0, 0.0],
    [300.0, 0.0],
    [600.0, 0.0],
    [0.0, 600.0],
    [0.0, 300.0],
    [0.0, 200.0],
    [0.0, 150.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [0.0, 0.0],
];

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            time_step_ms: 32,
            max_speed: 5.24,
            cruise_ratio: 0.8,
            kp_angle: 2.0,
            stop_distance: 0.5,
            min_distance: 1.0,
            max_sensor_value: 1024.0,
            sensor_range: 5.0,
            wheel_weight_threshold: 100.0,
            led_count: 3,
            led_period: 70,
            sensor_weights: PIONEER_SENSOR_WEIGHTS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwarmSettings {
    /// Імена агентів у порядку призначення.
    pub fleet: Vec<AgentId>,
    pub broadcast_capacity: usize,
    /// Крок стартових позицій агентів уздовж x.
    pub sector_size: f64,
    pub beacon_period_ms: u64,
    pub beacons: Vec<BeaconSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeaconSettings {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl From<&BeaconSettings> for BeaconRecord {
    fn from(b: &BeaconSettings) -> Self {
        BeaconRecord::new(b.name.clone(), b.x, b.y)
    }
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            fleet: (1..=13).map(|i| format!("PIONEER{i}")).collect(),
            broadcast_capacity: 1024,
            sector_size: 1.0,
            beacon_period_ms: 32,
            beacons: vec![
                BeaconSettings {
                    name: "A".into(),
                    x: 0.0,
                    y: 0.0,
                },
                BeaconSettings {
                    name: "B".into(),
                    x: 9.0,
                    y: 0.0,
                },
                BeaconSettings {
                    name: "C".into(),
                    x: 40.0,
                    y: 40.0,
                },
            ],
        }
    }
}

impl Settings {
    /// Необов'язковий файл, поверх якого лягають змінні середовища `FLEET_`,
    /// напр. `FLEET_COORDINATOR__EPSILON=5`.
    ///
    /// Відсутній файл є помилкою лише з `required`.
    pub fn load(path: &Path, required: bool) -> Result<Settings, config::ConfigError> {
        let name = path.to_string_lossy();
        config::Config::builder()
            .add_source(config::File::with_name(&name).required(required))
            .add_source(
                config::Environment::with_prefix("FLEET")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), SwarmError> {
        let c = &self.coordinator;
        let a = &self.agent;
        let checks = [
            (c.time_step_ms > 0, "coordinator.time_step_ms має бути додатним"),
            (c.reassign_period_ms > 0, "coordinator.reassign_period_ms має бути додатним"),
            (c.epsilon > 0.0, "coordinator.epsilon має бути додатним"),
            (c.max_clusters > 0, "coordinator.max_clusters має бути додатним"),
            (a.time_step_ms > 0, "agent.time_step_ms має бути додатним"),
            (a.max_speed > 0.0, "agent.max_speed має бути додатним"),
            (a.stop_distance > 0.0, "agent.stop_distance має бути додатним"),
            (a.min_distance > 0.0, "agent.min_distance має бути додатним"),
            (a.max_sensor_value > 0.0, "agent.max_sensor_value має бути додатним"),
            (self.swarm.broadcast_capacity > 0, "swarm.broadcast_capacity має бути додатним"),
        ];
        if let Some((_, msg)) = checks.iter().find(|(ok, _)| !ok) {
            return Err(SwarmError::Config((*msg).to_string()));
        }

        // Ім'я агента йде в канал без екранування.
        match self.swarm.fleet.iter().find(|id| !is_valid_agent_id(id)) {
            Some(id) => Err(SwarmError::Config(format!(
                "swarm.fleet: ім'я агента `{id}` має бути непорожнім ASCII без ком"
            ))),
            None => Ok(()),
        }
    }

    /// Флот, мовчки обрізаний до `max_robots`.
    pub fn fleet(&self) -> Vec<AgentId> {
        self.swarm
            .fleet
            .iter()
            .take(self.coordinator.max_robots)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.fleet().len(), 13);
        assert_eq!(s.agent.sensor_weights.len(), 16);
        assert_eq!(s.coordinator.epsilon, 9.5);
    }

    #[test]
    fn test_fleet_truncated_to_max_robots() {
        let mut s = Settings::default();
        s.coordinator.max_robots = 4;
        assert_eq!(s.fleet(), ["PIONEER1", "PIONEER2", "PIONEER3", "PIONEER4"]);
    }

    #[test]
    fn test_validate_rejects_zero_clusters() {
        let mut s = Settings::default();
        s.coordinator.max_clusters = 0;
        assert!(matches!(s.validate(), Err(SwarmError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_fleet_ids_the_wire_cannot_carry() {
        for bad in ["R,1", "", "РОБОТ"] {
            let mut s = Settings::default();
            s.swarm.fleet = vec!["R0".into(), bad.into()];
            match s.validate() {
                Err(SwarmError::Config(msg)) => assert!(msg.contains("swarm.fleet"), "{msg}"),
                other => panic!("`{bad}` accepted: {other:?}"),
            }
        }

        let mut s = Settings::default();
        s.swarm.fleet = vec!["AGENT_WITH_A_NAME_LONGER_THAN_31_CHARS".into()];
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_missing_optional_file_gives_defaults() {
        let s = Settings::load(Path::new("/nonexistent/fleet-settings.toml"), false).unwrap();
        assert_eq!(s.coordinator.reassign_period_ms, 10_000);
        assert!(Settings::load(Path::new("/nonexistent/fleet-settings.toml"), true).is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = std::env::temp_dir().join(format!("fleet-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Settings.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[coordinator]\nepsilon = 3.0\n\n[swarm]\nfleet = [\"R1\", \"R2\"]\n\n[[swarm.beacons]]\nname = \"X\"\nx = 1.0\ny = 2.0\n"
        )
        .unwrap();

        let s = Settings::load(&path, true).unwrap();
        assert_eq!(s.coordinator.epsilon, 3.0);
        assert_eq!(s.coordinator.max_beacons, 50);
        assert_eq!(s.fleet(), ["R1", "R2"]);
        assert_eq!(s.swarm.beacons.len(), 1);
        assert_eq!(s.agent.kp_angle, 2.0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
