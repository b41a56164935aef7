// СЛОВНИК
// Спільні типи координатора та агентів.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ім'я агента у флоті, як воно передається в повідомленнях призначення.
pub type AgentId = String;

/// Максимальна довжина імені маяка в каналі.
pub const MAX_BEACON_NAME_LEN: usize = 31;

/// Двовимірна позиція у світовій системі координат.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Евклідова відстань до іншої точки.
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Позиція разом з орієнтацією (радіани, проти годинникової стрілки від +x).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Pose {
    pub position: Position,
    pub heading: f64,
}

/// Остання повідомлена позиція іменованого маяка.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeaconRecord {
    pub name: String,
    pub position: Position,
}

impl BeaconRecord {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            position: Position::new(x, y),
        }
    }
}

/// Група маяків, відкрита маяком-зародком.
///
/// `members` — індекси у знімку реєстру, з якого побудовано кластер,
/// у порядку реєстрації; зародок завжди перший.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: usize,
    pub members: Vec<usize>,
    pub centroid: Position,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Мітка кластера в каналі, напр. `CLUSTER3`.
    pub fn label(&self) -> String {
        cluster_label(self.id)
    }
}

pub fn cluster_label(id: usize) -> String {
    format!("CLUSTER{id}")
}

/// Призначення одного агента на поточний цикл перерозподілу.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationAssignment {
    pub agent_id: AgentId,
    pub cluster_id: usize,
    pub target: Position,
}

impl DestinationAssignment {
    pub fn label(&self) -> String {
        cluster_label(self.cluster_id)
    }
}

/// Стани навігації агента.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavState {
    /// Жодного призначення ще не отримано.
    Idle,
    /// Рух до поточної цілі.
    Seeking,
    /// У межах дистанції зупинки; колеса стоять.
    Arrived,
}

/// Звіт агента, що надсилається при кожній зміні навігації.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentStatus {
    pub agent_id: AgentId,
    pub state: NavState,
    pub position: Position,
    /// Мітка поточної цілі, якщо вона є.
    pub target: Option<String>,
}

/// Диференційне зміщення від датчиків наближення.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WheelBias {
    pub left: f64,
    pub right: f64,
}

/// Підсумкова кутова швидкість кожного колеса.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    pub const STOP: WheelCommand = WheelCommand {
        left: 0.0,
        right: 0.0,
    };
}

/// Причини, з яких рядок у каналі не є коректним повідомленням.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WireError {
    #[error("Порожнє повідомлення")]
    Empty,
    #[error("Невідомий тег повідомлення `{0}`")]
    UnknownTag(String),
    #[error("{tag} очікує {expected} полів, отримано {found}")]
    FieldCount {
        tag: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Некоректне ім'я `{0}`")]
    InvalidName(String),
    #[error("Поле `{field}` не є скінченним числом: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Некоректна мітка призначення `{0}`")]
    InvalidLabel(String),
}

/// Помилки, що зупиняють робочий цикл або не дають його запустити.
#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("Канал розсилки закрито: {0}")]
    ChannelClosed(&'static str),
    #[error("Некоректна конфігурація: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn test_cluster_label() {
        let c = Cluster {
            id: 7,
            members: vec![0],
            centroid: Position::ORIGIN,
        };
        assert_eq!(c.label(), "CLUSTER7");
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_error_messages() {
        let e = WireError::FieldCount {
            tag: "BALIZA",
            expected: 4,
            found: 3,
        };
        assert_eq!(e.to_string(), "BALIZA очікує 4 полів, отримано 3");
        let e = SwarmError::ChannelClosed("destinations");
        assert!(e.to_string().contains("destinations"));
    }
}
