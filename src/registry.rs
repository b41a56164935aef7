//! Сховище позицій маяків на один цикл.

use tracing::trace;

use crate::core::BeaconRecord;
use crate::wire::Message;

/// Остання позиція кожного маяка за іменем, у порядку першої появи.
///
/// Реєстр перебудовується кожного циклу перерозподілу; нічого не переноситься.
/// Порядок вставки визначає, які маяки стають зародками кластерів.
#[derive(Debug, Clone)]
pub struct BeaconRegistry {
    records: Vec<BeaconRecord>,
    capacity: usize,
}

impl BeaconRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Забуває всі маяки. Викликається на початку кожного циклу.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Розбирає сирий рядок звіту і записує його.
    ///
    /// Некоректні рядки та повідомлення не від маяків відкидаються.
    pub fn ingest(&mut self, report: &str) {
        match Message::decode(report) {
            Ok(Message::Beacon(record)) => self.upsert(record),
            Ok(other) => trace!(?other, "Ігноруємо повідомлення не від маяка"),
            Err(e) => trace!(error = %e, report, "Відкинуто некоректний звіт маяка"),
        }
    }

    /// Оновлює запис з тим самим іменем або додає новий, поки є місце.
    pub fn upsert(&mut self, record: BeaconRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.name == record.name) {
            existing.position = record.position;
        } else if self.records.len() < self.capacity {
            self.records.push(record);
        } else {
            trace!(name = %record.name, capacity = self.capacity, "Реєстр маяків заповнено");
        }
    }

    pub fn snapshot(&self) -> &[BeaconRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
