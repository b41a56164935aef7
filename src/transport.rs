//! Внутрішньопроцесні broadcast канали замість радіозв'язку.
//!
//! Доставка без гарантій: отримувач, що відстав, втрачає найстаріші рядки,
//! а надсилання без отримувачів не є помилкою.

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use crate::core::SwarmError;

/// Два канали системи: звіти маяків на вхід, цілі на вихід.
#[derive(Debug, Clone)]
pub struct Channels {
    pub beacons: broadcast::Sender<String>,
    pub destinations: broadcast::Sender<String>,
}

impl Channels {
    pub fn new(capacity: usize) -> Self {
        let (beacons, _) = broadcast::channel(capacity);
        let (destinations, _) = broadcast::channel(capacity);
        Self {
            beacons,
            destinations,
        }
    }
}

/// Надіслати й забути.
pub fn publish(tx: &broadcast::Sender<String>, line: String) {
    // Немає підписників: просто ще ніхто не слухає.
    let _ = tx.send(line);
}

/// Забирає всі рядки, що зараз у черзі, без очікування.
///
/// Рядки, втрачені через відставання, пропускаються. Помилка лише тоді, коли
/// канал закрито і читати більше нічого.
pub fn drain(
    rx: &mut broadcast::Receiver<String>,
    channel: &'static str,
) -> Result<Vec<String>, SwarmError> {
    let mut lines = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(line) => lines.push(line),
            Err(TryRecvError::Lagged(skipped)) => {
                debug!(channel, skipped, "Отримувач відстав, повідомлення втрачено");
            }
            Err(TryRecvError::Empty) => return Ok(lines),
            Err(TryRecvError::Closed) if lines.is_empty() => {
                return Err(SwarmError::ChannelClosed(channel));
            }
            Err(TryRecvError::Closed) => return Ok(lines),
        }
    }
}
