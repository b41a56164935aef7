//! Нерухомий маяк, що транслює власну позицію.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use crate::core::BeaconRecord;
use crate::transport::publish;
use crate::wire::Message;

/// Надсилає звіти `BALIZA` для `record` кожні `period`, безкінечно.
pub async fn run(record: BeaconRecord, tx: broadcast::Sender<String>, period: Duration) {
    info!(
        beacon = %record.name,
        "Маяк запущено в ({:.2}, {:.2})",
        record.position.x,
        record.position.y
    );
    let line = Message::from(record).encode();
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        publish(&tx, line.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reports_periodically() {
        let (tx, mut rx) = broadcast::channel(8);
        let handle = tokio::spawn(run(
            BeaconRecord::new("BEACON1", 1.234, -5.0),
            tx,
            Duration::from_millis(32),
        ));

        assert_eq!(rx.recv().await.unwrap(), "BALIZA,BEACON1,1.23,-5.00");
        assert_eq!(rx.recv().await.unwrap(), "BALIZA,BEACON1,1.23,-5.00");
        handle.abort();
    }
}
