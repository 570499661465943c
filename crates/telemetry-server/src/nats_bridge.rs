//! NATS bus bridge.
//!
//! [`NatsBridge`] subscribes to the configured telemetry subject and
//! feeds every message through the same ingestion pipeline as the HTTP
//! route. It runs on its own Tokio task so a stalled subscription never
//! holds up HTTP ingestion or fan-out delivery; successful ingestions
//! are handed to the fan-out task through its [`FanoutHandle`], never
//! delivered directly.
//!
//! # Failure handling
//!
//! - undecodable message: logged at `warn`, dropped
//! - ingestion failure: logged at `error`, dropped
//! - connect or subscribe failure, or the subscription ending:
//!   logged, then retried after a fixed delay
//!
//! A message redelivered after a reconnect is ingested again as a new
//! record; there is no idempotency key.

use std::time::Duration;

use futures::StreamExt as _;
use telemetry_core::{decode_report, FanoutHandle, IngestError, Ingestor, RecordStore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::EngineError;

/// Delay between reconnect attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// What happened to one bus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Ingested and queued for fan-out.
    Broadcast,
    /// Not a valid report; nothing was written.
    Rejected,
    /// Validated, but the store or pipeline failed.
    StorageFailed,
}

/// Bridges a NATS subject into the ingestion pipeline.
#[derive(Debug)]
pub struct NatsBridge<S> {
    ingestor: Ingestor<S>,
    fanout: FanoutHandle,
    url: String,
    subject: String,
}

impl<S: RecordStore> NatsBridge<S> {
    /// Create a bridge for `subject` on the server at `url`.
    pub fn new(
        ingestor: Ingestor<S>,
        fanout: FanoutHandle,
        url: &str,
        subject: &str,
    ) -> Self {
        Self {
            ingestor,
            fanout,
            url: url.to_owned(),
            subject: subject.to_owned(),
        }
    }

    /// Decode, ingest, and broadcast one message payload.
    ///
    /// Never fails; every outcome is logged and reported.
    pub async fn handle_payload(&self, payload: &[u8]) -> MessageOutcome {
        let report = match decode_report(payload) {
            Ok(report) => report,
            Err(e) => {
                warn!(subject = %self.subject, error = %e, "dropping undecodable bus message");
                return MessageOutcome::Rejected;
            }
        };

        match self.ingestor.ingest(&report).await {
            Ok(record) => {
                if let Err(e) = self.fanout.broadcast(&record.document) {
                    warn!(ts = record.ts, error = %e, "broadcast after bus ingest failed");
                }
                debug!(ts = record.ts, "bus message ingested");
                MessageOutcome::Broadcast
            }
            Err(IngestError::Rejected(e)) => {
                warn!(subject = %self.subject, error = %e, "dropping invalid bus message");
                MessageOutcome::Rejected
            }
            Err(e) => {
                error!(subject = %self.subject, error = %e, "failed to store bus message");
                MessageOutcome::StorageFailed
            }
        }
    }

    /// Connect, subscribe, and consume until the subscription ends.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if connecting or subscribing fails.
    pub async fn consume(&self) -> Result<(), EngineError> {
        let client = async_nats::connect(self.url.as_str())
            .await
            .map_err(|e| EngineError::Nats {
                message: format!("failed to connect to NATS at {}: {e}", self.url),
            })?;
        let mut subscriber = client
            .subscribe(self.subject.clone())
            .await
            .map_err(|e| EngineError::Nats {
                message: format!("failed to subscribe to {}: {e}", self.subject),
            })?;

        info!(url = %self.url, subject = %self.subject, "Consuming telemetry from NATS");

        while let Some(message) = subscriber.next().await {
            self.handle_payload(&message.payload).await;
        }
        Ok(())
    }

    /// Consume forever, reconnecting after [`RETRY_DELAY`] whenever the
    /// connection attempt fails or the subscription ends.
    pub async fn run(self) {
        loop {
            match self.consume().await {
                Ok(()) => warn!(subject = %self.subject, "NATS subscription ended"),
                Err(e) => warn!(error = %e, "NATS bridge unavailable"),
            }
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
}

/// Spawn the bridge on its own Tokio task.
pub fn spawn_bridge<S: RecordStore>(bridge: NatsBridge<S>) -> JoinHandle<()> {
    tokio::spawn(bridge.run())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use telemetry_core::{spawn_fanout, MemoryStore, StoreError, TimeFormatter};
    use telemetry_types::{
        NewProcessedRecord, ProcessedRecord, ProcessedRecordId, RangeQuery, RawRangeQuery,
        RawRecord, RawRecordId,
    };

    use super::*;

    const VALID: &[u8] = br#"{
        "car": {"drive": {"pwm": 80}},
        "centric": {"controls": {"curve_direction": 180, "speed": 0, "movement_direction": 0}},
        "src": "bus"
    }"#;

    const OUT_OF_RANGE: &[u8] = br#"{
        "car": {},
        "centric": {"controls": {"curve_direction": 999, "speed": 0, "movement_direction": 0}}
    }"#;

    fn bridge<S: RecordStore>(store: S) -> (NatsBridge<S>, FanoutHandle) {
        let (fanout, _task) = spawn_fanout();
        let ingestor = Ingestor::new(Arc::new(store), 12.0, TimeFormatter::utc());
        let bridge = NatsBridge::new(
            ingestor,
            fanout.clone(),
            "nats://localhost:4222",
            "telemetry.combined.1",
        );
        (bridge, fanout)
    }

    #[tokio::test]
    async fn valid_message_is_stored_and_broadcast() {
        let (bridge, fanout) = bridge(MemoryStore::new());
        let mut sub = fanout.connect().unwrap();

        assert_eq!(bridge.handle_payload(VALID).await, MessageOutcome::Broadcast);

        let stored = bridge.ingestor.store().latest().await.unwrap().unwrap();
        let frame = sub.rx.recv().await.unwrap();
        let doc: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(doc["ts"], stored.ts);
        assert_eq!(doc["centric"]["controls"]["derived"]["movement_direction_text"], "back");
        assert_eq!(bridge.ingestor.store().counts().await, (1, 1));
    }

    #[tokio::test]
    async fn undecodable_message_is_dropped_and_loop_continues() {
        let (bridge, _fanout) = bridge(MemoryStore::new());

        assert_eq!(bridge.handle_payload(b"\xff\xfe").await, MessageOutcome::Rejected);
        assert_eq!(
            bridge.handle_payload(OUT_OF_RANGE).await,
            MessageOutcome::Rejected
        );
        assert_eq!(bridge.ingestor.store().counts().await, (0, 0));

        assert_eq!(bridge.handle_payload(VALID).await, MessageOutcome::Broadcast);
    }

    /// Store that fails every call.
    #[derive(Debug)]
    struct DownStore;

    fn down() -> StoreError {
        StoreError::Backend(String::from("connection refused"))
    }

    impl RecordStore for DownStore {
        async fn write_raw(&self, _: i64, _: Option<&str>, _: &str) -> Result<RawRecordId, StoreError> {
            Err(down())
        }

        async fn write_processed(
            &self,
            _: &NewProcessedRecord,
        ) -> Result<ProcessedRecordId, StoreError> {
            Err(down())
        }

        async fn latest(&self) -> Result<Option<ProcessedRecord>, StoreError> {
            Err(down())
        }

        async fn range(&self, _: &RangeQuery) -> Result<Vec<ProcessedRecord>, StoreError> {
            Err(down())
        }

        async fn latest_raw(&self) -> Result<Option<RawRecord>, StoreError> {
            Err(down())
        }

        async fn range_raw(&self, _: &RawRangeQuery) -> Result<Vec<RawRecord>, StoreError> {
            Err(down())
        }

        async fn touch(&self, _: ProcessedRecordId, _: i64) -> Result<bool, StoreError> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn storage_failure_is_contained() {
        let (bridge, fanout) = bridge(DownStore);
        let mut sub = fanout.connect().unwrap();

        assert_eq!(bridge.handle_payload(VALID).await, MessageOutcome::StorageFailed);
        assert_eq!(bridge.handle_payload(VALID).await, MessageOutcome::StorageFailed);
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bridge_task_hands_off_to_fanout_subscribers() {
        let (bridge, fanout) = bridge(MemoryStore::new());
        let mut sub = fanout.connect().unwrap();

        let worker = tokio::spawn(async move { bridge.handle_payload(VALID).await });
        assert_eq!(worker.await.unwrap(), MessageOutcome::Broadcast);

        let frame = sub.rx.recv().await.unwrap();
        assert!(frame.contains("\"src\":\"bus\""));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error_not_a_panic() {
        let (bridge, _fanout) = bridge(MemoryStore::new());
        let bridge = NatsBridge {
            url: String::from("nats://127.0.0.1:1"),
            ..bridge
        };
        assert!(matches!(
            bridge.consume().await,
            Err(EngineError::Nats { .. })
        ));
    }
}
