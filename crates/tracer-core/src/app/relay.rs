//! StoreRelay - ストリームの envelope をストアへ書き込む consumer
//!
//! # フロー
//! 1. EventSource::receive() で 1 メッセージ取得（poll_timeout まで待つ）
//! 2. wire document として parse（不正なら rejected としてスキップ）
//! 3. DocumentStore::persist() で書き込み
//!
//! 生産者とは独立して動きます。共有するのはメッセージ内の rootId だけです。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::status::{RelayCounters, RelayStats};
use crate::domain::EnvelopeDocument;
use crate::ports::{DocumentStore, EventSource};

/// Relay handle.
/// - `request_shutdown()` で受信ループを止める
/// - `shutdown_and_join()` で停止を待って最終的な件数を返す
pub struct StoreRelay {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
    counters: Arc<RelayCounters>,
}

impl StoreRelay {
    pub fn spawn<E, S>(
        source: E,
        destination: impl Into<String>,
        store: S,
        poll_timeout: Duration,
    ) -> Self
    where
        E: EventSource + 'static,
        S: DocumentStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let counters = Arc::new(RelayCounters::default());

        let join = tokio::spawn(relay_loop(
            source,
            destination.into(),
            store,
            poll_timeout,
            shutdown_rx,
            Arc::clone(&counters),
        ));

        Self {
            shutdown_tx,
            join,
            counters,
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.counters.snapshot()
    }

    /// Stops taking new messages. A message already received is still persisted.
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) -> RelayStats {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            warn!(error = %e, "store relay task ended abnormally");
        }
        self.counters.snapshot()
    }
}

async fn relay_loop<E, S>(
    source: E,
    destination: String,
    store: S,
    poll_timeout: Duration,
    shutdown_rx: watch::Receiver<bool>,
    counters: Arc<RelayCounters>,
) where
    E: EventSource,
    S: DocumentStore,
{
    info!(destination = %destination, "store relay started");

    loop {
        // receive は poll_timeout で必ず戻るので、shutdown はここで判定するだけ。
        // select で receive を中断すると取り出し済みのメッセージを失う。
        if *shutdown_rx.borrow() {
            break;
        }

        let body = match source.receive(&destination, poll_timeout).await {
            Ok(Some(body)) => body,
            Ok(None) => continue,
            Err(e) => {
                counters.record_failed();
                warn!(destination = %destination, error = %e, "receive failed");
                tokio::time::sleep(poll_timeout).await;
                continue;
            }
        };

        let document = match EnvelopeDocument::from_transport_bytes(&body) {
            Ok(document) => document,
            Err(e) => {
                counters.record_rejected();
                warn!(
                    destination = %destination,
                    error = %e,
                    "message is not an envelope document"
                );
                continue;
            }
        };

        let root_id = document.root_id.clone();
        let stage = document.stage_name.clone();
        match store.persist(document).await {
            Ok(()) => {
                counters.record_persisted();
                debug!(root_id = %root_id, stage = %stage, "envelope persisted");
            }
            Err(e) => {
                counters.record_failed();
                warn!(root_id = %root_id, stage = %stage, error = %e, "persist failed");
            }
        }
    }

    info!(destination = %destination, stats = ?counters.snapshot(), "store relay stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{CorrelationReader, PollPolicy, Publisher};
    use crate::domain::{RootId, StageName, TraceEnvelope};
    use crate::impls::{InMemoryDocumentStore, InMemoryEventStream};
    use crate::ports::{
        DocumentCursor, EventStream, QueryOrder, StoreError, StreamError, SystemClock,
    };
    use crate::typed::payload::fixtures::KeyValue;
    use async_trait::async_trait;

    const POLL: Duration = Duration::from_millis(20);

    struct ReadOnlyStore;

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn persist(&self, _document: EnvelopeDocument) -> Result<(), StoreError> {
            Err(StoreError::OperationFailed("read-only".to_string()))
        }

        async fn query_by_root_id(
            &self,
            _root_id: &RootId,
            _order: QueryOrder,
        ) -> Result<DocumentCursor, StoreError> {
            Ok(DocumentCursor::empty())
        }
    }

    /// 常に接続できない stream
    struct DisconnectedSource;

    #[async_trait]
    impl EventSource for DisconnectedSource {
        async fn receive(
            &self,
            _destination: &str,
            _timeout: Duration,
        ) -> Result<Option<Vec<u8>>, StreamError> {
            Err(StreamError::Unavailable("no route to namespace".to_string()))
        }
    }

    #[tokio::test]
    async fn published_stages_become_queryable() {
        let stream = Arc::new(InMemoryEventStream::new());
        let store = Arc::new(InMemoryDocumentStore::new(SystemClock));
        let relay = StoreRelay::spawn(stream.clone(), "tracehub", store.clone(), POLL);

        let publisher = Publisher::new(stream.clone(), "tracehub");
        let root_id = RootId::new("r1");
        let origin = TraceEnvelope::originate(
            root_id.clone(),
            StageName::new("RequestHandler"),
            KeyValue::new("Foo", "Bar"),
        )
        .unwrap();
        let processed = origin
            .next_stage(StageName::new("Processor"), KeyValue::new("Foo", "Baz"))
            .unwrap();
        publisher.publish(&origin).await.unwrap();
        publisher.publish(&processed).await.unwrap();

        let reader = CorrelationReader::new(store.clone()).with_order(QueryOrder::PersistedAt);
        let documents = reader
            .await_documents(&root_id, 2, &PollPolicy::new(POLL, 1.5, 50))
            .await
            .unwrap();
        assert_eq!(documents.len(), 2);

        let mut stages = Vec::new();
        for document in documents {
            let envelope: TraceEnvelope<KeyValue> = document.into_envelope().unwrap();
            assert_eq!(envelope.root_id(), &root_id);
            stages.push(envelope.stage_name().to_string());
        }
        stages.sort();
        assert_eq!(stages, vec!["Processor", "RequestHandler"]);

        let stats = relay.shutdown_and_join().await;
        assert_eq!(stats.persisted, 2);
        assert_eq!(stats.rejected, 0);
    }

    #[tokio::test]
    async fn garbage_messages_are_rejected_and_skipped() {
        let stream = Arc::new(InMemoryEventStream::new());
        let store = Arc::new(InMemoryDocumentStore::new(SystemClock));
        let relay = StoreRelay::spawn(stream.clone(), "tracehub", store.clone(), POLL);

        stream.send("tracehub", b"not json".to_vec()).await.unwrap();
        let valid = TraceEnvelope::originate(
            RootId::new("r1"),
            StageName::new("RequestHandler"),
            KeyValue::new("Foo", "Bar"),
        )
        .unwrap();
        Publisher::new(stream.clone(), "tracehub")
            .publish(&valid)
            .await
            .unwrap();

        let reader = CorrelationReader::new(store.clone());
        let documents = reader
            .await_documents(&RootId::new("r1"), 1, &PollPolicy::new(POLL, 1.5, 50))
            .await
            .unwrap();
        assert_eq!(documents, vec![valid.to_document()]);

        let stats = relay.shutdown_and_join().await;
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.persisted, 1);
    }

    #[tokio::test]
    async fn store_failures_are_counted() {
        let stream = Arc::new(InMemoryEventStream::new());
        let relay = StoreRelay::spawn(stream.clone(), "tracehub", ReadOnlyStore, POLL);

        let envelope = TraceEnvelope::originate(
            RootId::new("r1"),
            StageName::new("RequestHandler"),
            KeyValue::new("Foo", "Bar"),
        )
        .unwrap();
        Publisher::new(stream.clone(), "tracehub")
            .publish(&envelope)
            .await
            .unwrap();

        // relay が取り出すまで待つ
        for _ in 0..100 {
            if relay.stats().failed == 1 {
                break;
            }
            tokio::time::sleep(POLL).await;
        }

        let stats = relay.shutdown_and_join().await;
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.persisted, 0);
    }

    #[tokio::test]
    async fn receive_failures_are_counted_and_shutdown_still_joins() {
        let store = Arc::new(InMemoryDocumentStore::new(SystemClock));
        let relay = StoreRelay::spawn(DisconnectedSource, "tracehub", store.clone(), POLL);

        for _ in 0..100 {
            if relay.stats().failed >= 2 {
                break;
            }
            tokio::time::sleep(POLL).await;
        }

        let stats = tokio::time::timeout(Duration::from_secs(2), relay.shutdown_and_join())
            .await
            .expect("relay did not stop");
        assert!(stats.failed >= 2);
        assert_eq!(stats.persisted, 0);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn idle_relay_stops_on_shutdown() {
        let stream = Arc::new(InMemoryEventStream::new());
        let store = Arc::new(InMemoryDocumentStore::new(SystemClock));
        let relay = StoreRelay::spawn(stream, "tracehub", store, POLL);

        let stats = tokio::time::timeout(Duration::from_secs(2), relay.shutdown_and_join())
            .await
            .expect("relay did not stop");
        assert_eq!(stats, RelayStats::default());
    }
}
