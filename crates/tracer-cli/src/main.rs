use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tracer_core::app::{CorrelationReader, Publisher, StoreRelay};
use tracer_core::domain::{RootId, StageName, TraceEnvelope, Trail};
use tracer_core::impls::{InMemoryDocumentStore, InMemoryEventStream};
use tracer_core::ports::{QueryOrder, RootIdGenerator, SystemClock, UlidGenerator};

mod config;
mod telemetry;

use crate::config::Settings;

/// リクエストのコンテキスト（payload）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RequestContext {
    #[serde(rename = "EventRootID")]
    event_root_id: RootId,
    event_trace: Trail,
    key: String,
    value: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()?;
    telemetry::init_logging(&settings.telemetry)?;
    let poll_policy = settings.poll.policy()?;

    // (A) transport と store を用意し、store への書き写し（relay）を起動
    let stream = Arc::new(InMemoryEventStream::new());
    let store = Arc::new(InMemoryDocumentStore::with_collection(
        SystemClock,
        settings.store.collection_path(),
    ));
    info!(collection = store.collection(), "trace log store ready");
    let relay = StoreRelay::spawn(
        stream.clone(),
        settings.stream.destination.clone(),
        store.clone(),
        settings.stream.receive_timeout(),
    );

    // (B) rootId を採番して最初のステージの envelope を publish
    let root_id = UlidGenerator::new(SystemClock).generate_root_id();
    let publisher = Publisher::new(stream.clone(), settings.stream.destination.clone());

    let request_stage = StageName::new("RequestHandler");
    let request = TraceEnvelope::originate(
        root_id.clone(),
        request_stage.clone(),
        RequestContext {
            event_root_id: root_id.clone(),
            event_trace: Trail::starting_at(request_stage),
            key: "Foo".to_string(),
            value: "Bar".to_string(),
        },
    )?;
    let ack = publisher.publish(&request).await?;
    info!(
        root_id = %root_id,
        destination = publisher.destination(),
        sequence = ack.sequence,
        "request envelope sent"
    );

    // (C) 下流ステージ: 同じ rootId、trail を引き継いで publish
    let processor_stage = StageName::new("Processor");
    let processed = request.next_stage(
        processor_stage.clone(),
        RequestContext {
            event_root_id: root_id.clone(),
            event_trace: request.trail().appended(processor_stage),
            value: format!("{} (processed)", request.payload().value),
            ..request.payload().clone()
        },
    )?;
    publisher.publish(&processed).await?;

    // (D) 固定 sleep ではなく、全ステージが揃うまでポーリング
    let reader = CorrelationReader::new(store.clone()).with_order(QueryOrder::PersistedAt);
    let documents = reader
        .await_documents(&root_id, 2, &poll_policy)
        .await?;
    info!(root_id = %root_id, count = documents.len(), "trace documents available");

    // (E) 型付きで復元
    for envelope in reader.query_decoded::<RequestContext>(&root_id).await? {
        match envelope {
            Ok(envelope) => info!(
                stage = %envelope.stage_name(),
                trail = ?envelope.trail().stages(),
                payload = ?envelope.payload(),
                "decoded"
            ),
            Err(e) => warn!(root_id = %root_id, error = %e, "document could not be decoded"),
        }
    }

    // (F) 生の document（payload は encode されたまま）
    for raw in reader.query_raw(&root_id).await? {
        info!(document = %raw, "raw");
    }

    let stats = relay.shutdown_and_join().await;
    info!(?stats, "done");
    Ok(())
}
