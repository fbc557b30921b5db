//! Publisher - envelope をイベントストリームに送る
//!
//! # フロー
//! 1. envelope を wire document（JSON bytes）に serialize
//! 2. EventStream::send() で 1 メッセージとして送信（1 回だけ、内部リトライなし）
//! 3. 失敗時は原因付きの PublishError を返す（リトライするかは呼び出し側が決める）

use tracing::{debug, warn};

use crate::domain::{PublishError, TraceEnvelope};
use crate::ports::{Ack, EventStream};

pub struct Publisher<S> {
    stream: S,
    destination: String,
}

impl<S: EventStream> Publisher<S> {
    pub fn new(stream: S, destination: impl Into<String>) -> Self {
        Self {
            stream,
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub async fn publish<P>(&self, envelope: &TraceEnvelope<P>) -> Result<Ack, PublishError> {
        let body = envelope.to_transport_bytes()?;

        match self.stream.send(&self.destination, body).await {
            Ok(ack) => {
                debug!(
                    root_id = %envelope.root_id(),
                    stage = %envelope.stage_name(),
                    destination = %self.destination,
                    sequence = ack.sequence,
                    "envelope published"
                );
                Ok(ack)
            }
            Err(source) => {
                warn!(
                    root_id = %envelope.root_id(),
                    stage = %envelope.stage_name(),
                    destination = %self.destination,
                    error = %source,
                    "publish failed"
                );
                Err(PublishError::Transport {
                    destination: self.destination.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnvelopeDocument, ErrorKind, RootId, StageName};
    use crate::impls::InMemoryEventStream;
    use crate::ports::{EventSource, StreamError};
    use crate::typed::payload::fixtures::KeyValue;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 常に失敗し、呼ばれた回数を数える transport
    struct RejectingStream {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EventStream for RejectingStream {
        async fn send(&self, _destination: &str, _body: Vec<u8>) -> Result<Ack, StreamError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(StreamError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn envelope() -> TraceEnvelope<KeyValue> {
        TraceEnvelope::originate(
            RootId::new("r1"),
            StageName::new("RequestHandler"),
            KeyValue::new("Foo", "Bar"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn publish_sends_one_wire_document() {
        let stream = Arc::new(InMemoryEventStream::new());
        let publisher = Publisher::new(stream.clone(), "tracehub");

        let ack = publisher.publish(&envelope()).await.unwrap();
        assert_eq!(ack.destination, publisher.destination());

        let body = stream
            .receive("tracehub", Duration::from_millis(100))
            .await
            .unwrap()
            .unwrap();
        let document = EnvelopeDocument::from_transport_bytes(&body).unwrap();
        assert_eq!(document, envelope().to_document());
        assert_eq!(stream.pending("tracehub").unwrap(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_reported_without_retry() {
        let stream = Arc::new(RejectingStream {
            calls: AtomicUsize::new(0),
        });
        let publisher = Publisher::new(stream.clone(), "tracehub");

        let err = publisher.publish(&envelope()).await.unwrap_err();

        assert!(matches!(
            &err,
            PublishError::Transport { destination, source: StreamError::Unavailable(_) }
                if destination == "tracehub"
        ));
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(stream.calls.load(Ordering::Relaxed), 1);
    }
}
