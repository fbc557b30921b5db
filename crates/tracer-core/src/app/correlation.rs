//! CorrelationReader - rootId でトレースログを引く
//!
//! # 読み取りの流れ
//! 1. DocumentStore::query_by_root_id() でスナップショットを取得
//! 2. rootId が一致しない document は捨てる（store 実装を信用しない）
//! 3. 必要なら各 document を遅延デコード（`query_decoded`）
//!
//! クエリ時点で全ステージが書き込まれているとは限りません。
//! 部分的な結果はエラーではなく、待ちたい場合は `await_documents` を使います。

use std::marker::PhantomData;

use tracing::{debug, info, warn};

use super::poll::PollPolicy;
use crate::domain::{EnvelopeDocument, EnvelopeError, RootId, StoreQueryError, TraceEnvelope};
use crate::ports::{DocumentCursor, DocumentStore, QueryOrder};
use crate::typed::Payload;

/// Untyped view of a correlation query.
pub type RawCursor = std::iter::Map<DocumentCursor, fn(EnvelopeDocument) -> serde_json::Value>;

pub struct CorrelationReader<S> {
    store: S,
    order: QueryOrder,
}

impl<S: DocumentStore> CorrelationReader<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            order: QueryOrder::StoreDefined,
        }
    }

    pub fn with_order(mut self, order: QueryOrder) -> Self {
        self.order = order;
        self
    }

    /// All persisted documents whose `rootId` equals `root_id`.
    pub async fn query_by_root_id(
        &self,
        root_id: &RootId,
    ) -> Result<DocumentCursor, StoreQueryError> {
        let cursor = self
            .store
            .query_by_root_id(root_id, self.order)
            .await
            .map_err(|source| StoreQueryError::Query {
                root_id: root_id.clone(),
                source,
            })?;
        debug!(root_id = %root_id, order = ?self.order, "correlation query issued");

        let expected = root_id.clone();
        Ok(DocumentCursor::new(cursor.filter(move |document| {
            if document.root_id == expected {
                return true;
            }
            warn!(
                root_id = %expected,
                foreign_root_id = %document.root_id,
                "store returned a document for another root; skipped"
            );
            false
        })))
    }

    /// Same as `query_by_root_id`, decoding each payload as it is consumed.
    pub async fn query_decoded<P: Payload>(
        &self,
        root_id: &RootId,
    ) -> Result<DecodedCursor<P>, StoreQueryError> {
        let documents = self.query_by_root_id(root_id).await?;
        Ok(DecodedCursor::new(documents))
    }

    /// Matching documents as untyped JSON objects, payloads left encoded.
    pub async fn query_raw(&self, root_id: &RootId) -> Result<RawCursor, StoreQueryError> {
        let documents = self.query_by_root_id(root_id).await?;
        Ok(documents.map(serde_json::Value::from as fn(EnvelopeDocument) -> serde_json::Value))
    }

    /// Polls until at least `expected` documents exist for `root_id`.
    ///
    /// Returns the last snapshot once it is large enough or once
    /// `policy.max_attempts` queries have been issued, whichever comes first.
    pub async fn await_documents(
        &self,
        root_id: &RootId,
        expected: usize,
        policy: &PollPolicy,
    ) -> Result<Vec<EnvelopeDocument>, StoreQueryError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let documents: Vec<EnvelopeDocument> =
                self.query_by_root_id(root_id).await?.collect();
            if documents.len() >= expected {
                info!(root_id = %root_id, count = documents.len(), attempt, "trace complete");
                return Ok(documents);
            }
            if attempt >= max_attempts {
                warn!(
                    root_id = %root_id,
                    count = documents.len(),
                    expected,
                    "gave up waiting for trace; returning partial result"
                );
                return Ok(documents);
            }

            let delay = policy.next_delay(attempt);
            debug!(
                root_id = %root_id,
                count = documents.len(),
                expected,
                delay_ms = delay.as_millis() as u64,
                "trace incomplete; polling again"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Lazily decodes each document into a `TraceEnvelope<P>`.
///
/// A document that fails to decode yields an `Err` item; iteration continues
/// with the next document.
pub struct DecodedCursor<P> {
    documents: DocumentCursor,
    _marker: PhantomData<fn() -> P>,
}

impl<P> DecodedCursor<P> {
    fn new(documents: DocumentCursor) -> Self {
        Self {
            documents,
            _marker: PhantomData,
        }
    }
}

impl<P: Payload> Iterator for DecodedCursor<P> {
    type Item = Result<TraceEnvelope<P>, EnvelopeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents.next().map(|document| document.into_envelope())
    }
}
