//! InMemoryDocumentStore - 開発用のドキュメントストア
//!
//! 永続化時刻を Clock で記録するので、`QueryOrder::PersistedAt` を指定できます。
//! ストア定義の順序（`StoreDefined`）は書き込み順です。

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::debug;

use crate::domain::{EnvelopeDocument, RootId};
use crate::ports::{Clock, DocumentCursor, DocumentStore, QueryOrder, StoreError, SystemClock};

struct StoredDocument {
    persisted_at: DateTime<Utc>,
    document: EnvelopeDocument,
}

pub struct InMemoryDocumentStore<C = SystemClock> {
    collection: String,
    clock: C,
    records: Mutex<Vec<StoredDocument>>,
}

impl<C: Clock> InMemoryDocumentStore<C> {
    pub fn new(clock: C) -> Self {
        Self::with_collection(clock, "tracelog")
    }

    pub fn with_collection(clock: C, collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            clock,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredDocument>>, StoreError> {
        self.records
            .lock()
            .map_err(|e| {
                StoreError::OperationFailed(format!("{}: lock poisoned: {e}", self.collection))
            })
    }
}

#[async_trait::async_trait]
impl<C: Clock> DocumentStore for InMemoryDocumentStore<C> {
    async fn persist(&self, document: EnvelopeDocument) -> Result<(), StoreError> {
        let persisted_at = self.clock.now();
        let mut records = self.lock()?;
        debug!(
            collection = %self.collection,
            root_id = %document.root_id,
            stage = %document.stage_name,
            "document stored"
        );
        records.push(StoredDocument {
            persisted_at,
            document,
        });
        Ok(())
    }

    async fn query_by_root_id(
        &self,
        root_id: &RootId,
        order: QueryOrder,
    ) -> Result<DocumentCursor, StoreError> {
        let mut matches: Vec<(DateTime<Utc>, EnvelopeDocument)> = {
            let records = self.lock()?;
            records
                .iter()
                .filter(|r| &r.document.root_id == root_id)
                .map(|r| (r.persisted_at, r.document.clone()))
                .collect()
        };

        if order == QueryOrder::PersistedAt {
            // stable sort: 同時刻なら書き込み順のまま
            matches.sort_by_key(|(persisted_at, _)| *persisted_at);
        }

        Ok(DocumentCursor::new(
            matches.into_iter().map(|(_, document)| document),
        ))
    }
}
