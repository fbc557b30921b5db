//! DocumentStore port - 永続化されたトレースログ（ドキュメントストア）
//!
//! - 書き込み側: `persist`（StoreRelay などの consumer が使う）
//! - 読み込み側: `query_by_root_id`（rootId の等値検索）
//!
//! # 実装
//! - InMemoryDocumentStore（開発用・テスト用）

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{EnvelopeDocument, RootId};

/// Result ordering requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrder {
    /// Whatever order the store yields; not tied to trail order.
    #[default]
    StoreDefined,
    /// Oldest persisted first.
    PersistedAt,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation failed: {0}")]
    OperationFailed(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn persist(&self, document: EnvelopeDocument) -> Result<(), StoreError>;

    /// Snapshot of the documents whose `rootId` equals `root_id` at query time.
    async fn query_by_root_id(
        &self,
        root_id: &RootId,
        order: QueryOrder,
    ) -> Result<DocumentCursor, StoreError>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn persist(&self, document: EnvelopeDocument) -> Result<(), StoreError> {
        (**self).persist(document).await
    }

    async fn query_by_root_id(
        &self,
        root_id: &RootId,
        order: QueryOrder,
    ) -> Result<DocumentCursor, StoreError> {
        (**self).query_by_root_id(root_id, order).await
    }
}

/// One-shot, finite sequence of query results.
///
/// Dropping the cursor before it is exhausted has no effect on the store.
pub struct DocumentCursor {
    inner: Box<dyn Iterator<Item = EnvelopeDocument> + Send>,
}

impl DocumentCursor {
    pub fn new<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = EnvelopeDocument>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(documents.into_iter()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Iterator for DocumentCursor {
    type Item = EnvelopeDocument;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for DocumentCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor").finish_non_exhaustive()
    }
}
