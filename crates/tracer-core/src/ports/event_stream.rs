//! EventStream port - transport（メッセージバス）の抽象化
//!
//! コアが依存するのは「宛先 + 不透明な bytes を送る → ack または失敗」という契約だけです。
//! 接続文字列やエンティティ設定などは実装側の関心事です。
//!
//! # 実装
//! - InMemoryEventStream（開発用・テスト用）

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Acknowledgement returned by the transport for one accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub destination: String,
    /// Position assigned by the transport within `destination`.
    pub sequence: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream unavailable: {0}")]
    Unavailable(String),

    #[error("stream operation failed: {0}")]
    OperationFailed(String),
}

/// Producer side. One call is one delivery attempt; retries belong to the implementation.
#[async_trait]
pub trait EventStream: Send + Sync {
    async fn send(&self, destination: &str, body: Vec<u8>) -> Result<Ack, StreamError>;
}

/// Consumer side, used by the store relay.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Waits up to `timeout` for the next message; `None` when nothing arrived.
    async fn receive(
        &self,
        destination: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, StreamError>;
}

#[async_trait]
impl<T: EventStream + ?Sized> EventStream for Arc<T> {
    async fn send(&self, destination: &str, body: Vec<u8>) -> Result<Ack, StreamError> {
        (**self).send(destination, body).await
    }
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for Arc<T> {
    async fn receive(
        &self,
        destination: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, StreamError> {
        (**self).receive(destination, timeout).await
    }
}
