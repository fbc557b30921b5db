//! InMemoryEventStream - 開発用のイベントストリーム
//!
//! # 学習ポイント
//! - Mutex + Condvar による blocking receive
//! - Async での blocking 処理の扱い（spawn_blocking）
//! - destination ごとの複数キューの管理

use crate::ports::{Ack, EventSource, EventStream, StreamError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Channel {
    next_sequence: u64,
    messages: VecDeque<Vec<u8>>,
}

/// InMemoryEventStream は開発用のイベントストリーム
///
/// # 実装詳細
/// - HashMap<String, Channel> で destination ごとにキューを管理
/// - Mutex で排他制御
/// - Condvar で send 時の通知
///
/// 1 メッセージは 1 回だけ受信されます（consumer group は 1 つだけ）。
pub struct InMemoryEventStream {
    channels: Arc<Mutex<HashMap<String, Channel>>>,
    condvar: Arc<Condvar>,
}

impl InMemoryEventStream {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Messages waiting in `destination`.
    pub fn pending(&self, destination: &str) -> Result<usize, StreamError> {
        let channels = self
            .channels
            .lock()
            .map_err(|e| StreamError::OperationFailed(format!("lock poisoned: {e}")))?;
        Ok(channels.get(destination).map_or(0, |c| c.messages.len()))
    }
}

impl Default for InMemoryEventStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EventStream for InMemoryEventStream {
    async fn send(&self, destination: &str, body: Vec<u8>) -> Result<Ack, StreamError> {
        let channels = self.channels.clone();
        let condvar = self.condvar.clone();
        let destination = destination.to_string();

        tokio::task::spawn_blocking(move || {
            let mut channels = channels
                .lock()
                .map_err(|e| StreamError::OperationFailed(format!("lock poisoned: {e}")))?;
            let channel = channels.entry(destination.clone()).or_default();
            let sequence = channel.next_sequence;
            channel.next_sequence += 1;
            channel.messages.push_back(body);

            // 待機中の consumer を全員起こす（destination が違う可能性があるため）
            condvar.notify_all();
            Ok(Ack {
                destination,
                sequence,
            })
        })
        .await
        .map_err(|e| StreamError::OperationFailed(format!("send failed: {e}")))?
    }
}

#[async_trait::async_trait]
impl EventSource for InMemoryEventStream {
    async fn receive(
        &self,
        destination: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, StreamError> {
        let channels = self.channels.clone();
        let condvar = self.condvar.clone();
        let destination = destination.to_string();

        tokio::task::spawn_blocking(move || {
            let start = std::time::Instant::now();
            let mut guard = channels
                .lock()
                .map_err(|e| StreamError::OperationFailed(format!("lock poisoned: {e}")))?;
            loop {
                if let Some(channel) = guard.get_mut(&destination)
                    && let Some(body) = channel.messages.pop_front()
                {
                    return Ok(Some(body));
                }
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    return Ok(None);
                }
                let remaining = timeout.saturating_sub(elapsed);
                let (new_guard, _result) = condvar
                    .wait_timeout(guard, remaining)
                    .map_err(|e| StreamError::OperationFailed(format!("lock poisoned: {e}")))?;
                guard = new_guard;
            }
        })
        .await
        .map_err(|e| StreamError::OperationFailed(format!("receive failed: {e}")))?
    }
}
