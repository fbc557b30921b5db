//! tracer-core
//!
//! Trace-context propagation and correlation envelope.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（RootId, StageName, Trail, TraceEnvelope, EnvelopeDocument, errors）
//! - **typed**: 型付き payload API（Payload trait, PayloadCodec）
//! - **ports**: 抽象化レイヤー（EventStream, EventSource, DocumentStore, Clock, RootIdGenerator）
//! - **app**: アプリケーションロジック（Publisher, CorrelationReader, StoreRelay, PollPolicy）
//! - **impls**: 実装（InMemoryEventStream, InMemoryDocumentStore など開発用）

pub mod domain;
pub mod typed;
pub mod ports;
pub mod app;
pub mod impls;
