//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryEventStream**: 開発用のイベントストリーム（EventStream + EventSource）
//! - **InMemoryDocumentStore**: 開発用のドキュメントストア
//!
//! 本番用の transport / store クライアントは別クレートに置く想定です。

pub mod inmem_stream;
pub mod inmem_store;

pub use self::inmem_stream::InMemoryEventStream;
pub use self::inmem_store::InMemoryDocumentStore;
