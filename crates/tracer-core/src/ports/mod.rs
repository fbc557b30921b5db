//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（メッセージバス、ドキュメントストアなど）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - 生産者と store の書き手は独立したプロセス。共有するのは rootId だけ
//! - タイムアウトやリトライは各実装の責務（コアは結果を返すだけ）

pub mod event_stream;
pub mod document_store;
pub mod clock;
pub mod id_generator;

pub use self::event_stream::{Ack, EventSource, EventStream, StreamError};
pub use self::document_store::{DocumentCursor, DocumentStore, QueryOrder, StoreError};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{RootIdGenerator, UlidGenerator};
