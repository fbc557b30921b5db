//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **Publisher**: envelope をイベントストリームに送る（書き込み側）
//! - **CorrelationReader**: rootId でストアを引き、payload を復元する（読み込み側）
//! - **StoreRelay**: ストリームからストアへ envelope を書き写す consumer
//! - **PollPolicy**: 全ステージが揃うまでのポーリング間隔

pub mod publisher;
pub mod correlation;
pub mod relay;
pub mod poll;
pub mod status;

pub use self::publisher::Publisher;
pub use self::correlation::{CorrelationReader, DecodedCursor, RawCursor};
pub use self::relay::StoreRelay;
pub use self::poll::PollPolicy;
pub use self::status::RelayStats;
