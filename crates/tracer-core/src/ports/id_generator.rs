//! IdGenerator port - RootId 採番の抽象化
//!
//! トレースの発生源（最初のステージ）で一度だけ呼ばれます。
//! テスト容易性のために trait として抽象化しています。

use crate::domain::RootId;
use crate::ports::Clock;
use ulid::Ulid;

/// RootIdGenerator は分散環境で衝突しない RootId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数の producer から使える）
pub trait RootIdGenerator: Send + Sync {
    fn generate_root_id(&self) -> RootId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// これにより、テスト時に FixedClock を使って timestamp 部分を固定できます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> RootIdGenerator for UlidGenerator<C> {
    fn generate_root_id(&self) -> RootId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        RootId::from_ulid(ulid)
    }
}
