//! Domain identifiers.
//!
//! `RootId` は 1 つの論理トレース（リクエスト / ワークフロー）を束ねる相関キーです。
//! 発生源で一度だけ採番され、以後は変更されません。
//!
//! ## ワイヤ表現
//! 他言語の実装と相互運用するため、ただの文字列として serialize します。
//! 採番には ULID を使いますが（`UlidGenerator`）、外部から渡された任意の文字列
//! （GUID など）もそのまま受け入れます。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Correlation key shared by every envelope of one trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootId(String);

impl RootId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// ULID から RootId を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RootId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RootId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_id_serializes_as_plain_string() {
        let id = RootId::new("r1");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"r1\"");

        let back: RootId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn foreign_identifiers_are_accepted_verbatim() {
        // GUID 形式など、ULID 以外もそのまま保持する
        let guid = "6f1c2d3e-0a4b-4c5d-8e9f-0123456789ab";
        let id: RootId = guid.into();
        assert_eq!(id.as_str(), guid);
        assert_eq!(id.to_string(), guid);
    }

    #[test]
    fn ulid_root_ids_are_sortable() {
        let id1 = RootId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RootId::from_ulid(Ulid::new());

        assert!(id1 < id2);
    }
}
