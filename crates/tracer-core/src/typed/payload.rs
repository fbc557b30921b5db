//! Payload trait - envelope に載せられる型の条件
//!
//! # Trait Bounds
//! - `Serialize`: encodedPayload を作るため
//! - `DeserializeOwned`: store から読み戻すため（'static に対応）
//! - `Send + Sync + 'static`: 非同期タスクを跨いで運ぶため
//!
//! 全ての型に blanket impl があるので、利用側で impl を書く必要はありません。

use serde::Serialize;
use serde::de::DeserializeOwned;

pub trait Payload: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde::ser::{Error as _, SerializeStruct};
    use serde::{Deserialize, Serialize, Serializer};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct KeyValue {
        pub key: String,
        pub value: String,
    }

    impl KeyValue {
        pub fn new(key: &str, value: &str) -> Self {
            Self {
                key: key.to_string(),
                value: value.to_string(),
            }
        }
    }

    /// `poisoned` が立っていると serialize に失敗する payload
    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    pub struct Flaky {
        pub value: String,
        #[serde(skip)]
        pub poisoned: bool,
    }

    impl Flaky {
        pub fn healthy(value: &str) -> Self {
            Self {
                value: value.to_string(),
                poisoned: false,
            }
        }

        pub fn poisoned(value: &str) -> Self {
            Self {
                value: value.to_string(),
                poisoned: true,
            }
        }
    }

    impl Serialize for Flaky {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.poisoned {
                return Err(S::Error::custom("poisoned payload"));
            }
            let mut state = serializer.serialize_struct("Flaky", 1)?;
            state.serialize_field("value", &self.value)?;
            state.end()
        }
    }
}
