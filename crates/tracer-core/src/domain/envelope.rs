//! TraceEnvelope - 相関メタデータ付きの payload コンテナ
//!
//! # 不変条件
//! `encoded_payload == PayloadCodec::encode(&payload)` が常に成り立つ。
//!
//! - フィールドは private、payload への `&mut` は公開しない
//! - payload の差し替えは `set_payload` のみ（encode に成功してから両方を入れ替える）
//!
//! # ワイヤ表現
//! transport / store に出るのは `EnvelopeDocument` だけです：
//!
//! ```json
//! {"rootId":"r1","trail":["RequestHandler"],"stageName":"RequestHandler","encodedPayload":"eyJ..."}
//! ```
//!
//! payload 本体はワイヤに載らず、読み手は `encodedPayload` から復元します。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::EnvelopeError;
use super::ids::RootId;
use super::stage::{StageName, Trail};
use crate::typed::PayloadCodec;

/// Persisted / transmitted form of an envelope.
///
/// Documents come from outside (a transport message, a store row), so nothing
/// about `encoded_payload` is trusted until it is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocument {
    pub root_id: RootId,
    pub trail: Trail,
    pub stage_name: StageName,
    pub encoded_payload: String,
}

impl EnvelopeDocument {
    pub fn from_transport_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(bytes).map_err(|source| EnvelopeError::Deserialization {
            target: std::any::type_name::<Self>(),
            source,
        })
    }

    pub fn to_transport_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(EnvelopeError::Encoding)
    }

    pub fn decode_payload<P: DeserializeOwned>(&self) -> Result<P, EnvelopeError> {
        PayloadCodec::decode(&self.encoded_payload)
    }

    /// Rebuilds a typed envelope. The encoding is derived again from the
    /// decoded payload, so the result satisfies the invariant even if the
    /// writer used a different JSON layout.
    pub fn into_envelope<P>(self) -> Result<TraceEnvelope<P>, EnvelopeError>
    where
        P: Serialize + DeserializeOwned,
    {
        let payload = self.decode_payload::<P>()?;
        TraceEnvelope::new(self.root_id, self.trail, self.stage_name, payload)
    }
}

impl From<EnvelopeDocument> for serde_json::Value {
    fn from(document: EnvelopeDocument) -> Self {
        let trail = document
            .trail
            .stages()
            .iter()
            .map(|stage| serde_json::Value::String(stage.as_str().to_string()))
            .collect();

        let mut map = serde_json::Map::new();
        map.insert("rootId".to_string(), document.root_id.as_str().into());
        map.insert("trail".to_string(), serde_json::Value::Array(trail));
        map.insert("stageName".to_string(), document.stage_name.as_str().into());
        map.insert(
            "encodedPayload".to_string(),
            serde_json::Value::String(document.encoded_payload),
        );
        serde_json::Value::Object(map)
    }
}

/// Root id + trail + stage name + typed payload, with its encoding kept in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEnvelope<P> {
    root_id: RootId,
    trail: Trail,
    stage_name: StageName,
    payload: P,
    encoded_payload: String,
}

impl<P: Serialize> TraceEnvelope<P> {
    /// Fails only if `payload` cannot be serialized.
    pub fn new(
        root_id: RootId,
        trail: Trail,
        stage_name: StageName,
        payload: P,
    ) -> Result<Self, EnvelopeError> {
        let encoded_payload = PayloadCodec::encode(&payload)?;
        Ok(Self {
            root_id,
            trail,
            stage_name,
            payload,
            encoded_payload,
        })
    }

    /// Envelope at the origin of a trace: the trail holds only `stage`.
    pub fn originate(
        root_id: RootId,
        stage: StageName,
        payload: P,
    ) -> Result<Self, EnvelopeError> {
        Self::new(root_id, Trail::starting_at(stage.clone()), stage, payload)
    }

    /// payload を差し替える
    ///
    /// encode に失敗した場合は `self` を一切変更せずにエラーを返します。
    pub fn set_payload(&mut self, payload: P) -> Result<(), EnvelopeError> {
        let encoded_payload = PayloadCodec::encode(&payload)?;
        self.payload = payload;
        self.encoded_payload = encoded_payload;
        Ok(())
    }

    /// Derives the envelope of a downstream stage: same root, trail extended
    /// by `stage`.
    pub fn next_stage<Q: Serialize>(
        &self,
        stage: StageName,
        payload: Q,
    ) -> Result<TraceEnvelope<Q>, EnvelopeError> {
        TraceEnvelope::new(
            self.root_id.clone(),
            self.trail.appended(stage.clone()),
            stage,
            payload,
        )
    }
}

impl<P> TraceEnvelope<P> {
    pub fn root_id(&self) -> &RootId {
        &self.root_id
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn stage_name(&self) -> &StageName {
        &self.stage_name
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    pub fn to_document(&self) -> EnvelopeDocument {
        EnvelopeDocument {
            root_id: self.root_id.clone(),
            trail: self.trail.clone(),
            stage_name: self.stage_name.clone(),
            encoded_payload: self.encoded_payload.clone(),
        }
    }

    pub fn to_transport_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        self.to_document().to_transport_bytes()
    }
}

impl<P> TryFrom<EnvelopeDocument> for TraceEnvelope<P>
where
    P: Serialize + DeserializeOwned,
{
    type Error = EnvelopeError;

    fn try_from(document: EnvelopeDocument) -> Result<Self, Self::Error> {
        document.into_envelope()
    }
}
