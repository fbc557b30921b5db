//! PayloadCodec - payload と encodedPayload の相互変換
//!
//! # エンコードフロー
//! 1. serde_json で payload を JSON テキストに serialize
//! 2. テキストの UTF-8 bytes を base64 (standard, padding あり) に変換
//!
//! デコードはその逆順です。改行や空白で折り返された base64 も受け付けます。
//! 失敗段階ごとにエラーが分かれます：
//! - base64 / UTF-8 が不正 → `EnvelopeError::Decoding`
//! - JSON が P の形に合わない → `EnvelopeError::Deserialization`

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::errors::{DecodeFailure, EnvelopeError};

pub struct PayloadCodec;

impl PayloadCodec {
    pub fn encode<P: Serialize + ?Sized>(payload: &P) -> Result<String, EnvelopeError> {
        let text = serde_json::to_string(payload).map_err(EnvelopeError::Encoding)?;
        Ok(STANDARD.encode(text.as_bytes()))
    }

    pub fn decode<P: DeserializeOwned>(encoded: &str) -> Result<P, EnvelopeError> {
        let text = Self::decode_text(encoded)?;
        serde_json::from_str(&text).map_err(|source| EnvelopeError::Deserialization {
            target: std::any::type_name::<P>(),
            source,
        })
    }

    /// Decodes only the transport layer, yielding the canonical JSON text.
    pub fn decode_text(encoded: &str) -> Result<String, EnvelopeError> {
        let compact = strip_ascii_whitespace(encoded);
        let bytes = STANDARD.decode(compact.as_bytes()).map_err(DecodeFailure::from)?;
        let text = String::from_utf8(bytes).map_err(DecodeFailure::from)?;
        Ok(text)
    }
}

fn strip_ascii_whitespace(encoded: &str) -> Cow<'_, str> {
    if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(encoded)
    }
}
