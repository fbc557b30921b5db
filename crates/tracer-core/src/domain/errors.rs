//! Errors - エラー型と分類
//!
//! 呼び出し側がリトライ方針を決められるよう、各エラーは `ErrorKind` を返します。
//! コア内部ではリトライしません。

use thiserror::Error;

use super::ids::RootId;
use crate::ports::{StoreError, StreamError};

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（リトライ推奨）
/// - Permanent: 恒久的なエラー（リトライ無意味）
/// - Infrastructure: インフラエラー（transport / store の障害）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// Failures of the payload codec (serialize + base64).
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("payload is not serializable")]
    Encoding(#[source] serde_json::Error),

    #[error("encoded payload cannot be decoded")]
    Decoding(#[from] DecodeFailure),

    #[error("decoded payload does not fit {target}")]
    Deserialization {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Why the encoded string could not be turned back into text.
#[derive(Debug, Error)]
pub enum DecodeFailure {
    #[error("invalid base64")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl EnvelopeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Permanent
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("envelope could not be prepared for transport")]
    Envelope(#[from] EnvelopeError),

    #[error("transport failed to deliver to {destination}")]
    Transport {
        destination: String,
        #[source]
        source: StreamError,
    },
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Envelope(e) => e.kind(),
            PublishError::Transport {
                source: StreamError::Unavailable(_),
                ..
            } => ErrorKind::Transient,
            PublishError::Transport { .. } => ErrorKind::Infrastructure,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreQueryError {
    #[error("store query for rootId={root_id} failed")]
    Query {
        root_id: RootId,
        #[source]
        source: StoreError,
    },
}

impl StoreQueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreQueryError::Query {
                source: StoreError::Unavailable(_),
                ..
            } => ErrorKind::Transient,
            StoreQueryError::Query { .. } => ErrorKind::Infrastructure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_classified_by_cause() {
        let transient = PublishError::Transport {
            destination: "tracehub".to_string(),
            source: StreamError::Unavailable("throttled".to_string()),
        };
        assert_eq!(transient.kind(), ErrorKind::Transient);

        let broken = PublishError::Transport {
            destination: "tracehub".to_string(),
            source: StreamError::OperationFailed("connection reset".to_string()),
        };
        assert_eq!(broken.kind(), ErrorKind::Infrastructure);
        assert!(broken.to_string().contains("tracehub"));
    }

    #[test]
    fn cause_is_reported_once_through_the_source_chain() {
        let err = PublishError::Transport {
            destination: "tracehub".to_string(),
            source: StreamError::OperationFailed("connection reset".to_string()),
        };

        assert_eq!(err.to_string(), "transport failed to deliver to tracehub");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "stream operation failed: connection reset");

        let decoding = EnvelopeError::from(DecodeFailure::from(
            String::from_utf8(vec![0xff]).unwrap_err(),
        ));
        assert_eq!(decoding.to_string(), "encoded payload cannot be decoded");
        let chain: Vec<String> = std::iter::successors(
            std::error::Error::source(&decoding),
            |e| e.source(),
        )
        .map(|e| e.to_string())
        .collect();
        assert_eq!(chain[0], "invalid utf-8");
    }

    #[test]
    fn query_error_names_the_root_id() {
        let err = StoreQueryError::Query {
            root_id: RootId::new("r1"),
            source: StoreError::OperationFailed("bad predicate".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert!(err.to_string().contains("rootId=r1"));
    }
}
