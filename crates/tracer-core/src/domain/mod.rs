//! Domain model (IDs, stages, envelopes, errors).

pub mod ids;
pub mod stage;
pub mod envelope;
pub mod errors;

pub use self::ids::RootId;
pub use self::stage::{StageName, Trail};
pub use self::envelope::{EnvelopeDocument, TraceEnvelope};
pub use self::errors::{
    DecodeFailure, EnvelopeError, ErrorKind, PublishError, StoreQueryError,
};
