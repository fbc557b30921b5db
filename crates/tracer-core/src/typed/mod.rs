//! Typed - 型付き payload API
//!
//! envelope に載せる payload の型制約（`Payload`）と、
//! payload ⇔ encodedPayload の変換（`PayloadCodec`）を提供します。

pub mod payload;
pub mod codec;

pub use self::payload::Payload;
pub use self::codec::PayloadCodec;
