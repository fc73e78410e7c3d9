//! Structural value codec for the pwire driver protocol.
//!
//! This crate converts native value graphs — including cyclic and
//! shared-reference structure, special numeric values, dates, regular
//! expressions, arbitrary-precision integers, and remote-object handles —
//! into the driver's canonical wire representation and back, with full
//! fidelity and no unbounded recursion.
//!
//! # Architecture
//!
//! ```text
//! caller ──► Serializer ──► SerializedValue ──► (transport)
//!                                                    │
//! caller ◄── Deserializer ◄── SerializedValue ◄──────┘
//! ```
//!
//! The encoder and decoder share only the wire shapes from
//! `pwire-protocol`; the decoder has no dependency on encoder state. Both
//! are synchronous pure tree transforms: each top-level call gets its own
//! identity table, so independent calls are freely parallelizable.
//!
//! # Reference bookkeeping
//!
//! Composites (arrays, objects, maps, sets) are the only values that can
//! participate in sharing or cycles. The encoder keys a visited map on
//! allocation identity and assigns ids in pre-order encounter order,
//! registering each composite *before* descending; repeat encounters emit a
//! back-reference. The decoder mirrors this: it registers an empty
//! composite under its id before decoding children, so a cycle resolves to
//! the still-under-construction value.

pub mod decode;
pub mod encode;
pub mod error;
pub mod handle;
pub mod value;

pub use decode::{Deserializer, deserialize, deserialize_argument, deserialize_from_json};
pub use encode::{
    Serializer, serialize, serialize_argument, serialize_error, serialize_to_json,
};
pub use error::{Error, Result};
pub use handle::{RemoteObject, RemoteRef};
pub use value::{JsArray, JsError, JsMap, JsObject, JsRegex, JsSet, JsValue};
