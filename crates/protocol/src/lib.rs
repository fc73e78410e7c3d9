//! Wire types for the pwire driver protocol.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! automation driver over JSON-RPC. The central type is [`SerializedValue`],
//! the transport-neutral encoding of a JavaScript value, together with the
//! envelopes that carry it ([`SerializedArgument`], [`SerializedError`]) and
//! the fixed mapping tables for enumerated option values.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization and
//!   cheap structural views
//! - **1:1 with protocol**: Match the driver's wire schema field for field
//! - **Stable**: Changes only when the wire protocol changes
//!
//! The structural codec that produces and consumes these shapes lives in
//! `pwire-codec`.

pub mod options;
pub mod regex_flags;
pub mod value;

pub use options::*;
pub use regex_flags::RegexFlags;
pub use value::*;
