//! Encoder: native value graph to wire tree.
//!
//! The [`Serializer`] walks a [`JsValue`] graph and produces a
//! [`SerializedValue`] tree. Shared and cyclic structure is preserved with
//! reference bookkeeping: the first encounter of a composite allocates the
//! next id and registers it *before* descending into children, so a child
//! that points back at an ancestor is emitted as a back-reference instead of
//! recursing forever.
//!
//! One serializer serves exactly one top-level call; identity bookkeeping
//! has no meaning across independent wire payloads.

use chrono::SecondsFormat;
use pwire_protocol::{
    RegexFlags, SerializedArgument, SerializedError, SerializedErrorPayload, SerializedObjectEntry,
    SerializedRegex, SerializedValue,
};
use serde_json::Number;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::handle::RemoteRef;
use crate::value::{JsError, JsValue};

/// Per-call encoding state: the visited-identity map, the id counter, and
/// the handles accumulated for the argument envelope.
#[derive(Default)]
pub struct Serializer {
    value_to_id: HashMap<usize, u32>,
    last_id: u32,
    handles: Vec<RemoteRef>,
}

impl Serializer {
    /// Creates a serializer with empty per-call state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes one value into its wire form.
    ///
    /// Total over [`JsValue`] except for regexes carrying a flag letter
    /// outside the wire vocabulary, which fail with
    /// [`Error::FlagTranslation`].
    pub fn serialize(&mut self, value: &JsValue) -> Result<SerializedValue> {
        match value {
            JsValue::Undefined => Ok(special("undefined")),
            JsValue::Null => Ok(special("null")),
            JsValue::Bool(b) => Ok(SerializedValue {
                b: Some(*b),
                ..Default::default()
            }),
            JsValue::Int(i) => Ok(SerializedValue {
                n: Some(Number::from(*i)),
                ..Default::default()
            }),
            JsValue::Float(f) => self.serialize_float(*f),
            JsValue::String(s) => Ok(SerializedValue {
                s: Some(s.clone()),
                ..Default::default()
            }),
            JsValue::Date(date) => Ok(SerializedValue {
                d: Some(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ..Default::default()
            }),
            JsValue::Url(url) => Ok(SerializedValue {
                u: Some(url.to_string()),
                ..Default::default()
            }),
            JsValue::BigInt(big) => Ok(SerializedValue {
                bi: Some(big.to_string()),
                ..Default::default()
            }),
            JsValue::Regex(regex) => {
                let flags =
                    RegexFlags::from_letters(&regex.flags).map_err(Error::FlagTranslation)?;
                Ok(SerializedValue {
                    r: Some(SerializedRegex {
                        p: regex.source.clone(),
                        f: flags.to_letters(),
                    }),
                    ..Default::default()
                })
            }
            JsValue::Error(error) => Ok(SerializedValue {
                e: Some(error_payload(error)),
                ..Default::default()
            }),
            JsValue::Array(array) => {
                if let Some(reference) = self.back_reference(array.identity()) {
                    return Ok(reference);
                }
                let id = self.register(array.identity());
                let mut elements = Vec::with_capacity(array.len());
                for element in array.values() {
                    elements.push(self.serialize(&element)?);
                }
                Ok(SerializedValue {
                    id: Some(id),
                    a: Some(elements),
                    ..Default::default()
                })
            }
            JsValue::Object(object) => {
                if let Some(reference) = self.back_reference(object.identity()) {
                    return Ok(reference);
                }
                let id = self.register(object.identity());
                let mut entries = Vec::with_capacity(object.len());
                for (key, entry_value) in object.entries() {
                    entries.push(SerializedObjectEntry {
                        k: key,
                        v: self.serialize(&entry_value)?,
                    });
                }
                Ok(SerializedValue {
                    id: Some(id),
                    o: Some(entries),
                    ..Default::default()
                })
            }
            JsValue::Map(map) => {
                if let Some(reference) = self.back_reference(map.identity()) {
                    return Ok(reference);
                }
                // Map entries do not cross the wire on this path.
                let id = self.register(map.identity());
                Ok(SerializedValue {
                    id: Some(id),
                    m: Some(Vec::new()),
                    ..Default::default()
                })
            }
            JsValue::Set(set) => {
                if let Some(reference) = self.back_reference(set.identity()) {
                    return Ok(reference);
                }
                let id = self.register(set.identity());
                Ok(SerializedValue {
                    id: Some(id),
                    se: Some(Vec::new()),
                    ..Default::default()
                })
            }
            JsValue::Handle(handle) => {
                let index = self.handles.len() as u32;
                self.handles.push(handle.clone());
                Ok(SerializedValue {
                    h: Some(index),
                    ..Default::default()
                })
            }
        }
    }

    /// Consumes the serializer and wraps an encoded value in the argument
    /// envelope, carrying the accumulated handles out-of-band.
    pub fn finish(self, value: SerializedValue) -> SerializedArgument {
        SerializedArgument {
            value,
            handles: self.handles.iter().map(RemoteRef::to_channel).collect(),
        }
    }

    fn serialize_float(&self, f: f64) -> Result<SerializedValue> {
        if f.is_nan() {
            return Ok(special("NaN"));
        }
        if f == f64::INFINITY {
            return Ok(special("Infinity"));
        }
        if f == f64::NEG_INFINITY {
            return Ok(special("-Infinity"));
        }
        // Sign-bit test: -0.0 == 0.0 numerically.
        if f == 0.0 && f.is_sign_negative() {
            return Ok(special("-0"));
        }
        let n = Number::from_f64(f)
            .ok_or_else(|| Error::UnsupportedValue(format!("non-finite number: {f}")))?;
        Ok(SerializedValue {
            n: Some(n),
            ..Default::default()
        })
    }

    fn back_reference(&self, identity: usize) -> Option<SerializedValue> {
        let id = *self.value_to_id.get(&identity)?;
        tracing::trace!(id, "emitting back-reference");
        Some(SerializedValue {
            reference: Some(id),
            ..Default::default()
        })
    }

    fn register(&mut self, identity: usize) -> u32 {
        self.last_id += 1;
        self.value_to_id.insert(identity, self.last_id);
        tracing::trace!(id = self.last_id, "assigned composite id");
        self.last_id
    }
}

/// Encodes a value with a fresh per-call serializer.
pub fn serialize(value: &JsValue) -> Result<SerializedValue> {
    Serializer::new().serialize(value)
}

/// Encodes a value into the argument envelope the driver expects,
/// carrying any remote handles it references out-of-band.
pub fn serialize_argument(value: &JsValue) -> Result<SerializedArgument> {
    let mut serializer = Serializer::new();
    let encoded = serializer.serialize(value)?;
    Ok(serializer.finish(encoded))
}

/// Encodes an exception description into the driver's error envelope.
pub fn serialize_error(error: &JsError) -> SerializedError {
    SerializedError {
        error: error_payload(error),
    }
}

/// Encodes a value straight to a generic JSON tree, as handed to the
/// transport.
pub fn serialize_to_json(value: &JsValue) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(serialize(value)?)?)
}

fn special(literal: &str) -> SerializedValue {
    SerializedValue {
        v: Some(literal.to_string()),
        ..Default::default()
    }
}

fn error_payload(error: &JsError) -> SerializedErrorPayload {
    SerializedErrorPayload {
        m: Some(error.message.clone()),
        n: Some(error.name.clone()),
        s: error.stack.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{JsArray, JsObject, JsRegex};
    use chrono::{TimeZone, Utc};

    #[test]
    fn scalars_use_their_tag_field() {
        assert_eq!(serialize(&JsValue::Bool(true)).unwrap().b, Some(true));
        assert_eq!(
            serialize(&JsValue::from("hi")).unwrap().s.as_deref(),
            Some("hi")
        );
        let five = serialize(&JsValue::Int(5)).unwrap();
        assert_eq!(five.n, Some(Number::from(5)));
    }

    #[test]
    fn sentinels_use_the_v_field() {
        assert_eq!(serialize(&JsValue::Undefined).unwrap().v.as_deref(), Some("undefined"));
        assert_eq!(serialize(&JsValue::Null).unwrap().v.as_deref(), Some("null"));
        assert_eq!(serialize(&JsValue::Float(f64::NAN)).unwrap().v.as_deref(), Some("NaN"));
        assert_eq!(
            serialize(&JsValue::Float(f64::INFINITY)).unwrap().v.as_deref(),
            Some("Infinity")
        );
        assert_eq!(
            serialize(&JsValue::Float(f64::NEG_INFINITY)).unwrap().v.as_deref(),
            Some("-Infinity")
        );
    }

    #[test]
    fn negative_zero_detected_by_sign_bit() {
        assert_eq!(serialize(&JsValue::Float(-0.0)).unwrap().v.as_deref(), Some("-0"));
        // Positive zero stays numeric.
        let zero = serialize(&JsValue::Float(0.0)).unwrap();
        assert!(zero.v.is_none());
        assert_eq!(zero.n.and_then(|n| n.as_f64()), Some(0.0));
    }

    #[test]
    fn date_has_millisecond_precision_and_z_suffix() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let encoded = serialize(&JsValue::Date(date)).unwrap();
        assert_eq!(encoded.d.as_deref(), Some("2024-03-09T14:30:05.000Z"));
    }

    #[test]
    fn ids_are_assigned_in_encounter_order() {
        let inner = JsArray::new();
        let outer = JsObject::new();
        outer.insert("first", JsValue::Array(inner.clone()));
        outer.insert("second", JsValue::Array(inner));

        let encoded = serialize(&JsValue::Object(outer)).unwrap();
        assert_eq!(encoded.id, Some(1));
        let entries = encoded.o.unwrap();
        assert_eq!(entries[0].v.id, Some(2));
        assert_eq!(entries[1].v.reference, Some(2));
    }

    #[test]
    fn self_referential_array_emits_one_id() {
        let array = JsArray::new();
        array.push(JsValue::Array(array.clone()));

        let encoded = serialize(&JsValue::Array(array)).unwrap();
        assert_eq!(encoded.id, Some(1));
        let elements = encoded.a.unwrap();
        assert_eq!(elements[0].reference, Some(1));
        assert!(elements[0].a.is_none());
    }

    #[test]
    fn handles_are_indexed_in_encounter_order() {
        let array = JsArray::from_values([
            JsValue::Handle(RemoteRef::new("element@aa")),
            JsValue::Handle(RemoteRef::new("element@bb")),
        ]);

        let argument = serialize_argument(&JsValue::Array(array)).unwrap();
        let elements = argument.value.a.unwrap();
        assert_eq!(elements[0].h, Some(0));
        assert_eq!(elements[1].h, Some(1));
        assert_eq!(argument.handles.len(), 2);
        assert_eq!(argument.handles[1].guid, "element@bb");
    }

    #[test]
    fn regex_flags_are_canonicalized() {
        let encoded = serialize(&JsValue::Regex(JsRegex::new("a+b", "ig"))).unwrap();
        let regex = encoded.r.unwrap();
        assert_eq!(regex.p, "a+b");
        assert_eq!(regex.f, "gi");
    }

    #[test]
    fn unsupported_regex_flag_fails_at_encode_time() {
        let err = serialize(&JsValue::Regex(JsRegex::new("a", "gx"))).unwrap_err();
        assert_eq!(err.offending_flag(), Some('x'));
    }

    #[test]
    fn error_envelope_carries_name_message_stack() {
        let error = JsError::new("RuntimeFailure", "boom").with_stack("at main\nat run");
        let envelope = serialize_error(&error);
        assert_eq!(envelope.error.m.as_deref(), Some("boom"));
        assert_eq!(envelope.error.n.as_deref(), Some("RuntimeFailure"));
        assert_eq!(envelope.error.s.as_deref(), Some("at main\nat run"));
    }
}
