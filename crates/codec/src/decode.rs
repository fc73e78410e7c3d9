//! Decoder: wire tree to native value graph.
//!
//! The [`Deserializer`] walks a [`SerializedValue`] tree and materializes a
//! [`JsValue`] graph. Composites are registered in the id table *before*
//! their children are decoded, so a back-reference to an ancestor resolves
//! to the still-under-construction value and shared/cyclic structure is
//! reconstructed with real aliasing, not copies.
//!
//! Decoding is all-or-nothing: any structural violation — a dangling
//! reference, an unknown sentinel literal, an unparsable payload — aborts
//! the call with one descriptive [`Error`] and partial results are
//! discarded.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use pwire_protocol::{RegexFlags, SerializedArgument, SerializedValue, WireTag};
use regex::RegexBuilder;
use serde_json::Number;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::handle::RemoteRef;
use crate::value::{JsArray, JsError, JsMap, JsObject, JsRegex, JsSet, JsValue};

/// Per-call decoding state: the id table plus the handle list supplied by
/// the enclosing argument envelope, if any.
#[derive(Default)]
pub struct Deserializer<'a> {
    id_to_value: HashMap<u32, JsValue>,
    handles: Option<&'a [RemoteRef]>,
}

impl<'a> Deserializer<'a> {
    /// Creates a deserializer for a bare value tree. Handle references are
    /// rejected because their descriptors live in the argument envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a deserializer that resolves `h` indices against the given
    /// handle list.
    pub fn with_handles(handles: &'a [RemoteRef]) -> Self {
        Self {
            id_to_value: HashMap::new(),
            handles: Some(handles),
        }
    }

    /// Decodes one wire value into a native value.
    pub fn deserialize(&mut self, value: &SerializedValue) -> Result<JsValue> {
        let tag = value
            .tag()
            .ok_or_else(|| Error::MalformedWireValue("no tag field is set".to_string()))?;

        match tag {
            WireTag::Ref(id) => self.id_to_value.get(&id).cloned().ok_or_else(|| {
                Error::MalformedWireValue(format!("reference to unassigned id {id}"))
            }),
            WireTag::Number(n) => decode_number(n),
            WireTag::Bool(b) => Ok(JsValue::Bool(b)),
            WireTag::Str(s) => Ok(JsValue::String(s.to_string())),
            WireTag::Special(literal) => decode_special(literal),
            WireTag::Date(instant) => DateTime::parse_from_rfc3339(instant)
                .map(|date| JsValue::Date(date.with_timezone(&Utc)))
                .map_err(|e| {
                    Error::MalformedWireValue(format!("invalid date '{instant}': {e}"))
                }),
            WireTag::Url(raw) => url::Url::parse(raw)
                .map(JsValue::Url)
                .map_err(|e| Error::MalformedWireValue(format!("invalid url '{raw}': {e}"))),
            WireTag::BigInt(digits) => digits
                .parse::<BigInt>()
                .map(JsValue::BigInt)
                .map_err(|e| {
                    Error::MalformedWireValue(format!("invalid bigint '{digits}': {e}"))
                }),
            WireTag::Regex(regex) => {
                let flags =
                    RegexFlags::from_letters(&regex.f).map_err(Error::FlagTranslation)?;
                // Validate the pattern compiles with the translated flags.
                RegexBuilder::new(&regex.p)
                    .case_insensitive(flags.ignore_case)
                    .multi_line(flags.multiline)
                    .dot_matches_new_line(flags.dot_all)
                    .build()
                    .map_err(|e| {
                        Error::MalformedWireValue(format!(
                            "invalid regex pattern '{}': {e}",
                            regex.p
                        ))
                    })?;
                Ok(JsValue::Regex(JsRegex::new(&regex.p, flags.to_letters())))
            }
            WireTag::Error(payload) => Ok(JsValue::Error(JsError {
                name: payload.n.clone().unwrap_or_else(|| "Error".to_string()),
                message: payload.m.clone().unwrap_or_default(),
                stack: payload.s.clone(),
            })),
            WireTag::Array(elements) => {
                let id = composite_id(value, "array")?;
                let array = JsArray::new();
                self.register(id, JsValue::Array(array.clone()));
                for element in elements {
                    array.push(self.deserialize(element)?);
                }
                Ok(JsValue::Array(array))
            }
            WireTag::Object(entries) => {
                let id = composite_id(value, "object")?;
                let object = JsObject::new();
                self.register(id, JsValue::Object(object.clone()));
                for entry in entries {
                    object.insert(entry.k.clone(), self.deserialize(&entry.v)?);
                }
                Ok(JsValue::Object(object))
            }
            WireTag::MapMarker => {
                // Entries are not carried over the wire; decode to an empty map.
                let id = composite_id(value, "map")?;
                let map = JsMap::new();
                self.register(id, JsValue::Map(map.clone()));
                Ok(JsValue::Map(map))
            }
            WireTag::SetMarker => {
                let id = composite_id(value, "set")?;
                let set = JsSet::new();
                self.register(id, JsValue::Set(set.clone()));
                Ok(JsValue::Set(set))
            }
            WireTag::HandleRef(index) => {
                let handles = self.handles.ok_or_else(|| {
                    Error::MalformedWireValue(
                        "handle reference outside an argument envelope".to_string(),
                    )
                })?;
                handles
                    .get(index as usize)
                    .cloned()
                    .map(JsValue::Handle)
                    .ok_or_else(|| {
                        Error::MalformedWireValue(format!("handle index {index} out of range"))
                    })
            }
        }
    }

    fn register(&mut self, id: u32, value: JsValue) {
        tracing::trace!(id, "registered composite");
        self.id_to_value.insert(id, value);
    }
}

/// Decodes a bare wire value with a fresh per-call deserializer.
pub fn deserialize(value: &SerializedValue) -> Result<JsValue> {
    Deserializer::new().deserialize(value)
}

/// Decodes an argument envelope, resolving handle indices against its
/// handle list.
pub fn deserialize_argument(argument: &SerializedArgument) -> Result<JsValue> {
    let handles: Vec<RemoteRef> = argument.handles.iter().map(RemoteRef::from).collect();
    Deserializer::with_handles(&handles).deserialize(&argument.value)
}

/// Decodes a generic JSON tree, as received from the transport.
pub fn deserialize_from_json(json: &serde_json::Value) -> Result<JsValue> {
    let value: SerializedValue = serde_json::from_value(json.clone())?;
    deserialize(&value)
}

/// The integer/double discrimination rule: a numeric value whose truncation
/// to `i64` reproduces the double exactly reconstructs as an integer,
/// anything else as a float. Deliberately lossy at the boundary — exact
/// large integers must travel as BigInt.
fn decode_number(n: &Number) -> Result<JsValue> {
    let d = n
        .as_f64()
        .ok_or_else(|| Error::MalformedWireValue(format!("unrepresentable number {n}")))?;
    if d == (d as i64) as f64 {
        Ok(JsValue::Int(d as i64))
    } else {
        Ok(JsValue::Float(d))
    }
}

fn decode_special(literal: &str) -> Result<JsValue> {
    match literal {
        "null" => Ok(JsValue::Null),
        "undefined" => Ok(JsValue::Undefined),
        "NaN" => Ok(JsValue::Float(f64::NAN)),
        "Infinity" => Ok(JsValue::Float(f64::INFINITY)),
        "-Infinity" => Ok(JsValue::Float(f64::NEG_INFINITY)),
        "-0" => Ok(JsValue::Float(-0.0)),
        other => Err(Error::MalformedWireValue(format!(
            "unexpected sentinel literal '{other}'"
        ))),
    }
}

fn composite_id(value: &SerializedValue, kind: &str) -> Result<u32> {
    value
        .id
        .ok_or_else(|| Error::MalformedWireValue(format!("{kind} composite is missing its id")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_json(json: serde_json::Value) -> Result<JsValue> {
        deserialize_from_json(&json)
    }

    #[test]
    fn whole_numbers_decode_as_integers() {
        assert_eq!(decode_json(json!({"n": 5})).unwrap(), JsValue::Int(5));
        assert_eq!(decode_json(json!({"n": 5.0})).unwrap(), JsValue::Int(5));
        assert_eq!(decode_json(json!({"n": -3.0})).unwrap(), JsValue::Int(-3));
    }

    #[test]
    fn fractional_numbers_decode_as_floats() {
        assert_eq!(decode_json(json!({"n": 5.5})).unwrap(), JsValue::Float(5.5));
        assert_eq!(
            decode_json(json!({"n": 1e300})).unwrap(),
            JsValue::Float(1e300)
        );
    }

    #[test]
    fn sentinel_literals() {
        assert!(decode_json(json!({"v": "null"})).unwrap().is_null());
        assert!(decode_json(json!({"v": "undefined"})).unwrap().is_undefined());
        assert!(
            decode_json(json!({"v": "NaN"}))
                .unwrap()
                .as_f64()
                .unwrap()
                .is_nan()
        );
        assert_eq!(
            decode_json(json!({"v": "Infinity"})).unwrap().as_f64(),
            Some(f64::INFINITY)
        );
        assert_eq!(
            decode_json(json!({"v": "-Infinity"})).unwrap().as_f64(),
            Some(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn negative_zero_keeps_its_sign_bit() {
        let zero = decode_json(json!({"v": "-0"})).unwrap().as_f64().unwrap();
        assert_eq!(zero, 0.0);
        assert!(zero.is_sign_negative());
    }

    #[test]
    fn unknown_sentinel_is_rejected() {
        let err = decode_json(json!({"v": "Epsilon"})).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("Epsilon"));
    }

    #[test]
    fn dangling_reference_is_rejected_by_id() {
        let err = decode_json(json!({"ref": 7})).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn empty_value_is_rejected() {
        assert!(decode_json(json!({})).unwrap_err().is_malformed());
    }

    #[test]
    fn composite_without_id_is_rejected() {
        let err = decode_json(json!({"a": []})).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("missing its id"));
    }

    #[test]
    fn bad_payloads_wrap_the_parse_failure() {
        assert!(decode_json(json!({"u": "not a url"})).unwrap_err().is_malformed());
        assert!(decode_json(json!({"d": "yesterday"})).unwrap_err().is_malformed());
        assert!(decode_json(json!({"bi": "12x"})).unwrap_err().is_malformed());
        assert!(
            decode_json(json!({"r": {"p": "(unclosed", "f": ""}}))
                .unwrap_err()
                .is_malformed()
        );
    }

    #[test]
    fn unknown_regex_flag_names_the_offender() {
        let err = decode_json(json!({"r": {"p": "a", "f": "gq"}})).unwrap_err();
        assert_eq!(err.offending_flag(), Some('q'));
    }

    #[test]
    fn map_and_set_markers_decode_empty() {
        let map = decode_json(json!({"id": 1, "m": []})).unwrap();
        match map {
            JsValue::Map(m) => assert!(m.is_empty()),
            other => panic!("expected map, got {other:?}"),
        }

        // Entries present on the wire are ignored, not decoded.
        let set = decode_json(json!({"id": 1, "se": [{"n": 1}, {"n": 2}]})).unwrap();
        match set {
            JsValue::Set(s) => assert!(s.is_empty()),
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn handle_outside_envelope_is_rejected() {
        let err = decode_json(json!({"h": 0})).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn handle_index_resolves_against_the_envelope() {
        let argument: SerializedArgument = serde_json::from_value(json!({
            "value": {"h": 0},
            "handles": [{"guid": "element@12"}],
        }))
        .unwrap();
        let handle = deserialize_argument(&argument).unwrap();
        assert_eq!(handle.as_handle().unwrap().guid(), "element@12");
    }

    #[test]
    fn handle_index_out_of_range_is_rejected() {
        let argument: SerializedArgument = serde_json::from_value(json!({
            "value": {"h": 3},
            "handles": [{"guid": "element@12"}],
        }))
        .unwrap();
        let err = deserialize_argument(&argument).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn error_payload_decodes_to_data() {
        let decoded = decode_json(json!({
            "e": {"m": "boom", "n": "RuntimeFailure", "s": "at main"}
        }))
        .unwrap();
        let error = decoded.as_error().unwrap();
        assert_eq!(error.message, "boom");
        assert_eq!(error.name, "RuntimeFailure");
        assert_eq!(error.stack.as_deref(), Some("at main"));
    }
}
