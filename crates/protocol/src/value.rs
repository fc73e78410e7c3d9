//! The transport-neutral encoding of a JavaScript value.
//!
//! A [`SerializedValue`] is a struct of optional fields of which exactly one
//! is set, matching the driver's wire schema:
//!
//! | Field | Payload | Meaning |
//! |-------|---------|---------|
//! | `n`   | number  | integer or double |
//! | `b`   | bool    | boolean |
//! | `s`   | string  | string |
//! | `v`   | string  | one of `null`, `undefined`, `NaN`, `Infinity`, `-Infinity`, `-0` |
//! | `d`   | string  | ISO-8601 UTC instant |
//! | `u`   | string  | absolute URL |
//! | `bi`  | string  | arbitrary-precision integer, base-10 digits |
//! | `r`   | `{p, f}` | regex pattern source and flag letters |
//! | `e`   | `{m, n, s}` | error message, name, and stack text |
//! | `a`   | array   | ordered sequence (carries `id`) |
//! | `o`   | array of `{k, v}` | key/value entries (carries `id`) |
//! | `m`   | array   | Map marker; entries are not carried (carries `id`) |
//! | `se`  | array   | Set marker; entries are not carried (carries `id`) |
//! | `h`   | integer | index into the argument's handle list |
//! | `ref` | integer | back-reference to a previously assigned `id` |
//!
//! Composite values (`a`, `o`, `m`, `se`) carry a positive `id`, unique
//! within one tree and assigned in pre-order encounter order. A `ref` may
//! only point to an `id` assigned earlier in a depth-first left-to-right
//! walk of the same tree.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One JavaScript value in wire form. Exactly one tag field is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializedValue {
    /// Numeric value; integer/double discrimination happens at decode time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<Number>,

    /// Boolean value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<bool>,

    /// String value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,

    /// Singleton sentinel: `null`, `undefined`, `NaN`, `Infinity`,
    /// `-Infinity`, or `-0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,

    /// Date as an ISO-8601 UTC instant with millisecond precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// Absolute URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u: Option<String>,

    /// Arbitrary-precision integer as base-10 digits, sign included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bi: Option<String>,

    /// Regular expression literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<SerializedRegex>,

    /// Raised-exception description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<SerializedErrorPayload>,

    /// Array elements, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<Vec<SerializedValue>>,

    /// Object entries, insertion order preserved, keys unique.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub o: Option<Vec<SerializedObjectEntry>>,

    /// Map marker. The entries array is present for wire-shape compatibility
    /// but is never populated on this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<Vec<SerializedValue>>,

    /// Set marker. Same caveat as `m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub se: Option<Vec<SerializedValue>>,

    /// Remote handle: index into the enclosing argument's handle list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,

    /// Composite id, assigned in encounter order before descending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    /// Back-reference to an earlier composite id.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<u32>,
}

/// Regex payload: pattern source plus JS flag letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedRegex {
    /// Pattern source, as written between the slashes of a regex literal.
    pub p: String,
    /// Flag letters, e.g. `"gi"`. See [`crate::RegexFlags`].
    pub f: String,
}

/// Error payload: message, name, and formatted stack text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedErrorPayload {
    /// Human-readable error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<String>,
    /// Error kind identifier (e.g. `"TypeError"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// Stack trace as human-readable, newline-separated frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
}

/// One object entry: key plus encoded value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedObjectEntry {
    /// Entry key; plain string, never encoded recursively.
    pub k: String,
    /// Entry value.
    pub v: SerializedValue,
}

/// Argument envelope sent to the driver: the encoded value plus the remote
/// handles it references, carried out-of-band in encounter order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedArgument {
    /// The encoded value tree.
    pub value: SerializedValue,
    /// Handle channels referenced by `h` indices inside `value`.
    pub handles: Vec<HandleChannel>,
}

/// A remote object reference as it appears in an argument's handle list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleChannel {
    /// Unique identifier of the remote object.
    pub guid: String,
}

/// Raised-exception envelope used by driver responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedError {
    /// The error description.
    pub error: SerializedErrorPayload,
}

/// Borrowed single-tag view of a [`SerializedValue`].
///
/// Decoders match on this exhaustively so that new wire tags are
/// compile-time-visible gaps rather than silent no-ops. When more than one
/// field is set the view follows the driver's precedence (reference first,
/// then scalars, then composites).
#[derive(Debug)]
pub enum WireTag<'a> {
    /// Back-reference to an earlier composite id.
    Ref(u32),
    /// Numeric value.
    Number(&'a Number),
    /// Boolean value.
    Bool(bool),
    /// String value.
    Str(&'a str),
    /// Singleton sentinel literal.
    Special(&'a str),
    /// ISO-8601 instant string.
    Date(&'a str),
    /// Absolute URL string.
    Url(&'a str),
    /// Base-10 digit string.
    BigInt(&'a str),
    /// Regex payload.
    Regex(&'a SerializedRegex),
    /// Error payload.
    Error(&'a SerializedErrorPayload),
    /// Array elements.
    Array(&'a [SerializedValue]),
    /// Object entries.
    Object(&'a [SerializedObjectEntry]),
    /// Map marker (entries not carried).
    MapMarker,
    /// Set marker (entries not carried).
    SetMarker,
    /// Handle index into the argument's handle list.
    HandleRef(u32),
}

impl SerializedValue {
    /// Returns the single-tag view of this value, or `None` when no tag
    /// field is set (a malformed value).
    pub fn tag(&self) -> Option<WireTag<'_>> {
        if let Some(id) = self.reference {
            return Some(WireTag::Ref(id));
        }
        if let Some(n) = &self.n {
            return Some(WireTag::Number(n));
        }
        if let Some(b) = self.b {
            return Some(WireTag::Bool(b));
        }
        if let Some(s) = &self.s {
            return Some(WireTag::Str(s));
        }
        if let Some(u) = &self.u {
            return Some(WireTag::Url(u));
        }
        if let Some(bi) = &self.bi {
            return Some(WireTag::BigInt(bi));
        }
        if let Some(d) = &self.d {
            return Some(WireTag::Date(d));
        }
        if let Some(r) = &self.r {
            return Some(WireTag::Regex(r));
        }
        if let Some(e) = &self.e {
            return Some(WireTag::Error(e));
        }
        if let Some(v) = &self.v {
            return Some(WireTag::Special(v));
        }
        if let Some(a) = &self.a {
            return Some(WireTag::Array(a));
        }
        if let Some(o) = &self.o {
            return Some(WireTag::Object(o));
        }
        if self.m.is_some() {
            return Some(WireTag::MapMarker);
        }
        if self.se.is_some() {
            return Some(WireTag::SetMarker);
        }
        if let Some(h) = self.h {
            return Some(WireTag::HandleRef(h));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_fields_are_omitted() {
        let value = SerializedValue {
            s: Some("hello".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({"s": "hello"}));
    }

    #[test]
    fn ref_field_renames() {
        let value = SerializedValue {
            reference: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({"ref": 3}));

        let parsed: SerializedValue = serde_json::from_value(json!({"ref": 3})).unwrap();
        assert_eq!(parsed.reference, Some(3));
    }

    #[test]
    fn object_entries_round_trip() {
        let json = json!({
            "id": 1,
            "o": [
                {"k": "a", "v": {"n": 1}},
                {"k": "b", "v": {"b": true}},
            ],
        });
        let value: SerializedValue = serde_json::from_value(json.clone()).unwrap();
        let entries = value.o.as_ref().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].k, "a");
        assert_eq!(value.id, Some(1));
        assert_eq!(serde_json::to_value(&value).unwrap(), json);
    }

    #[test]
    fn tag_view_prefers_reference() {
        let value = SerializedValue {
            reference: Some(2),
            n: Some(5.into()),
            ..Default::default()
        };
        assert!(matches!(value.tag(), Some(WireTag::Ref(2))));
    }

    #[test]
    fn empty_value_has_no_tag() {
        assert!(SerializedValue::default().tag().is_none());
    }

    #[test]
    fn argument_envelope_shape() {
        let arg = SerializedArgument {
            value: SerializedValue {
                h: Some(0),
                ..Default::default()
            },
            handles: vec![HandleChannel {
                guid: "handle@f8a3".to_string(),
            }],
        };
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(
            json,
            json!({"value": {"h": 0}, "handles": [{"guid": "handle@f8a3"}]})
        );
    }
}
