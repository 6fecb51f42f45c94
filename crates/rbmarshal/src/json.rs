//! JSON projection of a decoded Marshal document.
//!
//! One-way: Marshal in, JSON out. Re-serializing to Marshal is out of
//! scope for this crate.
//!
//! # Marshal to JSON mapping
//!
//! | Marshal              | JSON                                     |
//! |----------------------|------------------------------------------|
//! | `nil`                | null                                     |
//! | bool                 | true/false                               |
//! | integer              | number                                   |
//! | float                | number (non-finite floats are an error)  |
//! | string (UTF-8)       | string                                   |
//! | string (binary)      | string with `b64:` prefix                |
//! | array                | array                                    |
//! | hash                 | object, stringified keys, last-dup-wins  |
//!
//! Shared substructure (`@` references) is expanded at every occurrence; a
//! reference cycle is reported as an error instead of looping.

use base64::Engine;
use serde_json::Value as JsonValue;

use crate::document::{Document, NodeId};
use crate::error::{Error, Result};
use crate::tag::Kind;

/// Render a decoded document as a JSON string.
///
/// Walks the whole value, so the shared tables end up fully populated as a
/// side effect.
///
/// # Example
///
/// ```
/// use rbmarshal::{Document, to_json};
///
/// // Marshal.dump({:a => 42})
/// let data = [0x04, 0x08, 0x7B, 0x06, 0x3A, 0x06, b'a', 0x69, 0x2F];
/// let mut doc = Document::from_slice(&data).unwrap();
/// assert_eq!(to_json(&mut doc).unwrap(), r#"{"a":42}"#);
/// ```
///
/// # Errors
///
/// Returns `Error::NonFiniteFloat` for NaN or Infinity values,
/// `Error::RecursiveObject` if the object graph contains a `@` cycle, and
/// any decode error the walk encounters.
pub fn to_json(doc: &mut Document<'_>) -> Result<String> {
    let root = doc.root();
    let value = node_to_json(doc, root, &mut Vec::new())?;
    serde_json::to_string(&value).map_err(|e| Error::JsonSerialize(e.to_string()))
}

fn node_to_json(doc: &mut Document<'_>, id: NodeId, path: &mut Vec<NodeId>) -> Result<JsonValue> {
    let id = doc.resolve(id)?;
    match doc.kind(id) {
        Kind::Nil => Ok(JsonValue::Null),

        Kind::Bool => Ok(JsonValue::Bool(doc.as_bool(id)?)),

        Kind::Integer => Ok(JsonValue::Number(doc.as_integer(id)?.into())),

        Kind::Float => {
            let f = doc.as_float(id)?;
            serde_json::Number::from_f64(f)
                .map(JsonValue::Number)
                .ok_or(Error::NonFiniteFloat(f))
        }

        Kind::String => match doc.as_string(id) {
            Ok(s) => Ok(JsonValue::String(s.to_owned())),
            Err(Error::InvalidUtf8) => {
                let bytes = doc.as_string_bytes(id)?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Ok(JsonValue::String(format!("b64:{encoded}")))
            }
            Err(e) => Err(e),
        },

        Kind::Array => {
            if path.contains(&id) {
                return Err(Error::RecursiveObject);
            }
            path.push(id);
            let mut items = Vec::new();
            for child in doc.as_array(id)? {
                items.push(node_to_json(doc, child, path)?);
            }
            path.pop();
            Ok(JsonValue::Array(items))
        }

        Kind::Map => {
            if path.contains(&id) {
                return Err(Error::RecursiveObject);
            }
            path.push(id);
            let mut object = serde_json::Map::new();
            for (key, value) in doc.as_map_entries(id)? {
                let key = doc.stringify(key);
                object.insert(key, node_to_json(doc, value, path)?);
            }
            path.pop();
            Ok(JsonValue::Object(object))
        }

        Kind::Unknown => match doc.tag_byte(id) {
            Some(tag) => Err(Error::UnsupportedTag(tag)),
            None => Err(Error::Incomplete),
        },
    }
}
