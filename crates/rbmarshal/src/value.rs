//! Lazy value access over a decoded Marshal buffer.
//!
//! Every accessor takes a [`NodeId`] handle and reads the value directly
//! from the underlying bytes on demand, without copying payloads. Container
//! accessors walk their body once, carve out child nodes, and memoize both
//! the children and the container's total byte size; a sibling can then be
//! skipped in O(1) via [`Document::node_size`].
//!
//! Walking has side effects on the shared tables: `:` symbol definitions
//! (including the ones inside string encoding annotations) are interned in
//! stream order, and registrable values (strings, arrays, maps) are
//! appended to the object table in depth-first pre-order. `;` and `@`
//! back-references resolve against those tables, which is how the format
//! expresses interning, sharing, and cycles.

use std::collections::HashMap;
use std::ops::Range;

use crate::document::{Document, NodeId};
use crate::error::{Error, Result};
use crate::tag::{self, Kind};
use crate::varint;

/// Arena record for one encoded value.
#[derive(Debug)]
pub(crate) struct Node {
    /// Offset of the tag byte within the document payload.
    pub(crate) start: usize,
    /// Cached byte length; 0 until measured. Containers fill this in on
    /// their first full walk and it never changes afterwards.
    pub(crate) size: usize,
    /// Memoized children: array elements, or alternating key/value ids.
    pub(crate) children: Option<Vec<NodeId>>,
}

impl Node {
    pub(crate) fn unsized_at(start: usize) -> Self {
        Node {
            start,
            size: 0,
            children: None,
        }
    }

    pub(crate) fn with_size(start: usize, size: usize) -> Self {
        Node {
            start,
            size,
            children: None,
        }
    }
}

/// Length-prefixed byte run: a varint length followed by that many payload
/// bytes. Returns the absolute payload range and the bytes consumed after
/// the tag.
fn byte_run(data: &[u8], at: usize) -> Result<(Range<usize>, usize)> {
    let rest = data.get(at..).ok_or(Error::Incomplete)?;
    let (len, prefix) = varint::decode(rest)?;
    let len = usize::try_from(len).map_err(|_| Error::Incomplete)?;
    let payload = at + prefix;
    let end = payload.checked_add(len).ok_or(Error::Incomplete)?;
    if end > data.len() {
        return Err(Error::Incomplete);
    }
    Ok((payload..end, prefix + len))
}

fn varint_len_at(data: &[u8], at: usize) -> Result<usize> {
    varint::decoded_len(data.get(at..).ok_or(Error::Incomplete)?)
}

impl<'a> Document<'a> {
    /// Get a node's kind. Stable across calls and infallible: `@`
    /// references report their target's kind, and anything unresolvable or
    /// outside the supported alphabet is `Kind::Unknown`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Kind {
        match self.resolve(id) {
            Ok(target) => {
                let start = self.node(target).start;
                Kind::detect(self.data.get(start..).unwrap_or(&[]))
            }
            Err(_) => Kind::Unknown,
        }
    }

    fn expect_kind(&self, id: NodeId, expected: Kind) -> Result<()> {
        let found = self.kind(id);
        if found == expected {
            Ok(())
        } else {
            Err(Error::UnexpectedKind {
                expected: expected.name(),
                found: found.name(),
            })
        }
    }

    /// Read a boolean value.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedKind` if the node is not a bool, or
    /// `Error::Incomplete` if it is an unresolvable reference.
    pub fn as_bool(&self, id: NodeId) -> Result<bool> {
        let id = self.resolve(id)?;
        self.expect_kind(id, Kind::Bool)?;
        Ok(self.data[self.node(id).start] == tag::TRUE)
    }

    /// Read an integer value.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedKind` on a non-integer node and
    /// `Error::Incomplete` on a truncated varint body.
    pub fn as_integer(&self, id: NodeId) -> Result<i64> {
        let id = self.resolve(id)?;
        self.expect_kind(id, Kind::Integer)?;
        let start = self.node(id).start;
        let (value, _) = varint::decode(&self.data[start + 1..])?;
        Ok(value)
    }

    /// Read a float value. The wire carries a decimal literal; Ruby also
    /// writes `inf`, `-inf`, and `nan`, all of which `f64` parsing accepts.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedKind` on a non-float node,
    /// `Error::Incomplete` on truncation, and `Error::InvalidFloat` if the
    /// literal does not parse.
    pub fn as_float(&self, id: NodeId) -> Result<f64> {
        let id = self.resolve(id)?;
        self.expect_kind(id, Kind::Float)?;
        let start = self.node(id).start;
        let (span, _) = byte_run(self.data, start + 1)?;
        let text = std::str::from_utf8(&self.data[span]).map_err(|_| Error::InvalidUtf8)?;
        text.parse()
            .map_err(|_| Error::InvalidFloat(text.to_owned()))
    }

    /// Read a string value as UTF-8.
    ///
    /// All three physical string forms are handled: `:` symbol definitions
    /// (interned as a side effect), `;` symbol back-references, and `I"`
    /// encoding-annotated strings (whose annotation block is consumed
    /// byte-exact, interning any symbol definitions it carries).
    ///
    /// # Errors
    ///
    /// `Error::UnexpectedKind` on a non-string node, `Error::Incomplete`
    /// on truncation or an out-of-range `;`/`@` index, and
    /// `Error::InvalidUtf8` if the payload is not UTF-8 (use
    /// [`Document::as_string_bytes`] for the raw bytes).
    pub fn as_string(&mut self, id: NodeId) -> Result<&'a str> {
        std::str::from_utf8(self.as_string_bytes(id)?).map_err(|_| Error::InvalidUtf8)
    }

    /// Read a string value's raw payload bytes without UTF-8 validation.
    ///
    /// # Errors
    ///
    /// Same as [`Document::as_string`], minus `Error::InvalidUtf8`.
    pub fn as_string_bytes(&mut self, id: NodeId) -> Result<&'a [u8]> {
        let id = self.resolve(id)?;
        self.expect_kind(id, Kind::String)?;
        self.register_object(id);
        self.measure(id)?;
        let data = self.data;
        let start = self.node(id).start;
        match data[start] {
            tag::SYMBOL => {
                let (span, _) = byte_run(data, start + 1)?;
                Ok(&data[span])
            }
            tag::SYMBOL_REF => {
                let (index, _) = varint::decode(&data[start + 1..])?;
                let index = usize::try_from(index).map_err(|_| Error::Incomplete)?;
                self.symbols.get(index).copied().ok_or(Error::Incomplete)
            }
            // `I"`: the payload sits after the two tag bytes.
            _ => {
                let (span, _) = byte_run(data, start + 2)?;
                Ok(&data[span])
            }
        }
    }

    /// Read an array's elements, materializing one child node per element.
    ///
    /// The first call walks the body (registering the array and each
    /// eligible child in the object table) and memoizes the children;
    /// subsequent calls return the same handles.
    ///
    /// # Errors
    ///
    /// `Error::UnexpectedKind` on a non-array node, `Error::Incomplete` on
    /// a truncated body, and `Error::UnsupportedTag` if an element lies
    /// outside the supported alphabet. Children carved before the failure
    /// stay valid.
    pub fn as_array(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let id = self.resolve(id)?;
        self.expect_kind(id, Kind::Array)?;
        if let Some(children) = &self.node(id).children {
            return Ok(children.clone());
        }
        self.register_object(id);
        let start = self.node(id).start;
        let (count, prefix) = varint::decode(&self.data[start + 1..])?;
        let count = usize::try_from(count).map_err(|_| Error::Incomplete)?;
        let mut offset = start + 1 + prefix;
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            children.push(self.carve_child(&mut offset)?);
        }
        let node = self.node_mut(id);
        node.size = offset - start;
        node.children = Some(children.clone());
        Ok(children)
    }

    /// Read a hash's entries in stream order as `(key, value)` node pairs.
    ///
    /// This preserves key identity; [`Document::as_map`] is the
    /// string-normalized view. Registration order matches the writer:
    /// container, then key, then value, for each pair.
    ///
    /// # Errors
    ///
    /// Same as [`Document::as_array`], for maps.
    pub fn as_map_entries(&mut self, id: NodeId) -> Result<Vec<(NodeId, NodeId)>> {
        let id = self.resolve(id)?;
        self.expect_kind(id, Kind::Map)?;
        if self.node(id).children.is_none() {
            self.walk_map(id)?;
        }
        let children = self.node(id).children.as_ref().expect("walked above");
        Ok(children.chunks(2).map(|kv| (kv[0], kv[1])).collect())
    }

    /// Read a hash as a mapping from stringified key to value node.
    ///
    /// Keys are normalized via [`Document::stringify`]; two distinct
    /// encoded keys that stringify identically collide, and like Ruby,
    /// the last occurrence wins.
    ///
    /// # Errors
    ///
    /// Same as [`Document::as_map_entries`].
    pub fn as_map(&mut self, id: NodeId) -> Result<HashMap<String, NodeId>> {
        let entries = self.as_map_entries(id)?;
        let mut map = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            map.insert(self.stringify(key), value);
        }
        Ok(map)
    }

    fn walk_map(&mut self, id: NodeId) -> Result<()> {
        self.register_object(id);
        let start = self.node(id).start;
        let (pairs, prefix) = varint::decode(&self.data[start + 1..])?;
        let pairs = usize::try_from(pairs).map_err(|_| Error::Incomplete)?;
        let mut offset = start + 1 + prefix;
        let mut children = Vec::with_capacity(pairs * 2);
        for _ in 0..pairs {
            children.push(self.carve_child(&mut offset)?);
            children.push(self.carve_child(&mut offset)?);
        }
        let node = self.node_mut(id);
        node.size = offset - start;
        node.children = Some(children);
        Ok(())
    }

    /// Size the value at `*offset`, materialize it as a node, register it
    /// when eligible, and advance the offset past it.
    fn carve_child(&mut self, offset: &mut usize) -> Result<NodeId> {
        let child = self.push_node(*offset);
        let size = self.measure(child)?;
        self.node_mut(child).size = size;
        self.register_object(child);
        *offset += size;
        Ok(child)
    }

    /// Get the total encoded byte length of a node.
    ///
    /// Fixed-size and varint-body kinds answer from their bytes alone;
    /// strings consume their annotation block; containers perform their
    /// full walk once and memoize. A `@` reference reports the length of
    /// the reference itself, not of its target, which is what lets a
    /// caller skip a sibling without chasing links.
    ///
    /// # Errors
    ///
    /// `Error::Incomplete` on truncation, `Error::UnsupportedTag` outside
    /// the alphabet.
    pub fn node_size(&mut self, id: NodeId) -> Result<usize> {
        self.measure(id)
    }

    pub(crate) fn measure(&mut self, id: NodeId) -> Result<usize> {
        let data = self.data;
        let start = self.node(id).start;
        let Some(&tag_byte) = data.get(start) else {
            return Err(Error::Incomplete);
        };
        let size = match tag_byte {
            tag::NIL | tag::TRUE | tag::FALSE => 1,
            tag::INTEGER | tag::SYMBOL_REF | tag::OBJECT_REF => {
                1 + varint_len_at(data, start + 1)?
            }
            tag::FLOAT => {
                let (_, consumed) = byte_run(data, start + 1)?;
                1 + consumed
            }
            tag::SYMBOL => {
                let (span, consumed) = byte_run(data, start + 1)?;
                self.intern_symbol(&data[span]);
                1 + consumed
            }
            tag::IVAR => self.measure_annotated_string(start)?,
            tag::ARRAY => {
                if self.node(id).size != 0 {
                    return Ok(self.node(id).size);
                }
                self.as_array(id)?;
                return Ok(self.node(id).size);
            }
            tag::HASH => {
                if self.node(id).size != 0 {
                    return Ok(self.node(id).size);
                }
                self.as_map_entries(id)?;
                return Ok(self.node(id).size);
            }
            other => return Err(Error::UnsupportedTag(other)),
        };
        self.node_mut(id).size = size;
        Ok(size)
    }

    /// Size an `I"` string: the raw body, then a varint count of attached
    /// instance-variable pairs, each a symbol plus either a `"` byte run
    /// (an encoding name) or a single primitive byte (the `T`/`F` of the
    /// `:E` flag). The semantics are ignored; the bytes must be consumed
    /// exactly so container offsets stay aligned.
    fn measure_annotated_string(&mut self, start: usize) -> Result<usize> {
        let data = self.data;
        if data.get(start + 1) != Some(&tag::RAW_STRING) {
            return Err(Error::UnsupportedTag(tag::IVAR));
        }
        let (_, body) = byte_run(data, start + 2)?;
        let mut offset = start + 2 + body;
        let (pairs, prefix) = varint::decode(&data[offset..])?;
        let pairs = usize::try_from(pairs).map_err(|_| Error::Incomplete)?;
        offset += prefix;
        for _ in 0..pairs {
            offset += self.symbol_run(offset)?;
            match data.get(offset) {
                Some(&tag::RAW_STRING) => {
                    let (_, consumed) = byte_run(data, offset + 1)?;
                    offset += 1 + consumed;
                }
                Some(_) => offset += 1,
                None => return Err(Error::Incomplete),
            }
        }
        Ok(offset - start)
    }

    /// Consume a symbol (definition or back-reference) at `at`, interning
    /// definitions, and report the bytes consumed.
    fn symbol_run(&mut self, at: usize) -> Result<usize> {
        let data = self.data;
        match data.get(at) {
            Some(&tag::SYMBOL) => {
                let (span, consumed) = byte_run(data, at + 1)?;
                self.intern_symbol(&data[span]);
                Ok(1 + consumed)
            }
            Some(&tag::SYMBOL_REF) => Ok(1 + varint_len_at(data, at + 1)?),
            Some(&other) => Err(Error::UnsupportedTag(other)),
            None => Err(Error::Incomplete),
        }
    }

    /// Canonical text for a node: `<nil>`, `true`/`false`, base-10
    /// integers, shortest round-trip floats, string payloads. Containers
    /// and unknown values render empty. Also the key normalization used by
    /// [`Document::as_map`].
    pub fn stringify(&mut self, id: NodeId) -> String {
        match self.kind(id) {
            Kind::Nil => "<nil>".to_owned(),
            Kind::Bool => match self.as_bool(id) {
                Ok(true) => "true".to_owned(),
                Ok(false) => "false".to_owned(),
                Err(_) => String::new(),
            },
            Kind::Integer => self
                .as_integer(id)
                .map(|v| v.to_string())
                .unwrap_or_default(),
            Kind::Float => self.as_float(id).map(|v| v.to_string()).unwrap_or_default(),
            Kind::String => self.as_string(id).map(str::to_owned).unwrap_or_default(),
            Kind::Array | Kind::Map | Kind::Unknown => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil() {
        let data = [0x04, 0x08, 0x30];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.kind(root), Kind::Nil);
        assert_eq!(doc.stringify(root), "<nil>");
        assert_eq!(doc.node_size(root).unwrap(), 1);
    }

    #[test]
    fn test_bool() {
        let data = [0x04, 0x08, 0x54];
        let doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_bool(doc.root()), Ok(true));

        let data = [0x04, 0x08, 0x46];
        let doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_bool(doc.root()), Ok(false));
    }

    #[test]
    fn test_integer() {
        // 42 inlines as 0x2F.
        let data = [0x04, 0x08, 0x69, 0x2F];
        let doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_integer(doc.root()), Ok(42));

        let data = [0x04, 0x08, 0x69, 0xFA];
        let doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_integer(doc.root()), Ok(-1));

        let data = [0x04, 0x08, 0x69, 0x02, 0x00, 0x01];
        let doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_integer(doc.root()), Ok(256));
    }

    #[test]
    fn test_float() {
        let data = [0x04, 0x08, 0x66, 0x08, b'2', b'.', b'5'];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.as_float(root), Ok(2.5));
        assert_eq!(doc.stringify(root), "2.5");
        assert_eq!(doc.node_size(root).unwrap(), data.len() - 2);
    }

    #[test]
    fn test_float_special_literals() {
        let data = [0x04, 0x08, 0x66, 0x08, b'i', b'n', b'f'];
        let doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_float(doc.root()), Ok(f64::INFINITY));

        let data = [0x04, 0x08, 0x66, 0x08, b'n', b'a', b'n'];
        let doc = Document::from_slice(&data).unwrap();
        assert!(doc.as_float(doc.root()).unwrap().is_nan());
    }

    #[test]
    fn test_float_bad_literal() {
        let data = [0x04, 0x08, 0x66, 0x08, b'x', b'y', b'z'];
        let doc = Document::from_slice(&data).unwrap();
        assert!(matches!(
            doc.as_float(doc.root()),
            Err(Error::InvalidFloat(_))
        ));
    }

    #[test]
    fn test_symbol() {
        let data = [0x04, 0x08, 0x3A, 0x06, b'a'];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.kind(root), Kind::String);
        assert_eq!(doc.as_string(root), Ok("a"));
        assert_eq!(doc.symbols(), &[b"a".as_slice()]);
        // Symbols are not back-referenceable objects.
        assert_eq!(doc.object_count(), 0);
    }

    #[test]
    fn test_symbol_def_then_ref() {
        // [:a, :a]: the second occurrence is a table reference.
        let data = [0x04, 0x08, 0x5B, 0x07, 0x3A, 0x06, b'a', 0x3B, 0x00];
        let mut doc = Document::from_slice(&data).unwrap();
        let items = doc.as_array(doc.root()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(doc.as_string(items[0]), Ok("a"));
        assert_eq!(doc.as_string(items[1]), Ok("a"));
        assert_eq!(doc.symbols().len(), 1);
        assert_eq!(doc.node_size(doc.root()).unwrap(), data.len() - 2);
    }

    #[test]
    fn test_annotated_string() {
        // "hi" with the UTF-8 flag: I" body, one ivar pair (:E, true).
        let data = [
            0x04, 0x08, 0x49, 0x22, 0x07, b'h', b'i', 0x06, 0x3A, 0x06, b'E', 0x54,
        ];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.kind(root), Kind::String);
        assert_eq!(doc.as_string(root), Ok("hi"));
        assert_eq!(doc.node_size(root).unwrap(), data.len() - 2);
        assert_eq!(doc.symbols(), &[b"E".as_slice()]);
        // An accessed string registers itself for later back-references.
        assert_eq!(doc.object_count(), 1);
    }

    #[test]
    fn test_annotated_string_empty_body() {
        let data = [0x04, 0x08, 0x49, 0x22, 0x00, 0x06, 0x3A, 0x06, b'E', 0x54];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_string(doc.root()), Ok(""));
        assert_eq!(doc.node_size(doc.root()).unwrap(), data.len() - 2);
    }

    #[test]
    fn test_annotated_string_named_encoding() {
        // "abc" annotated with :encoding => "Shift_JIS".
        let mut data = vec![0x04, 0x08, 0x49, 0x22, 0x08, b'a', b'b', b'c', 0x06, 0x3A, 0x0D];
        data.extend_from_slice(b"encoding");
        data.push(0x22);
        data.push(0x0E);
        data.extend_from_slice(b"Shift_JIS");
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.as_string(root), Ok("abc"));
        assert_eq!(doc.node_size(root).unwrap(), data.len() - 2);
        assert_eq!(doc.symbols(), &[b"encoding".as_slice()]);
    }

    #[test]
    fn test_annotated_string_symbol_ref_flag() {
        // ["x", "y"]: the second string's :E annotation is a `;` ref.
        let data = [
            0x04, 0x08, 0x5B, 0x07, //
            0x49, 0x22, 0x06, b'x', 0x06, 0x3A, 0x06, b'E', 0x54, //
            0x49, 0x22, 0x06, b'y', 0x06, 0x3B, 0x00, 0x54,
        ];
        let mut doc = Document::from_slice(&data).unwrap();
        let items = doc.as_array(doc.root()).unwrap();
        assert_eq!(doc.as_string(items[0]), Ok("x"));
        assert_eq!(doc.as_string(items[1]), Ok("y"));
        assert_eq!(doc.symbols(), &[b"E".as_slice()]);
        assert_eq!(doc.node_size(doc.root()).unwrap(), data.len() - 2);
    }

    #[test]
    fn test_string_invalid_utf8() {
        let data = [
            0x04, 0x08, 0x49, 0x22, 0x07, 0xFF, 0xFE, 0x06, 0x3A, 0x06, b'E', 0x54,
        ];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.as_string(root), Err(Error::InvalidUtf8));
        assert_eq!(doc.as_string_bytes(root), Ok([0xFF, 0xFE].as_slice()));
    }

    #[test]
    fn test_array_of_integers() {
        let data = [0x04, 0x08, 0x5B, 0x08, 0x69, 0x06, 0x69, 0x07, 0x69, 0x08];
        let mut doc = Document::from_slice(&data).unwrap();
        let items = doc.as_array(doc.root()).unwrap();
        let values: Vec<i64> = items
            .iter()
            .map(|&id| doc.as_integer(id).unwrap())
            .collect();
        assert_eq!(values, [1, 2, 3]);
        assert_eq!(doc.node_size(doc.root()).unwrap(), data.len() - 2);
    }

    #[test]
    fn test_empty_array() {
        let data = [0x04, 0x08, 0x5B, 0x00];
        let mut doc = Document::from_slice(&data).unwrap();
        assert!(doc.as_array(doc.root()).unwrap().is_empty());
        // Repeat call returns the memoized (still empty) children.
        assert!(doc.as_array(doc.root()).unwrap().is_empty());
    }

    #[test]
    fn test_array_repeated_walk_is_stable() {
        let data = [0x04, 0x08, 0x5B, 0x07, 0x69, 0x06, 0x30];
        let mut doc = Document::from_slice(&data).unwrap();
        let first = doc.as_array(doc.root()).unwrap();
        let second = doc.as_array(doc.root()).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.object_count(), 1); // just the array itself
    }

    #[test]
    fn test_shared_substructure() {
        // a = ["x"]; dump([a, a]): the second element is @1.
        let data = [
            0x04, 0x08, 0x5B, 0x07, //
            0x5B, 0x06, 0x49, 0x22, 0x06, b'x', 0x06, 0x3A, 0x06, b'E', 0x54, //
            0x40, 0x06,
        ];
        let mut doc = Document::from_slice(&data).unwrap();
        let items = doc.as_array(doc.root()).unwrap();
        assert_eq!(items.len(), 2);

        // Pre-order registration: outer array, inner array, "x".
        assert_eq!(doc.object_count(), 3);

        // The reference reports its own two-byte size, not the target's.
        assert_eq!(doc.node_size(items[1]).unwrap(), 2);

        // Kind and contents delegate to the registered target.
        assert_eq!(doc.kind(items[1]), Kind::Array);
        let via_ref = doc.as_array(items[1]).unwrap();
        let direct = doc.as_array(items[0]).unwrap();
        assert_eq!(via_ref, direct);
        assert_eq!(doc.as_string(via_ref[0]), Ok("x"));
    }

    #[test]
    fn test_self_referential_array() {
        // dump(a = []; a << a): element is @0, the array itself.
        let data = [0x04, 0x08, 0x5B, 0x06, 0x40, 0x00];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        let items = doc.as_array(root).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(doc.kind(items[0]), Kind::Array);
        // Descending through the reference lands back on the same children.
        assert_eq!(doc.as_array(items[0]).unwrap(), items);
    }

    #[test]
    fn test_empty_hash() {
        let data = [0x04, 0x08, 0x7B, 0x00];
        let mut doc = Document::from_slice(&data).unwrap();
        assert!(doc.as_map(doc.root()).unwrap().is_empty());
        assert_eq!(doc.node_size(doc.root()).unwrap(), 2);
    }

    #[test]
    fn test_hash_symbol_key() {
        // {:a => 42}
        let data = [0x04, 0x08, 0x7B, 0x06, 0x3A, 0x06, b'a', 0x69, 0x2F];
        let mut doc = Document::from_slice(&data).unwrap();
        let map = doc.as_map(doc.root()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(doc.as_integer(map["a"]), Ok(42));
        // Symbol keys are not registrable; only the hash is.
        assert_eq!(doc.object_count(), 1);
        assert_eq!(doc.node_size(doc.root()).unwrap(), data.len() - 2);
    }

    #[test]
    fn test_hash_duplicate_keys_last_wins() {
        // {:a => 1, "a" => 2}: both keys stringify to "a".
        let data = [
            0x04, 0x08, 0x7B, 0x07, //
            0x3A, 0x06, b'a', 0x69, 0x06, //
            0x49, 0x22, 0x06, b'a', 0x06, 0x3A, 0x06, b'E', 0x54, 0x69, 0x07,
        ];
        let mut doc = Document::from_slice(&data).unwrap();
        let map = doc.as_map(doc.root()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(doc.as_integer(map["a"]), Ok(2));
        // The pair view keeps both entries with their identities.
        let entries = doc.as_map_entries(doc.root()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(doc.as_integer(entries[0].1), Ok(1));
        assert_eq!(doc.as_integer(entries[1].1), Ok(2));
    }

    #[test]
    fn test_kind_is_stable() {
        let data = [0x04, 0x08, 0x5B, 0x07, 0x69, 0x06, 0x30];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.kind(root), Kind::Array);
        let items = doc.as_array(root).unwrap();
        assert_eq!(doc.kind(root), Kind::Array);
        assert_eq!(doc.kind(items[0]), Kind::Integer);
        assert_eq!(doc.kind(items[0]), Kind::Integer);
    }

    #[test]
    fn test_type_mismatch_is_recoverable() {
        let data = [0x04, 0x08, 0x69, 0x2F];
        let doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(
            doc.as_bool(root),
            Err(Error::UnexpectedKind {
                expected: "bool",
                found: "integer",
            })
        );
        // The failed coercion left the node untouched.
        assert_eq!(doc.as_integer(root), Ok(42));
    }

    #[test]
    fn test_truncated_array_tail() {
        // Array claims two elements but carries only one.
        let data = [0x04, 0x08, 0x5B, 0x07, 0x69, 0x06];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_array(doc.root()), Err(Error::Incomplete));
    }

    #[test]
    fn test_truncated_string_body() {
        let data = [0x04, 0x08, 0x49, 0x22, 0x0A, b'h', b'i'];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_string(doc.root()), Err(Error::Incomplete));
    }

    #[test]
    fn test_symbol_ref_out_of_range() {
        let data = [0x04, 0x08, 0x3B, 0x06];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_string(doc.root()), Err(Error::Incomplete));
    }

    #[test]
    fn test_object_ref_out_of_range() {
        let data = [0x04, 0x08, 0x40, 0x06];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.kind(doc.root()), Kind::Unknown);
        assert_eq!(doc.as_array(doc.root()), Err(Error::Incomplete));
        assert_eq!(doc.as_string(doc.root()), Err(Error::Incomplete));
    }

    #[test]
    fn test_unsupported_tag() {
        // 'l' opens a bignum, which is out of scope.
        let data = [0x04, 0x08, 0x6C, 0x2B, 0x08, 0x00, 0x00, 0x00, 0x40];
        let mut doc = Document::from_slice(&data).unwrap();
        let root = doc.root();
        assert_eq!(doc.kind(root), Kind::Unknown);
        assert_eq!(
            doc.as_integer(root),
            Err(Error::UnexpectedKind {
                expected: "integer",
                found: "unknown",
            })
        );
        // Inside a container the walk refuses rather than guessing a size.
        let data = [0x04, 0x08, 0x5B, 0x06, 0x6C, 0x2B];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.as_array(doc.root()), Err(Error::UnsupportedTag(b'l')));
    }

    #[test]
    fn test_stringify_forms() {
        let data = [0x04, 0x08, 0x54];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.stringify(doc.root()), "true");

        let data = [0x04, 0x08, 0x69, 0xFA];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.stringify(doc.root()), "-1");

        // Whole floats render without a trailing ".0".
        let data = [0x04, 0x08, 0x66, 0x08, b'1', b'0', b'0'];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.stringify(doc.root()), "100");

        // Containers are never used as display values.
        let data = [0x04, 0x08, 0x5B, 0x00];
        let mut doc = Document::from_slice(&data).unwrap();
        assert_eq!(doc.stringify(doc.root()), "");
    }

    #[test]
    fn test_nested_hash_registration_order() {
        // a = ["v"]; dump({:a => a, :b => a}): the second value is @1.
        let data = [
            0x04, 0x08, 0x7B, 0x07, //
            0x3A, 0x06, b'a', //
            0x5B, 0x06, 0x49, 0x22, 0x06, b'v', 0x06, 0x3A, 0x06, b'E', 0x54, //
            0x3A, 0x06, b'b', //
            0x40, 0x06,
        ];
        let mut doc = Document::from_slice(&data).unwrap();
        let map = doc.as_map(doc.root()).unwrap();
        // Objects: hash @0, array @1, "v" @2; @06 resolves to the array.
        assert_eq!(doc.object_count(), 3);
        let referenced = doc.as_array(map["b"]).unwrap();
        assert_eq!(doc.as_string(referenced[0]), Ok("v"));
        assert_eq!(doc.symbols().len(), 3); // :a, :E, :b
    }
}
