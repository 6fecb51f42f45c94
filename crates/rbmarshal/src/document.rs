//! Decoded Marshal document: version header, node arena, and the two
//! parse-time tables.
//!
//! A Marshal buffer is a two-byte format version (4.8 in practice) followed
//! by exactly one encoded value. The document borrows the buffer, never
//! copies payload bytes, and hands out copyable [`NodeId`] handles into an
//! internal node arena. Decoding is lazy: a container that is never
//! inspected never materializes child nodes.
//!
//! Two tables are shared by every node under one root and are mutated by
//! the parse itself, mirroring the state Ruby's writer kept while encoding:
//!
//! - the symbol table, holding each `:` symbol payload once, in stream
//!   order, resolving `;` back-references;
//! - the object table, holding registrable nodes (strings, arrays, maps) in
//!   depth-first pre-order, resolving `@` back-references.

use crate::error::{Error, Result};
use crate::tag;
use crate::value::Node;
use crate::varint;

/// Handle to a node in a [`Document`]'s arena.
///
/// Ids are only meaningful for the document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A lazily decoded Marshal buffer.
///
/// # Example
///
/// ```
/// use rbmarshal::{Document, Kind};
///
/// let data = [0x04, 0x08, 0x69, 0x2F]; // Marshal.dump(42)
/// let mut doc = Document::from_slice(&data).unwrap();
/// let root = doc.root();
/// assert_eq!(doc.kind(root), Kind::Integer);
/// assert_eq!(doc.as_integer(root).unwrap(), 42);
/// ```
pub struct Document<'a> {
    major: u8,
    minor: u8,
    /// The encoded value, positioned after the version bytes.
    pub(crate) data: &'a [u8],
    /// Node arena; index 0 is the root.
    pub(crate) nodes: Vec<Node>,
    /// Interned symbol payloads, stream order, duplicate-free.
    pub(crate) symbols: Vec<&'a [u8]>,
    /// Registered object nodes, depth-first pre-order.
    pub(crate) objects: Vec<NodeId>,
}

impl<'a> Document<'a> {
    /// Open a Marshal buffer (zero-copy).
    ///
    /// The first two bytes are the format's major and minor version; no
    /// behavior branches on them. The remainder must hold one encoded
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Incomplete` if the buffer is shorter than a version
    /// header plus one tag byte.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        if data.len() < 3 {
            return Err(Error::Incomplete);
        }
        let payload = &data[2..];
        Ok(Self {
            major: data[0],
            minor: data[1],
            data: payload,
            nodes: vec![Node::with_size(0, payload.len())],
            symbols: Vec::new(),
            objects: Vec::new(),
        })
    }

    /// Get the root value's node id.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get the format version bytes `(major, minor)`.
    #[inline]
    #[must_use]
    pub fn version(&self) -> (u8, u8) {
        (self.major, self.minor)
    }

    /// Get the encoded value bytes (version header stripped).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Get the encoded value length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the encoded value is empty (never true for a document built
    /// by `from_slice`).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a node's leading tag byte, if it is in bounds.
    #[must_use]
    pub fn tag_byte(&self, id: NodeId) -> Option<u8> {
        self.data.get(self.node(id).start).copied()
    }

    /// Get the interned symbols in stream order.
    #[must_use]
    pub fn symbols(&self) -> &[&'a [u8]] {
        &self.symbols
    }

    /// Get the number of registered back-referenceable objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // --- Arena plumbing ---

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn push_node(&mut self, start: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::unsized_at(start));
        id
    }

    // --- Tables ---

    /// Intern a symbol payload unless an identical one is already present.
    pub(crate) fn intern_symbol(&mut self, sym: &'a [u8]) {
        if !self.symbols.iter().any(|s| *s == sym) {
            self.symbols.push(sym);
        }
    }

    /// Register a node in the object table if it is back-referenceable:
    /// its own kind must be String, Array, or Map, and its leading byte
    /// must not itself be a reference or symbol form.
    pub(crate) fn register_object(&mut self, id: NodeId) {
        let start = self.node(id).start;
        match self.data.get(start) {
            Some(&(tag::OBJECT_REF | tag::SYMBOL | tag::SYMBOL_REF)) | None => return,
            Some(_) => {}
        }
        match tag::Kind::detect(&self.data[start..]) {
            tag::Kind::String | tag::Kind::Array | tag::Kind::Map => {}
            _ => return,
        }
        if !self.objects.contains(&id) {
            self.objects.push(id);
        }
    }

    /// Follow a `@` reference to its target node. One hop suffices: the
    /// object table never holds reference nodes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Incomplete` if the index lies beyond the objects
    /// registered so far, or the index varint is truncated.
    pub(crate) fn resolve(&self, id: NodeId) -> Result<NodeId> {
        let start = self.node(id).start;
        if self.data.get(start) != Some(&tag::OBJECT_REF) {
            return Ok(id);
        }
        let (index, _) = varint::decode(&self.data[start + 1..])?;
        let index = usize::try_from(index).map_err(|_| Error::Incomplete)?;
        self.objects.get(index).copied().ok_or(Error::Incomplete)
    }
}

impl std::fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("version", &format_args!("{}.{}", self.major, self.minor))
            .field("len", &self.data.len())
            .field("nodes", &self.nodes.len())
            .field("symbols", &self.symbols.len())
            .field("objects", &self.objects.len())
            .finish()
    }
}
