//! Tag byte alphabet for Marshal values.
//!
//! Every encoded value starts with a one-byte ASCII tag. The tag alone
//! determines the kind, except `I` (instance-variable wrapper), which is a
//! string only when the wrapped value is a `"` raw byte-string.

/// `nil`.
pub const NIL: u8 = b'0';
/// `true`.
pub const TRUE: u8 = b'T';
/// `false`.
pub const FALSE: u8 = b'F';
/// Integer; body is a packed varint.
pub const INTEGER: u8 = b'i';
/// Float; body is a length-prefixed decimal literal.
pub const FLOAT: u8 = b'f';
/// Symbol definition; body is a length-prefixed byte-string, interned.
pub const SYMBOL: u8 = b':';
/// Symbol back-reference; body is a varint index into the symbol table.
pub const SYMBOL_REF: u8 = b';';
/// Instance-variable wrapper. Only `I"` (an encoding-annotated string) is
/// part of the supported alphabet.
pub const IVAR: u8 = b'I';
/// Raw byte-string. Valid inside `I` and as an annotation value, not as a
/// standalone tag.
pub const RAW_STRING: u8 = b'"';
/// Array; body is a varint count followed by the elements.
pub const ARRAY: u8 = b'[';
/// Hash; body is a varint pair-count followed by alternating keys/values.
pub const HASH: u8 = b'{';
/// Object back-reference; body is a varint index into the object table.
pub const OBJECT_REF: u8 = b'@';

/// Value kind determined by the leading tag byte(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Unknown,
    Nil,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Map,
}

impl Kind {
    /// Classify the value starting at `bytes[0]`.
    ///
    /// `@` references are Unknown here; they take their kind from the
    /// referenced node, which only the document can resolve.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        let Some(&tag) = bytes.first() else {
            return Kind::Unknown;
        };
        match tag {
            NIL => Kind::Nil,
            TRUE | FALSE => Kind::Bool,
            INTEGER => Kind::Integer,
            FLOAT => Kind::Float,
            SYMBOL | SYMBOL_REF => Kind::String,
            IVAR if bytes.get(1) == Some(&RAW_STRING) => Kind::String,
            ARRAY => Kind::Array,
            HASH => Kind::Map,
            _ => Kind::Unknown,
        }
    }

    /// Get the kind name as a string (for error messages).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Kind::Unknown => "unknown",
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Map => "map",
        }
    }
}
