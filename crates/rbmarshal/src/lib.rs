//! Zero-copy lazy reader for Ruby Marshal 4.8 data.
//!
//! This is the format Rails uses for session cookies and other persisted
//! state. The crate decodes what a Ruby 1.9+ writer emits for plain data:
//! nil, booleans, integers, floats, strings (with encoding annotations),
//! symbols, arrays, hashes, and the `;`/`@` back-references that express
//! interning and sharing. User-defined classes, regexps, and bignums are
//! out of scope, as is writing the format.
//!
//! ```
//! use rbmarshal::{Document, Kind};
//!
//! // Marshal.dump({:user_id => 42})
//! let data = [
//!     0x04, 0x08, 0x7B, 0x06, 0x3A, 0x0C, b'u', b's', b'e', b'r', b'_',
//!     b'i', b'd', 0x69, 0x2F,
//! ];
//! let mut doc = Document::from_slice(&data).unwrap();
//! let root = doc.root();
//! assert_eq!(doc.kind(root), Kind::Map);
//! let session = doc.as_map(root).unwrap();
//! assert_eq!(doc.as_integer(session["user_id"]).unwrap(), 42);
//! ```

pub mod document;
pub mod error;
pub mod json;
pub mod tag;
pub mod value;
pub mod varint;

pub use document::{Document, NodeId};
pub use error::{Error, Result};
pub use json::to_json;
pub use tag::Kind;
