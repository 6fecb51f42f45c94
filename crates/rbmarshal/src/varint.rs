//! Ruby's packed signed integer encoding.
//!
//! Counts, table indices, and `i` integer bodies all use the same scheme.
//! One byte classifies the value: 0 is zero, 1-4 prefix that many positive
//! little-endian payload bytes, 0xFC-0xFF prefix `256 - b` complemented
//! negative payload bytes, and everything in between is a small integer
//! inlined into the classifier byte itself.

use crate::error::{Error, Result};

/// Decode a packed integer from the front of `data`.
///
/// Returns the value and the number of bytes consumed (1 to 5).
///
/// # Errors
///
/// Returns `Error::Incomplete` if `data` is empty or ends inside the
/// payload.
pub fn decode(data: &[u8]) -> Result<(i64, usize)> {
    let Some(&b) = data.first() else {
        return Err(Error::Incomplete);
    };
    match b {
        // Zero classifies first; the inline rule below would read it as -5.
        0 => Ok((0, 1)),
        1..=4 => {
            let n = b as usize;
            let payload = data.get(1..=n).ok_or(Error::Incomplete)?;
            let mut value: i64 = 0;
            for &x in payload.iter().rev() {
                value = (value << 8) | i64::from(x);
            }
            Ok((value, n + 1))
        }
        5..=0x7F => Ok((i64::from(b) - 5, 1)),
        0x80..=0xFB => Ok((-(i64::from(b ^ 0xFF) + 1) + 5, 1)),
        0xFC..=0xFF => {
            let n = 256 - b as usize;
            let payload = data.get(1..=n).ok_or(Error::Incomplete)?;
            let mut value: i64 = 0;
            for &x in payload.iter().rev() {
                value = (value << 8) | i64::from(0xFF - x);
            }
            Ok((-(value + 1), n + 1))
        }
    }
}

/// Decode a packed integer and report only the bytes consumed.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decoded_len(data: &[u8]) -> Result<usize> {
    decode(data).map(|(_, n)| n)
}
