//! `application/x-www-form-urlencoded` encoding.
//!
//! ASCII letters, digits and `*` `.` `-` `_` pass through, a space becomes
//! `+`, every other byte becomes `%XX` with uppercase hex digits.
//!
//! [`urlencode`] follows a two-phase protocol so callers can work with
//! fixed buffers:
//!
//! ```
//! use btn2slack::urlencode::{encoded_len, urlencode};
//!
//! let text = "a b";
//! let mut buf = [0u8; 8];
//! assert!(encoded_len(text) < buf.len());  // leave room for the NUL
//! let len = urlencode(text, &mut buf);
//! assert_eq!(&buf[..len], b"a+b");
//! assert_eq!(buf[len], 0);
//! ```
//!
//! A return value of `buf.len()` or more means the output was truncated.


const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes that are copied unchanged.
const fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'*' | b'.' | b'-' | b'_')
}

/// Encoded width of a single input byte.
const fn width(b: u8) -> usize {
    if is_unreserved(b) || b == b' ' {
        1
    } else {
        3
    }
}

/// Encode `s` into `buf` and return the full encoded length.
///
/// - An empty `buf` writes nothing: size-query mode.
/// - Otherwise output stops at the first unit that would not leave room for
///   the trailing NUL, and a NUL is always written after the last byte
///   stored. The return value is unaffected by truncation.
pub fn urlencode(s: &str, buf: &mut [u8]) -> usize {
    let mut size = 0;
    let mut written = 0;
    let mut fits = !buf.is_empty();

    for &b in s.as_bytes() {
        let w = width(b);
        fits = fits && size + w < buf.len();

        if fits {
            if is_unreserved(b) {
                buf[written] = b;
            } else if b == b' ' {
                buf[written] = b'+';
            } else {
                buf[written] = b'%';
                buf[written + 1] = HEX[(b >> 4) as usize];
                buf[written + 2] = HEX[(b & 0x0f) as usize];
            }
            written += w;
        }
        size += w;
    }

    if let Some(terminator) = buf.get_mut(written) {
        *terminator = 0;
    }
    size
}

/// Length `s` occupies once encoded, excluding the NUL.
pub fn encoded_len(s: &str) -> usize {
    urlencode(s, &mut [])
}
