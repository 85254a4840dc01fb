//! Cached value types.
//!
//! [`ByteLen`] is the one capability the eviction engine needs from a value:
//! how many bytes it accounts for. [`ByteView`] is the value type groups store,
//! an immutable byte buffer that copies on the way in and on the way out so no
//! caller can reach into cached data.

use std::fmt;
use std::sync::Arc;

/// Reports the number of bytes a value charges against a cache's capacity.
pub trait ByteLen {
    fn byte_len(&self) -> usize;
}

impl ByteLen for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteLen for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl<T: ByteLen + ?Sized> ByteLen for Arc<T> {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

/// Immutable view over a cached byte sequence.
///
/// Construction from a borrowed slice copies it, and [`to_vec`](Self::to_vec)
/// hands out a fresh copy, so mutating either buffer never changes what the
/// cache holds. Clones share one allocation, which is safe because nothing
/// can write through it.
///
/// # Example
///
/// ```
/// use groupcache::ByteView;
///
/// let mut source = b"hello".to_vec();
/// let view = ByteView::new(&source);
/// source[0] = b'j';
///
/// let mut out = view.to_vec();
/// out[0] = b'c';
///
/// assert_eq!(view.as_bytes(), b"hello");
/// assert_eq!(view.to_string(), "hello");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    /// Copies `bytes` into a new view.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read-only borrow of the stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns an owned copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Alias of [`to_vec`](Self::to_vec).
    pub fn byte_slice(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl Default for ByteView {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ByteLen for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<Vec<u8>> for ByteView {
    /// Takes ownership of `bytes`; the caller can no longer reach the buffer.
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        Self::from(s.into_bytes())
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Lossy UTF-8 projection; invalid sequences become U+FFFD.
impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.len())
            .field("text", &String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}
