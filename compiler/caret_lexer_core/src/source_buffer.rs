//! Source bytes followed by a `0x00` sentinel.
//!
//! The scanner detects end of input by reading the sentinel, so no scan
//! loop needs a bounds check. Zero padding up to the next 64-byte
//! boundary keeps two-byte lookahead in bounds. A session reuses one
//! buffer for every request through [`SourceBuffer::replace`].

use crate::Cursor;

const PAD_TO: usize = 64;

/// Sentinel-terminated source buffer.
///
/// ```text
/// [source bytes..., 0x00, 0x00 padding...]
///                   ^
///                   len()
/// ```
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    buf: Vec<u8>,
    source_len: u32,
}

impl SourceBuffer {
    /// Sources longer than `u32::MAX - 1` bytes are truncated.
    pub fn new(source: &str) -> Self {
        let mut buffer = SourceBuffer {
            buf: Vec::new(),
            source_len: 0,
        };
        buffer.replace(source);
        buffer
    }

    /// Load `source` in place of the current contents, reusing the
    /// allocation.
    pub fn replace(&mut self, source: &str) {
        let bytes = source.as_bytes();
        let len = bytes.len().min(u32::MAX as usize - 1);
        let padded = (len + PAD_TO) & !(PAD_TO - 1);
        self.buf.clear();
        self.buf.extend_from_slice(&bytes[..len]);
        self.buf.resize(padded, 0);
        self.source_len = u32::try_from(len).unwrap_or(u32::MAX);
    }

    /// A [`Cursor`] at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source_len)
    }

    /// Source length in bytes, sentinel excluded.
    pub fn len(&self) -> u32 {
        self.source_len
    }

    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding(buf: &SourceBuffer) -> &[u8] {
        &buf.buf[buf.source_len as usize..]
    }

    #[test]
    fn empty_source_is_only_sentinel() {
        let buf = SourceBuffer::new("");
        assert!(buf.is_empty());
        assert_eq!(padding(&buf).len(), PAD_TO);
        assert!(padding(&buf).iter().all(|&b| b == 0));
    }

    #[test]
    fn padding_always_holds_a_sentinel() {
        for len in [1, 62, 63, 64, 65, 200] {
            let buf = SourceBuffer::new(&"a".repeat(len));
            assert_eq!(buf.buf.len() % PAD_TO, 0, "length {len}");
            assert!(!padding(&buf).is_empty(), "length {len}");
            assert!(padding(&buf).iter().all(|&b| b == 0), "length {len}");
        }
    }

    #[test]
    fn replace_clears_the_previous_source() {
        let mut buf = SourceBuffer::new("class Longer { }");
        buf.replace("int");
        assert_eq!(buf.len(), 3);
        assert_eq!(&buf.buf[..3], b"int");
        assert!(padding(&buf).iter().all(|&b| b == 0));
        assert_eq!(buf.cursor().slice(0, 3), "int");
    }
}
