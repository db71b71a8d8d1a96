/*! Input adapters.

The matching engines read their input one rune at a time through the
[`Input`] trait, which has one implementation per kind of haystack:
[`StrInput`] for `&str`, [`BytesInput`] for `&[u8]` and [`ReaderInput`] for
anything implementing [`std::io::Read`]. Invalid UTF-8 sequences are decoded
as [`char::REPLACEMENT_CHARACTER`] with a width of one byte.
*/

use std::io::{ErrorKind, Read};

use crate::lazyflag::LazyFlag;

/// Rune-level access to the input being matched.
pub(crate) trait Input {
    /// Decodes the rune at byte offset `pos`. Returns the rune and its width
    /// in bytes, or `(None, 0)` at the end of the input.
    fn step(&mut self, pos: usize) -> (Option<char>, usize);

    /// Returns true if the input supports searching for literal prefixes
    /// with [`Input::has_prefix`] and [`Input::index`].
    fn can_check_prefix(&self) -> bool;

    /// Returns true if the input starts with `prefix`.
    fn has_prefix(&self, prefix: &[u8]) -> bool;

    /// Returns the offset of the first occurrence of `prefix` at or after
    /// `pos`, relative to `pos`.
    fn index(&self, prefix: &[u8], pos: usize) -> Option<usize>;

    /// Returns the runes surrounding position `pos`.
    fn context(&self, pos: usize) -> LazyFlag;

    /// Length of the input in bytes, if known in advance.
    fn known_len(&self) -> Option<usize>;
}

/// Decodes the rune at the start of `bytes`.
#[inline]
fn decode(bytes: &[u8]) -> (Option<char>, usize) {
    match bytes.first() {
        None => (None, 0),
        Some(&b) if b.is_ascii() => (Some(char::from(b)), 1),
        Some(_) => match bstr::decode_utf8(bytes) {
            (Some(c), width) => (Some(c), width),
            (None, _) => (Some(char::REPLACEMENT_CHARACTER), 1),
        },
    }
}

/// Decodes the rune at the end of `bytes`.
#[inline]
fn decode_last(bytes: &[u8]) -> Option<char> {
    match bytes.last() {
        None => None,
        Some(&b) if b.is_ascii() => Some(char::from(b)),
        Some(_) => match bstr::decode_last_utf8(bytes) {
            (Some(c), _) => Some(c),
            (None, _) => Some(char::REPLACEMENT_CHARACTER),
        },
    }
}

/// Input backed by a byte slice, which may contain invalid UTF-8.
pub(crate) struct BytesInput<'h> {
    bytes: &'h [u8],
}

impl<'h> BytesInput<'h> {
    pub fn new(bytes: &'h [u8]) -> Self {
        Self { bytes }
    }
}

impl Input for BytesInput<'_> {
    #[inline]
    fn step(&mut self, pos: usize) -> (Option<char>, usize) {
        match self.bytes.get(pos..) {
            Some(rest) => decode(rest),
            None => (None, 0),
        }
    }

    fn can_check_prefix(&self) -> bool {
        true
    }

    fn has_prefix(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }

    fn index(&self, prefix: &[u8], pos: usize) -> Option<usize> {
        memchr::memmem::find(self.bytes.get(pos..)?, prefix)
    }

    fn context(&self, pos: usize) -> LazyFlag {
        let prev = self.bytes.get(..pos).and_then(decode_last);
        let next = self.bytes.get(pos..).and_then(|rest| decode(rest).0);
        LazyFlag::new(prev, next)
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.bytes.len())
    }
}

/// Input backed by a string slice.
pub(crate) struct StrInput<'h> {
    s: &'h str,
}

impl<'h> StrInput<'h> {
    pub fn new(s: &'h str) -> Self {
        Self { s }
    }
}

impl Input for StrInput<'_> {
    #[inline]
    fn step(&mut self, pos: usize) -> (Option<char>, usize) {
        match self.s.get(pos..).and_then(|rest| rest.chars().next()) {
            Some(c) => (Some(c), c.len_utf8()),
            // `pos` is not at a char boundary.
            None if pos < self.s.len() => {
                (Some(char::REPLACEMENT_CHARACTER), 1)
            }
            None => (None, 0),
        }
    }

    fn can_check_prefix(&self) -> bool {
        true
    }

    fn has_prefix(&self, prefix: &[u8]) -> bool {
        self.s.as_bytes().starts_with(prefix)
    }

    fn index(&self, prefix: &[u8], pos: usize) -> Option<usize> {
        memchr::memmem::find(self.s.as_bytes().get(pos..)?, prefix)
    }

    fn context(&self, pos: usize) -> LazyFlag {
        let bytes = self.s.as_bytes();
        LazyFlag::new(
            bytes.get(..pos).and_then(decode_last),
            bytes.get(pos..).and_then(|rest| decode(rest).0),
        )
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.s.len())
    }
}

/// Input backed by a forward-only stream of bytes.
///
/// Runes can only be read in order: stepping at any position other than the
/// current one yields end of input. Read errors are treated as the end of
/// the input too. The literal prefix optimizations are disabled, and the
/// context of any position is unknown.
pub(crate) struct ReaderInput<R: Read> {
    reader: R,
    /// Bytes already read from `reader` but not yet decoded.
    pending: [u8; 4],
    pending_len: usize,
    /// Offset of the next rune to be decoded.
    pos: usize,
    at_eot: bool,
}

impl<R: Read> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pending: [0; 4], pending_len: 0, pos: 0, at_eot: false }
    }

    /// Tops up the pending buffer, returns the number of pending bytes.
    fn fill(&mut self) -> usize {
        while !self.at_eot && self.pending_len < self.pending.len() {
            match self.reader.read(&mut self.pending[self.pending_len..]) {
                Ok(0) => self.at_eot = true,
                Ok(n) => self.pending_len += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(_) => self.at_eot = true,
            }
        }
        self.pending_len
    }
}

impl<R: Read> Input for ReaderInput<R> {
    fn step(&mut self, pos: usize) -> (Option<char>, usize) {
        if pos != self.pos {
            return (None, 0);
        }
        let available = self.fill();
        let (c, width) = decode(&self.pending[..available]);
        if width > 0 {
            self.pending.copy_within(width..available, 0);
            self.pending_len -= width;
            self.pos += width;
        }
        (c, width)
    }

    fn can_check_prefix(&self) -> bool {
        false
    }

    fn has_prefix(&self, _prefix: &[u8]) -> bool {
        false
    }

    fn index(&self, _prefix: &[u8], _pos: usize) -> Option<usize> {
        None
    }

    fn context(&self, _pos: usize) -> LazyFlag {
        LazyFlag::new(None, None)
    }

    fn known_len(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{BytesInput, Input, ReaderInput, StrInput};
    use crate::lazyflag::LazyFlag;

    #[test]
    fn str_input() {
        let mut input = StrInput::new("aé€");
        assert_eq!(input.step(0), (Some('a'), 1));
        assert_eq!(input.step(1), (Some('é'), 2));
        assert_eq!(input.step(3), (Some('€'), 3));
        assert_eq!(input.step(6), (None, 0));
        // Not a char boundary.
        assert_eq!(input.step(2), (Some(char::REPLACEMENT_CHARACTER), 1));
        assert_eq!(input.context(1), LazyFlag::new(Some('a'), Some('é')));
        assert_eq!(input.context(6), LazyFlag::new(Some('€'), None));
        assert_eq!(input.index("€".as_bytes(), 1), Some(2));
        assert!(input.has_prefix(b"a"));
        assert_eq!(input.known_len(), Some(6));
    }

    #[test]
    fn bytes_input() {
        let mut input = BytesInput::new(b"a\xffb\xe2\x82");
        assert_eq!(input.step(0), (Some('a'), 1));
        assert_eq!(input.step(1), (Some(char::REPLACEMENT_CHARACTER), 1));
        assert_eq!(input.step(2), (Some('b'), 1));
        assert_eq!(input.step(3), (Some(char::REPLACEMENT_CHARACTER), 1));
        assert_eq!(input.step(5), (None, 0));
        assert_eq!(input.step(10), (None, 0));
        assert_eq!(
            input.context(2),
            LazyFlag::new(Some(char::REPLACEMENT_CHARACTER), Some('b'))
        );
        assert_eq!(input.context(0), LazyFlag::new(None, Some('a')));
        assert_eq!(input.index(b"b", 0), Some(2));
        assert_eq!(input.index(b"b", 3), None);
        assert_eq!(input.index(b"b", 100), None);
    }

    #[test]
    fn reader_input() {
        let mut input = ReaderInput::new("héllo".as_bytes());
        assert_eq!(input.step(0), (Some('h'), 1));
        assert_eq!(input.step(1), (Some('é'), 2));
        // Rewinding is not possible.
        assert_eq!(input.step(0), (None, 0));
        assert_eq!(input.step(3), (Some('l'), 1));
        assert_eq!(input.step(4), (Some('l'), 1));
        assert_eq!(input.step(5), (Some('o'), 1));
        assert_eq!(input.step(6), (None, 0));
        assert_eq!(input.step(6), (None, 0));
        assert!(!input.can_check_prefix());
        assert_eq!(input.index(b"l", 0), None);
        assert_eq!(input.known_len(), None);
    }

    #[test]
    fn reader_input_invalid_utf8() {
        let mut input = ReaderInput::new(&b"\xffa"[..]);
        assert_eq!(input.step(0), (Some(char::REPLACEMENT_CHARACTER), 1));
        assert_eq!(input.step(1), (Some('a'), 1));
        assert_eq!(input.step(2), (None, 0));
    }
}
