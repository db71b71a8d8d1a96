use crate::program::EmptyOp;

/// Returns true if `c` is an ASCII word character: `[0-9A-Za-z_]`.
#[inline]
pub(crate) fn is_word_char(c: Option<char>) -> bool {
    matches!(c, Some(c) if c == '_' || c.is_ascii_alphanumeric())
}

/// The context around a position in the input: the rune right before it
/// and the rune right after it. `None` stands for the start or the end of
/// the input.
///
/// Zero-width assertions are evaluated lazily, only when an `EmptyWidth`
/// instruction is actually reached, instead of computing every assertion
/// flag at each position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LazyFlag {
    prev: Option<char>,
    next: Option<char>,
}

impl LazyFlag {
    #[inline]
    pub fn new(prev: Option<char>, next: Option<char>) -> Self {
        Self { prev, next }
    }

    /// Returns true if every assertion in `op` holds at this position.
    pub fn matches(&self, mut op: EmptyOp) -> bool {
        if op.is_empty() {
            return true;
        }
        match self.prev {
            None => op.remove(EmptyOp::BEGIN_LINE | EmptyOp::BEGIN_TEXT),
            Some('\n') => op.remove(EmptyOp::BEGIN_LINE),
            Some(_) => {}
        }
        match self.next {
            None => op.remove(EmptyOp::END_LINE | EmptyOp::END_TEXT),
            Some('\n') => op.remove(EmptyOp::END_LINE),
            Some(_) => {}
        }
        if op.is_empty() {
            return true;
        }
        if is_word_char(self.prev) != is_word_char(self.next) {
            op.remove(EmptyOp::WORD_BOUNDARY);
        } else {
            op.remove(EmptyOp::NO_WORD_BOUNDARY);
        }
        op.is_empty()
    }
}
