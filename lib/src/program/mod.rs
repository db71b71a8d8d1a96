/*! The instruction graph shared by every matching engine.

A [`Program`] is a flat array of [`Inst`], where each instruction refers to
its successors by index. Index 0 is always a [`InstOp::Fail`] instruction,
so jumping to pc 0 means "this path can't match". The program is produced
by the [`compiler::Compiler`] from the high-level intermediate representation
(HIR) built by the [`regex-syntax`][1] crate, and it's never modified after
that. The one-pass engine works on its own rewritten copy.

[1]: https://docs.rs/regex-syntax
*/

use std::fmt::{Display, Formatter, Write};

use bitflags::bitflags;

pub(crate) mod compiler;


bitflags! {
    /// Zero-width assertions that an [`InstOp::EmptyWidth`] instruction
    /// requires at the current position.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EmptyOp: u8 {
        /// `^` in multi-line mode: at the start of the input or after `\n`.
        const BEGIN_LINE = 0x01;
        /// `$` in multi-line mode: at the end of the input or before `\n`.
        const END_LINE = 0x02;
        /// `^` / `\A`: at the start of the input.
        const BEGIN_TEXT = 0x04;
        /// `$` / `\z`: at the end of the input.
        const END_TEXT = 0x08;
        /// `\b`: between a word character and a non-word character.
        const WORD_BOUNDARY = 0x10;
        /// `\B`: not at a word boundary.
        const NO_WORD_BOUNDARY = 0x20;
    }
}

/// Operation performed by an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstOp {
    /// Fork. `out` is the preferred branch, `arg` the alternative.
    Alt,
    /// Fork where one branch consumes runes and the other leads to a match.
    /// Only produced by the one-pass rewrite.
    AltMatch,
    /// Records the current position in capture slot `arg`.
    Capture,
    /// Zero-width assertion, `arg` holds the [`EmptyOp`] bits.
    EmptyWidth,
    /// Successful end of a path.
    Match,
    /// Path that never matches.
    Fail,
    /// No-op, continues at `out`.
    Nop,
    /// Consumes one rune contained in `runes`.
    Rune,
    /// Consumes exactly the single rune `runes[0].0`.
    Rune1,
    /// Consumes any rune.
    RuneAny,
    /// Consumes any rune except `\n`.
    RuneAnyNotNL,
}

impl InstOp {
    /// Returns true for the instructions that consume one rune from the
    /// input.
    #[inline]
    pub fn consumes_rune(&self) -> bool {
        matches!(
            self,
            InstOp::Rune
                | InstOp::Rune1
                | InstOp::RuneAny
                | InstOp::RuneAnyNotNL
        )
    }

    /// Returns true for [`InstOp::Alt`] and [`InstOp::AltMatch`].
    #[inline]
    pub fn is_alt(&self) -> bool {
        matches!(self, InstOp::Alt | InstOp::AltMatch)
    }
}

/// A single instruction of a [`Program`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inst {
    /// Operation performed by this instruction.
    pub op: InstOp,
    /// Index of the next instruction (the preferred one for `Alt`).
    pub out: usize,
    /// Operation-specific argument: alternative branch for `Alt`, slot index
    /// for `Capture` and assertion bits for `EmptyWidth`.
    pub arg: usize,
    /// Sorted, non-overlapping, inclusive rune ranges for rune-consuming
    /// instructions.
    pub runes: Vec<(char, char)>,
}

impl Inst {
    pub(crate) fn new(op: InstOp) -> Self {
        Self { op, out: 0, arg: 0, runes: Vec::new() }
    }

    /// The assertions required by an `EmptyWidth` instruction.
    #[inline]
    pub fn empty_op(&self) -> EmptyOp {
        EmptyOp::from_bits_truncate(self.arg as u8)
    }

    /// Returns the index of the range in `runes` that contains `c`, if any.
    pub fn match_rune_pos(&self, c: char) -> Option<usize> {
        self.runes
            .binary_search_by(|&(lo, hi)| {
                if hi < c {
                    std::cmp::Ordering::Less
                } else if lo > c {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    /// Returns true if this rune-consuming instruction accepts `c`. `None`
    /// means end of input, which is never accepted.
    #[inline]
    pub fn matches_rune(&self, c: Option<char>) -> bool {
        let c = match c {
            Some(c) => c,
            None => return false,
        };
        match self.op {
            InstOp::Rune1 => self.runes[0].0 == c,
            InstOp::Rune => self.match_rune_pos(c).is_some(),
            InstOp::RuneAny => true,
            InstOp::RuneAnyNotNL => c != '\n',
            _ => unreachable!("{:?} doesn't consume runes", self.op),
        }
    }
}

impl Display for Inst {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.op {
            InstOp::Alt => write!(f, "ALT -> {}, {}", self.out, self.arg),
            InstOp::AltMatch => {
                write!(f, "ALTMATCH -> {}, {}", self.out, self.arg)
            }
            InstOp::Capture => write!(f, "CAP {} -> {}", self.arg, self.out),
            InstOp::EmptyWidth => {
                write!(f, "EMPTY {:#04x} -> {}", self.arg, self.out)
            }
            InstOp::Match => write!(f, "MATCH"),
            InstOp::Fail => write!(f, "FAIL"),
            InstOp::Nop => write!(f, "NOP -> {}", self.out),
            InstOp::Rune1 => {
                write!(f, "RUNE1 {:?} -> {}", self.runes[0].0, self.out)
            }
            InstOp::Rune => {
                let mut ranges = String::new();
                for (i, (lo, hi)) in self.runes.iter().enumerate() {
                    if i > 0 {
                        ranges.push(' ');
                    }
                    if lo == hi {
                        write!(ranges, "{:?}", lo)?;
                    } else {
                        write!(ranges, "{:?}-{:?}", lo, hi)?;
                    }
                }
                write!(f, "RUNE [{}] -> {}", ranges, self.out)
            }
            InstOp::RuneAny => write!(f, "ANY -> {}", self.out),
            InstOp::RuneAnyNotNL => write!(f, "ANYNOTNL -> {}", self.out),
        }
    }
}

/// A compiled regular expression, ready to be executed by any of the
/// matching engines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub(crate) insts: Vec<Inst>,
    pub(crate) start: usize,
    pub(crate) num_cap: usize,
}

impl Program {
    /// Creates a program from its parts.
    ///
    /// # Panics
    ///
    /// If `insts` is empty, if `insts[0]` is not a `Fail` instruction or if
    /// `start` is out of bounds.
    pub(crate) fn new(insts: Vec<Inst>, start: usize, num_cap: usize) -> Self {
        assert!(!insts.is_empty() && insts[0].op == InstOp::Fail);
        assert!(start < insts.len());
        Self { insts, start, num_cap }
    }

    /// Instructions in this program.
    #[inline]
    pub fn insts(&self) -> &[Inst] {
        self.insts.as_slice()
    }

    /// Number of instructions in this program.
    #[inline]
    pub fn num_insts(&self) -> usize {
        self.insts.len()
    }

    /// Index of the first instruction executed.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of capture slots, two per group, including the implicit
    /// group 0 that covers the whole match.
    #[inline]
    pub fn num_cap(&self) -> usize {
        self.num_cap
    }

    /// Returns the first instruction at or after `pc` that is neither a
    /// `Nop` nor a `Capture`.
    pub(crate) fn skip_nop(&self, mut pc: usize) -> &Inst {
        let mut inst = &self.insts[pc];
        while matches!(inst.op, InstOp::Nop | InstOp::Capture) {
            pc = inst.out;
            inst = &self.insts[pc];
        }
        inst
    }

    /// Returns the literal string that every match must start with, and
    /// whether that literal is the whole regexp (i.e. the program matches
    /// right after consuming it).
    pub fn prefix(&self) -> (String, bool) {
        let mut inst = self.skip_nop(self.start);
        let mut prefix = String::new();

        while inst.op == InstOp::Rune1
            && inst.runes[0].0 != char::REPLACEMENT_CHARACTER
        {
            prefix.push(inst.runes[0].0);
            inst = self.skip_nop(inst.out);
        }

        let complete = inst.op == InstOp::Match;
        (prefix, complete)
    }

    /// Returns the assertions that hold for every match at the start
    /// position, or `None` if the program can't match at all.
    pub fn start_cond(&self) -> Option<EmptyOp> {
        let mut flag = EmptyOp::empty();
        let mut pc = self.start;
        loop {
            let inst = &self.insts[pc];
            match inst.op {
                InstOp::EmptyWidth => flag |= inst.empty_op(),
                InstOp::Fail => return None,
                InstOp::Capture | InstOp::Nop => {}
                _ => return Some(flag),
            }
            pc = inst.out;
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            let marker = if pc == self.start { "*" } else { " " };
            writeln!(f, "{:05}{} {}", pc, marker, inst)?;
        }
        Ok(())
    }
}
