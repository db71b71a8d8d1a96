/*! This module implements the one-pass matcher, the fastest of the three
engines, accompanied by the compiler that decides whether a program can use
it.

A regexp is one-pass when it is anchored at the start of the input and, at
every `Alt` instruction, the next rune in the input is enough to decide which
branch to follow. For instance, `^a(b|c)d$` is one-pass because after `a`
the next rune is either `b` or `c`, and each one selects a single branch.
On the other hand, `^(a|ab)$` is not one-pass, as both branches start with
`a`. One-pass regexps can be matched in a single left-to-right scan with no
backtracking and no thread lists, recording captures along the way.

The [compiler] rewrites a copy of the [`Program`] so that every `Alt`
carries the union of the runes accepted by its branches and, for each rune
range in that union, the branch that must be taken. If the union can't be
built because two branches accept the same rune, or if both branches can
reach a match without consuming input, the program is not one-pass and
[`compile`] returns `None`.

[`Program`]: crate::program::Program
*/

use std::ops::{Deref, DerefMut};

use crate::program::{EmptyOp, Inst, InstOp, Program};

pub(crate) use compiler::compile;
pub(crate) use onepassvm::OnePassVM;

mod compiler;
mod onepassvm;


/// An instruction of a [`OnePassProgram`].
///
/// For `Alt` and `AltMatch` instructions `runes` holds the merged rune
/// ranges of both branches, and `next[i]` is the instruction to jump to when
/// the next rune falls in `runes[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OnePassInst {
    pub inst: Inst,
    pub next: Vec<usize>,
}

impl Deref for OnePassInst {
    type Target = Inst;

    fn deref(&self) -> &Self::Target {
        &self.inst
    }
}

impl DerefMut for OnePassInst {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inst
    }
}

/// A program rewritten for the one-pass matcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OnePassProgram {
    pub insts: Vec<OnePassInst>,
    pub start: usize,
    pub num_cap: usize,
}

impl OnePassProgram {
    /// Creates a copy of `prog` with empty `next` tables.
    fn from_program(prog: &Program) -> Self {
        Self {
            insts: prog
                .insts
                .iter()
                .map(|inst| OnePassInst {
                    inst: inst.clone(),
                    next: Vec::new(),
                })
                .collect(),
            start: prog.start,
            num_cap: prog.num_cap,
        }
    }
}

/// Returns the instruction that follows `inst` when the next rune in the
/// input is `c`.
///
/// If `c` is not accepted by any branch the result is 0 (`Fail`), except
/// for `AltMatch` instructions, which fall back to their `out` branch.
#[inline]
pub(crate) fn next_pc(inst: &OnePassInst, c: Option<char>) -> usize {
    match c.and_then(|c| inst.match_rune_pos(c)) {
        Some(i) => inst.next[i],
        None if inst.op == InstOp::AltMatch => inst.out,
        None => 0,
    }
}

/// Returns the literal prefix that follows the `BEGIN_TEXT` assertion at the
/// start of a one-pass program, whether the prefix is the whole regexp, and
/// the pc of the first instruction after the prefix.
pub(crate) fn prefix(prog: &Program) -> (String, bool, usize) {
    let mut inst = &prog.insts[prog.start];
    if inst.op != InstOp::EmptyWidth
        || !inst.empty_op().contains(EmptyOp::BEGIN_TEXT)
    {
        return (String::new(), inst.op == InstOp::Match, prog.start);
    }

    let mut pc = inst.out;
    inst = &prog.insts[pc];
    while inst.op == InstOp::Nop {
        pc = inst.out;
        inst = &prog.insts[pc];
    }

    // Only a single rune per instruction is accepted.
    if inst.op != InstOp::Rune1 {
        return (String::new(), inst.op == InstOp::Match, prog.start);
    }

    let mut prefix = String::new();
    while inst.op == InstOp::Rune1
        && inst.runes[0].0 != char::REPLACEMENT_CHARACTER
    {
        prefix.push(inst.runes[0].0);
        pc = inst.out;
        inst = &prog.insts[pc];
    }

    let complete = inst.op == InstOp::EmptyWidth
        && inst.empty_op().contains(EmptyOp::END_TEXT)
        && prog.insts[inst.out].op == InstOp::Match;

    (prefix, complete, pc)
}
