use std::mem;

use crate::onepass::{OnePassInst, OnePassProgram};
use crate::program::{EmptyOp, InstOp, Program};
use crate::sparse::SparseSet;

/// Programs with this number of instructions or more are not even checked.
const MAX_ONEPASS_INSTS: usize = 1000;

/// Rune ranges accepted by `RuneAny`.
const ANY_RUNE: [(char, char); 1] = [('\0', char::MAX)];

/// Rune ranges accepted by `RuneAnyNotNL`.
const ANY_RUNE_NOT_NL: [(char, char); 2] =
    [('\0', '\x09'), ('\x0b', char::MAX)];

/// Builds the one-pass version of `prog`, or returns `None` if the regexp
/// is not one-pass.
pub(crate) fn compile(prog: &Program) -> Option<OnePassProgram> {
    if prog.start == 0 || prog.insts.len() >= MAX_ONEPASS_INSTS {
        return None;
    }

    // A one-pass regexp must be anchored at the start of the input.
    let start = &prog.insts[prog.start];
    if start.op != InstOp::EmptyWidth
        || !start.empty_op().contains(EmptyOp::BEGIN_TEXT)
    {
        return None;
    }

    // Every instruction leading to a match must be an end-of-text
    // assertion.
    for inst in prog.insts.iter() {
        let op_out = prog.insts[inst.out].op;
        match inst.op {
            InstOp::Alt | InstOp::AltMatch => {
                if op_out == InstOp::Match
                    || prog.insts[inst.arg].op == InstOp::Match
                {
                    return None;
                }
            }
            InstOp::EmptyWidth => {
                if op_out == InstOp::Match
                    && !inst.empty_op().contains(EmptyOp::END_TEXT)
                {
                    return None;
                }
            }
            _ => {
                if op_out == InstOp::Match {
                    return None;
                }
            }
        }
    }

    let mut onepass = copy(prog);
    Builder::new(&mut onepass).build().then(|| {
        cleanup(&mut onepass, prog);
        onepass
    })
}

/// Creates a copy of `prog` where some idioms that would prevent an
/// otherwise one-pass program from being recognized as such are rewritten.
///
/// Given two `Alt` instructions `A` and `B`, where `A` has `B` as one of its
/// branches and some non-`Alt` instruction as the other one:
///
/// - `A:BC + B:DA => A:BC + B:DC`: a loop from `B` back to `A` is redirected
///   to `C`, as going through `A` again can only lead to `B` or `C`.
/// - `A:BC + B:DC => A:DC + B:DC`: if both lead to `C`, `A` can jump to
///   `D` directly.
fn copy(prog: &Program) -> OnePassProgram {
    let mut p = OnePassProgram::from_program(prog);

    for pc in 0..p.insts.len() {
        if !p.insts[pc].op.is_alt() {
            continue;
        }

        // Find which branch of `A` leads to the other `Alt`.
        let (a_out, a_arg) = (p.insts[pc].out, p.insts[pc].arg);
        let (b, other, alt_in_arg) = if p.insts[a_arg].op.is_alt() {
            (a_arg, a_out, true)
        } else if p.insts[a_out].op.is_alt() {
            (a_out, a_arg, false)
        } else {
            continue;
        };

        if p.insts[other].op.is_alt() {
            continue;
        }

        let (b_out, b_arg) = (p.insts[b].out, p.insts[b].arg);

        // `b_alt_in_out` tells which branch of `B` is the one that loops
        // back to `A`, if any.
        let b_alt_in_out = if b_out == pc {
            p.insts[b].out = other;
            true
        } else if b_arg == pc {
            p.insts[b].arg = other;
            false
        } else {
            true
        };

        let (b_alt, b_other) = if b_alt_in_out {
            (p.insts[b].out, p.insts[b].arg)
        } else {
            (p.insts[b].arg, p.insts[b].out)
        };

        if other == b_alt {
            if alt_in_arg {
                p.insts[pc].arg = b_other;
            } else {
                p.insts[pc].out = b_other;
            }
        }
    }

    p
}

/// Merges two sorted lists of rune ranges, returning the merged list and,
/// for each range in it, the pc it came from. Returns `None` if the two
/// lists overlap, which means that some rune could be accepted by both
/// branches.
pub(super) fn merge_rune_sets(
    left: &[(char, char)],
    right: &[(char, char)],
    left_pc: usize,
    right_pc: usize,
) -> Option<(Vec<(char, char)>, Vec<usize>)> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut next = Vec::with_capacity(left.len() + right.len());
    let (mut lx, mut rx) = (0, 0);

    while lx < left.len() || rx < right.len() {
        let take_right = if rx >= right.len() {
            false
        } else if lx >= left.len() {
            true
        } else {
            right[rx].0 < left[lx].0
        };

        let (range, pc) = if take_right {
            rx += 1;
            (right[rx - 1], right_pc)
        } else {
            lx += 1;
            (left[lx - 1], left_pc)
        };

        if let Some(&(_, last_hi)) = merged.last() {
            if range.0 <= last_hi {
                return None;
            }
        }

        merged.push(range);
        next.push(pc);
    }

    Some((merged, next))
}

/// Checks whether a program is one-pass, filling the `next` tables of its
/// instructions while doing so.
struct Builder<'a> {
    p: &'a mut OnePassProgram,
    /// Rune-consuming instructions whose successors must be checked.
    inst_queue: SparseSet,
    /// Instructions visited while checking the current entry of
    /// `inst_queue`.
    visit_queue: SparseSet,
    /// Runes that can be accepted from each instruction.
    runes: Vec<Vec<(char, char)>>,
    /// `matches[pc]` is true if a match can be reached from `pc` without
    /// consuming any rune.
    matches: Vec<bool>,
}

impl<'a> Builder<'a> {
    fn new(p: &'a mut OnePassProgram) -> Self {
        let len = p.insts.len();
        Self {
            p,
            inst_queue: SparseSet::new(len),
            visit_queue: SparseSet::new(len),
            runes: vec![Vec::new(); len],
            matches: vec![false; len],
        }
    }

    fn build(mut self) -> bool {
        self.inst_queue.insert(self.p.start);

        while let Some(pc) = self.inst_queue.next() {
            self.visit_queue.clear();
            if !self.check(pc) {
                return false;
            }
        }

        for (inst, runes) in self.p.insts.iter_mut().zip(self.runes) {
            inst.runes = runes;
        }

        true
    }

    /// Makes the zero-width instruction at `pc` accept the same runes as
    /// its successor `out`, forwarding all of them to `out`.
    fn pass_through(&mut self, pc: usize, out: usize) {
        self.matches[pc] = self.matches[out];
        self.runes[pc] = self.runes[out].clone();
        self.p.insts[pc].next = vec![out; self.runes[pc].len() + 1];
    }

    /// Sets the runes accepted by a rune-consuming instruction.
    fn consume(&mut self, pc: usize, runes: Vec<(char, char)>) {
        let out = self.p.insts[pc].out;
        self.p.insts[pc].next = vec![out; runes.len() + 1];
        self.runes[pc] = runes;
    }

    fn check(&mut self, pc: usize) -> bool {
        if self.visit_queue.contains(pc) {
            return true;
        }
        self.visit_queue.insert(pc);

        let OnePassInst { inst, next } = &self.p.insts[pc];
        let (op, out, arg) = (inst.op, inst.out, inst.arg);
        let already_done = !next.is_empty();

        match op {
            InstOp::Alt | InstOp::AltMatch => {
                if !(self.check(out) && self.check(arg)) {
                    return false;
                }

                let (mut out, mut arg) = (out, arg);
                let mut match_out = self.matches[out];
                let match_arg = self.matches[arg];

                // Both branches reach a match without consuming input.
                if match_out && match_arg {
                    return false;
                }

                // The branch that matches on empty input goes to `out`.
                if match_arg {
                    mem::swap(&mut out, &mut arg);
                    self.p.insts[pc].out = out;
                    self.p.insts[pc].arg = arg;
                    match_out = true;
                }

                if match_out {
                    self.matches[pc] = true;
                    self.p.insts[pc].op = InstOp::AltMatch;
                }

                let merged = merge_rune_sets(
                    &self.runes[out],
                    &self.runes[arg],
                    out,
                    arg,
                );
                match merged {
                    Some((runes, next)) => {
                        self.runes[pc] = runes;
                        self.p.insts[pc].next = next;
                    }
                    None => return false,
                }
            }
            InstOp::Capture | InstOp::Nop | InstOp::EmptyWidth => {
                let ok = self.check(out);
                self.pass_through(pc, out);
                return ok;
            }
            InstOp::Match | InstOp::Fail => {
                self.matches[pc] = op == InstOp::Match;
            }
            InstOp::Rune
            | InstOp::Rune1
            | InstOp::RuneAny
            | InstOp::RuneAnyNotNL => {
                self.matches[pc] = false;
                if already_done {
                    return true;
                }
                self.inst_queue.insert(out);
                let runes = match op {
                    InstOp::RuneAny => ANY_RUNE.to_vec(),
                    InstOp::RuneAnyNotNL => ANY_RUNE_NOT_NL.to_vec(),
                    _ => self.p.insts[pc].runes.clone(),
                };
                self.consume(pc, runes);
                if op == InstOp::Rune1 {
                    self.p.insts[pc].op = InstOp::Rune;
                }
            }
        }

        true
    }
}

/// Restores the instructions that the one-pass executor runs the same way
/// the other engines do, and drops the `next` tables it doesn't need.
fn cleanup(p: &mut OnePassProgram, original: &Program) {
    for (inst, orig) in p.insts.iter_mut().zip(original.insts.iter()) {
        match orig.op {
            InstOp::Alt | InstOp::AltMatch | InstOp::Rune => {}
            InstOp::Capture
            | InstOp::EmptyWidth
            | InstOp::Nop
            | InstOp::Match
            | InstOp::Fail => inst.next.clear(),
            InstOp::Rune1 | InstOp::RuneAny | InstOp::RuneAnyNotNL => {
                inst.inst = orig.clone();
                inst.next.clear();
            }
        }
    }
}
