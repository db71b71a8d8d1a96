/*! This module implements a bounded backtracking matcher.

The backtracker explores the program depth-first, trying the preferred
branch of each `Alt` first and the alternative one later. Exploring a
program this way takes exponential time in the worst case, unless each
(instruction, position) pair is explored at most once. [`BitState`] keeps
a bitmap with one bit per pair for this purpose, which makes the matcher
linear in the size of the input, but requires `num_insts × (len + 1)` bits
of memory. For this reason the backtracker is used only with short programs
and short inputs: see [`max_bitstate_len`].

The bitmap is not cleared between start positions in an unanchored search.
A pair that failed to lead to a match when reached from an earlier start
position won't lead to a match from a later one either.
*/

use bitvec::vec::BitVec;

use crate::input::Input;
use crate::program::{EmptyOp, InstOp, Program};
use crate::regexp::Regexp;


/// Programs with more instructions than this never use the backtracker.
const MAX_BACKTRACK_PROG: usize = 500;

/// Maximum size in bits of the visited bitmap.
const MAX_BACKTRACK_VECTOR: usize = 256 * 1024;

/// Returns the maximum input length, in bytes, for which the backtracker
/// can be used with `prog`. The backtracker is used only when the input is
/// strictly shorter than this, so 0 means "never".
pub(crate) fn max_bitstate_len(prog: &Program) -> usize {
    if prog.num_insts() > MAX_BACKTRACK_PROG {
        return 0;
    }
    MAX_BACKTRACK_VECTOR / prog.num_insts()
}

/// Pending work for the backtracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Job {
    /// Explore instruction `pc` at input position `pos`.
    Explore { pc: usize, pos: usize },
    /// The preferred branch of the `Alt` at `pc` has been explored, explore
    /// the alternative one.
    AltSecond { pc: usize, pos: usize },
    /// Restore capture slot `slot` to `old` once the path that set it has
    /// been explored.
    RestoreCapture { slot: usize, old: Option<usize> },
}

/// State of the bounded backtracker.
#[derive(Debug, Default)]
pub(crate) struct BitState {
    /// Length of the input.
    end: usize,
    /// Capture slots for the path being explored.
    cap: Vec<Option<usize>>,
    /// Capture slots of the best match found so far.
    matchcap: Vec<Option<usize>>,
    jobs: Vec<Job>,
    /// One bit per (instruction, position) pair.
    visited: BitVec<usize>,
}

impl BitState {
    /// Capture slots recorded by the last successful call to
    /// [`BitState::backtrack`].
    #[inline]
    pub fn captures(&self) -> &[Option<usize>] {
        self.matchcap.as_slice()
    }

    /// Prepares the state for matching a program with `num_insts`
    /// instructions against an input of `end` bytes.
    fn reset(&mut self, num_insts: usize, end: usize, ncap: usize) {
        self.end = end;
        self.jobs.clear();

        self.visited.clear();
        self.visited.resize(num_insts * (end + 1), false);

        self.cap.clear();
        self.cap.resize(ncap, None);

        self.matchcap.clear();
        self.matchcap.resize(ncap, None);
    }

    /// Marks the (`pc`, `pos`) pair as visited, returns false if it was
    /// visited already.
    #[inline]
    fn should_visit(&mut self, pc: usize, pos: usize) -> bool {
        let n = pc * (self.end + 1) + pos;
        if self.visited[n] {
            return false;
        }
        self.visited.set(n, true);
        true
    }

    /// Schedules the exploration of `pc` at `pos`, unless `pc` is a `Fail`
    /// instruction or the pair was visited already.
    #[inline]
    fn push(&mut self, prog: &Program, pc: usize, pos: usize) {
        if prog.insts[pc].op != InstOp::Fail && self.should_visit(pc, pos) {
            self.jobs.push(Job::Explore { pc, pos });
        }
    }

    /// Explores the program starting at `pc` and `pos`. Returns true if a
    /// match was found.
    fn try_backtrack<I: Input>(
        &mut self,
        re: &Regexp,
        input: &mut I,
        pc: usize,
        pos: usize,
    ) -> bool {
        let prog = &re.prog;
        let longest = re.longest;

        self.push(prog, pc, pos);

        while let Some(job) = self.jobs.pop() {
            let (mut pc, mut pos, mut second) = match job {
                Job::Explore { pc, pos } => (pc, pos, false),
                Job::AltSecond { pc, pos } => (pc, pos, true),
                Job::RestoreCapture { slot, old } => {
                    self.cap[slot] = old;
                    continue;
                }
            };

            // The pair taken from the stack was already marked as visited
            // when it was pushed, the check is done only for the pairs
            // reached from it.
            let mut check = false;

            loop {
                if check && !self.should_visit(pc, pos) {
                    break;
                }
                check = true;

                let inst = &prog.insts[pc];

                match inst.op {
                    InstOp::Fail => {
                        unreachable!("Fail instruction in backtracker")
                    }
                    InstOp::Alt => {
                        if second {
                            second = false;
                            pc = inst.arg;
                        } else {
                            self.jobs.push(Job::AltSecond { pc, pos });
                            pc = inst.out;
                        }
                    }
                    InstOp::AltMatch => {
                        // One branch consumes runes, the other one leads
                        // to a match.
                        if prog.insts[inst.out].op.consumes_rune() {
                            self.push(prog, inst.arg, pos);
                            pc = inst.arg;
                            pos = self.end;
                        } else {
                            self.push(prog, inst.out, self.end);
                            pc = inst.out;
                        }
                    }
                    InstOp::Rune
                    | InstOp::Rune1
                    | InstOp::RuneAny
                    | InstOp::RuneAnyNotNL => {
                        let (r, width) = input.step(pos);
                        if !inst.matches_rune(r) {
                            break;
                        }
                        pos += width;
                        pc = inst.out;
                    }
                    InstOp::Capture => {
                        if inst.arg < self.cap.len() {
                            self.jobs.push(Job::RestoreCapture {
                                slot: inst.arg,
                                old: self.cap[inst.arg],
                            });
                            self.cap[inst.arg] = Some(pos);
                        }
                        pc = inst.out;
                    }
                    InstOp::EmptyWidth => {
                        if !input.context(pos).matches(inst.empty_op()) {
                            break;
                        }
                        pc = inst.out;
                    }
                    InstOp::Nop => {
                        pc = inst.out;
                    }
                    InstOp::Match => {
                        // Only whether there's a match or not matters.
                        if self.cap.is_empty() {
                            return true;
                        }

                        if self.cap.len() > 1 {
                            self.cap[1] = Some(pos);
                        }

                        let better = match self.matchcap[1] {
                            None => true,
                            Some(old) => longest && pos > 0 && pos > old,
                        };

                        if better {
                            self.matchcap.copy_from_slice(&self.cap);
                        }

                        // In leftmost-first mode the first match found is
                        // the one with the highest priority.
                        if !longest {
                            return true;
                        }

                        // Nothing can be longer than the whole input.
                        if pos == self.end {
                            return true;
                        }

                        break;
                    }
                }
            }
        }

        longest && self.matchcap.len() > 1 && self.matchcap[1].is_some()
    }

    /// Searches for a match of `re` in `input`, which is `end` bytes long,
    /// starting at `pos` and recording up to `ncap` capture slots. Returns
    /// true if a match was found, its capture slots are available in
    /// [`BitState::captures`].
    pub fn backtrack<I: Input>(
        &mut self,
        re: &Regexp,
        input: &mut I,
        end: usize,
        mut pos: usize,
        ncap: usize,
    ) -> bool {
        let start_cond = match re.cond {
            Some(cond) => cond,
            None => return false,
        };

        let anchored = start_cond.contains(EmptyOp::BEGIN_TEXT);

        // Anchored regexps can only match at the start of the input.
        if anchored && pos != 0 {
            return false;
        }

        self.reset(re.prog.num_insts(), end, ncap);

        if anchored {
            if !self.cap.is_empty() {
                self.cap[0] = Some(pos);
            }
            return self.try_backtrack(re, input, re.prog.start, pos);
        }

        // Unanchored search, try every start position in turn.
        while pos <= end {
            if !re.prefix.is_empty() {
                match input.index(re.prefix.as_bytes(), pos) {
                    Some(advance) => pos += advance,
                    None => return false,
                }
            }

            if !self.cap.is_empty() {
                self.cap[0] = Some(pos);
            }

            if self.try_backtrack(re, input, re.prog.start, pos) {
                return true;
            }

            let (_, width) = input.step(pos);
            if width == 0 {
                break;
            }
            pos += width;
        }

        false
    }
}
