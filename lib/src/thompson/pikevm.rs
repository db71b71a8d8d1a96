use std::mem;

use crate::input::Input;
use crate::lazyflag::LazyFlag;
use crate::program::{EmptyOp, InstOp, Program};
use crate::regexp::Regexp;

/// A thread of execution: an instruction and the capture slots recorded
/// along the path that led to it.
#[derive(Debug)]
struct Thread {
    pc: usize,
    cap: Vec<Option<usize>>,
}

/// An entry in a [`Queue`]. The thread is absent for instructions that
/// don't consume runes, which are visited only to reach other ones.
#[derive(Debug)]
struct Entry {
    pc: usize,
    thread: Option<Thread>,
}

/// Pending work for [`PikeVM::add`].
#[derive(Debug)]
enum Frame {
    /// Follow the paths that start at the given pc.
    Explore(usize),
    /// Put back the value a capture slot had before a `Capture`
    /// instruction overwrote it.
    RestoreCapture { slot: usize, old: Option<usize> },
}

/// An ordered set of threads, indexed by pc.
///
/// Like [`crate::sparse::SparseSet`], but each value carries a thread.
#[derive(Debug, Default)]
struct Queue {
    sparse: Vec<usize>,
    dense: Vec<Entry>,
}

impl Queue {
    /// Makes sure that the queue can hold pcs in the range `0..size`.
    fn resize(&mut self, size: usize) {
        if self.sparse.len() < size {
            self.sparse.resize(size, 0);
            self.dense.reserve(size - self.dense.len());
        }
    }

    #[inline]
    fn contains(&self, pc: usize) -> bool {
        let j = self.sparse[pc];
        j < self.dense.len() && self.dense[j].pc == pc
    }

    /// Adds `pc` to the queue, returning its index in `dense`.
    #[inline]
    fn insert(&mut self, pc: usize) -> usize {
        let j = self.dense.len();
        self.sparse[pc] = j;
        self.dense.push(Entry { pc, thread: None });
        j
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

/// A Pike VM. One instance can be reused with any number of programs,
/// [`PikeVM::reset`] must be called before running a new one.
#[derive(Debug, Default)]
pub(crate) struct PikeVM {
    /// Threads for the current position.
    q0: Queue,
    /// Threads for the next position.
    q1: Queue,
    /// Threads no longer in use, kept for reusing their capture slots.
    free: Vec<Thread>,
    /// Scratch copy of the capture slots of the thread being stepped.
    scratch: Vec<Option<usize>>,
    /// True once some thread reached a `Match` instruction.
    matched: bool,
    /// Capture slots of the best match found so far.
    matchcap: Vec<Option<usize>>,
    /// Number of capture slots recorded by each thread.
    ncap: usize,
    /// Stack used by [`PikeVM::add`], kept for reusing its allocation.
    stack: Vec<Frame>,
}

impl PikeVM {
    /// Prepares the VM for running a program with up to `num_insts`
    /// instructions and recording `ncap` capture slots.
    pub fn reset(&mut self, num_insts: usize, ncap: usize) {
        for t in self.free.iter_mut() {
            t.cap.resize(ncap, None);
        }
        self.ncap = ncap;
        self.matchcap.resize(ncap, None);
        self.scratch.resize(ncap, None);
        self.q0.resize(num_insts);
        self.q1.resize(num_insts);
    }

    /// Capture slots recorded by the last successful call to
    /// [`PikeVM::try_match`].
    #[inline]
    pub fn captures(&self) -> &[Option<usize>] {
        self.matchcap.as_slice()
    }

    fn alloc(&mut self, pc: usize) -> Thread {
        match self.free.pop() {
            Some(mut t) => {
                t.pc = pc;
                t
            }
            None => Thread { pc, cap: vec![None; self.ncap] },
        }
    }

    /// Moves every thread still in `q` to the free list.
    fn clear(&mut self, q: &mut Queue) {
        for entry in q.dense.drain(..) {
            if let Some(t) = entry.thread {
                self.free.push(t);
            }
        }
    }

    /// Searches for a match of `re` in `input`, starting at `pos`. Returns
    /// true if a match was found, its capture slots are available in
    /// [`PikeVM::captures`].
    ///
    /// # Panics
    ///
    /// If the VM was not sized for the program with [`PikeVM::reset`].
    pub fn try_match<I: Input>(
        &mut self,
        re: &Regexp,
        input: &mut I,
        mut pos: usize,
    ) -> bool {
        let start_cond = match re.cond {
            Some(cond) => cond,
            None => return false,
        };

        let prog = &re.prog;

        assert!(
            self.q0.sparse.len() >= prog.num_insts(),
            "PikeVM sized for {} instructions, program has {}",
            self.q0.sparse.len(),
            prog.num_insts()
        );

        let anchored = start_cond.contains(EmptyOp::BEGIN_TEXT);

        self.matched = false;
        self.matchcap.fill(None);

        let mut runq = mem::take(&mut self.q0);
        let mut nextq = mem::take(&mut self.q1);

        let (mut r, mut width) = input.step(pos);
        let (mut r1, mut width1) = if r.is_some() {
            input.step(pos + width)
        } else {
            (None, 0)
        };

        let mut flag = if pos == 0 {
            LazyFlag::new(None, r)
        } else {
            input.context(pos)
        };

        loop {
            if runq.is_empty() {
                // Anchored search and no threads left, there's no match.
                if anchored && pos != 0 {
                    break;
                }
                // There's a match and no threads with higher priority.
                if self.matched {
                    break;
                }
                // Jump to the next occurrence of the literal prefix, if the
                // current rune is not its first one.
                if !re.prefix.is_empty()
                    && r != re.prefix_rune
                    && input.can_check_prefix()
                {
                    match input.index(re.prefix.as_bytes(), pos) {
                        Some(advance) => pos += advance,
                        None => break,
                    }
                    (r, width) = input.step(pos);
                    (r1, width1) = input.step(pos + width);
                    flag = input.context(pos);
                }
            }

            // Start a new thread at the current position, unless a match
            // was found already. A new thread would have lower priority
            // than the existing ones.
            if !self.matched && (pos == 0 || !anchored) {
                let mut cap = mem::take(&mut self.matchcap);
                if !cap.is_empty() {
                    cap[0] = Some(pos);
                }
                let unused = self.add(
                    prog,
                    &mut runq,
                    prog.start,
                    pos,
                    &mut cap,
                    &flag,
                    None,
                );
                debug_assert!(unused.is_none());
                self.matchcap = cap;
            }

            flag = LazyFlag::new(r, r1);

            self.step(
                prog,
                re.longest,
                &mut runq,
                &mut nextq,
                pos,
                pos + width,
                r,
                &flag,
            );

            if width == 0 {
                break;
            }

            // When captures are not needed any match is good enough.
            if self.matchcap.is_empty() && self.matched {
                break;
            }

            pos += width;
            (r, width) = (r1, width1);
            if r.is_some() {
                (r1, width1) = input.step(pos + width);
            }

            mem::swap(&mut runq, &mut nextq);
        }

        self.clear(&mut runq);
        self.clear(&mut nextq);

        self.q0 = runq;
        self.q1 = nextq;

        self.matched
    }

    /// Executes one step of the VM: advances every thread in `runq` over
    /// rune `c`, the one at `pos`, and adds the resulting threads to
    /// `nextq`. `runq` is left empty.
    #[allow(clippy::too_many_arguments)]
    fn step(
        &mut self,
        prog: &Program,
        longest: bool,
        runq: &mut Queue,
        nextq: &mut Queue,
        pos: usize,
        next_pos: usize,
        c: Option<char>,
        next_cond: &LazyFlag,
    ) {
        let mut scratch = mem::take(&mut self.scratch);
        let mut j = 0;

        while j < runq.dense.len() {
            let t = runq.dense[j].thread.take();
            j += 1;

            let mut t = match t {
                Some(t) => t,
                None => continue,
            };

            // In leftmost-longest mode, threads that started after the
            // current match can't produce a better one.
            if longest
                && self.matched
                && !t.cap.is_empty()
                && self.matchcap[0] < t.cap[0]
            {
                self.free.push(t);
                continue;
            }

            let inst = &prog.insts[t.pc];

            let advance = match inst.op {
                InstOp::Match => {
                    if !t.cap.is_empty()
                        && (!longest
                            || !self.matched
                            || self.matchcap[1] < Some(pos))
                    {
                        t.cap[1] = Some(pos);
                        self.matchcap.copy_from_slice(&t.cap);
                    }
                    if !longest {
                        // Leftmost-first: the remaining threads have lower
                        // priority than this one, discard them.
                        for entry in runq.dense.drain(j..) {
                            if let Some(t) = entry.thread {
                                self.free.push(t);
                            }
                        }
                    }
                    self.matched = true;
                    false
                }
                InstOp::Rune
                | InstOp::Rune1
                | InstOp::RuneAny
                | InstOp::RuneAnyNotNL => inst.matches_rune(c),
                op => unreachable!("{:?} in thread list", op),
            };

            if advance {
                scratch.clear();
                scratch.extend_from_slice(&t.cap);
                let t = self.add(
                    prog,
                    nextq,
                    inst.out,
                    next_pos,
                    &mut scratch,
                    next_cond,
                    Some(t),
                );
                if let Some(t) = t {
                    self.free.push(t);
                }
            } else {
                self.free.push(t);
            }
        }

        runq.dense.clear();
        self.scratch = scratch;
    }

    /// Follows every path from `pc` that doesn't consume input, adding to
    /// `q` the instructions found along the way, in priority order. Threads
    /// are created for the instructions that consume runes, and for `Match`.
    ///
    /// `cap` holds the capture slots for the path, it's restored to its
    /// original value before returning. `t`, if given, is a thread that
    /// can be reused instead of allocating a new one. If it's not used,
    /// it's returned back.
    ///
    /// Paths are followed with an explicit stack instead of recursion, the
    /// number of pending paths grows with the size of the program.
    #[allow(clippy::too_many_arguments)]
    fn add(
        &mut self,
        prog: &Program,
        q: &mut Queue,
        pc: usize,
        pos: usize,
        cap: &mut [Option<usize>],
        cond: &LazyFlag,
        mut t: Option<Thread>,
    ) -> Option<Thread> {
        let mut stack = mem::take(&mut self.stack);
        stack.push(Frame::Explore(pc));

        while let Some(frame) = stack.pop() {
            let mut pc = match frame {
                Frame::Explore(pc) => pc,
                Frame::RestoreCapture { slot, old } => {
                    cap[slot] = old;
                    continue;
                }
            };

            loop {
                if pc == 0 || q.contains(pc) {
                    break;
                }

                let j = q.insert(pc);
                let inst = &prog.insts[pc];

                match inst.op {
                    InstOp::Fail => break,
                    InstOp::Alt | InstOp::AltMatch => {
                        stack.push(Frame::Explore(inst.arg));
                        pc = inst.out;
                    }
                    InstOp::EmptyWidth => {
                        if !cond.matches(inst.empty_op()) {
                            break;
                        }
                        pc = inst.out;
                    }
                    InstOp::Nop => {
                        pc = inst.out;
                    }
                    InstOp::Capture => {
                        if inst.arg < cap.len() {
                            stack.push(Frame::RestoreCapture {
                                slot: inst.arg,
                                old: cap[inst.arg],
                            });
                            cap[inst.arg] = Some(pos);
                        }
                        pc = inst.out;
                    }
                    InstOp::Match
                    | InstOp::Rune
                    | InstOp::Rune1
                    | InstOp::RuneAny
                    | InstOp::RuneAnyNotNL => {
                        let mut thread = match t.take() {
                            Some(mut thread) => {
                                thread.pc = pc;
                                thread
                            }
                            None => self.alloc(pc),
                        };
                        thread.cap.copy_from_slice(cap);
                        q.dense[j].thread = Some(thread);
                        break;
                    }
                }
            }
        }

        self.stack = stack;
        t
    }
}
