use crate::input::Input;
use crate::lazyflag::LazyFlag;
use crate::onepass::{next_pc, OnePassProgram};
use crate::program::InstOp;
use crate::regexp::Regexp;

/// Executes a [`OnePassProgram`].
///
/// As the program is one-pass, there's a single thread of execution that
/// moves forward one rune at a time, so the only state that must be kept
/// between runs are the capture slots.
#[derive(Debug, Default)]
pub(crate) struct OnePassVM {
    matchcap: Vec<Option<usize>>,
}

impl OnePassVM {
    /// Capture slots recorded by the last successful call to
    /// [`OnePassVM::try_match`].
    #[inline]
    pub fn captures(&self) -> &[Option<usize>] {
        self.matchcap.as_slice()
    }

    /// Runs `prog` on `input` starting at `pos`, recording up to `ncap`
    /// capture slots. Returns true if the input matches.
    pub fn try_match<I: Input>(
        &mut self,
        re: &Regexp,
        prog: &OnePassProgram,
        input: &mut I,
        mut pos: usize,
        ncap: usize,
    ) -> bool {
        if re.cond.is_none() {
            return false;
        }

        self.matchcap.clear();
        self.matchcap.resize(ncap, None);

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

        let mut pc = prog.start;

        // The start instruction is the BEGIN_TEXT assertion, if the literal
        // prefix follows it the prefix is verified at once.
        if pos == 0
            && flag.matches(prog.insts[pc].empty_op())
            && !re.prefix.is_empty()
            && input.can_check_prefix()
        {
            if !input.has_prefix(re.prefix.as_bytes()) {
                return false;
            }
            pos += re.prefix.len();
            (r, width) = input.step(pos);
            (r1, width1) = input.step(pos + width);
            flag = input.context(pos);
            pc = re.prefix_end;
        }

        loop {
            let inst = &prog.insts[pc];
            pc = inst.out;
            match inst.op {
                InstOp::Match => {
                    if self.matchcap.len() > 1 {
                        self.matchcap[0] = Some(0);
                        self.matchcap[1] = Some(pos);
                    }
                    return true;
                }
                InstOp::Rune
                | InstOp::Rune1
                | InstOp::RuneAny
                | InstOp::RuneAnyNotNL => {
                    if !inst.matches_rune(r) {
                        return false;
                    }
                }
                InstOp::Alt | InstOp::AltMatch => {
                    pc = next_pc(inst, r);
                    continue;
                }
                InstOp::Fail => return false,
                InstOp::Nop => continue,
                InstOp::EmptyWidth => {
                    if !flag.matches(inst.empty_op()) {
                        return false;
                    }
                    continue;
                }
                InstOp::Capture => {
                    if inst.arg < self.matchcap.len() {
                        self.matchcap[inst.arg] = Some(pos);
                    }
                    continue;
                }
            }

            if width == 0 {
                return false;
            }

            flag = LazyFlag::new(r, r1);
            pos += width;
            (r, width) = (r1, width1);
            if r.is_some() {
                (r1, width1) = input.step(pos + width);
            }
        }
    }
}
