/*!
This module provides a compiler that takes a regexp's [`Hir`] and produces
the [`Program`] executed by the matching engines.

The compiler follows [Thompson's construction][1]: each node in the HIR
becomes a fragment, a group of instructions with a single entry point and a
list of dangling exits (holes) that are patched once the next fragment is
known. The HIR is traversed depth-first with [`regex_syntax::hir::visit`],
and fragments are kept in a stack until their parent node is visited.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
*/

use std::mem::size_of;

use bstr::ByteSlice;
use regex_syntax::hir::{
    visit, Capture, Class, Hir, HirKind, Literal, Look, Repetition, Visitor,
};

use crate::errors::Error;
use crate::program::{EmptyOp, Inst, InstOp, Program};

/// Default limit for the size of a compiled program, in bytes.
pub const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A dangling exit of a fragment, identified by the instruction and the
/// field that must be patched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hole {
    Out(usize),
    Arg(usize),
}

impl Hole {
    fn relocate(self, offset: usize) -> Self {
        match self {
            Hole::Out(pc) => Hole::Out(pc + offset),
            Hole::Arg(pc) => Hole::Arg(pc + offset),
        }
    }
}

/// A compiled portion of the program.
#[derive(Debug)]
struct Frag {
    /// Entry point. 0 means that the fragment never matches.
    start: usize,
    /// Exits that must be patched with the entry point of whatever comes
    /// after this fragment.
    holes: Vec<Hole>,
    /// True if the fragment can match the empty string.
    nullable: bool,
}

impl Frag {
    fn fail() -> Self {
        Self { start: 0, holes: Vec::new(), nullable: false }
    }

    #[inline]
    fn is_fail(&self) -> bool {
        self.start == 0
    }
}

/// Compiles a regular expression into a [`Program`].
pub(crate) struct Compiler {
    insts: Vec<Inst>,
    /// Number of capture slots used so far. Slots 0 and 1 are always used
    /// by the whole match.
    num_cap: usize,
    /// Approximate size in bytes of the instructions emitted so far.
    size: usize,
    size_limit: usize,
    /// Fragments produced by already visited nodes whose parent has not been
    /// visited yet.
    frags: Vec<Frag>,
    /// Index of the first instruction emitted for each repetition currently
    /// being visited.
    bookmarks: Vec<usize>,
}

impl Compiler {
    /// Creates a new regexp compiler.
    pub fn new() -> Self {
        Self {
            insts: Vec::new(),
            num_cap: 2,
            size: 0,
            size_limit: DEFAULT_SIZE_LIMIT,
            frags: Vec::new(),
            bookmarks: Vec::new(),
        }
    }

    /// Maximum size in bytes of the compiled program. [`Compiler::compile`]
    /// returns [`Error::TooLarge`] if the limit is exceeded.
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Given the high-level intermediate representation (HIR) of a regular
    /// expression, produces its program.
    pub fn compile(mut self, hir: &Hir) -> Result<Program, Error> {
        self.emit(Inst::new(InstOp::Fail))?;
        visit(hir, self)
    }
}

impl Compiler {
    fn emit(&mut self, inst: Inst) -> Result<usize, Error> {
        self.size +=
            size_of::<Inst>() + inst.runes.len() * size_of::<(char, char)>();
        if self.size > self.size_limit {
            return Err(Error::TooLarge { limit: self.size_limit });
        }
        self.insts.push(inst);
        Ok(self.insts.len() - 1)
    }

    fn patch(&mut self, holes: &[Hole], target: usize) {
        for hole in holes {
            match *hole {
                Hole::Out(pc) => self.insts[pc].out = target,
                Hole::Arg(pc) => self.insts[pc].arg = target,
            }
        }
    }

    fn nop(&mut self) -> Result<Frag, Error> {
        let pc = self.emit(Inst::new(InstOp::Nop))?;
        Ok(Frag { start: pc, holes: vec![Hole::Out(pc)], nullable: true })
    }

    fn empty_width(&mut self, op: EmptyOp) -> Result<Frag, Error> {
        let mut inst = Inst::new(InstOp::EmptyWidth);
        inst.arg = op.bits() as usize;
        let pc = self.emit(inst)?;
        Ok(Frag { start: pc, holes: vec![Hole::Out(pc)], nullable: true })
    }

    fn capture(&mut self, slot: usize) -> Result<Frag, Error> {
        let mut inst = Inst::new(InstOp::Capture);
        inst.arg = slot;
        let pc = self.emit(inst)?;
        self.num_cap = self.num_cap.max(slot + 1);
        Ok(Frag { start: pc, holes: vec![Hole::Out(pc)], nullable: true })
    }

    fn rune(&mut self, runes: Vec<(char, char)>) -> Result<Frag, Error> {
        if runes.is_empty() {
            return Ok(Frag::fail());
        }

        let op = match runes.as_slice() {
            [(lo, hi)] if lo == hi => InstOp::Rune1,
            [('\0', char::MAX)] => InstOp::RuneAny,
            [('\0', '\x09'), ('\x0b', char::MAX)] => InstOp::RuneAnyNotNL,
            _ => InstOp::Rune,
        };

        let mut inst = Inst::new(op);
        inst.runes = runes;

        let pc = self.emit(inst)?;
        Ok(Frag { start: pc, holes: vec![Hole::Out(pc)], nullable: false })
    }

    fn cat(&mut self, f1: Frag, f2: Frag) -> Frag {
        if f1.is_fail() || f2.is_fail() {
            return Frag::fail();
        }
        self.patch(&f1.holes, f2.start);
        Frag {
            start: f1.start,
            holes: f2.holes,
            nullable: f1.nullable && f2.nullable,
        }
    }

    fn alt(&mut self, f1: Frag, f2: Frag) -> Result<Frag, Error> {
        if f1.is_fail() {
            return Ok(f2);
        }
        if f2.is_fail() {
            return Ok(f1);
        }
        let mut inst = Inst::new(InstOp::Alt);
        inst.out = f1.start;
        inst.arg = f2.start;
        let pc = self.emit(inst)?;

        let mut holes = f1.holes;
        holes.extend(f2.holes);

        Ok(Frag { start: pc, holes, nullable: f1.nullable || f2.nullable })
    }

    /// `f?`, the preferred branch of the `Alt` is `f` unless `non_greedy`.
    fn quest(&mut self, f: Frag, non_greedy: bool) -> Result<Frag, Error> {
        let mut inst = Inst::new(InstOp::Alt);
        let mut holes = Vec::with_capacity(f.holes.len() + 1);
        if non_greedy {
            inst.arg = f.start;
            holes.push(Hole::Out(self.insts.len()));
        } else {
            inst.out = f.start;
            holes.push(Hole::Arg(self.insts.len()));
        }
        let pc = self.emit(inst)?;
        holes.extend(f.holes);
        Ok(Frag { start: pc, holes, nullable: true })
    }

    /// Builds the `Alt` that loops back into `f`, the returned fragment
    /// starts at the `Alt`.
    fn repeat(&mut self, f: Frag, non_greedy: bool) -> Result<Frag, Error> {
        let mut inst = Inst::new(InstOp::Alt);
        let hole = if non_greedy {
            inst.arg = f.start;
            Hole::Out(self.insts.len())
        } else {
            inst.out = f.start;
            Hole::Arg(self.insts.len())
        };
        let pc = self.emit(inst)?;
        self.patch(&f.holes, pc);
        Ok(Frag { start: pc, holes: vec![hole], nullable: true })
    }

    fn star(&mut self, f: Frag, non_greedy: bool) -> Result<Frag, Error> {
        // When `f` can match the empty string, `f*` is compiled as `(f+)?`,
        // otherwise an empty iteration could take priority over a
        // non-empty one.
        if f.nullable {
            let plus = self.plus(f, non_greedy)?;
            return self.quest(plus, non_greedy);
        }
        self.repeat(f, non_greedy)
    }

    fn plus(&mut self, f: Frag, non_greedy: bool) -> Result<Frag, Error> {
        let start = f.start;
        let nullable = f.nullable;
        let loop_frag = self.repeat(f, non_greedy)?;
        Ok(Frag { start, holes: loop_frag.holes, nullable })
    }

    /// Emits a copy of the instructions in `start..end`, which contain the
    /// code for fragment `f`, and returns the fragment for the copy.
    fn clone_frag(
        &mut self,
        f: &Frag,
        start: usize,
        end: usize,
    ) -> Result<Frag, Error> {
        if f.is_fail() {
            return Ok(Frag::fail());
        }
        let offset = self.insts.len() - start;
        for pc in start..end {
            let mut inst = self.insts[pc].clone();
            if inst.out != 0 {
                inst.out += offset;
            }
            if inst.op.is_alt() && inst.arg != 0 {
                inst.arg += offset;
            }
            self.emit(inst)?;
        }
        Ok(Frag {
            start: f.start + offset,
            holes: f.holes.iter().map(|h| h.relocate(offset)).collect(),
            nullable: f.nullable,
        })
    }

    fn pop_frags(&mut self, n: usize) -> Vec<Frag> {
        let at = self.frags.len() - n;
        self.frags.split_off(at)
    }

    fn visit_post_literal(
        &mut self,
        literal: &Literal,
    ) -> Result<Frag, Error> {
        let mut frags = Vec::with_capacity(literal.0.len());
        for c in literal.0.chars() {
            frags.push(self.rune(vec![(c, c)])?);
        }
        self.cat_all(frags)
    }

    fn visit_post_class(&mut self, class: &Class) -> Result<Frag, Error> {
        let runes = match class {
            Class::Unicode(class) => class
                .ranges()
                .iter()
                .map(|range| (range.start(), range.end()))
                .collect(),
            Class::Bytes(class) => {
                let mut runes = Vec::with_capacity(class.ranges().len());
                for range in class.ranges() {
                    if !range.end().is_ascii() {
                        return Err(Error::Unsupported(format!(
                            "non-ASCII byte class {:?}",
                            range
                        )));
                    }
                    runes.push((
                        char::from(range.start()),
                        char::from(range.end()),
                    ));
                }
                runes
            }
        };
        self.rune(runes)
    }

    fn visit_post_look(&mut self, look: &Look) -> Result<Frag, Error> {
        let op = match look {
            Look::Start => EmptyOp::BEGIN_TEXT,
            Look::End => EmptyOp::END_TEXT,
            Look::StartLF => EmptyOp::BEGIN_LINE,
            Look::EndLF => EmptyOp::END_LINE,
            Look::WordAscii | Look::WordUnicode => EmptyOp::WORD_BOUNDARY,
            Look::WordAsciiNegate | Look::WordUnicodeNegate => {
                EmptyOp::NO_WORD_BOUNDARY
            }
            other => {
                return Err(Error::Unsupported(format!("{:?}", other)));
            }
        };
        self.empty_width(op)
    }

    fn visit_post_capture(
        &mut self,
        capture: &Capture,
    ) -> Result<Frag, Error> {
        let sub = self.pop_frags(1).remove(0);
        let index = capture.index as usize;
        let bra = self.capture(2 * index)?;
        let ket = self.capture(2 * index + 1)?;
        let frag = self.cat(bra, sub);
        Ok(self.cat(frag, ket))
    }

    fn visit_post_repetition(
        &mut self,
        rep: &Repetition,
    ) -> Result<Frag, Error> {
        let sub = self.pop_frags(1).remove(0);
        let start = match self.bookmarks.pop() {
            Some(start) => start,
            None => unreachable!("repetition without bookmark"),
        };
        let end = self.insts.len();
        let non_greedy = !rep.greedy;

        let copies = match rep.max {
            Some(max) => max as usize,
            None => (rep.min as usize).max(1),
        };

        // `x{0}` matches the empty string, the code already emitted for `x`
        // is unreachable and can be discarded.
        if copies == 0 {
            self.insts.truncate(start);
            return self.nop();
        }

        // All the copies must be made before patching any hole, because
        // patching modifies the original code.
        let mut subs = Vec::with_capacity(copies);
        for _ in 1..copies {
            subs.push(self.clone_frag(&sub, start, end)?);
        }
        subs.insert(0, sub);

        let min = rep.min as usize;
        let mut optional = subs.split_off(min.min(copies));

        match rep.max {
            None if min == 0 => {
                let sub = optional.remove(0);
                self.star(sub, non_greedy)
            }
            None => {
                // x{n,} is n-1 copies of x followed by x+.
                let last = match subs.pop() {
                    Some(last) => last,
                    None => unreachable!(),
                };
                let plus = self.plus(last, non_greedy)?;
                subs.push(plus);
                self.cat_all(subs)
            }
            Some(_) => {
                // x{n,m} is n copies of x followed by m-n nested optional
                // copies: (x(x(x)?)?)?
                let mut suffix: Option<Frag> = None;
                while let Some(x) = optional.pop() {
                    let inner = match suffix.take() {
                        Some(suffix) => self.cat(x, suffix),
                        None => x,
                    };
                    suffix = Some(self.quest(inner, non_greedy)?);
                }
                subs.extend(suffix);
                self.cat_all(subs)
            }
        }
    }

    /// Concatenates the given fragments, an empty list produces a `Nop`.
    fn cat_all(&mut self, frags: Vec<Frag>) -> Result<Frag, Error> {
        let mut frag: Option<Frag> = None;
        for next in frags {
            frag = Some(match frag {
                Some(prev) => self.cat(prev, next),
                None => next,
            });
        }
        match frag {
            Some(frag) => Ok(frag),
            None => self.nop(),
        }
    }
}

impl Visitor for Compiler {
    type Output = Program;
    type Err = Error;

    fn finish(mut self) -> Result<Self::Output, Self::Err> {
        let frag = match self.frags.pop() {
            Some(frag) => frag,
            None => unreachable!("no fragment left after compiling"),
        };
        debug_assert!(self.frags.is_empty());
        let pc = self.emit(Inst::new(InstOp::Match))?;
        self.patch(&frag.holes, pc);
        Ok(Program::new(self.insts, frag.start, self.num_cap))
    }

    fn visit_pre(&mut self, hir: &Hir) -> Result<(), Self::Err> {
        if let HirKind::Repetition(_) = hir.kind() {
            self.bookmarks.push(self.insts.len());
        }
        Ok(())
    }

    fn visit_post(&mut self, hir: &Hir) -> Result<(), Self::Err> {
        let frag = match hir.kind() {
            HirKind::Empty => self.nop()?,
            HirKind::Literal(literal) => self.visit_post_literal(literal)?,
            HirKind::Class(class) => self.visit_post_class(class)?,
            HirKind::Look(look) => self.visit_post_look(look)?,
            HirKind::Capture(capture) => self.visit_post_capture(capture)?,
            HirKind::Repetition(rep) => self.visit_post_repetition(rep)?,
            HirKind::Concat(subs) => {
                let frags = self.pop_frags(subs.len());
                self.cat_all(frags)?
            }
            HirKind::Alternation(subs) => {
                let mut frag = Frag::fail();
                for next in self.pop_frags(subs.len()) {
                    frag = self.alt(frag, next)?;
                }
                frag
            }
        };
        self.frags.push(frag);
        Ok(())
    }
}
