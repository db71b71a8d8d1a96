/*! The [`Regexp`] type and its builder.

A [`Regexp`] owns the compiled [`Program`] and the metadata computed from it
at build time: the one-pass version of the program (if the regexp is
one-pass), the literal prefix, the required start assertions, and the limits
that decide which engine runs each search. Every search goes through
[`Regexp::execute`], which picks the engine:

1. The one-pass matcher, if the regexp is one-pass.
2. The bounded backtracker, if the length of the input is known and small
   enough for the program.
3. The Pike VM otherwise.

The engines keep some mutable state, which is taken from process-wide
pools for the duration of each search, so a [`Regexp`] can be shared by
any number of threads.
*/

use std::fmt::{Debug, Display, Formatter};
use std::io::Read;
use std::str::FromStr;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "logging")]
use log::*;

use crate::backtrack::{max_bitstate_len, BitState};
use crate::errors::Error;
use crate::input::{BytesInput, Input, ReaderInput, StrInput};
use crate::onepass::{self, OnePassProgram, OnePassVM};
use crate::parser::Parser;
use crate::pool::Pool;
use crate::program::compiler::{Compiler, DEFAULT_SIZE_LIMIT};
use crate::program::{EmptyOp, Program};
use crate::thompson::PikeVM;

/// Size classes for the Pike VM pools, by number of instructions. A VM
/// taken from pool `i` has queues for `MATCH_SIZE[i]` instructions, the
/// last pool holds VMs sized for each program.
const MATCH_SIZE: [usize; 5] = [128, 512, 2048, 16384, 0];

lazy_static! {
    static ref PIKEVM_POOLS: [Pool<PikeVM>; 5] = Default::default();
    static ref BITSTATE_POOL: Pool<BitState> = Pool::new();
    static ref ONEPASS_POOL: Pool<OnePassVM> = Pool::new();
}

/// Builds a [`Regexp`] with non-default options.
///
/// ```
/// # use regexp_core::RegexpBuilder;
/// let re = RegexpBuilder::new()
///     .case_insensitive(true)
///     .build(r"hello \w+")
///     .unwrap();
///
/// assert!(re.is_match_str("HELLO world"));
/// ```
#[derive(Clone, Debug)]
pub struct RegexpBuilder {
    parser: Parser,
    longest: bool,
    size_limit: usize,
}

impl Default for RegexpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexpBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            longest: false,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    /// Matches letters in a case-insensitive way, as if the regexp started
    /// with `(?i)`.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.parser = self.parser.case_insensitive(yes);
        self
    }

    /// Makes `^` and `$` match at the start and end of each line, as if
    /// the regexp started with `(?m)`.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.parser = self.parser.multi_line(yes);
        self
    }

    /// Allows `.` to match `\n`, as if the regexp started with `(?s)`.
    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.parser = self.parser.dot_matches_new_line(yes);
        self
    }

    /// Makes quantifiers non-greedy by default, and `?` makes them greedy,
    /// as if the regexp started with `(?U)`.
    pub fn swap_greed(mut self, yes: bool) -> Self {
        self.parser = self.parser.swap_greed(yes);
        self
    }

    /// Ignores whitespace in the pattern and allows `#` comments, as if the
    /// regexp started with `(?x)`.
    pub fn ignore_whitespace(mut self, yes: bool) -> Self {
        self.parser = self.parser.ignore_whitespace(yes);
        self
    }

    /// Maximum nesting depth of groups and repetitions. The default is 250.
    pub fn nest_limit(mut self, limit: u32) -> Self {
        self.parser = self.parser.nest_limit(limit);
        self
    }

    /// Prefers the leftmost-longest match instead of the leftmost-first
    /// one. See [`Regexp::set_longest`].
    pub fn longest(mut self, yes: bool) -> Self {
        self.longest = yes;
        self
    }

    /// Maximum size in bytes of the compiled program. The default is
    /// 10 MiB.
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Compiles `pattern` with the options in this builder.
    pub fn build(&self, pattern: &str) -> Result<Regexp, Error> {
        let parsed = self.parser.parse(pattern)?;
        let num_subexp = parsed.names.len() - 1;
        let min_input_len = parsed.hir.properties().minimum_len().unwrap_or(0);

        let prog = Compiler::new()
            .size_limit(self.size_limit)
            .compile(&parsed.hir)?;

        Ok(Regexp::with_program(
            pattern,
            prog,
            parsed.names,
            num_subexp,
            min_input_len,
            self.longest,
        ))
    }
}

/// A compiled regular expression.
///
/// Searches never modify the [`Regexp`], it can be used from multiple
/// threads at the same time.
#[derive(Clone)]
pub struct Regexp {
    /// Pattern as given when the regexp was built.
    expr: String,
    pub(crate) prog: Program,
    /// One-pass version of `prog`, if the regexp is one-pass.
    pub(crate) onepass: Option<OnePassProgram>,
    num_subexp: usize,
    /// Inputs shorter than this use the backtracker.
    pub(crate) max_bitstate_len: usize,
    subexp_names: Vec<Option<String>>,
    subexp_index: FxHashMap<String, usize>,
    /// Literal every match starts with.
    pub(crate) prefix: String,
    /// First rune of `prefix`.
    pub(crate) prefix_rune: Option<char>,
    /// For one-pass regexps, pc of the first instruction after the prefix.
    pub(crate) prefix_end: usize,
    /// True if `prefix` is the whole regexp.
    prefix_complete: bool,
    /// Index of the Pike VM pool used by this regexp.
    mpool: usize,
    /// Assertions required at the start of every match, `None` if the
    /// regexp can't match anything.
    pub(crate) cond: Option<EmptyOp>,
    /// Inputs shorter than this can't match.
    min_input_len: usize,
    /// Whether leftmost-longest semantics are used.
    pub(crate) longest: bool,
}

impl Regexp {
    /// Compiles a regular expression with the default options. Matches
    /// are leftmost-first, like in Perl and most other engines: among the
    /// matches that start at the leftmost position, the one found first by
    /// a backtracking search wins.
    ///
    /// ```
    /// # use regexp_core::Regexp;
    /// let re = Regexp::new("a|ab").unwrap();
    /// assert_eq!(re.find_str("ab"), Some((0, 1)));
    /// ```
    pub fn new(pattern: &str) -> Result<Self, Error> {
        RegexpBuilder::new().build(pattern)
    }

    /// Like [`Regexp::new`], but the regexp prefers the leftmost-longest
    /// match, as POSIX regexps do.
    ///
    /// ```
    /// # use regexp_core::Regexp;
    /// let re = Regexp::new_longest("a|ab").unwrap();
    /// assert_eq!(re.find_str("ab"), Some((0, 2)));
    /// ```
    pub fn new_longest(pattern: &str) -> Result<Self, Error> {
        RegexpBuilder::new().longest(true).build(pattern)
    }

    fn with_program(
        expr: &str,
        prog: Program,
        subexp_names: Vec<Option<String>>,
        num_subexp: usize,
        min_input_len: usize,
        longest: bool,
    ) -> Self {
        let onepass = onepass::compile(&prog);

        let (prefix, prefix_complete, prefix_end, max_bitstate_len) =
            match onepass {
                Some(_) => {
                    let (prefix, complete, end) = onepass::prefix(&prog);
                    (prefix, complete, end, 0)
                }
                None => {
                    let (prefix, complete) = prog.prefix();
                    (prefix, complete, 0, max_bitstate_len(&prog))
                }
            };

        let mut mpool = 0;
        while MATCH_SIZE[mpool] != 0 && MATCH_SIZE[mpool] < prog.num_insts()
        {
            mpool += 1;
        }

        let subexp_index = subexp_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| name.as_ref().map(|n| (n.clone(), i)))
            .collect();

        #[cfg(feature = "logging")]
        {
            info!(
                "Compiled regexp `{}` into {} instructions",
                expr,
                prog.num_insts()
            );
            debug!(
                "Regexp `{}`: one-pass: {}, prefix: {:?} (complete: {}), \
                backtracker limit: {}, pool: {}",
                expr,
                onepass.is_some(),
                prefix,
                prefix_complete,
                max_bitstate_len,
                mpool,
            );
        }

        Self {
            expr: expr.to_string(),
            cond: prog.start_cond(),
            prefix_rune: prefix.chars().next(),
            prog,
            onepass,
            num_subexp,
            max_bitstate_len,
            subexp_names,
            subexp_index,
            prefix,
            prefix_end,
            prefix_complete,
            mpool,
            min_input_len,
            longest,
        }
    }

    /// Returns the pattern this regexp was built from.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.expr.as_str()
    }

    /// Returns the compiled program.
    #[inline]
    pub fn program(&self) -> &Program {
        &self.prog
    }

    /// Number of capture groups in the regexp, not counting the implicit
    /// group 0 that covers the whole match.
    #[inline]
    pub fn num_subexp(&self) -> usize {
        self.num_subexp
    }

    /// Names of the capture groups, indexed by group number. The first item
    /// corresponds to group 0 and is always `None`, as are the items for
    /// unnamed groups.
    #[inline]
    pub fn subexp_names(&self) -> &[Option<String>] {
        self.subexp_names.as_slice()
    }

    /// Returns the number of the group with the given name.
    pub fn subexp_index(&self, name: &str) -> Option<usize> {
        self.subexp_index.get(name).copied()
    }

    /// Returns the literal that every match must start with, and true if
    /// that literal is the whole regexp.
    pub fn literal_prefix(&self) -> (&str, bool) {
        (self.prefix.as_str(), self.prefix_complete)
    }

    /// Switches between leftmost-first and leftmost-longest semantics.
    /// With leftmost-longest, among the matches that start at the leftmost
    /// position the longest one wins.
    pub fn set_longest(&mut self, yes: bool) {
        self.longest = yes;
    }

    /// Returns true if the regexp matches anywhere in `haystack`.
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.execute(BytesInput::new(haystack), 0, 0).is_some()
    }

    /// Returns true if the regexp matches anywhere in `haystack`.
    pub fn is_match_str(&self, haystack: &str) -> bool {
        self.execute(StrInput::new(haystack), 0, 0).is_some()
    }

    /// Returns true if the regexp matches anywhere in the data produced by
    /// `reader`. The reader is consumed until a match is found or it's
    /// exhausted. Read errors are treated as the end of the data.
    pub fn is_match_reader<R: Read>(&self, reader: R) -> bool {
        self.execute(ReaderInput::new(reader), 0, 0).is_some()
    }

    /// Returns the start and end offsets of the leftmost match in
    /// `haystack`.
    pub fn find(&self, haystack: &[u8]) -> Option<(usize, usize)> {
        self.find_at(haystack, 0)
    }

    /// Like [`Regexp::find`], but the search starts at offset `start`.
    /// The bytes before `start` are still taken into account by
    /// assertions like `\b`, and `^` doesn't match at `start` unless it's
    /// 0.
    pub fn find_at(
        &self,
        haystack: &[u8],
        start: usize,
    ) -> Option<(usize, usize)> {
        span(&self.execute(BytesInput::new(haystack), start, 2)?)
    }

    /// Returns the start and end offsets of the leftmost match in
    /// `haystack`.
    pub fn find_str(&self, haystack: &str) -> Option<(usize, usize)> {
        self.find_str_at(haystack, 0)
    }

    /// Like [`Regexp::find_str`], but the search starts at offset `start`.
    pub fn find_str_at(
        &self,
        haystack: &str,
        start: usize,
    ) -> Option<(usize, usize)> {
        span(&self.execute(StrInput::new(haystack), start, 2)?)
    }

    /// Returns the start and end offsets of the leftmost match in the data
    /// produced by `reader`.
    pub fn find_reader<R: Read>(&self, reader: R) -> Option<(usize, usize)> {
        span(&self.execute(ReaderInput::new(reader), 0, 2)?)
    }

    /// Returns the leftmost match in `haystack` and the submatches for
    /// each capture group.
    pub fn find_submatch(&self, haystack: &[u8]) -> Option<Captures> {
        self.find_submatch_at(haystack, 0)
    }

    /// Like [`Regexp::find_submatch`], but the search starts at offset
    /// `start`.
    pub fn find_submatch_at(
        &self,
        haystack: &[u8],
        start: usize,
    ) -> Option<Captures> {
        self.execute(BytesInput::new(haystack), start, self.prog.num_cap)
            .map(|slots| self.pad(slots))
    }

    /// Returns the leftmost match in `haystack` and the submatches for
    /// each capture group.
    pub fn find_str_submatch(&self, haystack: &str) -> Option<Captures> {
        self.find_str_submatch_at(haystack, 0)
    }

    /// Like [`Regexp::find_str_submatch`], but the search starts at offset
    /// `start`.
    pub fn find_str_submatch_at(
        &self,
        haystack: &str,
        start: usize,
    ) -> Option<Captures> {
        self.execute(StrInput::new(haystack), start, self.prog.num_cap)
            .map(|slots| self.pad(slots))
    }

    /// Returns the leftmost match in the data produced by `reader` and the
    /// submatches for each capture group.
    pub fn find_reader_submatch<R: Read>(
        &self,
        reader: R,
    ) -> Option<Captures> {
        self.execute(ReaderInput::new(reader), 0, self.prog.num_cap)
            .map(|slots| self.pad(slots))
    }

    /// Returns the offsets of successive non-overlapping matches in
    /// `haystack`, up to `limit` matches if given.
    ///
    /// An empty match that immediately follows the previous match is
    /// ignored.
    ///
    /// ```
    /// # use regexp_core::Regexp;
    /// let re = Regexp::new("a*").unwrap();
    /// assert_eq!(re.find_all(b"baaab", None), vec![(0, 0), (1, 4), (5, 5)]);
    /// ```
    pub fn find_all(
        &self,
        haystack: &[u8],
        limit: Option<usize>,
    ) -> Vec<(usize, usize)> {
        let mut result = Vec::new();
        self.all_matches(Haystack::Bytes(haystack), limit, |caps| {
            result.extend(caps.get(0))
        });
        result
    }

    /// Like [`Regexp::find_all`], for string haystacks.
    pub fn find_all_str(
        &self,
        haystack: &str,
        limit: Option<usize>,
    ) -> Vec<(usize, usize)> {
        let mut result = Vec::new();
        self.all_matches(Haystack::Str(haystack), limit, |caps| {
            result.extend(caps.get(0))
        });
        result
    }

    /// Like [`Regexp::find_all`], but returns the submatches of each
    /// match.
    pub fn find_all_submatch(
        &self,
        haystack: &[u8],
        limit: Option<usize>,
    ) -> Vec<Captures> {
        let mut result = Vec::new();
        self.all_matches(Haystack::Bytes(haystack), limit, |caps| {
            result.push(caps)
        });
        result
    }

    /// Like [`Regexp::find_all_submatch`], for string haystacks.
    pub fn find_all_str_submatch(
        &self,
        haystack: &str,
        limit: Option<usize>,
    ) -> Vec<Captures> {
        let mut result = Vec::new();
        self.all_matches(Haystack::Str(haystack), limit, |caps| {
            result.push(caps)
        });
        result
    }

    /// Replaces every match in `src` with `template`, where `$name`,
    /// `${name}`, `$1` and `${1}` are replaced by the corresponding
    /// submatch, as in [`Regexp::expand`].
    pub fn replace_all(&self, src: &[u8], template: &[u8]) -> Vec<u8> {
        let nmatch = if memchr::memchr(b'$', template).is_some() {
            2 * (self.num_subexp + 1)
        } else {
            2
        };
        self.replace_all_impl(Haystack::Bytes(src), nmatch, |dst, slots| {
            self.expand_impl(dst, template, src, slots)
        })
    }

    /// Like [`Regexp::replace_all`], for strings.
    ///
    /// ```
    /// # use regexp_core::Regexp;
    /// let re = Regexp::new(r"(?P<key>\w+)=(?P<value>\w+)").unwrap();
    /// assert_eq!(re.replace_all_str("a=1 b=2", "$value=$key"), "1=a 2=b");
    /// ```
    pub fn replace_all_str(&self, src: &str, template: &str) -> String {
        let nmatch = if template.contains('$') {
            2 * (self.num_subexp + 1)
        } else {
            2
        };
        into_string(self.replace_all_impl(
            Haystack::Str(src),
            nmatch,
            |dst, slots| {
                self.expand_impl(
                    dst,
                    template.as_bytes(),
                    src.as_bytes(),
                    slots,
                )
            },
        ))
    }

    /// Replaces every match in `src` with `repl`, taken literally.
    pub fn replace_all_literal(&self, src: &[u8], repl: &[u8]) -> Vec<u8> {
        self.replace_all_impl(Haystack::Bytes(src), 2, |dst, _| {
            dst.extend_from_slice(repl)
        })
    }

    /// Like [`Regexp::replace_all_literal`], for strings.
    pub fn replace_all_literal_str(&self, src: &str, repl: &str) -> String {
        into_string(self.replace_all_impl(Haystack::Str(src), 2, |dst, _| {
            dst.extend_from_slice(repl.as_bytes())
        }))
    }

    /// Replaces every match in `src` with the value returned by `repl`,
    /// which receives the matched bytes.
    pub fn replace_all_with<F, T>(&self, src: &[u8], mut repl: F) -> Vec<u8>
    where
        F: FnMut(&[u8]) -> T,
        T: AsRef<[u8]>,
    {
        self.replace_all_impl(Haystack::Bytes(src), 2, |dst, slots| {
            if let Some((start, end)) = span(slots) {
                dst.extend_from_slice(repl(&src[start..end]).as_ref())
            }
        })
    }

    /// Like [`Regexp::replace_all_with`], for strings.
    pub fn replace_all_str_with<F, T>(&self, src: &str, mut repl: F) -> String
    where
        F: FnMut(&str) -> T,
        T: AsRef<str>,
    {
        into_string(self.replace_all_impl(Haystack::Str(src), 2, |dst, slots| {
            if let Some((start, end)) = span(slots) {
                let text = repl(&src[start..end]);
                dst.extend_from_slice(text.as_ref().as_bytes())
            }
        }))
    }

    /// Appends `template` to `dst`, replacing the variables in the template
    /// with the corresponding submatches of `caps`, which must be a match
    /// of this regexp in `src`.
    ///
    /// `$name` or `${name}` is replaced by the submatch of the group with
    /// that name, and `$1` or `${1}` by the submatch of group 1. A name is
    /// the longest sequence of letters, digits and underscores, so `$1x` is
    /// the group named `1x`, not group 1 followed by `x`; use `${1}x` for
    /// the latter. Numbers with leading zeros are taken as names. Groups
    /// that don't exist or didn't participate in the match are replaced by
    /// nothing. `$$` is a literal `$`, and a `$` not followed by a valid
    /// name is copied as is.
    pub fn expand(
        &self,
        dst: &mut Vec<u8>,
        template: &[u8],
        src: &[u8],
        caps: &Captures,
    ) {
        self.expand_impl(dst, template, src, caps.slots())
    }

    /// Like [`Regexp::expand`], for strings.
    pub fn expand_str(
        &self,
        dst: &mut String,
        template: &str,
        src: &str,
        caps: &Captures,
    ) {
        let mut buf = Vec::with_capacity(template.len());
        self.expand_impl(
            &mut buf,
            template.as_bytes(),
            src.as_bytes(),
            caps.slots(),
        );
        dst.push_str(&into_string(buf));
    }
}

impl Regexp {
    /// Runs a search on `input`, starting at `pos`, with the engine that
    /// suits this regexp and input best. Returns the first `ncap` capture
    /// slots of the match.
    pub(crate) fn execute<I: Input>(
        &self,
        mut input: I,
        pos: usize,
        ncap: usize,
    ) -> Option<Vec<Option<usize>>> {
        let len = input.known_len();

        if matches!(len, Some(len) if pos > len || len < self.min_input_len) {
            return None;
        }

        if let Some(prog) = &self.onepass {
            let mut vm = ONEPASS_POOL.get();
            return vm
                .try_match(self, prog, &mut input, pos, ncap)
                .then(|| vm.captures().to_vec());
        }

        if let Some(len) = len {
            if len < self.max_bitstate_len {
                let mut bitstate = BITSTATE_POOL.get();
                return bitstate
                    .backtrack(self, &mut input, len, pos, ncap)
                    .then(|| bitstate.captures().to_vec());
            }
        }

        let mut vm = PIKEVM_POOLS[self.mpool].get();
        vm.reset(self.pike_queue_size(), ncap);
        vm.try_match(self, &mut input, pos).then(|| vm.captures().to_vec())
    }

    /// Number of instructions the Pike VM queues must hold for this
    /// regexp, which depends on the pool the VM comes from.
    pub(crate) fn pike_queue_size(&self) -> usize {
        match MATCH_SIZE[self.mpool] {
            0 => self.prog.num_insts(),
            n => n,
        }
    }

    fn execute_on(
        &self,
        haystack: Haystack<'_>,
        pos: usize,
        ncap: usize,
    ) -> Option<Vec<Option<usize>>> {
        match haystack {
            Haystack::Bytes(b) => self.execute(BytesInput::new(b), pos, ncap),
            Haystack::Str(s) => self.execute(StrInput::new(s), pos, ncap),
        }
    }

    /// Extends `slots` with unset slots up to `2 × (num_subexp + 1)`.
    fn pad(&self, mut slots: Vec<Option<usize>>) -> Captures {
        debug_assert!(slots.len() <= 2 * (self.num_subexp + 1));
        slots.resize(2 * (self.num_subexp + 1), None);
        Captures { slots }
    }

    /// Calls `deliver` for each successive non-overlapping match in
    /// `haystack`, up to `limit` matches.
    fn all_matches<F>(
        &self,
        haystack: Haystack<'_>,
        limit: Option<usize>,
        mut deliver: F,
    ) where
        F: FnMut(Captures),
    {
        let end = haystack.len();
        let limit = limit.unwrap_or(usize::MAX);

        let mut pos = 0;
        let mut count = 0;
        let mut prev_match_end = None;

        while count < limit && pos <= end {
            let slots = match self.execute_on(haystack, pos, self.prog.num_cap)
            {
                Some(slots) => slots,
                None => break,
            };

            let (start, stop) = match span(&slots) {
                Some(span) => span,
                None => break,
            };

            let mut accept = true;

            if stop == pos {
                // An empty match right after the previous match is not
                // reported.
                if prev_match_end == Some(start) {
                    accept = false;
                }
                // Move forward one rune, or past the end of the input.
                pos = match haystack.rune_width(pos) {
                    0 => end + 1,
                    width => pos + width,
                };
            } else {
                pos = stop;
            }

            prev_match_end = Some(stop);

            if accept {
                deliver(self.pad(slots));
                count += 1;
            }
        }
    }

    /// Builds a copy of `src` where each match is replaced by whatever
    /// `repl` appends to the output, given the first `nmatch` capture
    /// slots of the match.
    fn replace_all_impl<F>(
        &self,
        src: Haystack<'_>,
        nmatch: usize,
        mut repl: F,
    ) -> Vec<u8>
    where
        F: FnMut(&mut Vec<u8>, &[Option<usize>]),
    {
        let bytes = src.as_bytes();
        let end = bytes.len();
        let nmatch = nmatch.min(self.prog.num_cap);

        let mut buf = Vec::with_capacity(end);
        let mut last_match_end = 0;
        let mut search_pos = 0;

        while search_pos <= end {
            let slots = match self.execute_on(src, search_pos, nmatch) {
                Some(slots) => slots,
                None => break,
            };

            let (start, stop) = match span(&slots) {
                Some(span) => span,
                None => break,
            };

            // Copy the unmatched bytes before this match.
            buf.extend_from_slice(&bytes[last_match_end..start]);

            // Insert the replacement, but not for an empty match right
            // after the previous one.
            if stop > last_match_end || start == 0 {
                repl(&mut buf, &slots);
            }

            last_match_end = stop;

            // Advance past this match, at least one rune.
            let width = src.rune_width(search_pos);
            if search_pos + width > stop {
                search_pos += width;
            } else if search_pos + 1 > stop {
                // Only at the end of the input, where the width is 0.
                search_pos += 1;
            } else {
                search_pos = stop;
            }
        }

        buf.extend_from_slice(&bytes[last_match_end..]);
        buf
    }

    fn expand_impl(
        &self,
        dst: &mut Vec<u8>,
        mut template: &[u8],
        src: &[u8],
        slots: &[Option<usize>],
    ) {
        let submatch = |group: usize| match (
            slots.get(2 * group),
            slots.get(2 * group + 1),
        ) {
            (Some(Some(start)), Some(Some(end))) => src.get(*start..*end),
            _ => None,
        };

        while let Some(i) = memchr::memchr(b'$', template) {
            dst.extend_from_slice(&template[..i]);
            template = &template[i + 1..];

            // `$$` is a literal `$`.
            if template.first() == Some(&b'$') {
                dst.push(b'$');
                template = &template[1..];
                continue;
            }

            let (name, num, rest) = match extract(template) {
                Some(extracted) => extracted,
                None => {
                    // Malformed, the `$` is copied as is.
                    dst.push(b'$');
                    continue;
                }
            };

            template = rest;

            let group = match num {
                Some(num) => Some(num),
                None => std::str::from_utf8(name)
                    .ok()
                    .and_then(|name| self.subexp_index(name)),
            };

            if let Some(text) = group.and_then(submatch) {
                dst.extend_from_slice(text);
            }
        }

        dst.extend_from_slice(template);
    }
}

/// Parses the name after a `$` in a template: either `name` or `{name}`,
/// where a name is a non-empty sequence of letters, digits and
/// underscores. Returns the name, its value if it's a number without
/// leading zeros, and the rest of the template.
fn extract(template: &[u8]) -> Option<(&[u8], Option<usize>, &[u8])> {
    let (brace, s) = match template.first() {
        Some(b'{') => (true, &template[1..]),
        Some(_) => (false, template),
        None => return None,
    };

    let mut i = 0;
    while i < s.len() {
        let (c, size) = bstr::decode_utf8(&s[i..]);
        match c {
            Some(c) if c.is_alphanumeric() || c == '_' => i += size,
            _ => break,
        }
    }

    if i == 0 {
        return None;
    }

    let name = &s[..i];

    if brace {
        if s.get(i) != Some(&b'}') {
            return None;
        }
        i += 1;
    }

    let mut num: Option<usize> = Some(0);
    for b in name {
        num = match num {
            Some(n) if b.is_ascii_digit() && n < 100_000_000 => {
                Some(n * 10 + (b - b'0') as usize)
            }
            _ => None,
        };
    }

    // Leading zeros are not allowed.
    if name.len() > 1 && name[0] == b'0' {
        num = None;
    }

    Some((name, num, &s[i..]))
}

/// Returns the span of the whole match from capture slots.
#[inline]
fn span(slots: &[Option<usize>]) -> Option<(usize, usize)> {
    match slots {
        [Some(start), Some(end), ..] => Some((*start, *end)),
        _ => None,
    }
}

/// Converts the output of a replacement on string inputs back into a
/// string. The output is made of pieces of valid UTF-8 cut at rune
/// boundaries, so the conversion never fails in practice.
fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}

/// A haystack with a known length.
#[derive(Clone, Copy)]
enum Haystack<'h> {
    Bytes(&'h [u8]),
    Str(&'h str),
}

impl<'h> Haystack<'h> {
    fn as_bytes(&self) -> &'h [u8] {
        match self {
            Haystack::Bytes(b) => b,
            Haystack::Str(s) => s.as_bytes(),
        }
    }

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Width of the rune at `pos`, 0 at the end of the haystack.
    fn rune_width(&self, pos: usize) -> usize {
        match self {
            Haystack::Bytes(b) => BytesInput::new(b).step(pos).1,
            Haystack::Str(s) => StrInput::new(s).step(pos).1,
        }
    }
}

/// The offsets of a match and of the submatches for each capture group.
///
/// Group 0 is the whole match, group `i` is the `i`-th capture group in
/// the regexp. A group that didn't participate in the match has no
/// offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captures {
    slots: Vec<Option<usize>>,
}

impl Captures {
    /// Number of groups, including group 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    /// Always false, there's at least group 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Start and end offsets of group `i`.
    pub fn get(&self, i: usize) -> Option<(usize, usize)> {
        span(self.slots.get(2 * i..)?)
    }

    /// Raw capture slots: the start and end offsets of each group, in
    /// group order.
    #[inline]
    pub fn slots(&self) -> &[Option<usize>] {
        self.slots.as_slice()
    }

    /// Iterates over the offsets of each group.
    pub fn iter(&self) -> impl Iterator<Item = Option<(usize, usize)>> + '_ {
        self.slots.chunks_exact(2).map(span)
    }
}

impl Display for Regexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expr)
    }
}

impl Debug for Regexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Regexp").field(&self.expr).finish()
    }
}

impl FromStr for Regexp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Regexp::new(s)
    }
}

impl Serialize for Regexp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.expr)
    }
}

impl<'de> Deserialize<'de> for Regexp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let expr = String::deserialize(deserializer)?;
        Regexp::new(&expr).map_err(serde::de::Error::custom)
    }
}
