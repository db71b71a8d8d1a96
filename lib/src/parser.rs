use regex_syntax as re;
use regex_syntax::ast::{Ast, GroupKind};
use regex_syntax::hir::Hir;

use crate::errors::Error;

/// Default nesting limit for the regexp parser.
pub(crate) const DEFAULT_NEST_LIMIT: u32 = 250;

/// Result of parsing a regexp.
pub(crate) struct Parsed {
    /// The high-level intermediate representation of the regexp.
    pub hir: Hir,
    /// Names of capture groups, indexed by group number. Group 0, which
    /// covers the whole match, and unnamed groups have no name. The length
    /// is the number of groups in the pattern text plus one, including
    /// groups that the HIR drops, like the ones repeated `{0}` times.
    pub names: Vec<Option<String>>,
}

/// A regular expression parser.
///
/// Takes the regexp source code and produces its corresponding [`Hir`],
/// using the [`regex_syntax`] crate.
#[derive(Clone, Debug)]
pub(crate) struct Parser {
    case_insensitive: bool,
    multi_line: bool,
    dot_matches_new_line: bool,
    swap_greed: bool,
    ignore_whitespace: bool,
    nest_limit: u32,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
            swap_greed: false,
            ignore_whitespace: false,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }

    /// Parses the regexp as a case-insensitive one, as if it started with
    /// `(?i)`.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Makes `^` and `$` match at line boundaries, as if the regexp started
    /// with `(?m)`.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.multi_line = yes;
        self
    }

    /// Allows `.` to match `\n`, as if the regexp started with `(?s)`.
    pub fn dot_matches_new_line(mut self, yes: bool) -> Self {
        self.dot_matches_new_line = yes;
        self
    }

    /// Swaps the meaning of greedy and non-greedy quantifiers, as if the
    /// regexp started with `(?U)`.
    pub fn swap_greed(mut self, yes: bool) -> Self {
        self.swap_greed = yes;
        self
    }

    /// Ignores whitespace and allows `#` comments, as if the regexp started
    /// with `(?x)`.
    pub fn ignore_whitespace(mut self, yes: bool) -> Self {
        self.ignore_whitespace = yes;
        self
    }

    /// Maximum nesting depth allowed while parsing.
    pub fn nest_limit(mut self, limit: u32) -> Self {
        self.nest_limit = limit;
        self
    }

    /// Parses the regexp and returns its HIR.
    pub fn parse(&self, pattern: &str) -> Result<Parsed, Error> {
        let mut parser = re::ast::parse::ParserBuilder::new()
            .nest_limit(self.nest_limit)
            .ignore_whitespace(self.ignore_whitespace)
            .build();

        let ast = parser
            .parse(pattern)
            .map_err(|err| Error::Syntax(err.kind().to_string()))?;

        let mut translator = re::hir::translate::TranslatorBuilder::new()
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_matches_new_line)
            .swap_greed(self.swap_greed)
            .unicode(true)
            .utf8(true)
            .build();

        let hir = translator
            .translate(pattern, &ast)
            .map_err(|err| Error::Syntax(err.kind().to_string()))?;

        let names = re::ast::visit(&ast, CaptureNames::new())?;

        Ok(Parsed { hir, names })
    }
}

/// Collects the capture groups from the AST, with their names.
struct CaptureNames {
    names: Vec<Option<String>>,
}

impl CaptureNames {
    fn new() -> Self {
        Self { names: vec![None] }
    }

    fn add(&mut self, index: u32, name: Option<&str>) {
        let index = index as usize;
        if index >= self.names.len() {
            self.names.resize(index + 1, None);
        }
        self.names[index] = name.map(String::from);
    }
}

impl re::ast::Visitor for CaptureNames {
    type Output = Vec<Option<String>>;
    type Err = Error;

    fn finish(self) -> Result<Self::Output, Self::Err> {
        Ok(self.names)
    }

    fn visit_pre(&mut self, ast: &Ast) -> Result<(), Self::Err> {
        if let Ast::Group(group) = ast {
            match &group.kind {
                GroupKind::CaptureIndex(index) => self.add(*index, None),
                GroupKind::CaptureName { name, .. } => {
                    self.add(name.index, Some(name.name.as_str()))
                }
                GroupKind::NonCapturing(_) => {}
            }
        }
        Ok(())
    }
}
