/*! End-to-end tests. */
use pretty_assertions::assert_eq;

use crate::backtrack::BitState;
use crate::input::{ReaderInput, StrInput};
use crate::onepass::OnePassVM;
use crate::thompson::PikeVM;
use crate::{Error, Regexp, RegexpBuilder};

macro_rules! assert_find {
    ($pattern:expr, $haystack:expr, $expected:expr) => {{
        let re = Regexp::new($pattern).unwrap();
        let expected: Option<(usize, usize)> = $expected;
        assert_eq!(
            re.find_str($haystack),
            expected,
            "\n\n`{}` in {:?}",
            $pattern,
            $haystack
        );
        assert_eq!(re.find($haystack.as_bytes()), expected);
        assert_eq!(re.find_reader($haystack.as_bytes()), expected);
        assert_eq!(re.is_match_str($haystack), expected.is_some());
    }};
}

macro_rules! assert_find_longest {
    ($pattern:expr, $haystack:expr, $expected:expr) => {{
        let re = Regexp::new_longest($pattern).unwrap();
        let expected: Option<(usize, usize)> = $expected;
        assert_eq!(
            re.find_str($haystack),
            expected,
            "\n\n`{}` in {:?}",
            $pattern,
            $haystack
        );
        assert_eq!(re.find_reader($haystack.as_bytes()), expected);
    }};
}

macro_rules! assert_replace {
    ($pattern:expr, $src:expr, $template:expr, $expected:expr) => {{
        let re = Regexp::new($pattern).unwrap();
        assert_eq!(re.replace_all_str($src, $template), $expected);
        assert_eq!(
            re.replace_all($src.as_bytes(), $template.as_bytes()),
            $expected.as_bytes()
        );
    }};
}

macro_rules! assert_expand {
    ($pattern:expr, $src:expr, $template:expr, $expected:expr) => {{
        let re = Regexp::new($pattern).unwrap();
        let caps = re.find_str_submatch($src).unwrap();
        let mut dst = String::new();
        re.expand_str(&mut dst, $template, $src, &caps);
        assert_eq!(dst, $expected, "\n\ntemplate: {:?}", $template);
    }};
}

#[test]
fn find() {
    assert_find!("abc", "xabcx", Some((1, 4)));
    assert_find!("^abc$", "abc", Some((0, 3)));
    assert_find!("^abc$", "xabcx", None);
    assert_find!(r"\bcat\b", "concatenate cat", Some((12, 15)));
    assert_find!(r"\Bcat", "cat concat", Some((7, 10)));
    assert_find!("a+b", "xaaab", Some((1, 5)));
    assert_find!("a*", "baaa", Some((0, 0)));
    assert_find!("", "", Some((0, 0)));
    assert_find!("$", "abc", Some((3, 3)));
    assert_find!("(?m)^b", "a\nb", Some((2, 3)));
    assert_find!("(?m)a$", "a\nb", Some((0, 1)));
    assert_find!("a.c", "a\nc abc", Some((4, 7)));
    assert_find!("(?s)a.c", "a\nc abc", Some((0, 3)));
    assert_find!("h.llo", "¡héllo!", Some((2, 8)));
    assert_find!("abcdef", "abc", None);
}

#[test]
fn leftmost_first_vs_longest() {
    assert_find!("a|ab", "ab", Some((0, 1)));
    assert_find_longest!("a|ab", "ab", Some((0, 2)));

    assert_find!("a+?", "aaa", Some((0, 1)));
    assert_find_longest!("a+?", "aaa", Some((0, 3)));

    assert_find!("(a|ab)(c|bcd)", "abcd", Some((0, 4)));
    assert_find!("(a|ab)(c|bcd)", "abc", Some((0, 3)));
    assert_find_longest!("(a|ab)(c|bcd)", "abcd", Some((0, 4)));

    let mut re = Regexp::new("a|ab").unwrap();
    re.set_longest(true);
    assert_eq!(re.find_str("ab"), Some((0, 2)));
    re.set_longest(false);
    assert_eq!(re.find_str("ab"), Some((0, 1)));

    let re = RegexpBuilder::new().longest(true).build("x*|xxx").unwrap();
    assert_eq!(re.find_str("xxxx"), Some((0, 4)));
}

#[test]
fn find_at() {
    let re = Regexp::new(r"\bb").unwrap();
    assert_eq!(re.find_str_at("ab b", 1), Some((3, 4)));
    assert_eq!(re.find_at(b"ab b", 1), Some((3, 4)));

    let re = Regexp::new("^b").unwrap();
    assert_eq!(re.find_str_at("ab", 1), None);

    let re = Regexp::new("b").unwrap();
    assert_eq!(re.find_str_at("abab", 2), Some((3, 4)));
    assert_eq!(re.find_submatch_at(b"abab", 2).unwrap().get(0), Some((3, 4)));
}

#[test]
fn submatches() {
    let re = Regexp::new("(a)(b)?").unwrap();

    let caps = re.find_str_submatch("a").unwrap();
    assert_eq!(caps.len(), 3);
    assert_eq!(caps.get(0), Some((0, 1)));
    assert_eq!(caps.get(1), Some((0, 1)));
    assert_eq!(caps.get(2), None);
    assert_eq!(caps.get(3), None);
    assert_eq!(caps.slots(), &[Some(0), Some(1), Some(0), Some(1), None, None]);
    assert_eq!(
        caps.iter().collect::<Vec<_>>(),
        vec![Some((0, 1)), Some((0, 1)), None]
    );

    let re = Regexp::new("(a)|(b)").unwrap();
    let caps = re.find_submatch(b"b").unwrap();
    assert_eq!(caps.slots(), &[Some(0), Some(1), None, None, Some(0), Some(1)]);

    let re = Regexp::new(r"(\w+)@(\w+)\.com").unwrap();
    let caps = re.find_reader_submatch("mail: me@host.com".as_bytes()).unwrap();
    assert_eq!(caps.get(0), Some((6, 17)));
    assert_eq!(caps.get(1), Some((6, 8)));
    assert_eq!(caps.get(2), Some((9, 13)));

    assert_eq!(re.find_str_submatch("nothing here"), None);
}

#[test]
fn find_all() {
    let re = Regexp::new("a*").unwrap();
    assert_eq!(re.find_all(b"baaab", None), vec![(0, 0), (1, 4), (5, 5)]);
    assert_eq!(re.find_all_str("baaab", Some(2)), vec![(0, 0), (1, 4)]);
    assert_eq!(re.find_all_str("baaab", Some(0)), vec![]);

    let re = Regexp::new("").unwrap();
    assert_eq!(
        re.find_all_str("abc", None),
        vec![(0, 0), (1, 1), (2, 2), (3, 3)]
    );
    assert_eq!(re.find_all_str("é", None), vec![(0, 0), (2, 2)]);
    assert_eq!(re.find_all(b"\xffa", None), vec![(0, 0), (1, 1), (2, 2)]);

    let re = Regexp::new("a+").unwrap();
    assert_eq!(re.find_all_str("xaxaax", None), vec![(1, 2), (3, 5)]);
    assert_eq!(re.find_all_str("xxx", None), vec![]);

    // An empty match adjacent to the previous match is skipped.
    let re = Regexp::new("x*").unwrap();
    assert_eq!(re.find_all_str("axxb", None), vec![(0, 0), (1, 3), (4, 4)]);
}

#[test]
fn find_all_submatch() {
    let re = Regexp::new(r"(\w)(\d)?").unwrap();

    let all = re.find_all_str_submatch("a1 b c3", None);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].slots(), &[Some(0), Some(2), Some(0), Some(1), Some(1), Some(2)]);
    assert_eq!(all[1].slots(), &[Some(3), Some(4), Some(3), Some(4), None, None]);
    assert_eq!(all[2].slots(), &[Some(5), Some(7), Some(5), Some(6), Some(6), Some(7)]);

    let all = re.find_all_submatch(b"a1 b c3", Some(1));
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get(2), Some((1, 2)));
}

#[test]
fn replace() {
    assert_replace!("a(x*)b", "-ab-axxb-", "T", "-T-T-");
    assert_replace!("a(x*)b", "-ab-axxb-", "$1", "--xx-");
    assert_replace!("a(x*)b", "-ab-axxb-", "$1W", "---");
    assert_replace!("a(x*)b", "-ab-axxb-", "${1}W", "-W-xxW-");
    assert_replace!("a*", "baaac", "X", "XbXcX");
    assert_replace!("", "abc", "-", "-a-b-c-");
    assert_replace!("b", "abc", "$$", "a$c");
    assert_replace!("x", "abc", "y", "abc");
    assert_replace!(
        r"(?P<key>\w+)=(?P<value>\w+)",
        "a=1, b=2",
        "$value:$key",
        "1:a, 2:b"
    );
}

#[test]
fn replace_literal() {
    let re = Regexp::new("a(x*)b").unwrap();
    assert_eq!(re.replace_all_literal_str("-ab-axxb-", "$1"), "-$1-$1-");
    assert_eq!(re.replace_all_literal(b"-ab-axxb-", b"${1}"), b"-${1}-${1}-");
}

#[test]
fn replace_with() {
    let re = Regexp::new(r"\d+").unwrap();
    assert_eq!(
        re.replace_all_str_with("a1b22c333", |m| m.len().to_string()),
        "a1b2c3"
    );

    let re = Regexp::new("[ab]").unwrap();
    assert_eq!(
        re.replace_all_with(b"abc", |m| m.to_ascii_uppercase()),
        b"ABc"
    );

    let re = Regexp::new("é").unwrap();
    assert_eq!(re.replace_all_str_with("éaé", |_| "e"), "eae");
}

#[test]
fn expand() {
    assert_expand!(
        r"(\w+)=(\w+)",
        "x=1",
        "$2=$1 $$ ${1}y $3 $x $",
        "1=x $ xy   $"
    );
    assert_expand!(r"(\w+)=(\w+)", "x=1", "$1x|${1}x", "|xx");
    assert_expand!(r"(\w+)=(\w+)", "x=1", "$01|$0", "|x=1");
    assert_expand!(r"(\w+)=(\w+)", "x=1", "${2", "${2");
    assert_expand!(r"(\w+)=(\w+)", "x=1", "$}", "$}");
    assert_expand!(
        r"(?P<first>\w+) (?P<last>\w+)",
        "John Smith",
        "$last, ${first}",
        "Smith, John"
    );
    assert_expand!(r"(a)|(b)", "b", "[$1][$2]", "[][b]");

    let re = Regexp::new(r"(\w+)@(\w+)").unwrap();
    let src = b"user@host";
    let caps = re.find_submatch(src).unwrap();
    let mut dst = b"> ".to_vec();
    re.expand(&mut dst, b"$2:$1", src, &caps);
    assert_eq!(dst, b"> host:user");
}

#[test]
fn metadata() {
    let re = Regexp::new(r"(?P<first>\w+) (\w+) (?P<last>\w+)").unwrap();
    assert_eq!(re.as_str(), r"(?P<first>\w+) (\w+) (?P<last>\w+)");
    assert_eq!(re.num_subexp(), 3);
    assert_eq!(
        re.subexp_names(),
        &[None, Some("first".to_string()), None, Some("last".to_string())]
    );
    assert_eq!(re.subexp_index("first"), Some(1));
    assert_eq!(re.subexp_index("last"), Some(3));
    assert_eq!(re.subexp_index("middle"), None);
    assert_eq!(re.program().num_cap(), 8);

    assert_eq!(Regexp::new("abc").unwrap().literal_prefix(), ("abc", true));
    assert_eq!(Regexp::new("abc+").unwrap().literal_prefix(), ("abc", false));
    assert_eq!(Regexp::new("[ab]c").unwrap().literal_prefix(), ("", false));
    assert_eq!(Regexp::new("^abc$").unwrap().literal_prefix(), ("abc", true));
}

#[test]
fn builder_options() {
    let re = RegexpBuilder::new().case_insensitive(true).build("hello").unwrap();
    assert_eq!(re.find_str("Say HeLLo"), Some((4, 9)));

    let re = RegexpBuilder::new().multi_line(true).build("^b$").unwrap();
    assert_eq!(re.find_str("a\nb\nc"), Some((2, 3)));

    let re =
        RegexpBuilder::new().dot_matches_new_line(true).build("a.b").unwrap();
    assert_eq!(re.find_str("a\nb"), Some((0, 3)));

    let re = RegexpBuilder::new().swap_greed(true).build("a+").unwrap();
    assert_eq!(re.find_str("aaa"), Some((0, 1)));

    let re = RegexpBuilder::new()
        .ignore_whitespace(true)
        .build("a b c # comment")
        .unwrap();
    assert_eq!(re.find_str("xabc"), Some((1, 4)));

    assert!(matches!(
        RegexpBuilder::new().nest_limit(2).build("((((a))))"),
        Err(Error::Syntax(_))
    ));

    assert_eq!(
        RegexpBuilder::new().size_limit(100).build("a{100}").unwrap_err(),
        Error::TooLarge { limit: 100 }
    );
}

#[test]
fn errors() {
    assert!(matches!(Regexp::new("a("), Err(Error::Syntax(_))));
    assert!(matches!(Regexp::new("a{2,1}"), Err(Error::Syntax(_))));
    assert!(matches!(Regexp::new(r"\b{start}"), Err(Error::Unsupported(_))));
    assert_eq!(
        Error::TooLarge { limit: 10 }.to_string(),
        "compiled regexp exceeds the size limit (10 bytes)"
    );
}

#[test]
fn invalid_utf8() {
    let re = Regexp::new(".").unwrap();
    assert_eq!(re.find(b"\xff"), Some((0, 1)));

    let re = Regexp::new("\u{FFFD}").unwrap();
    assert_eq!(re.find(b"a\xffb"), Some((1, 2)));
    assert_eq!(re.literal_prefix(), ("", false));

    let re = Regexp::new("a.b").unwrap();
    assert_eq!(re.find(b"xa\xe2\x82b"), None);
    assert_eq!(re.find(b"xa\xe2\x82\xacb"), Some((1, 6)));
}

#[test]
fn reader() {
    let re = Regexp::new("foo+").unwrap();
    assert!(re.is_match_reader("a foooo b".as_bytes()));
    assert!(!re.is_match_reader("a fo b".as_bytes()));
    assert_eq!(re.find_reader("a foooo b".as_bytes()), Some((2, 7)));
}

#[test]
fn long_input() {
    // Too long for the backtracker, the Pike VM is used.
    let re = Regexp::new("a+b").unwrap();
    assert!(re.onepass.is_none());

    let haystack = "a".repeat(100_000) + "b";
    assert!(haystack.len() >= re.max_bitstate_len);
    assert_eq!(re.find_str(&haystack), Some((0, 100_001)));

    // The backtracker agrees when run directly on the same input.
    let mut bitstate = BitState::default();
    assert!(bitstate.backtrack(
        &re,
        &mut StrInput::new(&haystack),
        haystack.len(),
        0,
        2
    ));
    assert_eq!(bitstate.captures(), &[Some(0), Some(100_001)]);

    let haystack = "a".repeat(100_000);
    assert_eq!(re.find_str(&haystack), None);
}

#[test]
fn onepass_fallback() {
    // Anchored, but both branches of the alternation start with `a`.
    let re = Regexp::new("^(a|ab)$").unwrap();
    assert!(re.program().to_string().contains("ALT"));
    assert!(re.onepass.is_none());

    let caps = re.find_str_submatch("ab").unwrap();
    assert_eq!(caps.slots(), &[Some(0), Some(2), Some(0), Some(2)]);

    let caps = re.find_str_submatch("a").unwrap();
    assert_eq!(caps.slots(), &[Some(0), Some(1), Some(0), Some(1)]);

    assert_eq!(re.find_str_submatch("abc"), None);

    // The parser turns `a|a` into a single class, no ambiguity is left.
    let re = Regexp::new("^(a|a)$").unwrap();
    assert!(!re.program().to_string().contains("ALT"));
    assert!(re.onepass.is_some());
    assert_eq!(re.find_str("a"), Some((0, 1)));
}

#[test]
fn groups_repeated_zero_times() {
    let re = Regexp::new("(a){0}(b)").unwrap();
    assert_eq!(re.num_subexp(), 2);

    let caps = re.find_str_submatch("b").unwrap();
    assert_eq!(caps.len(), 3);
    assert_eq!(
        caps.slots(),
        &[Some(0), Some(1), None, None, Some(0), Some(1)]
    );
    assert_eq!(caps.get(1), None);
    assert_eq!(caps.get(2), Some((0, 1)));
    assert_eq!(re.replace_all_str("b", "[$2]"), "[b]");

    let re = Regexp::new("(a)(b){0}").unwrap();
    assert_eq!(re.num_subexp(), 2);

    let caps = re.find_str_submatch("a").unwrap();
    assert_eq!(caps.len(), 3);
    assert_eq!(
        caps.slots(),
        &[Some(0), Some(1), Some(0), Some(1), None, None]
    );

    let re = Regexp::new("(?P<x>a){0}(?P<y>b)").unwrap();
    assert_eq!(re.num_subexp(), 2);
    assert_eq!(re.subexp_index("x"), Some(1));
    assert_eq!(re.subexp_index("y"), Some(2));
    assert_eq!(re.replace_all_str("b", "<$y>"), "<b>");
}

#[test]
fn long_chain_of_empty_paths() {
    // Tens of thousands of consecutive optional runes, all of them can be
    // skipped without consuming input.
    let re = Regexp::new("(?:(?:a??){1000}){60}").unwrap();
    assert!(re.program().num_insts() > 100_000);
    assert_eq!(re.find_str("bbbbbbbbbb"), Some((0, 0)));
    assert_eq!(re.find_str(""), Some((0, 0)));
}

#[test]
fn start_past_the_end() {
    for pattern in ["^$", "$", "(a*)", r"\b"] {
        let re = Regexp::new(pattern).unwrap();
        assert_eq!(re.find_at(b"ab", 5), None, "{}", pattern);
        assert_eq!(re.find_str_at("ab", 5), None, "{}", pattern);
        assert_eq!(re.find_submatch_at(b"ab", 5), None, "{}", pattern);
        assert_eq!(re.find_str_submatch_at("ab", 5), None, "{}", pattern);
        assert_eq!(re.find_at(b"ab", 3), None, "{}", pattern);
    }

    // The end of the haystack is still a valid starting point.
    let re = Regexp::new("$").unwrap();
    assert_eq!(re.find_at(b"ab", 2), Some((2, 2)));
    assert_eq!(re.find_str_at("ab", 2), Some((2, 2)));

    let re = Regexp::new("^$").unwrap();
    assert!(re.onepass.is_some());
    assert_eq!(re.find_at(b"", 0), Some((0, 0)));
    assert_eq!(re.find_at(b"ab", 2), None);
}

#[test]
fn deterministic_compilation() {
    for pattern in [r"^(\w+)@(\w+)$", "(a|b)*c{2,5}", r"(?i)\bfoo\b|bar+?"] {
        let re1 = Regexp::new(pattern).unwrap();
        let re2 = Regexp::new(pattern).unwrap();
        assert_eq!(re1.program(), re2.program());
        assert_eq!(re1.onepass, re2.onepass);
    }
}

#[test]
fn large_program() {
    // Programs too large for the backtracker and the smaller VM pools.
    let re = Regexp::new("(?:a|b){600}c").unwrap();
    assert_eq!(re.max_bitstate_len, 0);
    assert!(re.pike_queue_size() >= re.program().num_insts());

    let haystack = "ab".repeat(300) + "c";
    assert_eq!(re.find_str(&haystack), Some((0, 601)));
    assert_eq!(re.find_str(&haystack[1..]), None);
}

#[test]
fn serialization() {
    let re = Regexp::new(r"(\w+)@example\.com").unwrap();
    let json = serde_json::to_string(&re).unwrap();
    assert_eq!(json, r#""(\\w+)@example\\.com""#);

    let re: Regexp = serde_json::from_str(&json).unwrap();
    assert_eq!(re.find_str("to: me@example.com"), Some((4, 18)));

    assert!(serde_json::from_str::<Regexp>(r#""a(""#).is_err());
}

#[test]
fn display_and_parse() {
    let re: Regexp = "a+b".parse().unwrap();
    assert_eq!(re.to_string(), "a+b");
    assert_eq!(format!("{:?}", re), r#"Regexp("a+b")"#);
    assert!("a(".parse::<Regexp>().is_err());
}

#[test]
fn concurrent_searches() {
    let patterns = [
        Regexp::new("^(a+)(b+)$").unwrap(),
        Regexp::new(r"(\w+)\s(\w+)").unwrap(),
        Regexp::new("(?:x|y){600}z").unwrap(),
    ];

    let haystacks = [
        "aaabb".to_string(),
        "hello world".to_string(),
        "xy".repeat(300) + "z",
    ];

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    for (re, haystack) in patterns.iter().zip(&haystacks) {
                        let caps = re.find_str_submatch(haystack).unwrap();
                        assert_eq!(caps.get(0), Some((0, haystack.len())));
                    }
                    assert_eq!(
                        patterns[1].find_all_str("a b c d", None),
                        vec![(0, 3), (4, 7)]
                    );
                }
            });
        }
    });
}

/// Runs every engine that can handle the regexp on the haystack and checks
/// that they all agree. In leftmost-longest mode only the span of the whole
/// match is compared.
fn check_engines(re: &Regexp, haystack: &str, pos: usize) {
    let ncap = re.program().num_cap();
    let compared = if re.longest { 2 } else { ncap };
    let context = || {
        format!(
            "`{}` in {:?} at {} (longest: {})",
            re.as_str(),
            haystack,
            pos,
            re.longest
        )
    };

    let mut pike = PikeVM::default();
    pike.reset(re.program().num_insts(), ncap);
    let expected = pike
        .try_match(re, &mut StrInput::new(haystack), pos)
        .then(|| pike.captures()[..compared].to_vec());

    let mut bitstate = BitState::default();
    let result = bitstate
        .backtrack(re, &mut StrInput::new(haystack), haystack.len(), pos, ncap)
        .then(|| bitstate.captures()[..compared].to_vec());
    assert_eq!(result, expected, "backtracker: {}", context());

    if let Some(prog) = &re.onepass {
        let mut onepass = OnePassVM::default();
        let result = onepass
            .try_match(re, prog, &mut StrInput::new(haystack), pos, ncap)
            .then(|| onepass.captures()[..compared].to_vec());
        assert_eq!(result, expected, "one-pass: {}", context());
    }

    if pos == 0 {
        pike.reset(re.program().num_insts(), ncap);
        let result = pike
            .try_match(re, &mut ReaderInput::new(haystack.as_bytes()), 0)
            .then(|| pike.captures()[..compared].to_vec());
        assert_eq!(result, expected, "reader: {}", context());
    }

    let result = re
        .find_str_submatch_at(haystack, pos)
        .map(|caps| caps.slots()[..compared].to_vec());
    assert_eq!(result, expected, "dispatcher: {}", context());

    assert_eq!(
        re.find_str_at(haystack, pos),
        expected.as_ref().and_then(|slots| Some((slots[0]?, slots[1]?))),
        "find: {}",
        context()
    );
}

#[test]
fn engines_agree() {
    let patterns = [
        "^abc$",
        "^(a)(b|c)$",
        "^a(b)?$",
        r"^(\d+)-(\w+)$",
        "a|ab",
        "(a)(b)?",
        "(a|b)*c",
        r"\bcat\b",
        r"\B",
        r"(\w+)@(\w+)\.com",
        "x*",
        "^$",
        r"(?m)^(\d+)$",
        "[a-c]+?b",
        "(?i)hello",
        "a{2,4}",
        "(foo|foobar)(bar)?",
        "é+",
        ".",
        "(?s).+",
        "a*?b",
        "(a+)(b+)?(c)",
        "abc+",
        "(?:ab)*(a)?",
        "(?U)(a+)(a*)",
    ];

    let haystacks = [
        "",
        "abc",
        "xabcx",
        "aab",
        "ac",
        "12-ab",
        "cat concatenate cat",
        "me@host.com you@x.com",
        "12\n345\nx",
        "HeLLo hello",
        "aaaaa",
        "foobarbar",
        "héé",
        "a\nb",
        "aabbc abcc",
        "ababab",
    ];

    for pattern in patterns {
        for longest in [false, true] {
            let mut re = Regexp::new(pattern).unwrap();
            re.set_longest(longest);
            for haystack in haystacks {
                check_engines(&re, haystack, 0);
                if haystack.is_char_boundary(1) {
                    check_engines(&re, haystack, 1);
                }
            }
        }
    }
}

#[cfg(feature = "logging")]
#[test]
fn build_with_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
    let re = RegexpBuilder::new().longest(true).build("^(a|b)+c$").unwrap();
    assert!(re.is_match_str("abac"));
}
