#![no_main]
use libfuzzer_sys::fuzz_target;

use regexp_core::Regexp;

// The first line of the input is the pattern, the rest is the haystack.
fuzz_target!(|data: &[u8]| {
    let (pattern, haystack) = match data.iter().position(|b| *b == b'\n') {
        Some(i) => (&data[..i], &data[i + 1..]),
        None => return,
    };

    let pattern = match std::str::from_utf8(pattern) {
        Ok(pattern) => pattern,
        Err(_) => return,
    };

    let mut re = match Regexp::new(pattern) {
        Ok(re) => re,
        Err(_) => return,
    };

    for longest in [false, true] {
        re.set_longest(longest);

        let span = re.find(haystack);
        assert_eq!(re.is_match(haystack), span.is_some());
        // A replacement char in the pattern counts as three bytes in the
        // minimum input length, but matches a single invalid byte, so the
        // reader may find matches that the length check rules out.
        if std::str::from_utf8(haystack).is_ok() {
            assert_eq!(re.find_reader(haystack), span);
        }

        let caps = re.find_submatch(haystack);
        assert_eq!(caps.as_ref().and_then(|caps| caps.get(0)), span);

        if let Some(caps) = caps {
            assert_eq!(caps.len(), re.num_subexp() + 1);
        }

        for (start, end) in re.find_all(haystack, Some(100)) {
            assert!(start <= end && end <= haystack.len());
        }
    }
});
