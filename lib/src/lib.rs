/*! Regular expression matching with guaranteed linear-time engines.

This crate compiles regular expressions into a small instruction set and
matches them with three different engines, choosing the fastest one that
can handle each regexp and input:

* A one-pass matcher, for anchored regexps where the next rune in the input
  always tells which alternative to follow.
* A bounded backtracker, for small programs and short inputs. It remembers
  the (instruction, position) pairs already explored, so it never takes
  exponential time.
* A Pike VM that simulates all the threads of the program in lock-step, for
  everything else.

All the engines produce the same results, with either leftmost-first
(Perl-like) or leftmost-longest (POSIX-like) semantics.

# Example

```rust
# use regexp_core::Regexp;
let re = Regexp::new(r"(?P<year>\d{4})-(?P<month>\d{2})").unwrap();

let caps = re.find_str_submatch("released on 2024-03").unwrap();
assert_eq!(caps.get(0), Some((12, 19)));
assert_eq!(caps.get(re.subexp_index("month").unwrap()), Some((17, 19)));

assert_eq!(
    re.replace_all_str("2024-03, 2025-11", "$month/$year"),
    "03/2024, 11/2025"
);
```
*/

#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub use errors::Error;
pub use regexp::Captures;
pub use regexp::Regexp;
pub use regexp::RegexpBuilder;

pub use program::EmptyOp;
pub use program::Inst;
pub use program::InstOp;
pub use program::Program;

mod backtrack;
mod errors;
mod input;
mod lazyflag;
mod onepass;
mod parser;
mod pool;
pub mod program;
mod regexp;
mod sparse;
mod thompson;

#[cfg(test)]
mod tests;
