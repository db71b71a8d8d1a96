/*! A simulation of the Thompson NFA built from the program, following the
Pike VM described in Russ Cox's article [Regular Expression Matching: the
Virtual Machine Approach][1].

The VM advances all the threads in lockstep, one rune at a time, so the
input is read exactly once and matching takes time proportional to the
size of the program times the size of the input, for any program and any
input. This makes the Pike VM the engine of last resort: it's used when
the regexp is not one-pass and the input is too long for the bounded
backtracker. It is also the only engine that can read from a forward-only
stream.

Each thread carries its own copy of the capture slots. Threads are kept in
priority order, and two threads at the same instruction are never kept at
once: the one with the highest priority wins. That's what makes the VM
honor leftmost-first semantics without backtracking.

[1]: https://swtch.com/~rsc/regexp/regexp2.html
*/

pub(crate) use pikevm::PikeVM;

mod pikevm;
