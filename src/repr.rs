//! Repr support shared by the `Debug` impls.
//!
//! Thread-local print length: how many items a list renders before `...`.
//! A shared list that contains itself prints `[...]` through the
//! `guard::WalkGuard` recursion guard.

use std::cell::Cell;
use std::fmt;

thread_local! {
    /// `None` renders every item.
    static PRINT_LENGTH: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Current print-length setting for this thread.
pub fn print_length() -> Option<usize> {
    PRINT_LENGTH.with(|pl| pl.get())
}

/// Set the print length for this thread. Returns the previous value.
pub fn set_print_length(len: Option<usize>) -> Option<usize> {
    PRINT_LENGTH.with(|pl| pl.replace(len))
}

/// Render `items` as `[a, b, c]`, honouring the print length.
pub(crate) fn fmt_items<T: fmt::Debug>(items: &[T], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let limit = print_length().unwrap_or(usize::MAX);
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if i == limit {
            f.write_str("...")?;
            break;
        }
        fmt::Debug::fmt(item, f)?;
    }
    f.write_str("]")
}
