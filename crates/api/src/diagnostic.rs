//! The thread-local "last error" diagnostic channel (spec §6).
//!
//! Reset at the start of each public [`crate::Db`] call and populated only
//! on failure; retrieval is a dedicated accessor rather than part of the
//! `Result` itself, matching how a process-wide diagnostic string is scoped
//! to the calling thread, not to any one engine instance.

use std::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = RefCell::new(None);
}

pub(crate) fn clear() {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = None);
}

pub(crate) fn set(message: impl Into<String>) {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = Some(message.into()));
}

/// The diagnostic message from the most recent failing call on this
/// thread, if any. Cleared at the start of every subsequent call, whether
/// or not it fails.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|cell| cell.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_records_then_clears() {
        clear();
        assert_eq!(last_error(), None);
        set("boom");
        assert_eq!(last_error(), Some("boom".to_string()));
        clear();
        assert_eq!(last_error(), None);
    }
}
