//! Panic recovery at the dispatch boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Message used when a panic payload is neither `&str` nor `String`.
pub const UNKNOWN_PANIC: &str = "unknown panic";

/// Runs `f`, converting a panic into its message.
///
/// ```
/// use heron_pipeline::recovery::catch;
///
/// assert_eq!(catch(|| 7), Ok(7));
/// assert_eq!(catch(|| -> i32 { panic!("boom") }), Err("boom".to_string()));
/// ```
pub fn catch<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Extracts the message of a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNKNOWN_PANIC.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_panic_message() {
        let id = 42;
        let result: Result<(), String> = catch(|| panic!("user {id} exploded"));
        assert_eq!(result, Err("user 42 exploded".to_string()));
    }

    #[test]
    fn test_non_string_payload() {
        let result: Result<(), String> = catch(|| std::panic::panic_any(17_u8));
        assert_eq!(result, Err(UNKNOWN_PANIC.to_string()));
    }

    #[test]
    fn test_mutation_before_panic_is_kept() {
        let mut touched = false;
        let result: Result<(), String> = catch(|| {
            touched = true;
            panic!("late");
        });
        assert!(result.is_err());
        assert!(touched);
    }
}
