//! Environment switches for engine diagnostics.
//!
//! Read once per process. Release builds ignore them.

use std::ffi::OsStr;
use std::sync::OnceLock;

const STACK_DEBUG_VAR: &str = "SM_DEBUG_STACK";

/// Accepts `1`, `true`, `yes` and `on` in any case. Anything else, including
/// a value that is not valid unicode, is off.
fn flag_value_is_set(raw: Option<&OsStr>) -> bool {
    let Some(value) = raw.and_then(OsStr::to_str) else {
        return false;
    };
    ["1", "true", "yes", "on"].iter().any(|on| value.trim().eq_ignore_ascii_case(on))
}

/// `SM_DEBUG_STACK`: dump the stack after every tick (debug builds only).
pub fn stack_debug_enabled() -> bool {
    if !cfg!(debug_assertions) {
        return false;
    }
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| flag_value_is_set(std::env::var_os(STACK_DEBUG_VAR).as_deref()))
}
