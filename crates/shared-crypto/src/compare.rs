//! Constant-time comparison of signature strings.

use subtle::ConstantTimeEq;

/// Compare two strings without an early exit on the first differing byte.
///
/// A length mismatch returns `false` immediately; signature lengths are public.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
