//! Constant-time comparison utilities
//!
//! Equality checks on secret material must not short-circuit on the first
//! differing byte, otherwise response timing leaks how long a matching prefix is.

use subtle::ConstantTimeEq;

/// Constant-time byte comparison. Length is not treated as secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Constant-time comparison of two 32-byte derived keys
pub fn constant_time_key_compare(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.ct_eq(b).into()
}
