//! Shared serde default helpers
//!
//! serde's `default` attribute takes a function path, so the common
//! literal defaults live here once instead of in every config module.

/// Default `true` for `#[serde(default = "...")]`
pub fn bool_true() -> bool {
    true
}

/// Default `false` for `#[serde(default = "...")]`
pub fn bool_false() -> bool {
    false
}
