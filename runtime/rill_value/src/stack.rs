//! Native stack headroom for deep fixes.
//!
//! Deep-fixing a heavily nested value graph recurses once per level. The
//! logical recursion guard bounds *reactive* re-entry, but a legal graph a
//! few thousand lists deep would still exhaust the native stack. Recursive
//! entry points wrap themselves in [`ensure_sufficient_stack`], which grows
//! the stack on demand on native targets and is a passthrough on WASM.

/// Remaining stack below which we grow (64KB).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 64 * 1024;

/// Stack added per growth step (2MB).
#[cfg(not(target_arch = "wasm32"))]
const GROWTH: usize = 2 * 1024 * 1024;

/// Run `f`, growing the native stack first when headroom is low.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// WASM manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
