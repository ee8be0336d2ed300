//! Logging utilities
//!
//! Thin labelled wrappers over the `log` facade. Without an installed logger
//! every call is a no-op.

const TARGET: &str = "apl";

/// Log an info message
#[inline(always)]
pub fn info(msg: &str) {
    ::log::info!(target: TARGET, "{}", msg);
}

/// Log a warning message
#[inline(always)]
pub fn warn(msg: &str) {
    ::log::warn!(target: TARGET, "{}", msg);
}

/// Log a debug message with a label
#[inline(always)]
pub fn debug(label: &str, msg: &str) {
    ::log::debug!(target: TARGET, "[{}] {}", label, msg);
}

/// Log an assembly stage transition
#[inline(always)]
pub fn stage(from: &dyn core::fmt::Debug, to: &dyn core::fmt::Debug) {
    ::log::debug!(target: TARGET, "stage {:?} -> {:?}", from, to);
}

/// Log an action being performed
#[inline(always)]
pub fn action(name: &str, details: &str) {
    ::log::trace!(target: TARGET, "{}: {}", name, details);
}
