//! Server internals, exposed as a library so the binary and the
//! integration tests share the same router construction.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod notifier;
pub mod reminder;
