#![doc(test(attr(deny(warnings))))]

//! Split Core keeps shared group expenses, checks how each expense is split
//! between members, and forecasts a group's upcoming daily spend.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use errors::{Result, SplitError};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    init_with_filter(None);
}

/// Same as [`init`] with a fallback filter directive used when `RUST_LOG` is unset.
pub fn init_with_filter(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "split core tracing initialized");
    });
}
