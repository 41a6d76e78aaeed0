//! Test utilities for the taskboard crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

mod doubles;
mod in_memory;

pub use doubles::{MutableClock, RecordingNotifier, RecordingSleeper};
pub use in_memory::InMemoryBackend;
