//! Role-based store task board.
//!
//! A thin client over a hosted Supabase project: the session, roster and
//! task stores in [`domain`] talk to the backend through ports implemented
//! in [`outbound`], and [`inbound::cli`] drives them from the command line.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod wiring;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
