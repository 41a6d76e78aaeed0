//! Inbound adapters driving the stores.
//!
//! - **cli**: `clap` command surface with text and JSON rendering

pub mod cli;
