//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **supabase**: reqwest-backed auth, PostgREST and admin adapters
//! - **notifications**: notices delivered as `tracing` events
//!
//! Adapters are thin translators between domain types and wire formats.
//! They contain no business logic.

pub mod notifications;
pub mod supabase;
