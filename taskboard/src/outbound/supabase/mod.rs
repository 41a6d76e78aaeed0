//! Supabase outbound adapters.
//!
//! Thin reqwest implementations of the auth, profile, task and provisioning
//! ports. Every adapter shares one [`SupabaseClient`], which owns the active
//! session so data requests run under the signed-in user's token.

mod admin;
mod auth;
mod client;
mod dto;
mod errors;
mod profiles;
mod tasks;

pub use admin::SupabaseAdminProvisioner;
pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use profiles::SupabaseProfiles;
pub use tasks::SupabaseTasks;
