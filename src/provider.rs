//! Provider-facing descriptors (data), normalizers, and strategies (behavior).
//!
//! `descriptor` exposes validated endpoint metadata plus the provider's token-exchange and
//! profile-auth shapes. `profile` defines [`NormalizeProfile`], the pure mapping from provider JSON
//! to [`UserProfile`](crate::auth::UserProfile). `known` bundles presets for common providers, and
//! `strategy` defines the [`Strategy`] contract the flow engine drives.

pub mod descriptor;
pub mod known;
pub mod profile;
pub mod strategy;

pub use descriptor::*;
pub use known::*;
pub use profile::*;
pub use strategy::*;
