//! Token payloads issued by provider token endpoints.

pub mod data;
pub mod secret;
