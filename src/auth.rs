//! Auth-domain identifiers, secrets, token data, and normalized user profiles.

pub mod id;
pub mod profile;
pub mod token;

pub use id::*;
pub use profile::*;
pub use token::{data::*, secret::*};

// self
use crate::_prelude::*;

/// Terminal artifact of a successful authorization-code flow.
///
/// Ownership passes to the host as soon as the flow returns; the gatekeeper keeps no copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
	/// Token material issued by the provider.
	pub token_data: TokenData,
	/// Normalized profile of the authenticated user.
	pub user_info: UserProfile,
}
