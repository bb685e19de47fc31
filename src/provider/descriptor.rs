//! Provider descriptor data structures shared by every OAuth strategy.
//!
//! A descriptor is configuration data: endpoints plus the two wire-shape choices a provider
//! makes (how the client authenticates at the token endpoint, how the access token is presented
//! to the profile endpoint). The flow engine never branches on provider identity; it only reads
//! these fields.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// How the client authenticates when exchanging an authorization code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// `Authorization: Basic base64(client_id:client_secret)` with a form-encoded grant body.
	ClientSecretBasic,
	/// Form-encoded body carrying `client_id`/`client_secret` next to the grant.
	ClientSecretPost,
	/// JSON body `{client_id, client_secret, redirect_uri, code}`.
	ClientSecretJson,
}

/// How the access token is presented to the profile endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileAuthMethod {
	#[default]
	/// `Authorization: Bearer <token>`.
	Bearer,
	/// `Authorization: token <token>`.
	TokenHeader,
	/// Token appended to the profile URL under the given query parameter.
	QueryParameter(String),
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Browser-facing authorization endpoint.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Profile endpoint queried with the issued access token.
	pub profile: Url,
}

/// Immutable provider descriptor consumed by [`OAuth2Strategy`](crate::provider::OAuth2Strategy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Fixed provider name.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Token endpoint client authentication.
	pub client_auth_method: ClientAuthMethod,
	/// Profile endpoint token presentation.
	pub profile_auth_method: ProfileAuthMethod,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}
