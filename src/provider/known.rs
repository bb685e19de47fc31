//! Presets for providers whose wire shapes are well known.
//!
//! Each preset pairs a [`ProviderDescriptor`] with a profile normalizer. Between them they cover
//! every token-exchange and profile-auth shape the engine supports.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{NameParts, ProviderId, TokenData, UserProfile},
	error::{ConfigError, ProfileFetchError},
	provider::{
		ClientAuthMethod, NormalizeProfile, ProfileAuthMethod, ProviderDescriptor, optional_str,
		pointer_str, required_id,
	},
};

/// Built-in provider presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownProvider {
	/// Spotify accounts: Basic client auth, Bearer profile auth.
	Spotify,
	/// GitHub OAuth apps: JSON token body, `token` profile auth, numeric user ids.
	GitHub,
	/// Discord: form-post client auth, Bearer profile auth.
	Discord,
	/// Facebook Graph API: form-post client auth, token in the profile query string.
	Facebook,
}
impl KnownProvider {
	/// Fixed strategy name.
	pub const fn as_str(self) -> &'static str {
		match self {
			KnownProvider::Spotify => "spotify",
			KnownProvider::GitHub => "github",
			KnownProvider::Discord => "discord",
			KnownProvider::Facebook => "facebook",
		}
	}

	/// Builds the provider's descriptor.
	pub fn descriptor(self) -> Result<ProviderDescriptor, ConfigError> {
		let id = ProviderId::new(self.as_str())?;
		let (authorization, token, profile) = self.endpoints();
		let (client_auth, profile_auth) = match self {
			KnownProvider::Spotify => (ClientAuthMethod::ClientSecretBasic, ProfileAuthMethod::Bearer),
			KnownProvider::GitHub =>
				(ClientAuthMethod::ClientSecretJson, ProfileAuthMethod::TokenHeader),
			KnownProvider::Discord => (ClientAuthMethod::ClientSecretPost, ProfileAuthMethod::Bearer),
			KnownProvider::Facebook => (
				ClientAuthMethod::ClientSecretPost,
				ProfileAuthMethod::QueryParameter("access_token".into()),
			),
		};
		let descriptor = ProviderDescriptor::builder(id)
			.endpoints(authorization, token, profile)?
			.client_auth_method(client_auth)
			.profile_auth_method(profile_auth)
			.build()?;

		Ok(descriptor)
	}

	/// Returns the provider's profile normalizer.
	pub fn normalizer(self) -> Arc<dyn NormalizeProfile> {
		match self {
			KnownProvider::Spotify => Arc::new(spotify_profile),
			KnownProvider::GitHub => Arc::new(github_profile),
			KnownProvider::Discord => Arc::new(discord_profile),
			KnownProvider::Facebook => Arc::new(facebook_profile),
		}
	}

	const fn endpoints(self) -> (&'static str, &'static str, &'static str) {
		match self {
			KnownProvider::Spotify => (
				"https://accounts.spotify.com/authorize",
				"https://accounts.spotify.com/api/token",
				"https://api.spotify.com/v1/me",
			),
			KnownProvider::GitHub => (
				"https://github.com/login/oauth/authorize",
				"https://github.com/login/oauth/access_token",
				"https://api.github.com/user",
			),
			KnownProvider::Discord => (
				"https://discord.com/oauth2/authorize",
				"https://discord.com/api/oauth2/token",
				"https://discord.com/api/users/@me",
			),
			KnownProvider::Facebook => (
				"https://www.facebook.com/v18.0/dialog/oauth",
				"https://graph.facebook.com/v18.0/oauth/access_token",
				"https://graph.facebook.com/v18.0/me?fields=id,name,first_name,last_name,middle_name,email",
			),
		}
	}
}
impl Display for KnownProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

fn spotify_profile(
	provider: &ProviderId,
	raw: &Value,
	_: &TokenData,
) -> Result<UserProfile, ProfileFetchError> {
	let id = required_id(provider, raw, "id")?;

	Ok(UserProfile::new(provider, id)
		.with_display_name(optional_str(raw, "display_name"))
		.with_email(optional_str(raw, "email"), None)
		.with_photo(pointer_str(raw, "/images/0/url"))
		.with_raw(raw.clone()))
}

fn github_profile(
	provider: &ProviderId,
	raw: &Value,
	_: &TokenData,
) -> Result<UserProfile, ProfileFetchError> {
	let id = required_id(provider, raw, "id")?;

	Ok(UserProfile::new(provider, id)
		.with_display_name(optional_str(raw, "name"))
		.with_username(optional_str(raw, "login"))
		.with_email(optional_str(raw, "email"), None)
		.with_photo(optional_str(raw, "avatar_url"))
		.with_raw(raw.clone()))
}

fn discord_profile(
	provider: &ProviderId,
	raw: &Value,
	_: &TokenData,
) -> Result<UserProfile, ProfileFetchError> {
	let id = required_id(provider, raw, "id")?;
	let username = optional_str(raw, "username");

	Ok(UserProfile::new(provider, id)
		.with_display_name(optional_str(raw, "global_name").or_else(|| username.clone()))
		.with_username(username)
		.with_email(optional_str(raw, "email"), raw.get("verified").and_then(Value::as_bool))
		.with_raw(raw.clone()))
}

fn facebook_profile(
	provider: &ProviderId,
	raw: &Value,
	_: &TokenData,
) -> Result<UserProfile, ProfileFetchError> {
	let id = required_id(provider, raw, "id")?;
	let name = NameParts {
		family_name: optional_str(raw, "last_name"),
		given_name: optional_str(raw, "first_name"),
		middle_name: optional_str(raw, "middle_name"),
	};

	Ok(UserProfile::new(provider, id)
		.with_display_name(optional_str(raw, "name"))
		.with_name(name)
		.with_email(optional_str(raw, "email"), None)
		.with_raw(raw.clone()))
}
