//! Profile normalization: provider JSON in, [`UserProfile`] out.
//!
//! Normalizers are pure. The only hard requirement is the provider's user identifier; every other
//! field is copied when present and skipped otherwise.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenData, UserProfile},
	error::ProfileFetchError,
};

/// Maps a provider's raw profile payload into a [`UserProfile`].
///
/// Any `Fn(&ProviderId, &Value, &TokenData) -> Result<UserProfile, ProfileFetchError>` closure is a
/// normalizer, so ad-hoc providers do not need a named type.
pub trait NormalizeProfile: Send + Sync {
	/// Normalizes `raw` for the strategy named `provider`.
	fn normalize(
		&self,
		provider: &ProviderId,
		raw: &Value,
		token: &TokenData,
	) -> Result<UserProfile, ProfileFetchError>;
}
impl<F> NormalizeProfile for F
where
	F: Send + Sync + Fn(&ProviderId, &Value, &TokenData) -> Result<UserProfile, ProfileFetchError>,
{
	fn normalize(
		&self,
		provider: &ProviderId,
		raw: &Value,
		token: &TokenData,
	) -> Result<UserProfile, ProfileFetchError> {
		self(provider, raw, token)
	}
}

/// Reads the mandatory identifier under `field`, accepting strings and numbers.
///
/// Numeric identifiers are rendered in decimal so `12345` and `"12345"` normalize identically.
pub fn required_id(
	provider: &ProviderId,
	raw: &Value,
	field: &'static str,
) -> Result<String, ProfileFetchError> {
	match raw.get(field) {
		Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
		Some(Value::Number(id)) => Ok(id.to_string()),
		_ => Err(ProfileFetchError::MissingId { provider: provider.to_string(), field }),
	}
}

/// Reads an optional, non-empty string under `field`.
pub fn optional_str(raw: &Value, field: &str) -> Option<String> {
	raw.get(field).and_then(Value::as_str).filter(|value| !value.is_empty()).map(str::to_owned)
}

/// Reads an optional string at a JSON pointer such as `/images/0/url`.
pub fn pointer_str(raw: &Value, pointer: &str) -> Option<String> {
	raw.pointer(pointer).and_then(Value::as_str).filter(|value| !value.is_empty()).map(str::to_owned)
}

/// Normalizer that only extracts `id` plus the common `name`/`email` fields.
///
/// Used for descriptors built at runtime when no provider-specific mapping exists.
pub fn generic_profile(
	provider: &ProviderId,
	raw: &Value,
	_token: &TokenData,
) -> Result<UserProfile, ProfileFetchError> {
	let id = required_id(provider, raw, "id")?;

	Ok(UserProfile::new(provider, id)
		.with_display_name(optional_str(raw, "name"))
		.with_email(optional_str(raw, "email"), None)
		.with_raw(raw.clone()))
}
