//! Provider-neutral user profile.

// self
use crate::{_prelude::*, auth::ProviderId};

/// Structured name parts; every field is best-effort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameParts {
	/// Family (last) name.
	pub family_name: Option<String>,
	/// Given (first) name.
	pub given_name: Option<String>,
	/// Middle name.
	pub middle_name: Option<String>,
}
impl NameParts {
	/// Returns `true` when no part is populated.
	pub fn is_empty(&self) -> bool {
		self.family_name.is_none() && self.given_name.is_none() && self.middle_name.is_none()
	}
}

/// Email address reported by a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
	/// Address as reported.
	pub value: String,
	/// Provider's verification flag, when it reports one.
	pub verified: Option<bool>,
}

/// Standardized identity record produced once per flow execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Fixed name of the strategy that produced the profile.
	pub provider: String,
	/// Provider-scoped user identifier.
	pub provider_user_id: String,
	/// Display name.
	pub display_name: Option<String>,
	/// Login handle, for providers that have one.
	pub username: Option<String>,
	/// Structured name parts.
	pub name: NameParts,
	/// Email addresses.
	pub emails: Vec<Email>,
	/// Avatar or photo URLs.
	pub photos: Vec<String>,
	/// Provider JSON the profile was normalized from.
	#[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
	pub raw: serde_json::Value,
}
impl UserProfile {
	/// Creates a profile carrying only the mandatory identity fields.
	pub fn new(provider: &ProviderId, provider_user_id: impl Into<String>) -> Self {
		Self {
			provider: provider.to_string(),
			provider_user_id: provider_user_id.into(),
			display_name: None,
			username: None,
			name: NameParts::default(),
			emails: Vec::new(),
			photos: Vec::new(),
			raw: serde_json::Value::Null,
		}
	}

	/// Sets the display name.
	pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
		self.display_name = display_name;

		self
	}

	/// Sets the login handle.
	pub fn with_username(mut self, username: Option<String>) -> Self {
		self.username = username;

		self
	}

	/// Sets the structured name parts.
	pub fn with_name(mut self, name: NameParts) -> Self {
		self.name = name;

		self
	}

	/// Appends an email address when one is present.
	pub fn with_email(mut self, value: Option<String>, verified: Option<bool>) -> Self {
		if let Some(value) = value.filter(|value| !value.is_empty()) {
			self.emails.push(Email { value, verified });
		}

		self
	}

	/// Appends a photo URL when one is present.
	pub fn with_photo(mut self, url: Option<String>) -> Self {
		if let Some(url) = url.filter(|url| !url.is_empty()) {
			self.photos.push(url);
		}

		self
	}

	/// Attaches the raw provider JSON.
	pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
		self.raw = raw;

		self
	}

	/// First reported email, if any.
	pub fn primary_email(&self) -> Option<&str> {
		self.emails.first().map(|email| email.value.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builders_skip_empty_values() {
		let provider = ProviderId::new("local").expect("Provider fixture should be valid.");
		let profile = UserProfile::new(&provider, "42")
			.with_email(Some(String::new()), None)
			.with_email(Some("a@example.com".into()), Some(true))
			.with_photo(None);

		assert_eq!(profile.provider, "local");
		assert_eq!(profile.primary_email(), Some("a@example.com"));
		assert!(profile.photos.is_empty());
		assert!(profile.name.is_empty());
	}

	#[test]
	fn serializes_with_camel_case_keys() {
		let provider = ProviderId::new("github").expect("Provider fixture should be valid.");
		let json = serde_json::to_value(UserProfile::new(&provider, "7"))
			.expect("Profile should serialize.");

		assert_eq!(json["providerUserId"], "7");
		assert_eq!(json["provider"], "github");
		assert!(json.get("raw").is_none());
	}
}
