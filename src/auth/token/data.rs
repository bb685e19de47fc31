//! Token data returned by a provider's token endpoint.

// self
use crate::{_prelude::*, auth::token::secret::Secret};

/// Access token plus the optional metadata providers attach to it.
///
/// Received once per flow execution and handed to the host inside
/// [`AuthData`](crate::auth::AuthData); the gatekeeper never persists it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
	/// Access token secret.
	pub access_token: Secret,
	/// Token type reported by the provider (usually `Bearer`).
	pub token_type: Option<String>,
	/// Raw scope string granted by the provider.
	pub scope: Option<String>,
	/// Lifetime in seconds, when supplied.
	pub expires_in: Option<u64>,
	/// Refresh token secret, when issued. Never used by the gatekeeper itself.
	pub refresh_token: Option<Secret>,
	/// Instant the token response was received.
	pub received_at: OffsetDateTime,
}
impl TokenData {
	/// Creates token data with only the mandatory access token, stamped with the current time.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: Secret::new(access_token),
			token_type: None,
			scope: None,
			expires_in: None,
			refresh_token: None,
			received_at: OffsetDateTime::now_utc(),
		}
	}

	/// Absolute expiry derived from `received_at + expires_in`.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let secs = i64::try_from(self.expires_in?).ok()?;

		self.received_at.checked_add(Duration::seconds(secs))
	}

	/// Returns `true` if the token is known to be expired at `instant`.
	///
	/// Tokens without an `expires_in` hint are never reported as expired.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for TokenData {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenData")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_in", &self.expires_in)
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("received_at", &self.received_at)
			.finish()
	}
}
