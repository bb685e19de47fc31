//! Strategy construction options.
//!
//! [`StrategyConfig`] is immutable once built: the three mandatory options are validated up
//! front and extension parameters (`scope`, `state`, `response_type`, ...) are kept as an ordered
//! list so the authorize URL is deterministic. Both config types deserialize through the same
//! validation the builders apply.

// crates.io
use serde::{
	Deserializer, Serializer,
	de::{MapAccess, Visitor},
	ser::SerializeMap,
};
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Option names every OAuth strategy requires.
pub const RESERVED_OPTIONS: [&str; 3] = ["client_id", "client_secret", "redirect_uri"];

/// Immutable per-strategy settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStrategyConfig", into = "RawStrategyConfig")]
pub struct StrategyConfig {
	client_id: String,
	client_secret: Secret,
	redirect_uri: String,
	params: Vec<(String, String)>,
}
impl StrategyConfig {
	/// Starts a new builder.
	pub fn builder() -> StrategyConfigBuilder {
		StrategyConfigBuilder::default()
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth client secret.
	pub fn client_secret(&self) -> &Secret {
		&self.client_secret
	}

	/// Redirect URI registered with the provider.
	pub fn redirect_uri(&self) -> &str {
		&self.redirect_uri
	}

	/// Extension parameters in insertion order.
	pub fn params(&self) -> &[(String, String)] {
		&self.params
	}

	/// Looks up an extension parameter.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Every option in a stable order: the mandatory options first, then extensions.
	///
	/// The client secret is included; callers building URLs must skip it.
	pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
		[
			("client_id", self.client_id.as_str()),
			("client_secret", self.client_secret.expose()),
			("redirect_uri", self.redirect_uri.as_str()),
		]
		.into_iter()
		.chain(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("redirect_uri", &self.redirect_uri)
			.field("params", &self.params)
			.finish()
	}
}
impl TryFrom<RawStrategyConfig> for StrategyConfig {
	type Error = ConfigError;

	fn try_from(raw: RawStrategyConfig) -> Result<Self, Self::Error> {
		let mut builder = StrategyConfig::builder()
			.client_id(raw.client_id)
			.client_secret(raw.client_secret)
			.redirect_uri(raw.redirect_uri);

		for (key, value) in raw.params.0 {
			builder = builder.param(key, value);
		}

		builder.build()
	}
}

/// Builder for [`StrategyConfig`].
#[derive(Debug, Default)]
pub struct StrategyConfigBuilder {
	client_id: Option<String>,
	client_secret: Option<Secret>,
	redirect_uri: Option<String>,
	params: Vec<(String, String)>,
}
impl StrategyConfigBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(Secret::new(value));

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, value: impl Into<String>) -> Self {
		self.redirect_uri = Some(value.into());

		self
	}

	/// Appends an extension parameter; a repeated key replaces the earlier value in place.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		let value = value.into();

		match self.params.iter_mut().find(|(k, _)| *k == key) {
			Some(slot) => slot.1 = value,
			None => self.params.push((key, value)),
		}

		self
	}

	/// Sets the `scope` extension parameter.
	pub fn scope(self, scope: impl Into<String>) -> Self {
		self.param("scope", scope)
	}

	/// Sets the `state` extension parameter.
	pub fn state(self, state: impl Into<String>) -> Self {
		self.param("state", state)
	}

	/// Sets the `response_type` extension parameter.
	pub fn response_type(self, response_type: impl Into<String>) -> Self {
		self.param("response_type", response_type)
	}

	/// Validates and freezes the configuration.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		let client_id = required("client_id", self.client_id)?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::MissingOption { option: "client_secret" })?;
		let redirect_uri = required("redirect_uri", self.redirect_uri)?;

		for (key, _) in &self.params {
			if key.is_empty() {
				return Err(ConfigError::EmptyParamKey);
			}
			if RESERVED_OPTIONS.contains(&key.as_str()) {
				return Err(ConfigError::ReservedParam { key: key.clone() });
			}
		}

		Ok(StrategyConfig { client_id, client_secret, redirect_uri, params: self.params })
	}
}

/// Credential field names read by the local strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLocalConfig", into = "RawLocalConfig")]
pub struct LocalConfig {
	username_field: String,
	password_field: String,
}
impl LocalConfig {
	const DEFAULT_PASSWORD_FIELD: &'static str = "password";
	const DEFAULT_USERNAME_FIELD: &'static str = "username";

	/// Creates a configuration with custom field names.
	pub fn new(
		username_field: impl Into<String>,
		password_field: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let username_field = username_field.into();
		let password_field = password_field.into();

		if username_field.is_empty() || password_field.is_empty() {
			return Err(ConfigError::InvalidCredentialFields { reason: "field names are empty" });
		}
		if username_field == password_field {
			return Err(ConfigError::InvalidCredentialFields {
				reason: "username and password share a field",
			});
		}

		Ok(Self { username_field, password_field })
	}

	/// Body field carrying the username.
	pub fn username_field(&self) -> &str {
		&self.username_field
	}

	/// Body field carrying the password.
	pub fn password_field(&self) -> &str {
		&self.password_field
	}
}
impl Default for LocalConfig {
	fn default() -> Self {
		Self {
			username_field: Self::DEFAULT_USERNAME_FIELD.into(),
			password_field: Self::DEFAULT_PASSWORD_FIELD.into(),
		}
	}
}
impl TryFrom<RawLocalConfig> for LocalConfig {
	type Error = ConfigError;

	fn try_from(raw: RawLocalConfig) -> Result<Self, Self::Error> {
		Self::new(raw.username_field, raw.password_field)
	}
}

#[derive(Serialize, Deserialize)]
struct RawStrategyConfig {
	client_id: String,
	client_secret: String,
	redirect_uri: String,
	#[serde(default)]
	params: OrderedParams,
}
impl From<StrategyConfig> for RawStrategyConfig {
	fn from(config: StrategyConfig) -> Self {
		Self {
			client_id: config.client_id,
			client_secret: config.client_secret.expose().to_owned(),
			redirect_uri: config.redirect_uri,
			params: OrderedParams(config.params),
		}
	}
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawLocalConfig {
	username_field: String,
	password_field: String,
}
impl Default for RawLocalConfig {
	fn default() -> Self {
		LocalConfig::default().into()
	}
}
impl From<LocalConfig> for RawLocalConfig {
	fn from(config: LocalConfig) -> Self {
		Self { username_field: config.username_field, password_field: config.password_field }
	}
}

/// String map that keeps document order on both sides of serde.
#[derive(Default)]
struct OrderedParams(Vec<(String, String)>);
impl Serialize for OrderedParams {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.0.len()))?;

		for (key, value) in &self.0 {
			map.serialize_entry(key, value)?;
		}

		map.end()
	}
}
impl<'de> Deserialize<'de> for OrderedParams {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct OrderedVisitor;
		impl<'de> Visitor<'de> for OrderedVisitor {
			type Value = OrderedParams;

			fn expecting(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("a map of string parameters")
			}

			fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
			where
				A: MapAccess<'de>,
			{
				let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or_default());

				while let Some((key, value)) = access.next_entry::<String, String>()? {
					pairs.push((key, value));
				}

				Ok(OrderedParams(pairs))
			}
		}

		deserializer.deserialize_map(OrderedVisitor)
	}
}

fn required(option: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	value.filter(|value| !value.is_empty()).ok_or(ConfigError::MissingOption { option })
}
