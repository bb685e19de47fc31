//! The strategy contract consumed by the flow engine, plus the descriptor-driven implementation.
//!
//! A strategy owns its provider's construction options and knows three things: where to send the
//! user agent, how to trade a code for a token, and how to turn a token into a profile. The engine
//! in [`flows`](crate::flows) only ever talks to this trait.

// crates.io
use oauth2::AsyncHttpClient;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenData, UserProfile},
	codec,
	config::StrategyConfig,
	error::{ConfigError, ProfileFetchError, TokenExchangeError},
	http::AuthHttpClient,
	oauth,
	provider::{KnownProvider, NormalizeProfile, ProviderDescriptor},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Boxed future returned by strategy calls.
pub type StrategyFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport.
pub type ReqwestStrategy = OAuth2Strategy<ReqwestHttpClient>;

/// Provider plug-in driven by the authorization-code engine.
///
/// Implementations hold immutable configuration after construction and may be shared by any
/// number of concurrent flow executions.
pub trait Strategy: Send + Sync {
	/// Fixed provider name copied into every profile.
	fn provider(&self) -> &ProviderId;

	/// Construction options the strategy was built with.
	fn config(&self) -> &StrategyConfig;

	/// Fully formed authorization URL; identical for every call on the same instance.
	fn authorize_url(&self) -> &str;

	/// Trades a decoded authorization code for token data. Called at most once per callback.
	fn exchange_code<'a>(&'a self, code: &'a str) -> StrategyFuture<'a, TokenData>;

	/// Fetches and normalizes the profile of the token's owner.
	fn fetch_profile<'a>(&'a self, token: &'a TokenData) -> StrategyFuture<'a, UserProfile>;
}

/// Descriptor-driven [`Strategy`] covering every provider the wire shapes in
/// [`oauth`] can express.
pub struct OAuth2Strategy<C>
where
	C: ?Sized + AuthHttpClient,
{
	descriptor: ProviderDescriptor,
	config: StrategyConfig,
	normalizer: Arc<dyn NormalizeProfile>,
	http_client: Arc<C>,
	authorize_url: String,
}
impl<C> OAuth2Strategy<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a strategy that reuses the caller-provided transport.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		config: StrategyConfig,
		normalizer: Arc<dyn NormalizeProfile>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let authorize_url = build_authorize_url(&descriptor, &config);

		Self { descriptor, config, normalizer, http_client: http_client.into(), authorize_url }
	}

	/// Creates a strategy for one of the [`KnownProvider`] presets.
	pub fn known_with_http_client(
		provider: KnownProvider,
		config: StrategyConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(
			provider.descriptor()?,
			config,
			provider.normalizer(),
			http_client,
		))
	}

	/// Descriptor the strategy was built from.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Strategy<ReqwestHttpClient> {
	/// Creates a strategy backed by a fresh [`ReqwestHttpClient`].
	pub fn new(
		descriptor: ProviderDescriptor,
		config: StrategyConfig,
		normalizer: Arc<dyn NormalizeProfile>,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(descriptor, config, normalizer, ReqwestHttpClient::build()?))
	}

	/// Creates a [`KnownProvider`] strategy backed by a fresh [`ReqwestHttpClient`].
	pub fn known(provider: KnownProvider, config: StrategyConfig) -> Result<Self, ConfigError> {
		Self::known_with_http_client(provider, config, ReqwestHttpClient::build()?)
	}
}
impl<C> Strategy for OAuth2Strategy<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn provider(&self) -> &ProviderId {
		&self.descriptor.id
	}

	fn config(&self) -> &StrategyConfig {
		&self.config
	}

	fn authorize_url(&self) -> &str {
		&self.authorize_url
	}

	fn exchange_code<'a>(&'a self, code: &'a str) -> StrategyFuture<'a, TokenData> {
		Box::pin(async move {
			let request = oauth::token_request(&self.descriptor, &self.config, code)?;
			let handle = self.http_client.handle();
			let response = handle
				.call(request)
				.await
				.map_err(|e| TokenExchangeError::Transport(oauth::map_transport_error(e)))?;

			Ok(oauth::map_token_response(&response)?)
		})
	}

	fn fetch_profile<'a>(&'a self, token: &'a TokenData) -> StrategyFuture<'a, UserProfile> {
		Box::pin(async move {
			let request = oauth::profile_request(&self.descriptor, &token.access_token)?;
			let handle = self.http_client.handle();
			let response = handle
				.call(request)
				.await
				.map_err(|e| ProfileFetchError::Transport(oauth::map_transport_error(e)))?;
			let raw = oauth::map_profile_response(&response)?;

			Ok(self.normalizer.normalize(&self.descriptor.id, &raw, token)?)
		})
	}
}
impl<C> Debug for OAuth2Strategy<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Strategy")
			.field("descriptor", &self.descriptor)
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

/// `authorization_endpoint ? encode(options minus client_secret)`.
///
/// When the endpoint already carries a query the options are appended with `&`.
fn build_authorize_url(descriptor: &ProviderDescriptor, config: &StrategyConfig) -> String {
	let endpoint = descriptor.endpoints.authorization.as_str();
	let query = codec::encode(config.options(), &["client_secret"]);

	if query.is_empty() {
		return endpoint.to_owned();
	}

	let separator = if descriptor.endpoints.authorization.query().is_some() { '&' } else { '?' };

	format!("{endpoint}{separator}{query}")
}
