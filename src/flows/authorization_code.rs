//! Authorization Code grant: phase detection, redirect, code exchange, profile fetch.
//!
//! Phases are derived from the request alone:
//!
//! - no query string (or a bare `?`) starts the flow by redirecting to the strategy's authorize
//!   URL;
//! - any other query is treated as the provider callback. It is rejected before any network call
//!   when it mentions `error`; otherwise its `code` parameter, wherever it sits, is decoded and
//!   exchanged for a token, and the token is used to fetch and normalize the profile.

// self
use crate::{
	_prelude::*,
	auth::{AuthData, TokenData, UserProfile},
	codec::CallbackQuery,
	flows::{AuthFuture, AuthOutcome, Authenticate, Authenticator},
	host::HostContext,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::Strategy,
};

/// Returns `true` when `search` carries no parameters and therefore starts a flow.
pub fn is_start(search: &str) -> bool {
	search.strip_prefix('?').unwrap_or(search).is_empty()
}

impl<S> Authenticator<S>
where
	S: ?Sized + Strategy,
{
	/// START phase: instructs the host to redirect to the strategy's authorize URL.
	///
	/// The URL never contains the client secret.
	pub fn begin(&self, ctx: &mut dyn HostContext) -> AuthOutcome {
		const STAGE: FlowStage = FlowStage::Authorize;

		let _guard = FlowSpan::new(STAGE, self.strategy.provider()).entered();

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let location = self.strategy.authorize_url().to_owned();

		ctx.redirect(&location);
		obs::record_flow_outcome(STAGE, FlowOutcome::Success);

		AuthOutcome::Redirected { location }
	}

	/// Parses a callback query, rejecting provider-reported errors and callbacks without a code.
	pub fn parse_callback(&self, search: &str) -> Result<CallbackQuery> {
		const STAGE: FlowStage = FlowStage::Callback;

		let _guard = FlowSpan::new(STAGE, self.strategy.provider()).entered();

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = CallbackQuery::parse(search).map_err(Error::from);

		obs::record_result(STAGE, &result);

		result
	}

	/// Exchanges an already decoded authorization code for token data.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenData> {
		const STAGE: FlowStage = FlowStage::TokenExchange;

		let span = FlowSpan::new(STAGE, self.strategy.provider());

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span.instrument(self.strategy.exchange_code(code)).await;

		obs::record_result(STAGE, &result);

		result
	}

	/// Fetches and normalizes the profile that owns `token`.
	pub async fn fetch_profile(&self, token: &TokenData) -> Result<UserProfile> {
		const STAGE: FlowStage = FlowStage::ProfileFetch;

		let span = FlowSpan::new(STAGE, self.strategy.provider());

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span.instrument(self.strategy.fetch_profile(token)).await;

		obs::record_result(STAGE, &result);

		result
	}

	/// Runs the CALLBACK phase to completion: code exchange followed by profile fetch.
	///
	/// Either a complete [`AuthData`] or one error comes back.
	pub async fn complete(&self, callback: &CallbackQuery) -> Result<AuthData> {
		let token_data = self.exchange_code(&callback.code).await?;
		let user_info = self.fetch_profile(&token_data).await?;

		Ok(AuthData { token_data, user_info })
	}
}
impl<S> Authenticate for Authenticator<S>
where
	S: ?Sized + Strategy,
{
	fn name(&self) -> &str {
		self.strategy.provider()
	}

	fn authenticate<'a>(&'a self, ctx: &'a mut dyn HostContext) -> AuthFuture<'a, AuthOutcome> {
		Box::pin(async move {
			if is_start(ctx.search()) {
				return Ok(self.begin(ctx));
			}

			let callback = self.parse_callback(ctx.search())?;
			let auth = self.complete(&callback).await?;

			Ok(AuthOutcome::Authenticated { auth, state: callback.state })
		})
	}
}
