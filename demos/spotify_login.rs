//! Walks a Spotify-shaped login through both phases against a local mock provider: the START
//! redirect, then the callback that exchanges the code and normalizes the profile.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_gatekeeper::{
	auth::ProviderId,
	config::StrategyConfig,
	flows::{AuthOutcome, Authenticate, Authenticator},
	host::BufferedContext,
	http::ReqwestHttpClient,
	provider::{KnownProvider, OAuth2Strategy, ProviderDescriptor},
	reqwest::Client,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"demo-user\",\"display_name\":\"Demo User\",\"email\":\"demo@example.com\"}",
			);
		})
		.await;
	// Same wire shapes as the Spotify preset, pointed at the mock server.
	let preset = KnownProvider::Spotify.descriptor()?;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("spotify")?)
		.endpoints(&server.url("/authorize"), &server.url("/api/token"), &server.url("/v1/me"))?
		.client_auth_method(preset.client_auth_method)
		.profile_auth_method(preset.profile_auth_method)
		.build()?;
	let config = StrategyConfig::builder()
		.client_id("demo-client")
		.client_secret("demo-secret")
		.redirect_uri("http://localhost:8888/callback")
		.response_type("code")
		.scope("user-read-email")
		.state("demo-state")
		.build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let engine = <Authenticator<OAuth2Strategy<ReqwestHttpClient>>>::new(
		OAuth2Strategy::with_http_client(
			descriptor,
			config,
			KnownProvider::Spotify.normalizer(),
			Arc::new(http_client),
		),
	);
	let mut login = BufferedContext::new("", Vec::new());

	engine.authenticate(&mut login).await?;

	println!("Redirect the browser to: {}.", login.redirected_to().unwrap_or_default());

	let callback_url = Url::parse("http://localhost:8888/callback?code=demo-code&state=demo-state")?;
	let mut callback = BufferedContext::from_url(&callback_url);

	if let AuthOutcome::Authenticated { auth, state } = engine.authenticate(&mut callback).await? {
		println!(
			"Signed in {} ({}) via {}; state {:?}.",
			auth.user_info.display_name.as_deref().unwrap_or("<unnamed>"),
			auth.user_info.provider_user_id,
			auth.user_info.provider,
			state,
		);
	}

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	Ok(())
}
