#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use oauth2_gatekeeper::{
	auth::ProviderId,
	config::StrategyConfig,
	error::{Error, ProfileFetchError, TokenExchangeError},
	flows::{AuthOutcome, Authenticate, Authenticator},
	host::BufferedContext,
	http::ReqwestHttpClient,
	provider::{
		ClientAuthMethod, KnownProvider, NormalizeProfile, OAuth2Strategy, ProfileAuthMethod,
		ProviderDescriptor, ReqwestStrategy,
	},
	reqwest::Client,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
// base64("client-it:secret-it")
const BASIC: &str = "Basic Y2xpZW50LWl0OnNlY3JldC1pdA==";

fn http_client() -> ReqwestHttpClient {
	ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Insecure test client should build."),
	)
}

fn build_descriptor(
	server: &MockServer,
	client: ClientAuthMethod,
	profile: ProfileAuthMethod,
) -> ProviderDescriptor {
	let provider_id =
		ProviderId::new("mock-http").expect("Provider identifier should be valid for flow test.");

	ProviderDescriptor::builder(provider_id)
		.endpoints(&server.url("/authorize"), &server.url("/token"), &server.url("/me"))
		.expect("Mock endpoints should parse successfully.")
		.client_auth_method(client)
		.profile_auth_method(profile)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn build_config() -> StrategyConfig {
	StrategyConfig::builder()
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.redirect_uri("https://app.example.com/callback")
		.response_type("code")
		.scope("user-read-email")
		.build()
		.expect("Strategy config should build successfully.")
}

fn build_engine(
	descriptor: ProviderDescriptor,
	normalizer: Arc<dyn NormalizeProfile>,
) -> Authenticator<ReqwestStrategy> {
	Authenticator::new(OAuth2Strategy::with_http_client(
		descriptor,
		build_config(),
		normalizer,
		http_client(),
	))
}

#[tokio::test]
async fn start_redirects_to_the_provider_without_contacting_it() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(500);
		})
		.await;
	let engine = build_engine(
		build_descriptor(&server, ClientAuthMethod::ClientSecretBasic, ProfileAuthMethod::Bearer),
		KnownProvider::Spotify.normalizer(),
	);
	let mut ctx = BufferedContext::new("", Vec::new());
	let outcome = engine.authenticate(&mut ctx).await.expect("Start phase should succeed.");
	let location = ctx.redirected_to().expect("Start phase should redirect.");

	assert!(matches!(outcome, AuthOutcome::Redirected { .. }));
	assert!(location.starts_with(&server.url("/authorize?client_id=client-it&")));
	assert!(location.ends_with("response_type=code&scope=user-read-email"));
	assert!(!location.contains(CLIENT_SECRET));

	token_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn basic_exchange_and_bearer_profile_yield_auth_data() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("authorization", BASIC)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-it\",\"token_type\":\"Bearer\",\"expires_in\":3600,\"refresh_token\":\"refresh-it\"}",
			);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").header("authorization", "Bearer access-it");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"wizzler\",\"display_name\":\"Wizzler\",\"email\":\"w@example.com\",\"images\":[]}",
			);
		})
		.await;
	let engine = build_engine(
		build_descriptor(&server, ClientAuthMethod::ClientSecretBasic, ProfileAuthMethod::Bearer),
		KnownProvider::Spotify.normalizer(),
	);
	let mut ctx = BufferedContext::new("?code=abc%26123&state=s-1", Vec::new());
	let outcome = engine.authenticate(&mut ctx).await.expect("Callback should complete.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	let AuthOutcome::Authenticated { auth, state } = outcome else {
		panic!("Callback should produce auth data.");
	};

	assert_eq!(state.as_deref(), Some("s-1"));
	assert_eq!(auth.token_data.access_token.expose(), "access-it");
	assert_eq!(auth.token_data.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-it"));
	assert_eq!(auth.user_info.provider, "mock-http");
	assert_eq!(auth.user_info.provider_user_id, "wizzler");
	assert_eq!(auth.user_info.display_name.as_deref(), Some("Wizzler"));
	assert!(auth.user_info.photos.is_empty());
}

#[tokio::test]
async fn json_exchange_and_token_header_handle_numeric_ids() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").header("content-type", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"gho-it\",\"token_type\":\"bearer\",\"scope\":\"read:user\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").header("authorization", "token gho-it");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":583231,\"login\":\"octocat\",\"name\":\"The Octocat\"}");
		})
		.await;
	let engine = build_engine(
		build_descriptor(
			&server,
			ClientAuthMethod::ClientSecretJson,
			ProfileAuthMethod::TokenHeader,
		),
		KnownProvider::GitHub.normalizer(),
	);
	let mut ctx = BufferedContext::new("?code=gh-code", Vec::new());
	let outcome = engine.authenticate(&mut ctx).await.expect("Callback should complete.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	let profile = outcome.user_info().expect("Outcome should carry a profile.");

	assert_eq!(profile.provider_user_id, "583231");
	assert_eq!(profile.username.as_deref(), Some("octocat"));
	assert_eq!(profile.display_name.as_deref(), Some("The Octocat"));
}

#[tokio::test]
async fn query_parameter_profile_auth_appends_the_token() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"fb-it\",\"token_type\":\"bearer\",\"expires_in\":5183944}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").query_param("access_token", "fb-it");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"10\",\"name\":\"Ada Lovelace\",\"first_name\":\"Ada\",\"last_name\":\"Lovelace\"}");
		})
		.await;
	let engine = build_engine(
		build_descriptor(
			&server,
			ClientAuthMethod::ClientSecretPost,
			ProfileAuthMethod::QueryParameter("access_token".into()),
		),
		KnownProvider::Facebook.normalizer(),
	);
	let mut ctx = BufferedContext::new("?code=fb-code", Vec::new());
	let outcome = engine.authenticate(&mut ctx).await.expect("Callback should complete.");

	profile_mock.assert_async().await;

	let profile = outcome.user_info().expect("Outcome should carry a profile.");

	assert_eq!(profile.name.given_name.as_deref(), Some("Ada"));
	assert_eq!(profile.name.family_name.as_deref(), Some("Lovelace"));
}

#[tokio::test]
async fn token_endpoint_failures_skip_the_profile_fetch() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"bad secret\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(200).body("{\"id\":\"never\"}");
		})
		.await;
	let engine = build_engine(
		build_descriptor(&server, ClientAuthMethod::ClientSecretPost, ProfileAuthMethod::Bearer),
		KnownProvider::Discord.normalizer(),
	);
	let mut ctx = BufferedContext::new("?code=stale", Vec::new());
	let err = engine.authenticate(&mut ctx).await.expect_err("401 responses must fail.");

	assert!(matches!(
		err,
		Error::TokenExchange(TokenExchangeError::Status { status: 401, error: Some(ref e), .. })
			if e == "invalid_client"
	));

	token_mock.assert_async().await;
	profile_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn profile_without_id_is_an_error_not_a_partial_profile() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-it\"}");
		})
		.await;
	let _profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"display_name\":\"Nobody\"}");
		})
		.await;
	let engine = build_engine(
		build_descriptor(&server, ClientAuthMethod::ClientSecretBasic, ProfileAuthMethod::Bearer),
		KnownProvider::Spotify.normalizer(),
	);
	let mut ctx = BufferedContext::new("?code=c", Vec::new());
	let err = engine.authenticate(&mut ctx).await.expect_err("Missing ids must fail.");

	assert!(matches!(
		err,
		Error::ProfileFetch(ProfileFetchError::MissingId { ref provider, field: "id" }) if provider == "mock-http"
	));
}

#[tokio::test]
async fn built_client_surfaces_token_redirects_instead_of_following_them() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(302).header("location", "/elsewhere");
		})
		.await;
	let elsewhere_mock = server
		.mock_async(|when, then| {
			when.path("/elsewhere");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"followed\"}");
		})
		.await;
	let engine = <Authenticator<ReqwestStrategy>>::new(OAuth2Strategy::with_http_client(
		build_descriptor(&server, ClientAuthMethod::ClientSecretPost, ProfileAuthMethod::Bearer),
		build_config(),
		KnownProvider::Discord.normalizer(),
		ReqwestHttpClient::build().expect("Default reqwest client should build."),
	));
	let mut ctx = BufferedContext::new("?code=c", Vec::new());
	let err = engine.authenticate(&mut ctx).await.expect_err("Redirects must not be followed.");

	assert!(matches!(err, Error::TokenExchange(TokenExchangeError::Status { status: 302, .. })));

	token_mock.assert_async().await;
	elsewhere_mock.assert_hits_async(0).await;
}
