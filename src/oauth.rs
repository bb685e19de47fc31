//! Wire shapes for the token exchange and profile fetch.
//!
//! Request builders turn a [`ProviderDescriptor`] plus flow inputs into [`HttpRequest`] values;
//! response mappers turn [`HttpResponse`] values into [`TokenData`] or raw profile JSON and
//! classify failures into the crate's error taxonomy.

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use serde_json::Value;
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenData},
	config::StrategyConfig,
	error::{ConfigError, ProfileFetchError, TokenExchangeError, TransportError},
	provider::{ClientAuthMethod, ProfileAuthMethod, ProviderDescriptor},
};

const BODY_PREVIEW_LIMIT: usize = 256;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct TokenPayload {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default, deserialize_with = "lenient_scope")]
	scope: Option<String>,
	#[serde(default, deserialize_with = "lenient_expires_in")]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<String>,
}

// Space-delimited per RFC 6749; some providers send an array instead. Anything else is dropped.
fn lenient_scope<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::String(scope)) => Some(scope),
		Some(Value::Array(items)) => {
			let scopes = items.iter().filter_map(Value::as_str).collect::<Vec<_>>();

			(!scopes.is_empty()).then(|| scopes.join(" "))
		},
		_ => None,
	})
}

fn lenient_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::Number(seconds)) => seconds.as_u64(),
		Some(Value::String(seconds)) => seconds.trim().parse().ok(),
		_ => None,
	})
}

/// Builds the token-exchange request for `code` in the descriptor's client auth shape.
///
/// `code` must already be decoded; form bodies re-encode it, JSON bodies carry it verbatim.
pub fn token_request(
	descriptor: &ProviderDescriptor,
	config: &StrategyConfig,
	code: &str,
) -> Result<HttpRequest, ConfigError> {
	let builder = Request::builder()
		.method(Method::POST)
		.uri(descriptor.endpoints.token.as_str())
		.header(ACCEPT, JSON_CONTENT_TYPE)
		.header(USER_AGENT, AGENT);
	let request = match descriptor.client_auth_method {
		ClientAuthMethod::ClientSecretBasic => {
			let credentials = STANDARD
				.encode(format!("{}:{}", config.client_id(), config.client_secret().expose()));
			let body = FormSerializer::new(String::new())
				.append_pair("grant_type", "authorization_code")
				.append_pair("code", code)
				.append_pair("redirect_uri", config.redirect_uri())
				.finish();

			builder
				.header(AUTHORIZATION, format!("Basic {credentials}"))
				.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
				.body(body.into_bytes())?
		},
		ClientAuthMethod::ClientSecretPost => {
			let body = FormSerializer::new(String::new())
				.append_pair("grant_type", "authorization_code")
				.append_pair("code", code)
				.append_pair("redirect_uri", config.redirect_uri())
				.append_pair("client_id", config.client_id())
				.append_pair("client_secret", config.client_secret().expose())
				.finish();

			builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body.into_bytes())?
		},
		ClientAuthMethod::ClientSecretJson => {
			let body = serde_json::json!({
				"client_id": config.client_id(),
				"client_secret": config.client_secret().expose(),
				"redirect_uri": config.redirect_uri(),
				"code": code,
			});

			builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body.to_string().into_bytes())?
		},
	};

	Ok(request)
}

/// Builds the authenticated profile request in the descriptor's token presentation shape.
pub fn profile_request(
	descriptor: &ProviderDescriptor,
	access_token: &Secret,
) -> Result<HttpRequest, ConfigError> {
	let mut url = descriptor.endpoints.profile.clone();
	let mut builder =
		Request::builder().method(Method::GET).header(ACCEPT, JSON_CONTENT_TYPE).header(USER_AGENT, AGENT);

	match &descriptor.profile_auth_method {
		ProfileAuthMethod::Bearer =>
			builder = builder.header(AUTHORIZATION, format!("Bearer {}", access_token.expose())),
		ProfileAuthMethod::TokenHeader =>
			builder = builder.header(AUTHORIZATION, format!("token {}", access_token.expose())),
		ProfileAuthMethod::QueryParameter(name) => {
			url.query_pairs_mut().append_pair(name, access_token.expose());
		},
	}

	Ok(builder.uri(url.as_str()).body(Vec::new())?)
}

/// Interprets a token endpoint response.
///
/// Non-2xx statuses, payloads describing an OAuth exception (a `type` naming an
/// `OAuthException`, or an `error` member), and payloads without `access_token` are failures.
pub fn map_token_response(response: &HttpResponse) -> Result<TokenData, TokenExchangeError> {
	let status = response.status();
	let body = response.body();

	if !status.is_success() {
		let error = serde_json::from_slice::<Value>(body)
			.ok()
			.and_then(|value| provider_exception(&value))
			.map(|(error, _)| error);

		return Err(TokenExchangeError::Status {
			status: status.as_u16(),
			error,
			body_preview: body_preview(body),
		});
	}

	let value: Value =
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body))
			.map_err(|source| TokenExchangeError::Parse { source, status: status.as_u16() })?;

	if let Some((error, description)) = provider_exception(&value) {
		return Err(TokenExchangeError::Provider { error, description });
	}

	let payload: TokenPayload = serde_path_to_error::deserialize(value)
		.map_err(|source| TokenExchangeError::Parse { source, status: status.as_u16() })?;

	Ok(TokenData {
		access_token: Secret::new(payload.access_token),
		token_type: payload.token_type,
		scope: payload.scope,
		expires_in: payload.expires_in,
		refresh_token: payload.refresh_token.map(Secret::new),
		received_at: OffsetDateTime::now_utc(),
	})
}

/// Interprets a profile endpoint response as raw JSON.
pub fn map_profile_response(response: &HttpResponse) -> Result<Value, ProfileFetchError> {
	let status = response.status();

	if !status.is_success() {
		return Err(ProfileFetchError::Status {
			status: status.as_u16(),
			body_preview: body_preview(response.body()),
		});
	}

	serde_json::from_slice(response.body()).map_err(ProfileFetchError::Parse)
}

/// Converts a transport's [`HttpClientError`] into a [`TransportError`].
pub fn map_transport_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner },
		HttpClientError::Http(inner) => TransportError::network(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "unrecognized transport failure".into() },
	}
}

fn provider_exception(value: &Value) -> Option<(String, Option<String>)> {
	let description = |value: &Value| {
		value
			.get("error_description")
			.or_else(|| value.get("message"))
			.and_then(Value::as_str)
			.map(str::to_owned)
	};

	match value.get("error") {
		Some(Value::String(error)) => return Some((error.clone(), description(value))),
		Some(nested @ Value::Object(_)) => {
			let error = nested
				.get("type")
				.or_else(|| nested.get("code"))
				.map(|kind| kind.as_str().map(str::to_owned).unwrap_or_else(|| kind.to_string()))
				.unwrap_or_else(|| "error".into());

			return Some((error, description(nested)));
		},
		_ => {},
	}

	value
		.get("type")
		.and_then(Value::as_str)
		.filter(|kind| kind.contains("OAuthException"))
		.map(|kind| (kind.to_owned(), description(value)))
}

fn body_preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return Some(text.into_owned());
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	Some(buf)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;
	use crate::auth::ProviderId;

	fn descriptor(client: ClientAuthMethod, profile: ProfileAuthMethod) -> ProviderDescriptor {
		ProviderDescriptor::builder(ProviderId::new("mock").expect("Provider id should be valid."))
			.endpoints(
				"https://example.com/authorize",
				"https://example.com/token",
				"https://example.com/me",
			)
			.expect("Endpoints should parse.")
			.client_auth_method(client)
			.profile_auth_method(profile)
			.build()
			.expect("Descriptor should build.")
	}

	fn config() -> StrategyConfig {
		StrategyConfig::builder()
			.client_id("client")
			.client_secret("secret")
			.redirect_uri("https://app.example.com/cb")
			.build()
			.expect("Config should build.")
	}

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = StatusCode::from_u16(status).expect("Status should be valid.");

		response
	}

	fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
		request.headers().get(name).and_then(|value| value.to_str().ok())
	}

	#[test]
	fn basic_token_request_uses_authorization_header() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretBasic, ProfileAuthMethod::Bearer);
		let request =
			token_request(&descriptor, &config(), "abc&123").expect("Request should build.");
		let body = String::from_utf8(request.body().clone()).expect("Body should be UTF-8.");
		let pairs = url::form_urlencoded::parse(body.as_bytes()).into_owned().collect::<Vec<_>>();

		assert_eq!(*request.method(), Method::POST);
		assert_eq!(header(&request, "authorization"), Some("Basic Y2xpZW50OnNlY3JldA=="));
		assert_eq!(header(&request, "content-type"), Some(FORM_CONTENT_TYPE));
		assert!(pairs.contains(&("code".into(), "abc&123".into())));
		assert!(pairs.iter().all(|(key, _)| key != "client_secret"));
	}

	#[test]
	fn post_token_request_carries_credentials_in_body() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretPost, ProfileAuthMethod::Bearer);
		let request = token_request(&descriptor, &config(), "c").expect("Request should build.");
		let pairs = url::form_urlencoded::parse(request.body()).into_owned().collect::<Vec<_>>();

		assert!(header(&request, "authorization").is_none());
		assert!(pairs.contains(&("client_id".into(), "client".into())));
		assert!(pairs.contains(&("client_secret".into(), "secret".into())));
	}

	#[test]
	fn json_token_request_carries_exactly_four_fields() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretJson, ProfileAuthMethod::Bearer);
		let request =
			token_request(&descriptor, &config(), "abc&123").expect("Request should build.");
		let body: Value = serde_json::from_slice(request.body()).expect("Body should be JSON.");

		assert_eq!(
			body,
			serde_json::json!({
				"client_id": "client",
				"client_secret": "secret",
				"redirect_uri": "https://app.example.com/cb",
				"code": "abc&123",
			})
		);
	}

	#[test]
	fn profile_request_presents_token_per_descriptor() {
		let token = Secret::new("tok");
		let bearer = profile_request(
			&descriptor(ClientAuthMethod::default(), ProfileAuthMethod::Bearer),
			&token,
		)
		.expect("Request should build.");

		assert_eq!(header(&bearer, "authorization"), Some("Bearer tok"));

		let legacy = profile_request(
			&descriptor(ClientAuthMethod::default(), ProfileAuthMethod::TokenHeader),
			&token,
		)
		.expect("Request should build.");

		assert_eq!(header(&legacy, "authorization"), Some("token tok"));

		let query = profile_request(
			&descriptor(
				ClientAuthMethod::default(),
				ProfileAuthMethod::QueryParameter("access_token".into()),
			),
			&token,
		)
		.expect("Request should build.");

		assert_eq!(query.uri().query(), Some("access_token=tok"));
		assert!(header(&query, "authorization").is_none());
	}

	#[test]
	fn token_response_maps_payload() {
		let token = map_token_response(&response(
			200,
			r#"{"access_token":"a","token_type":"Bearer","expires_in":3600,"refresh_token":"r","scope":"email"}"#,
		))
		.expect("Token should map.");

		assert_eq!(token.access_token.expose(), "a");
		assert_eq!(token.token_type.as_deref(), Some("Bearer"));
		assert_eq!(token.expires_in, Some(3600));
		assert_eq!(token.refresh_token.as_ref().map(Secret::expose), Some("r"));
	}

	#[test]
	fn token_response_tolerates_loosely_typed_optional_fields() {
		let token = map_token_response(&response(
			200,
			r#"{"access_token":"a","scope":["user:read:email","user:follow"],"expires_in":"3600"}"#,
		))
		.expect("Array scopes and string lifetimes should map.");

		assert_eq!(token.scope.as_deref(), Some("user:read:email user:follow"));
		assert_eq!(token.expires_in, Some(3600));

		let token = map_token_response(&response(
			200,
			r#"{"access_token":"a","scope":{"read":true},"expires_in":"soon"}"#,
		))
		.expect("Unusable optional fields should be dropped, not fatal.");

		assert_eq!(token.scope, None);
		assert_eq!(token.expires_in, None);

		let err = map_token_response(&response(200, r#"{"scope":["email"],"expires_in":60}"#))
			.expect_err("A missing access token must still fail.");

		assert!(matches!(err, TokenExchangeError::Parse { status: 200, .. }));
	}

	#[test]
	fn token_response_classifies_failures() {
		let err = map_token_response(&response(401, r#"{"error":"invalid_client"}"#))
			.expect_err("Non-2xx must fail.");

		assert!(matches!(
			err,
			TokenExchangeError::Status { status: 401, error: Some(ref e), .. } if e == "invalid_client"
		));

		let err = map_token_response(&response(
			200,
			r#"{"error":{"message":"Code expired","type":"OAuthException","code":100}}"#,
		))
		.expect_err("OAuth exceptions must fail.");

		assert!(matches!(
			err,
			TokenExchangeError::Provider { ref error, description: Some(ref d) }
				if error == "OAuthException" && d == "Code expired"
		));

		let err = map_token_response(&response(200, r#"{"type":"OAuthException"}"#))
			.expect_err("Top-level exception types must fail.");

		assert!(matches!(err, TokenExchangeError::Provider { .. }));

		let err = map_token_response(&response(200, r#"{"token_type":"bearer"}"#))
			.expect_err("Missing access_token must fail.");

		assert!(matches!(err, TokenExchangeError::Parse { status: 200, .. }));
	}

	#[test]
	fn profile_response_requires_success_and_json() {
		assert!(matches!(
			map_profile_response(&response(403, "forbidden")),
			Err(ProfileFetchError::Status { status: 403, body_preview: Some(_) })
		));
		assert!(matches!(
			map_profile_response(&response(200, "<html>")),
			Err(ProfileFetchError::Parse(_))
		));
		assert_eq!(
			map_profile_response(&response(200, r#"{"id":"1"}"#)).expect("Profile JSON maps."),
			serde_json::json!({ "id": "1" })
		);
	}

	#[test]
	fn body_preview_truncates_long_bodies() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(long.as_bytes()).expect("Preview should exist.");

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
		assert_eq!(body_preview(b""), None);
	}
}
