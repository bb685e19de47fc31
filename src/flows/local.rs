//! Local username/password strategy.
//!
//! The adapter reads credentials from the request body and hands them to an injected
//! [`CredentialVerifier`]. It never redirects and never calls out over HTTP; whatever the verifier
//! does to check the credentials is its own business.

// crates.io
use serde_json::Value;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Secret, UserProfile},
	config::LocalConfig,
	error::CredentialError,
	flows::{AuthFuture, AuthOutcome, Authenticate},
	host::HostContext,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
};

/// Boxed future returned by [`CredentialVerifier::verify`].
pub type CredentialFuture =
	Pin<Box<dyn Future<Output = Result<UserProfile, CredentialError>> + Send>>;

/// Username/password pair read from a request body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Submitted username.
	pub username: String,
	/// Submitted password.
	pub password: Secret,
}

/// Injected check that turns credentials into a profile or a rejection.
///
/// Any `Fn(Credentials) -> impl Future<Output = Result<UserProfile, CredentialError>>` closure
/// qualifies.
pub trait CredentialVerifier: Send + Sync {
	/// Verifies `credentials`.
	fn verify(&self, credentials: Credentials) -> CredentialFuture;
}
impl<F, Fut> CredentialVerifier for F
where
	F: Send + Sync + Fn(Credentials) -> Fut,
	Fut: 'static + Send + Future<Output = Result<UserProfile, CredentialError>>,
{
	fn verify(&self, credentials: Credentials) -> CredentialFuture {
		Box::pin(self(credentials))
	}
}

/// Strategy that authenticates against credentials posted by the user.
#[derive(Clone)]
pub struct LocalStrategy {
	config: LocalConfig,
	verifier: Arc<dyn CredentialVerifier>,
}
impl LocalStrategy {
	/// Fixed strategy name.
	pub const NAME: &'static str = "local";

	/// Creates a strategy from field-name configuration and a verifier.
	pub fn new(config: LocalConfig, verifier: impl 'static + CredentialVerifier) -> Self {
		Self::with_verifier(config, Arc::new(verifier))
	}

	/// Creates a strategy around a shared verifier.
	pub fn with_verifier(config: LocalConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
		Self { config, verifier }
	}

	/// Field-name configuration.
	pub fn config(&self) -> &LocalConfig {
		&self.config
	}

	/// Reads credentials from a JSON object body, falling back to a form-encoded body.
	pub fn read_credentials(&self, body: &[u8]) -> Result<Credentials, CredentialError> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Err(CredentialError::MissingCredentials);
		}

		let fields = match serde_json::from_slice::<Value>(body) {
			Ok(Value::Object(map)) => BodyFields::Json(map),
			_ => BodyFields::Form(form_urlencoded::parse(body).into_owned().collect()),
		};
		let username = fields.required(self.config.username_field())?;
		let password = fields.required(self.config.password_field())?;

		Ok(Credentials { username, password: Secret::new(password) })
	}

	/// Reads and verifies the credentials carried by `body`.
	pub async fn verify(&self, body: &[u8]) -> Result<UserProfile> {
		const STAGE: FlowStage = FlowStage::LocalVerify;

		let span = FlowSpan::new(STAGE, Self::NAME);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span.instrument(self.check(body)).await;

		obs::record_result(STAGE, &result);

		result
	}

	async fn check(&self, body: &[u8]) -> Result<UserProfile> {
		let credentials = self.read_credentials(body)?;

		Ok(self.verifier.verify(credentials).await?)
	}
}
impl Authenticate for LocalStrategy {
	fn name(&self) -> &str {
		Self::NAME
	}

	fn authenticate<'a>(&'a self, ctx: &'a mut dyn HostContext) -> AuthFuture<'a, AuthOutcome> {
		Box::pin(async move {
			let user_info = self.verify(ctx.body()).await?;

			Ok(AuthOutcome::Verified { user_info })
		})
	}
}
impl Debug for LocalStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LocalStrategy").field("config", &self.config).finish_non_exhaustive()
	}
}

enum BodyFields {
	Json(serde_json::Map<String, Value>),
	Form(Vec<(String, String)>),
}
impl BodyFields {
	fn required(&self, field: &str) -> Result<String, CredentialError> {
		let value = match self {
			BodyFields::Json(map) => map.get(field).and_then(Value::as_str),
			BodyFields::Form(pairs) =>
				pairs.iter().find(|(key, _)| key == field).map(|(_, value)| value.as_str()),
		};

		value
			.filter(|value| !value.is_empty())
			.map(str::to_owned)
			.ok_or_else(|| CredentialError::MissingField { field: field.to_owned() })
	}
}
