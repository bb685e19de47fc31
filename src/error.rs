//! Gatekeeper error taxonomy shared by strategies, flows, and the local adapter.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error returned by every flow phase.
///
/// A flow execution yields either a complete result or exactly one of these values; partial
/// token/profile pairs are never handed back.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider reported an error on the callback request.
	#[error(transparent)]
	Callback(#[from] CallbackError),
	/// Authorization code could not be exchanged for a token.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// Profile endpoint call or normalization failed.
	#[error(transparent)]
	ProfileFetch(#[from] ProfileFetchError),
	/// Local strategy rejected or could not read the submitted credentials.
	#[error(transparent)]
	Credential(#[from] CredentialError),
}

/// Configuration and validation failures raised while constructing strategies.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Strategy name is not a valid provider identifier.
	#[error(transparent)]
	ProviderId(#[from] crate::auth::IdentifierError),

	/// A mandatory construction option is missing or empty.
	#[error("Strategy option `{option}` is required.")]
	MissingOption {
		/// Name of the missing option.
		option: &'static str,
	},
	/// An extension parameter shadows one of the mandatory options.
	#[error("Extension parameter `{key}` collides with a reserved strategy option.")]
	ReservedParam {
		/// Offending parameter key.
		key: String,
	},
	/// An extension parameter has an empty key.
	#[error("Extension parameter keys cannot be empty.")]
	EmptyParamKey,
	/// Local strategy field names must be non-empty and distinct.
	#[error("Local strategy credential fields are invalid: {reason}.")]
	InvalidCredentialFields {
		/// Why the field configuration was rejected.
		reason: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures detected on the provider's callback request, before any token exchange.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum CallbackError {
	/// The callback query reported an error instead of a code.
	#[error("Provider reported an authorization error: {error}.")]
	ProviderDenied {
		/// Provider-supplied `error` value, or a placeholder when absent.
		error: String,
		/// Provider-supplied `error_description`, when present.
		description: Option<String>,
	},
	/// The callback query carried neither a `code` nor an `error` parameter.
	#[error("Callback query does not contain an authorization code.")]
	MissingCode,
}

/// Failures while exchanging an authorization code for a token.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Network-level failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint answered with a non-2xx status.
	#[error("Token endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// OAuth `error` field, when the body carried one.
		error: Option<String>,
		/// Truncated body for diagnostics.
		body_preview: Option<String>,
	},
	/// Token endpoint answered 2xx but the payload describes an OAuth exception.
	#[error("Token endpoint reported an OAuth exception: {error}.")]
	Provider {
		/// Provider error code or exception type.
		error: String,
		/// Human readable description, when supplied.
		description: Option<String>,
	},
	/// Token endpoint responded with JSON that does not describe a token.
	#[error("Token endpoint returned a malformed payload.")]
	Parse {
		/// Structured parsing failure including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
}

/// Failures while calling the profile endpoint or normalizing its payload.
#[derive(Debug, ThisError)]
pub enum ProfileFetchError {
	/// Network-level failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Profile endpoint answered with a non-2xx status.
	#[error("Profile endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated body for diagnostics.
		body_preview: Option<String>,
	},
	/// Profile endpoint returned a body that is not JSON.
	#[error("Profile endpoint returned malformed JSON.")]
	Parse(#[source] serde_json::Error),
	/// Profile payload lacks the provider's user identifier.
	#[error("Profile payload from `{provider}` is missing the `{field}` field.")]
	MissingId {
		/// Provider name.
		provider: String,
		/// Field that should have carried the identifier.
		field: &'static str,
	},
}

/// Local strategy credential failures.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// Request body was empty.
	#[error("Request body does not contain credentials.")]
	MissingCredentials,
	/// A credential field was absent or empty.
	#[error("Credential field `{field}` is missing.")]
	MissingField {
		/// Name of the missing field.
		field: String,
	},
	/// The injected verifier rejected the credentials.
	#[error("Credentials were rejected: {reason}.")]
	Rejected {
		/// Verifier-supplied reason.
		reason: String,
	},
}
impl CredentialError {
	/// Convenience constructor for verifier rejections.
	pub fn rejected(reason: impl Into<String>) -> Self {
		Self::Rejected { reason: reason.into() }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
