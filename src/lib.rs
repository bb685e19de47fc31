//! Pluggable OAuth 2.0 authorization-code strategies: one flow engine, many providers, plus a
//! local username/password path.
//!
//! A host hands each inbound request to an [`Authenticate`](flows::Authenticate) implementation
//! through a [`HostContext`](host::HostContext). The engine redirects to the provider, exchanges
//! the callback code, and returns a normalized [`AuthData`](auth::AuthData), or an error value.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod flows;
pub mod host;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::StrategyConfig,
		flows::Authenticator,
		http::ReqwestHttpClient,
		provider::{NormalizeProfile, OAuth2Strategy, ProviderDescriptor, ReqwestStrategy},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`Authenticator`] around a reqwest-backed strategy used across integration
	/// tests.
	pub fn build_reqwest_test_authenticator(
		descriptor: ProviderDescriptor,
		config: StrategyConfig,
		normalizer: Arc<dyn NormalizeProfile>,
	) -> Authenticator<ReqwestStrategy> {
		let strategy = OAuth2Strategy::with_http_client(
			descriptor,
			config,
			normalizer,
			test_reqwest_http_client(),
		);

		Authenticator::new(strategy)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
