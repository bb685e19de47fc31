//! Optional observability helpers for flow phases.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_gatekeeper.flow` with the `stage`
//!   and `provider` fields, plus a `warn` event whenever a stage fails.
//! - Enable `metrics` to increment the `oauth2_gatekeeper_flow_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.
//!
//! Neither layer ever records tokens, client secrets, or passwords.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow phases observed by the gatekeeper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// START phase: redirecting the user agent to the provider.
	Authorize,
	/// CALLBACK phase: parsing the provider's callback query.
	Callback,
	/// CALLBACK phase: exchanging the authorization code.
	TokenExchange,
	/// CALLBACK phase: fetching and normalizing the profile.
	ProfileFetch,
	/// Local strategy credential verification.
	LocalVerify,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Authorize => "authorize",
			FlowStage::Callback => "callback",
			FlowStage::TokenExchange => "token_exchange",
			FlowStage::ProfileFetch => "profile_fetch",
			FlowStage::LocalVerify => "local_verify",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the terminal outcome of a stage, emitting a `warn` event on failure.
pub fn record_result<T, E>(stage: FlowStage, result: &Result<T, E>)
where
	E: Display,
{
	match result {
		Ok(_) => record_flow_outcome(stage, FlowOutcome::Success),
		Err(e) => {
			#[cfg(feature = "tracing")]
			::tracing::warn!(stage = stage.as_str(), error = %e, "Flow stage failed.");
			#[cfg(not(feature = "tracing"))]
			let _ = e;

			record_flow_outcome(stage, FlowOutcome::Failure);
		},
	}
}
