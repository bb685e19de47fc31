//! Flow orchestrators driven by a host request context.
//!
//! [`Authenticator`] runs the authorization-code state machine over any [`Strategy`];
//! [`LocalStrategy`] verifies submitted credentials without touching the network. Both implement
//! [`Authenticate`] so a host can register them side by side.

pub mod authorization_code;
pub mod local;

pub use authorization_code::*;
pub use local::*;

// self
use crate::{
	_prelude::*,
	auth::{AuthData, UserProfile},
	host::HostContext,
	provider::Strategy,
};

/// Boxed future returned by [`Authenticate::authenticate`].
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// What a single [`Authenticate::authenticate`] call did with the request.
#[derive(Clone, Debug)]
pub enum AuthOutcome {
	/// The host was told to redirect the user agent; no further processing happened.
	Redirected {
		/// Redirect target handed to [`HostContext::redirect`].
		location: String,
	},
	/// The callback completed: token exchanged and profile normalized.
	Authenticated {
		/// Token plus profile, owned by the host from here on.
		auth: AuthData,
		/// Callback `state` value, for the host to check against the one it issued.
		state: Option<String>,
	},
	/// Local credentials were accepted.
	Verified {
		/// Profile returned by the credential verifier.
		user_info: UserProfile,
	},
}
impl AuthOutcome {
	/// Returns the authenticated profile, if the outcome carries one.
	pub fn user_info(&self) -> Option<&UserProfile> {
		match self {
			AuthOutcome::Redirected { .. } => None,
			AuthOutcome::Authenticated { auth, .. } => Some(&auth.user_info),
			AuthOutcome::Verified { user_info } => Some(user_info),
		}
	}
}

/// Uniform plug-in interface a host dispatches inbound requests to.
pub trait Authenticate: Send + Sync {
	/// Strategy name used for registration and logging.
	fn name(&self) -> &str;

	/// Handles one inbound request.
	///
	/// Every failure is returned as a value; nothing is retried and no partial result escapes.
	fn authenticate<'a>(&'a self, ctx: &'a mut dyn HostContext) -> AuthFuture<'a, AuthOutcome>;
}

/// Authorization-code flow engine bound to one strategy.
///
/// The engine keeps no per-flow state: each call re-derives its phase from the request it is
/// given, so one instance can serve any number of concurrent flows.
pub struct Authenticator<S = dyn Strategy>
where
	S: ?Sized + Strategy,
{
	strategy: Arc<S>,
}
impl<S> Authenticator<S>
where
	S: ?Sized + Strategy,
{
	/// Wraps a strategy.
	pub fn new(strategy: impl Into<Arc<S>>) -> Self {
		Self { strategy: strategy.into() }
	}

	/// Strategy driven by this engine.
	pub fn strategy(&self) -> &S {
		&self.strategy
	}
}
impl<S> Clone for Authenticator<S>
where
	S: ?Sized + Strategy,
{
	fn clone(&self) -> Self {
		Self { strategy: self.strategy.clone() }
	}
}
impl<S> Debug for Authenticator<S>
where
	S: ?Sized + Strategy,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("provider", &self.strategy.provider())
			.finish_non_exhaustive()
	}
}
