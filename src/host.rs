//! Host request context: the slice of an incoming HTTP request a flow reads, plus the redirect it
//! may issue.
//!
//! The gatekeeper does not own a server. Whatever framework receives the request adapts it to
//! [`HostContext`]; [`BufferedContext`] is a ready-made adapter for hosts that already hold the
//! raw query and body.

// self
use crate::_prelude::*;

/// Request data a flow consumes and the single side effect it may produce.
pub trait HostContext: Send {
	/// Raw query string, including the leading `?` when present. Empty when there is none.
	fn search(&self) -> &str;

	/// Raw request body.
	fn body(&self) -> &[u8];

	/// Instructs the host to answer the request with a redirect to `location`.
	fn redirect(&mut self, location: &str);
}

/// Owned [`HostContext`] that records the redirect instead of performing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferedContext {
	search: String,
	body: Vec<u8>,
	redirected_to: Option<String>,
}
impl BufferedContext {
	/// Creates a context from a raw query string and body.
	pub fn new(search: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
		Self { search: search.into(), body: body.into(), redirected_to: None }
	}

	/// Creates a body-less context from a full request URL.
	pub fn from_url(url: &Url) -> Self {
		let search = url.query().map(|query| format!("?{query}")).unwrap_or_default();

		Self::new(search, Vec::new())
	}

	/// Location recorded by the last [`HostContext::redirect`] call.
	pub fn redirected_to(&self) -> Option<&str> {
		self.redirected_to.as_deref()
	}
}
impl HostContext for BufferedContext {
	fn search(&self) -> &str {
		&self.search
	}

	fn body(&self) -> &[u8] {
		&self.body
	}

	fn redirect(&mut self, location: &str) {
		self.redirected_to = Some(location.to_owned());
	}
}
