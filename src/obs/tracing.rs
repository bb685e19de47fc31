// self
use crate::{_prelude::*, obs::FlowStage};

/// Future returned by [`FlowSpan::instrument`]; wrapped in the span only with `tracing` on.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Without `tracing` the phase future runs as-is.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// The `oauth2_gatekeeper.flow` span one authentication phase runs in.
///
/// Carries `stage` (see [`FlowStage::as_str`]) and `provider`, the provider id or `local`,
/// so redirect, callback, exchange and profile events of one login line up.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens the span for `stage` of a login through `provider`.
	pub fn new(stage: FlowStage, provider: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth2_gatekeeper.flow", stage = stage.as_str(), provider);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, provider);

			Self {}
		}
	}

	/// Enters the span for the synchronous phases (redirect and callback parsing).
	pub fn entered(self) -> FlowSpanGuard {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			FlowSpanGuard {}
		}
	}

	/// Attaches the span to a network phase (code exchange, profile fetch, credential check).
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Keeps the phase span entered until dropped.
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for FlowSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard(..)")
	}
}
