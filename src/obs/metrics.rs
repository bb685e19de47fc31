// self
use crate::obs::{FlowOutcome, FlowStage};

/// Bumps `oauth2_gatekeeper_flow_total{stage, outcome}` for one phase of a login.
///
/// Every phase records an `attempt` and then either `success` or `failure`, so a stalled
/// provider shows up as attempts without a matching outcome. Compiles away without `metrics`.
pub fn record_flow_outcome(stage: FlowStage, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_gatekeeper_flow_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}
