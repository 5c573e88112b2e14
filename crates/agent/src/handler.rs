//! Per-domain tool selection.
//!
//! Each domain has a fixed plan: primary steps that always run and gated
//! steps that run only when the query mentions one of their gate words. The
//! comprehensive overview runs every domain's primary tool and nothing else.

use execlens_core::{tools, AnalysisScope, BaseParams, Domain, ResultBundle, ToolInvocation};
use serde_json::{json, Value};
use tracing::debug;

use crate::dispatcher::Dispatcher;

pub mod result_keys {
    pub const SECURITY_STATUS: &str = "security_status";
    pub const FINDINGS: &str = "findings";
    pub const COST_BREAKDOWN: &str = "cost_breakdown";
    pub const TRENDS: &str = "trends";
    pub const FORECAST: &str = "forecast";
    pub const ROI_CALCULATION: &str = "roi_calculation";
    pub const COST_BENEFIT: &str = "cost_benefit";
    pub const EXECUTIVE_REPORT: &str = "executive_report";

    pub const OVERVIEW_SECURITY: &str = "security";
    pub const OVERVIEW_COSTS: &str = "costs";
    pub const OVERVIEW_ROI: &str = "roi";
}

#[derive(Clone, Copy, Debug)]
pub struct PlanStep {
    pub result_key: &'static str,
    pub domain: Domain,
    pub tool_name: &'static str,
    /// Empty for steps that always run.
    pub gate_words: &'static [&'static str],
    pub extra_params: fn() -> Vec<(&'static str, Value)>,
}

impl PlanStep {
    const fn always(result_key: &'static str, domain: Domain, tool_name: &'static str) -> Self {
        Self { result_key, domain, tool_name, gate_words: &[], extra_params: no_extra_params }
    }

    pub fn is_selected(&self, normalized_query: &str) -> bool {
        self.gate_words.is_empty()
            || self.gate_words.iter().any(|word| normalized_query.contains(word))
    }

    fn invocation(&self, base_params: &BaseParams) -> ToolInvocation {
        (self.extra_params)().into_iter().fold(
            ToolInvocation::new(self.domain, self.tool_name, base_params.to_parameters()),
            |invocation, (key, value)| invocation.with_parameter(key, value),
        )
    }
}

fn no_extra_params() -> Vec<(&'static str, Value)> {
    Vec::new()
}

fn high_severity_only() -> Vec<(&'static str, Value)> {
    vec![("severity", json!("HIGH,CRITICAL"))]
}

fn three_month_forecast() -> Vec<(&'static str, Value)> {
    vec![("forecast_months", json!(3))]
}

const SECURITY_PLAN: &[PlanStep] = &[
    PlanStep::always(result_keys::SECURITY_STATUS, Domain::Security, tools::CHECK_SECURITY_SERVICES),
    PlanStep {
        result_key: result_keys::FINDINGS,
        domain: Domain::Security,
        tool_name: tools::GET_SECURITY_FINDINGS,
        gate_words: &["finding", "vulnerability", "issue", "alert"],
        extra_params: high_severity_only,
    },
];

const COST_PLAN: &[PlanStep] = &[
    PlanStep::always(result_keys::COST_BREAKDOWN, Domain::Cost, tools::GET_COST_BREAKDOWN),
    PlanStep {
        result_key: result_keys::TRENDS,
        domain: Domain::Cost,
        tool_name: tools::ANALYZE_COST_TRENDS,
        gate_words: &["trend", "change", "increase", "decrease"],
        extra_params: no_extra_params,
    },
    PlanStep {
        result_key: result_keys::FORECAST,
        domain: Domain::Cost,
        tool_name: tools::FORECAST_COSTS,
        gate_words: &["forecast", "future", "predict", "next"],
        extra_params: three_month_forecast,
    },
];

const ROI_PLAN: &[PlanStep] = &[
    PlanStep::always(result_keys::ROI_CALCULATION, Domain::Roi, tools::CALCULATE_SECURITY_ROI),
    PlanStep::always(result_keys::COST_BENEFIT, Domain::Roi, tools::ANALYZE_COST_BENEFIT),
    PlanStep {
        result_key: result_keys::EXECUTIVE_REPORT,
        domain: Domain::Roi,
        tool_name: tools::GENERATE_ROI_REPORT,
        gate_words: &["report", "summary", "overview"],
        extra_params: no_extra_params,
    },
];

const OVERVIEW_PLAN: &[PlanStep] = &[
    PlanStep::always(result_keys::OVERVIEW_SECURITY, Domain::Security, tools::CHECK_SECURITY_SERVICES),
    PlanStep::always(result_keys::OVERVIEW_COSTS, Domain::Cost, tools::GET_COST_BREAKDOWN),
    PlanStep::always(result_keys::OVERVIEW_ROI, Domain::Roi, tools::CALCULATE_SECURITY_ROI),
];

/// Full step table for a scope, before gate words are applied.
pub fn plan(scope: AnalysisScope) -> &'static [PlanStep] {
    match scope {
        AnalysisScope::Single(Domain::Security) => SECURITY_PLAN,
        AnalysisScope::Single(Domain::Cost) => COST_PLAN,
        AnalysisScope::Single(Domain::Roi) => ROI_PLAN,
        AnalysisScope::Comprehensive => OVERVIEW_PLAN,
    }
}

#[derive(Clone)]
pub struct DomainHandler {
    dispatcher: Dispatcher,
}

impl DomainHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Steps that will run for `query` under `scope`, in execution order.
    pub fn select_steps(scope: AnalysisScope, query: &str) -> Vec<&'static PlanStep> {
        let normalized_query = query.to_lowercase();
        plan(scope).iter().filter(|step| step.is_selected(&normalized_query)).collect()
    }

    pub async fn handle(
        &self,
        scope: AnalysisScope,
        query: &str,
        base_params: &BaseParams,
    ) -> ResultBundle {
        let mut bundle = ResultBundle::new(scope, query);

        for step in Self::select_steps(scope, query) {
            debug!(
                event_name = "agent.handler.step",
                scope = %scope,
                result_key = step.result_key,
                tool_name = step.tool_name,
                "invoking plan step"
            );
            let result = self.dispatcher.invoke(&step.invocation(base_params)).await;
            bundle.insert(step.result_key, result);
        }

        bundle
    }
}
