//! Answer rendering.
//!
//! A bundle becomes either a single terse value (`$45.20`, `75/100`, `15.8%`)
//! or a short narrative. Every extraction path ends in a fixed fallback
//! sentence when the data is missing or malformed.

use std::str::FromStr;

use execlens_core::{AnalysisScope, Domain, ResultBundle, ToolResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::result_keys;

const VALUE_OPENERS: &[&str] = &["what is", "what's", "show me", "give me", "tell me"];
const VALUE_NOUNS: &[&str] = &["rating", "score", "spend", "cost", "number", "amount", "total"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Auto,
    Value,
    Narrative,
}

/// True when the query asks for one figure rather than an explanation.
pub fn wants_single_value(query: &str) -> bool {
    let normalized = query.to_lowercase();
    VALUE_OPENERS.iter().any(|opener| normalized.contains(opener))
        && VALUE_NOUNS.iter().any(|noun| normalized.contains(noun))
}

/// Scope-specific extraction and wording.
pub trait ScopeView: Sync {
    fn lead(&self) -> &'static str;

    fn summary(&self) -> &'static str;

    fn primary_key(&self) -> &'static str;

    /// `None` when the scope has no single-value form.
    fn single_value(&self, bundle: &ResultBundle) -> Option<String>;

    fn narrative(&self, bundle: &ResultBundle) -> String {
        let mut text = format!("{}\n\n{}", self.lead(), self.summary());
        if let Some(details) = bundle.get(self.primary_key()).and_then(ToolResult::raw_output) {
            text.push_str("\n\nDetails: ");
            text.push_str(&details);
        }
        text
    }
}

pub struct SecurityView;
pub struct CostView;
pub struct RoiView;
pub struct ComprehensiveView;

pub const COST_UNAVAILABLE: &str = "Cost data unavailable";
pub const SECURITY_UNAVAILABLE: &str = "Security data unavailable";
pub const ROI_UNAVAILABLE: &str = "ROI data unavailable";

impl ScopeView for SecurityView {
    fn lead(&self) -> &'static str {
        "Here's your security status:"
    }

    fn summary(&self) -> &'static str {
        "Security status overview with current service configurations and findings."
    }

    fn primary_key(&self) -> &'static str {
        result_keys::SECURITY_STATUS
    }

    fn single_value(&self, bundle: &ResultBundle) -> Option<String> {
        let score = primary_output(bundle, self.primary_key())
            .and_then(|output| security_score(&output))
            .map(|score| format!("{score}/100"));
        Some(score.unwrap_or_else(|| SECURITY_UNAVAILABLE.to_string()))
    }
}

impl ScopeView for CostView {
    fn lead(&self) -> &'static str {
        "Here's your security cost analysis:"
    }

    fn summary(&self) -> &'static str {
        "Security services cost analysis with trends and forecasts."
    }

    fn primary_key(&self) -> &'static str {
        result_keys::COST_BREAKDOWN
    }

    fn single_value(&self, bundle: &ResultBundle) -> Option<String> {
        let total = primary_output(bundle, self.primary_key())
            .and_then(|output| output.get("total_cost").and_then(decimal_value))
            .map(format_currency);
        Some(total.unwrap_or_else(|| COST_UNAVAILABLE.to_string()))
    }
}

impl ScopeView for RoiView {
    fn lead(&self) -> &'static str {
        "Here's your ROI analysis:"
    }

    fn summary(&self) -> &'static str {
        "Security investment ROI analysis with cost-benefit insights."
    }

    fn primary_key(&self) -> &'static str {
        result_keys::ROI_CALCULATION
    }

    fn single_value(&self, bundle: &ResultBundle) -> Option<String> {
        let percentage = primary_output(bundle, self.primary_key())
            .and_then(|output| roi_percentage(&output))
            .map(|value| format!("{value}%"));
        Some(percentage.unwrap_or_else(|| ROI_UNAVAILABLE.to_string()))
    }
}

impl ScopeView for ComprehensiveView {
    fn lead(&self) -> &'static str {
        "Analysis complete:"
    }

    fn summary(&self) -> &'static str {
        "Complete security ROI analytics overview covering services, costs, and returns."
    }

    fn primary_key(&self) -> &'static str {
        result_keys::OVERVIEW_SECURITY
    }

    fn single_value(&self, _bundle: &ResultBundle) -> Option<String> {
        None
    }

    fn narrative(&self, _bundle: &ResultBundle) -> String {
        format!("{} {}", self.lead(), self.summary())
    }
}

pub fn view_for(scope: AnalysisScope) -> &'static dyn ScopeView {
    match scope {
        AnalysisScope::Single(Domain::Security) => &SecurityView,
        AnalysisScope::Single(Domain::Cost) => &CostView,
        AnalysisScope::Single(Domain::Roi) => &RoiView,
        AnalysisScope::Comprehensive => &ComprehensiveView,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseRenderer;

impl ResponseRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, bundle: &ResultBundle, query: &str, mode: RenderMode) -> String {
        let view = view_for(bundle.scope);
        let value_requested = match mode {
            RenderMode::Auto => wants_single_value(query),
            RenderMode::Value => true,
            RenderMode::Narrative => false,
        };

        if value_requested {
            if let Some(value) = view.single_value(bundle) {
                return value;
            }
        }
        view.narrative(bundle)
    }

    pub fn summary(&self, scope: AnalysisScope) -> &'static str {
        view_for(scope).summary()
    }
}

fn primary_output(bundle: &ResultBundle, key: &str) -> Option<Value> {
    bundle.get(key).and_then(ToolResult::output)
}

/// Percentage of services reporting `enabled`, rounded down.
fn security_score(output: &Value) -> Option<u64> {
    let regions = output.as_object()?;
    let (enabled, total) = regions
        .values()
        .filter_map(Value::as_object)
        .flat_map(|services| services.values())
        .filter_map(|service| service.get("status"))
        .fold((0_u64, 0_u64), |(enabled, total), status| {
            (enabled + u64::from(status.as_str() == Some("enabled")), total + 1)
        });

    (total > 0).then(|| enabled * 100 / total)
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()
}

/// Cents are rounded as a binary float, so `1.015` prints `$1.01`.
fn format_currency(amount: Decimal) -> String {
    if amount.is_zero() {
        return "$0".to_string();
    }
    let magnitude = amount.abs();
    match magnitude.to_string().parse::<f64>() {
        Ok(value) => format!("${value:.2}"),
        Err(_) => format!("${:.2}", magnitude.round_dp(2)),
    }
}

fn roi_percentage(output: &Value) -> Option<String> {
    let value = output
        .get("roi_percentage")
        .or_else(|| output.get("total_roi"))
        .or_else(|| output.get("roi_metrics").and_then(|metrics| metrics.get("roi_percentage")))?;

    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => {
            let trimmed = text.trim().trim_end_matches('%').trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use execlens_core::{AnalysisScope, Domain, ResultBundle, ToolResult};
    use serde_json::{json, Value};

    use super::{wants_single_value, RenderMode, ResponseRenderer};

    fn wrapped(result: Value) -> ToolResult {
        ToolResult::Success { payload: json!({"tool_name": "t", "result": result.to_string()}) }
    }

    fn bundle(scope: AnalysisScope, key: &str, result: ToolResult) -> ResultBundle {
        let mut bundle = ResultBundle::new(scope, "q");
        bundle.insert(key, result);
        bundle
    }

    fn value(bundle: &ResultBundle) -> String {
        ResponseRenderer::new().render(bundle, "", RenderMode::Value)
    }

    #[test]
    fn value_mode_needs_opener_and_noun() {
        assert!(wants_single_value("What is my monthly spend?"));
        assert!(wants_single_value("Show me the security score"));
        assert!(wants_single_value("what's the total"));
        assert!(!wants_single_value("What is our security posture?"));
        assert!(!wants_single_value("monthly spend"));
    }

    #[test]
    fn zero_cost_renders_without_decimals() {
        let zero = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 0})));
        assert_eq!(value(&zero), "$0");

        let zero_float =
            bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 0.0})));
        assert_eq!(value(&zero_float), "$0");
    }

    #[test]
    fn cost_renders_two_decimal_absolute_value() {
        let cost = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 45.2})));
        assert_eq!(value(&cost), "$45.20");

        let credit =
            bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": -12.345})));
        assert_eq!(value(&credit), "$12.34");

        let unwrapped = bundle(
            Domain::Cost.into(),
            "cost_breakdown",
            ToolResult::Success { payload: json!({"total_cost": 125.5}) },
        );
        assert_eq!(value(&unwrapped), "$125.50");
    }

    #[test]
    fn half_cent_amounts_round_like_float_formatting() {
        let lower = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 1.015})));
        assert_eq!(value(&lower), "$1.01");

        let upper = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 2.675})));
        assert_eq!(value(&upper), "$2.67");

        let text = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": "19.999"})));
        assert_eq!(value(&text), "$20.00");
    }

    #[test]
    fn missing_total_cost_is_unavailable() {
        let empty = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"services": {}})));
        assert_eq!(value(&empty), "Cost data unavailable");

        let not_json = bundle(
            Domain::Cost.into(),
            "cost_breakdown",
            ToolResult::Success { payload: json!({"result": "AWS API Error: throttled"}) },
        );
        assert_eq!(value(&not_json), "Cost data unavailable");
    }

    #[test]
    fn security_score_counts_enabled_services_across_regions() {
        let payload = json!({
            "us-east-1": {
                "guardduty": {"status": "enabled", "detector_id": "abc"},
                "inspector": {"status": "disabled"},
                "securityhub": {"status": "enabled"}
            },
            "us-west-2": {
                "config": {"status": "enabled"},
                "notes": "ignored",
                "macie": {"enabled": true}
            },
            "generated_at": "2024-01-01"
        });
        let security = bundle(Domain::Security.into(), "security_status", wrapped(payload));
        assert_eq!(value(&security), "75/100");
    }

    #[test]
    fn security_score_rounds_down() {
        let payload = json!({"r": {
            "a": {"status": "enabled"}, "b": {"status": "enabled"}, "c": {"status": "error"}
        }});
        let security = bundle(Domain::Security.into(), "security_status", wrapped(payload));
        assert_eq!(value(&security), "66/100");
    }

    #[test]
    fn security_without_services_is_unavailable() {
        let security = bundle(Domain::Security.into(), "security_status", wrapped(json!({})));
        assert_eq!(value(&security), "Security data unavailable");

        let failed =
            bundle(Domain::Security.into(), "security_status", ToolResult::failure(500, "boom"));
        assert_eq!(value(&failed), "Security data unavailable");
    }

    #[test]
    fn roi_falls_back_through_known_fields() {
        let direct =
            bundle(Domain::Roi.into(), "roi_calculation", wrapped(json!({"roi_percentage": 15.8})));
        assert_eq!(value(&direct), "15.8%");

        let total = bundle(Domain::Roi.into(), "roi_calculation", wrapped(json!({"total_roi": 42})));
        assert_eq!(value(&total), "42%");

        let nested = bundle(
            Domain::Roi.into(),
            "roi_calculation",
            wrapped(json!({"roi_metrics": {"roi_percentage": "212.5%"}})),
        );
        assert_eq!(value(&nested), "212.5%");

        let missing = bundle(Domain::Roi.into(), "roi_calculation", wrapped(json!({"costs": 1})));
        assert_eq!(value(&missing), "ROI data unavailable");
    }

    #[test]
    fn narrative_includes_details_for_successful_primary() {
        let cost = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 45.2})));
        let text = ResponseRenderer::new().render(&cost, "how are we doing", RenderMode::Auto);

        assert_eq!(
            text,
            "Here's your security cost analysis:\n\n\
             Security services cost analysis with trends and forecasts.\n\n\
             Details: {\"total_cost\":45.2}"
        );
    }

    #[test]
    fn narrative_details_repeat_backend_text_verbatim() {
        let raw = r#"{"total_cost": 45.2, "currency": "USD", "amount": 1.10}"#;
        let cost = bundle(
            Domain::Cost.into(),
            "cost_breakdown",
            ToolResult::Success { payload: json!({"tool_name": "get_cost_breakdown", "result": raw}) },
        );
        let text = ResponseRenderer::new().render(&cost, "break down our spend", RenderMode::Narrative);

        assert!(text.ends_with(&format!("Details: {raw}")), "unexpected narrative: {text}");
    }

    #[test]
    fn view_primary_keys_match_first_plan_step() {
        for scope in [
            AnalysisScope::Single(Domain::Security),
            AnalysisScope::Single(Domain::Cost),
            AnalysisScope::Single(Domain::Roi),
            AnalysisScope::Comprehensive,
        ] {
            let first = crate::handler::plan(scope).first().map(|step| step.result_key);
            assert_eq!(first, Some(super::view_for(scope).primary_key()), "scope {scope}");
        }
    }

    #[test]
    fn narrative_hides_raw_errors_when_primary_fails() {
        let failed = bundle(
            Domain::Roi.into(),
            "roi_calculation",
            ToolResult::failure(500, "Traceback: KeyError 'roi'"),
        );
        let text = ResponseRenderer::new().render(&failed, "roi?", RenderMode::Narrative);

        assert!(text.starts_with("Here's your ROI analysis:"));
        assert!(!text.contains("Traceback"));
        assert!(!text.contains("Details"));
    }

    #[test]
    fn comprehensive_is_always_narrative() {
        let overview = bundle(AnalysisScope::Comprehensive, "security", wrapped(json!({})));
        let text = ResponseRenderer::new().render(&overview, "what is the total cost", RenderMode::Value);

        assert_eq!(
            text,
            "Analysis complete: Complete security ROI analytics overview covering services, costs, and returns."
        );
    }

    #[test]
    fn narrative_hint_overrides_value_pattern() {
        let cost = bundle(Domain::Cost.into(), "cost_breakdown", wrapped(json!({"total_cost": 1})));
        let text = ResponseRenderer::new().render(&cost, "what is my spend", RenderMode::Narrative);
        assert!(text.starts_with("Here's your security cost analysis:"));

        let auto = ResponseRenderer::new().render(&cost, "what is my spend", RenderMode::Auto);
        assert_eq!(auto, "$1.00");
    }
}
