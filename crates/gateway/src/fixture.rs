//! Canned backend used for demos, smoke checks and offline development.
//!
//! Payloads mirror the analytics servers: `{"tool_name", "result"}` where
//! `result` is JSON text. Figures are fixed so answers are reproducible.

use async_trait::async_trait;
use execlens_agent::gateway::{GatewayError, GatewayResponse, ToolGateway};
use execlens_core::{tools, Domain};
use serde_json::{json, Map, Value};

#[derive(Clone, Copy, Debug, Default)]
pub struct FixtureGateway;

impl FixtureGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolGateway for FixtureGateway {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn call(
        &self,
        endpoint: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<GatewayResponse, GatewayError> {
        let served_here = Domain::ALL
            .iter()
            .map(|domain| domain.config())
            .any(|config| config.endpoint == endpoint && config.has_tool(tool_name));
        if !served_here {
            return Ok(GatewayResponse::new(404, format!("no tool `{tool_name}` at `{endpoint}`")));
        }

        match canned_result(tool_name, arguments) {
            Some(result) => Ok(GatewayResponse::ok_json(&json!({
                "tool_name": tool_name,
                "result": result.to_string(),
            }))),
            None => Ok(GatewayResponse::new(501, format!("no fixture for `{tool_name}`"))),
        }
    }
}

fn argument<'a>(arguments: &'a Value, key: &str, fallback: &'a str) -> &'a str {
    arguments.get(key).and_then(Value::as_str).unwrap_or(fallback)
}

fn canned_result(tool_name: &str, arguments: &Value) -> Option<Value> {
    let region = argument(arguments, "region", "us-east-1");
    let time_range = argument(arguments, "time_range", "30d");

    let result = match tool_name {
        tools::CHECK_SECURITY_SERVICES => {
            let services = json!({
                "guardduty": {"status": "enabled", "detector_id": "fixture-detector"},
                "inspector": {"status": "enabled", "resource_types": ["EC2", "ECR"]},
                "securityhub": {"status": "enabled", "standards": 3},
                "macie": {"status": "disabled"}
            });
            Value::Object(Map::from_iter([(region.to_string(), services)]))
        }
        tools::GET_SECURITY_FINDINGS => json!({
            "region": region,
            "severity": argument(arguments, "severity", "HIGH,CRITICAL"),
            "count": 2,
            "findings": [
                {"id": "f-1", "severity": "HIGH", "title": "S3 bucket allows public read"},
                {"id": "f-2", "severity": "CRITICAL", "title": "Root account used without MFA"}
            ]
        }),
        tools::CHECK_COMPLIANCE => json!({
            "region": region,
            "standards": {"cis-aws-foundations": {"passed": 41, "failed": 7}}
        }),
        tools::GET_COST_BREAKDOWN | tools::GET_SECURITY_SERVICE_COSTS => json!({
            "total_cost": 125.50,
            "time_range": time_range,
            "services": {
                "guardduty": {"cost": 45.20, "currency": "USD"},
                "securityhub": {"cost": 80.30, "currency": "USD"}
            }
        }),
        tools::ANALYZE_COST_TRENDS => json!({
            "time_range": time_range,
            "trend": "increasing",
            "change_percentage": 6.4
        }),
        tools::FORECAST_COSTS => json!({
            "forecast_months": arguments.get("forecast_months").cloned().unwrap_or(json!(3)),
            "monthly_forecast": [128.10, 131.40, 134.75]
        }),
        tools::CALCULATE_SECURITY_ROI => json!({
            "roi_percentage": 15.8,
            "investment": 125.50,
            "savings": 198.75,
            "analysis": "Strong ROI from security investments"
        }),
        tools::ANALYZE_COST_BENEFIT => json!({
            "benefit_cost_ratio": 1.58,
            "avoided_incident_cost": 198.75
        }),
        tools::GENERATE_ROI_REPORT => json!({
            "headline": "Security spend returned 15.8% over the period",
            "time_range": time_range
        }),
        tools::OPTIMIZE_SECURITY_SPEND => json!({
            "recommendations": ["Consolidate Inspector scans to weekly cadence"]
        }),
        _ => return None,
    };
    Some(result)
}
