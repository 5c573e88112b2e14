//! Static tool registry.
//!
//! Each analytic [`Domain`] owns one [`DomainConfig`] row: the keywords the
//! classifier scores against, the gateway endpoint its tools live behind, and
//! the ordered list of tools that may be invoked there. The table is built at
//! compile time and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Security,
    Cost,
    Roi,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DomainConfig {
    pub domain: Domain,
    pub keywords: &'static [&'static str],
    pub endpoint: &'static str,
    pub tools: &'static [&'static str],
}

pub mod tools {
    pub const CHECK_SECURITY_SERVICES: &str = "check_security_services";
    pub const GET_SECURITY_FINDINGS: &str = "get_security_findings";
    pub const CHECK_COMPLIANCE: &str = "check_compliance";

    pub const GET_SECURITY_SERVICE_COSTS: &str = "get_security_service_costs";
    pub const ANALYZE_COST_TRENDS: &str = "analyze_cost_trends";
    pub const GET_COST_BREAKDOWN: &str = "get_cost_breakdown";
    pub const FORECAST_COSTS: &str = "forecast_costs";

    pub const CALCULATE_SECURITY_ROI: &str = "calculate_security_roi";
    pub const ANALYZE_COST_BENEFIT: &str = "analyze_cost_benefit";
    pub const GENERATE_ROI_REPORT: &str = "generate_roi_report";
    pub const OPTIMIZE_SECURITY_SPEND: &str = "optimize_security_spend";
}

static REGISTRY: [DomainConfig; 3] = [
    DomainConfig {
        domain: Domain::Security,
        keywords: &[
            "security",
            "compliance",
            "findings",
            "vulnerabilities",
            "guardduty",
            "inspector",
            "config",
            "threat",
            "risk",
            "breach",
            "attack",
            "malware",
            "incident",
        ],
        endpoint: "/security",
        tools: &[tools::CHECK_SECURITY_SERVICES, tools::GET_SECURITY_FINDINGS, tools::CHECK_COMPLIANCE],
    },
    DomainConfig {
        domain: Domain::Cost,
        keywords: &[
            "cost",
            "spend",
            "budget",
            "expense",
            "billing",
            "price",
            "forecast",
            "money",
            "dollar",
            "fee",
            "charge",
            "payment",
            "financial",
            "costs",
        ],
        endpoint: "/cost",
        tools: &[
            tools::GET_SECURITY_SERVICE_COSTS,
            tools::ANALYZE_COST_TRENDS,
            tools::GET_COST_BREAKDOWN,
            tools::FORECAST_COSTS,
        ],
    },
    DomainConfig {
        domain: Domain::Roi,
        keywords: &[
            "roi",
            "return",
            "investment",
            "benefit",
            "value",
            "optimization",
            "efficiency",
            "worth",
            "payback",
            "profit",
            "savings",
            "business case",
        ],
        endpoint: "/roi",
        tools: &[
            tools::CALCULATE_SECURITY_ROI,
            tools::ANALYZE_COST_BENEFIT,
            tools::GENERATE_ROI_REPORT,
            tools::OPTIMIZE_SECURITY_SPEND,
        ],
    },
];

/// Registry rows in deterministic iteration order (security, cost, roi).
pub fn entries() -> &'static [DomainConfig] {
    &REGISTRY
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Security, Domain::Cost, Domain::Roi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Cost => "cost",
            Self::Roi => "roi",
        }
    }

    pub fn config(&self) -> &'static DomainConfig {
        match self {
            Self::Security => &REGISTRY[0],
            Self::Cost => &REGISTRY[1],
            Self::Roi => &REGISTRY[2],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "security" => Ok(Self::Security),
            "cost" => Ok(Self::Cost),
            "roi" => Ok(Self::Roi),
            other => Err(format!("unknown domain `{other}` (expected security|cost|roi)")),
        }
    }
}

impl DomainConfig {
    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.tools.iter().any(|tool| *tool == tool_name)
    }

    pub fn suggested_tools(&self) -> Vec<String> {
        self.tools.iter().map(|tool| (*tool).to_string()).collect()
    }
}
