use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AnalysisDefaults;

/// Caller-supplied context accompanying a query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    /// Requests the multi-domain overview instead of single-domain routing.
    #[serde(default)]
    pub overview: bool,
}

/// Parameters every tool invocation starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BaseParams {
    pub region: String,
    pub time_range: String,
}

impl QueryContext {
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_time_range(mut self, time_range: impl Into<String>) -> Self {
        self.time_range = Some(time_range.into());
        self
    }

    pub fn overview(mut self) -> Self {
        self.overview = true;
        self
    }

    /// Fills blanks from the configured defaults.
    pub fn resolve(&self, defaults: &AnalysisDefaults) -> BaseParams {
        BaseParams {
            region: non_blank(self.region.as_deref()).unwrap_or(defaults.region.as_str()).to_string(),
            time_range: non_blank(self.time_range.as_deref())
                .unwrap_or(defaults.time_range.as_str())
                .to_string(),
        }
    }
}

impl BaseParams {
    pub fn to_parameters(&self) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("region".to_string(), Value::String(self.region.clone()));
        parameters.insert("time_range".to_string(), Value::String(self.time_range.clone()));
        parameters
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::QueryContext;
    use crate::config::AnalysisDefaults;

    #[test]
    fn missing_and_blank_fields_fall_back_to_defaults() {
        let defaults = AnalysisDefaults::default();
        let params = QueryContext::default().with_region("  ").resolve(&defaults);

        assert_eq!(params.region, "us-east-1");
        assert_eq!(params.time_range, "30d");
    }

    #[test]
    fn caller_context_wins_over_defaults() {
        let params = QueryContext::default()
            .with_region("eu-central-1")
            .with_time_range("90d")
            .resolve(&AnalysisDefaults::default());

        assert_eq!(
            serde_json::Value::Object(params.to_parameters()),
            json!({"region": "eu-central-1", "time_range": "90d"})
        );
    }

    #[test]
    fn context_deserializes_from_partial_session_attributes() {
        let context: QueryContext =
            serde_json::from_value(json!({"region": "ap-south-1"})).expect("context should parse");
        assert_eq!(context.region.as_deref(), Some("ap-south-1"));
        assert!(context.time_range.is_none());
        assert!(!context.overview);
    }
}
