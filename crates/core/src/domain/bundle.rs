use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::invocation::ToolResult;
use crate::domain::registry::Domain;

/// What a bundle covers: one classified domain, or the multi-domain overview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisScope {
    Single(Domain),
    Comprehensive,
}

impl AnalysisScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single(domain) => domain.as_str(),
            Self::Comprehensive => "comprehensive",
        }
    }

    pub fn domain(&self) -> Option<Domain> {
        match self {
            Self::Single(domain) => Some(*domain),
            Self::Comprehensive => None,
        }
    }
}

impl fmt::Display for AnalysisScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnalysisScope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl From<Domain> for AnalysisScope {
    fn from(domain: Domain) -> Self {
        Self::Single(domain)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultBundle {
    #[serde(rename = "intent")]
    pub scope: AnalysisScope,
    pub query: String,
    pub results: BTreeMap<String, ToolResult>,
}

impl ResultBundle {
    pub fn new(scope: AnalysisScope, query: impl Into<String>) -> Self {
        Self { scope, query: query.into(), results: BTreeMap::new() }
    }

    pub fn insert(&mut self, key: impl Into<String>, result: ToolResult) {
        self.results.insert(key.into(), result);
    }

    pub fn get(&self, key: &str) -> Option<&ToolResult> {
        self.results.get(key)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.results.values().filter(|result| !result.is_success()).count()
    }
}
