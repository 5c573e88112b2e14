use execlens_agent::{ClassificationResult, IntentClassifier};
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    command: &'static str,
    query: &'a str,
    #[serde(flatten)]
    classification: ClassificationResult,
}

/// Pure routing preview; no config or gateway involved.
pub fn run(query: &str) -> CommandResult {
    let classification = IntentClassifier::new().classify(query);
    CommandResult::json("classify", 0, &ClassifyOutput { command: "classify", query, classification })
}
