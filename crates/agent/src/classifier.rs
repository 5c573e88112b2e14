use std::collections::BTreeMap;

use execlens_core::domain::registry::{self, Domain, DomainConfig};
use serde::Serialize;
use tracing::debug;

/// Keyword hit counts per domain, in registry order.
pub type IntentScore = BTreeMap<Domain, u32>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub primary_domain: Domain,
    pub scores: IntentScore,
    pub suggested_tools: Vec<String>,
    pub matched_by: MatchSource,
}

/// How the primary domain was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Keywords,
    ContextPhrase,
    Default,
}

const COST_CONTEXT_PHRASES: &[&str] =
    &["how much", "what does it cost", "spending", "money", "dollars", "$"];
const ROI_CONTEXT_PHRASES: &[&str] =
    &["worth it", "return on", "benefit", "value", "investment"];

const TIE_PRIORITY: [Domain; 2] = [Domain::Cost, Domain::Roi];
const FALLBACK_DOMAIN: Domain = Domain::Security;

#[derive(Clone, Copy, Debug)]
pub struct IntentClassifier {
    registry: &'static [DomainConfig],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self { registry: registry::entries() }
    }

    pub fn classify(&self, query: &str) -> ClassificationResult {
        let normalized_query = normalize_text(query);
        let scores = self.score(&normalized_query);

        let (primary_domain, matched_by) = if scores.values().all(|score| *score == 0) {
            contextual_fallback(&normalized_query)
        } else {
            (resolve_max(&scores, self.registry), MatchSource::Keywords)
        };

        debug!(
            event_name = "agent.classifier.scored",
            security = scores.get(&Domain::Security).copied().unwrap_or(0),
            cost = scores.get(&Domain::Cost).copied().unwrap_or(0),
            roi = scores.get(&Domain::Roi).copied().unwrap_or(0),
            primary_domain = %primary_domain,
            matched_by = ?matched_by,
            "query intent scored"
        );

        ClassificationResult {
            primary_domain,
            scores,
            suggested_tools: primary_domain.config().suggested_tools(),
            matched_by,
        }
    }

    fn score(&self, normalized_query: &str) -> IntentScore {
        self.registry
            .iter()
            .map(|entry| {
                let hits = entry
                    .keywords
                    .iter()
                    .filter(|keyword| normalized_query.contains(**keyword))
                    .count();
                (entry.domain, hits as u32)
            })
            .collect()
    }
}

fn resolve_max(scores: &IntentScore, registry: &[DomainConfig]) -> Domain {
    let max_score = scores.values().copied().max().unwrap_or(0);

    TIE_PRIORITY
        .iter()
        .copied()
        .find(|domain| scores.get(domain).copied() == Some(max_score))
        .or_else(|| {
            registry
                .iter()
                .map(|entry| entry.domain)
                .find(|domain| scores.get(domain).copied() == Some(max_score))
        })
        .unwrap_or(FALLBACK_DOMAIN)
}

fn contextual_fallback(normalized_query: &str) -> (Domain, MatchSource) {
    let contains_any =
        |phrases: &[&str]| phrases.iter().any(|phrase| normalized_query.contains(phrase));

    if contains_any(COST_CONTEXT_PHRASES) {
        (Domain::Cost, MatchSource::ContextPhrase)
    } else if contains_any(ROI_CONTEXT_PHRASES) {
        (Domain::Roi, MatchSource::ContextPhrase)
    } else {
        (FALLBACK_DOMAIN, MatchSource::Default)
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use execlens_core::domain::registry::Domain;

    use super::{IntentClassifier, MatchSource};

    #[test]
    fn cost_only_query_routes_to_cost() {
        let result = IntentClassifier::new().classify("What is my monthly spend?");
        assert_eq!(result.primary_domain, Domain::Cost);
        assert_eq!(result.matched_by, MatchSource::Keywords);
        assert_eq!(result.scores[&Domain::Cost], 1);
        assert_eq!(result.scores[&Domain::Security], 0);
        assert_eq!(result.scores[&Domain::Roi], 0);
    }

    #[test]
    fn unrelated_query_defaults_to_security() {
        let result = IntentClassifier::new().classify("Good morning, how is the team doing?");
        assert_eq!(result.primary_domain, Domain::Security);
        assert_eq!(result.matched_by, MatchSource::Default);
        assert!(result.scores.values().all(|score| *score == 0));
        assert_eq!(
            result.suggested_tools,
            vec!["check_security_services", "get_security_findings", "check_compliance"]
        );
    }

    #[test]
    fn empty_query_defaults_to_security() {
        let result = IntentClassifier::new().classify("");
        assert_eq!(result.primary_domain, Domain::Security);
        assert_eq!(result.scores.len(), 3);
    }

    #[test]
    fn cost_wins_a_tie_with_roi() {
        let result = IntentClassifier::new().classify("budget versus payback");
        assert_eq!(result.scores[&Domain::Cost], 1);
        assert_eq!(result.scores[&Domain::Roi], 1);
        assert_eq!(result.primary_domain, Domain::Cost);
    }

    #[test]
    fn cost_wins_a_tie_with_security() {
        let result = IntentClassifier::new().classify("breach budget");
        assert_eq!(result.scores[&Domain::Security], 1);
        assert_eq!(result.scores[&Domain::Cost], 1);
        assert_eq!(result.scores[&Domain::Roi], 0);
        assert_eq!(result.primary_domain, Domain::Cost);
        assert_eq!(result.matched_by, MatchSource::Keywords);
    }

    #[test]
    fn cost_wins_a_three_way_tie() {
        let result = IntentClassifier::new().classify("malware budget payback");
        assert!(result.scores.values().all(|score| *score == 1));
        assert_eq!(result.primary_domain, Domain::Cost);
    }

    #[test]
    fn roi_wins_a_tie_with_security() {
        let result = IntentClassifier::new().classify("does the malware tooling pay its payback");
        assert_eq!(result.scores[&Domain::Security], 1);
        assert_eq!(result.scores[&Domain::Roi], 1);
        assert_eq!(result.primary_domain, Domain::Roi);
    }

    #[test]
    fn highest_score_wins_over_priority() {
        let result =
            IntentClassifier::new().classify("any guardduty threat or breach findings this week?");
        assert!(result.scores[&Domain::Security] >= 4);
        assert_eq!(result.primary_domain, Domain::Security);
    }

    #[test]
    fn keywords_match_as_substrings_case_insensitively() {
        let result = IntentClassifier::new().classify("Show the COSTS please");
        assert_eq!(result.scores[&Domain::Cost], 2, "`cost` and `costs` both match");
        assert_eq!(result.primary_domain, Domain::Cost);
    }

    #[test]
    fn context_phrases_break_silence_in_order() {
        let classifier = IntentClassifier::new();

        let cost = classifier.classify("How much are we paying?");
        assert_eq!(cost.primary_domain, Domain::Cost);
        assert_eq!(cost.matched_by, MatchSource::ContextPhrase);

        let roi = classifier.classify("Is all of this worth it?");
        assert_eq!(roi.scores[&Domain::Roi], 1, "`worth` is also an roi keyword");
        assert_eq!(roi.primary_domain, Domain::Roi);
        assert_eq!(roi.matched_by, MatchSource::Keywords);

        let dollars = classifier.classify("Are we wasting $ on tooling?");
        assert_eq!(dollars.primary_domain, Domain::Cost);
        assert_eq!(dollars.matched_by, MatchSource::ContextPhrase);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = IntentClassifier::new();
        let query = "Give me the compliance score and the forecast";
        assert_eq!(classifier.classify(query), classifier.classify(query));
    }

    #[test]
    fn suggested_tools_follow_the_winning_domain() {
        let result = IntentClassifier::new().classify("what is our roi");
        assert_eq!(result.primary_domain, Domain::Roi);
        assert_eq!(result.suggested_tools, Domain::Roi.config().suggested_tools());
    }
}
