//! Keyword routing of chat input to a capability.
//!
//! The router is an ordered rule table checked top-down against the lowercased
//! input. It is deliberately not a classifier: the first matching rule wins and
//! anything unmatched falls through to ecological advice. New intents are added
//! by appending rules.

use regex::Regex;
use tracing::info;

use crate::capability::{Capability, EcologicalAdviceInput, FindTreesInput, FindTreesOutput};
use crate::error::CapabilityError;
use crate::invoker::CapabilityInvoker;

pub const FIND_TREES_TRIGGER: &str = "znajdź drzewa";
pub const DEFAULT_LOCATION: &str = "twoja obecna okolica";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    FindTrees,
    EcologicalAdvice,
}

impl Intent {
    pub fn capability(&self) -> Capability {
        match self {
            Intent::FindTrees => Capability::NearbyTreeFinder,
            Intent::EcologicalAdvice => Capability::EcologicalAdvice,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Trigger {
    /// Substring match; the phrase is lowercased when the trigger is built.
    Phrase(String),
    /// Regex matched against the lowercased input.
    Pattern(Regex),
}

impl Trigger {
    pub fn phrase(phrase: &str) -> Self {
        Trigger::Phrase(phrase.to_lowercase())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Trigger::Pattern(Regex::new(pattern)?))
    }

    fn matches(&self, lowered: &str) -> bool {
        match self {
            Trigger::Phrase(phrase) => lowered.contains(phrase.as_str()),
            Trigger::Pattern(re) => re.is_match(lowered),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub trigger: Trigger,
    pub intent: Intent,
}

/// What the router knows about where the user is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteContext {
    pub current_path: Option<String>,
    pub location: Option<String>,
}

impl RouteContext {
    pub fn at_path(path: &str) -> Self {
        Self {
            current_path: Some(path.to_string()),
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedRequest {
    FindTrees(FindTreesInput),
    EcologicalAdvice(EcologicalAdviceInput),
}

impl RoutedRequest {
    pub fn intent(&self) -> Intent {
        match self {
            RoutedRequest::FindTrees(_) => Intent::FindTrees,
            RoutedRequest::EcologicalAdvice(_) => Intent::EcologicalAdvice,
        }
    }

    /// Call the capability and fold its output into one reply text.
    pub async fn execute(self, invoker: &CapabilityInvoker) -> Result<String, CapabilityError> {
        match self {
            RoutedRequest::FindTrees(input) => {
                let output = invoker.find_trees_near_me(&input).await?;
                Ok(format_tree_locations(&output))
            }
            RoutedRequest::EcologicalAdvice(input) => {
                let output = invoker.ecological_advice(&input).await?;
                Ok(output.advice)
            }
        }
    }
}

/// Reply text for a tree lookup. The notes section is omitted when the model
/// left it empty.
pub fn format_tree_locations(output: &FindTreesOutput) -> String {
    let mut text = format!("Znalazłem dla Ciebie kilka drzew:\n{}", output.tree_locations);
    if let Some(notes) = output
        .additional_notes
        .as_deref()
        .filter(|notes| !notes.trim().is_empty())
    {
        text.push_str(&format!("\n\nDodatkowe uwagi: {}", notes));
    }
    text
}

#[derive(Debug, Clone)]
pub struct IntentRouter {
    rules: Vec<RouteRule>,
    fallback: Intent,
    default_location: String,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl IntentRouter {
    pub fn new(default_location: &str) -> Self {
        Self {
            rules: vec![RouteRule {
                trigger: Trigger::phrase(FIND_TREES_TRIGGER),
                intent: Intent::FindTrees,
            }],
            fallback: Intent::EcologicalAdvice,
            default_location: default_location.to_string(),
        }
    }

    pub fn with_rule(mut self, trigger: Trigger, intent: Intent) -> Self {
        self.rules.push(RouteRule { trigger, intent });
        self
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.trigger.matches(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or(self.fallback)
    }

    pub fn route(&self, text: &str, context: &RouteContext) -> RoutedRequest {
        let intent = self.classify(text);
        info!(?intent, "routed chat message");
        match intent {
            Intent::FindTrees => {
                let location = context
                    .location
                    .as_deref()
                    .map(str::trim)
                    .filter(|location| !location.is_empty())
                    .unwrap_or(self.default_location.as_str());
                RoutedRequest::FindTrees(FindTreesInput {
                    user_location: location.to_string(),
                    tree_species_preference: None,
                })
            }
            Intent::EcologicalAdvice => RoutedRequest::EcologicalAdvice(EcologicalAdviceInput {
                query: text.to_string(),
                current_path: context.current_path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_phrase_routes_to_tree_finder() {
        let router = IntentRouter::default();
        assert_eq!(router.classify("znajdź drzewa w parku"), Intent::FindTrees);
        assert_eq!(router.classify("jak dodać drzewo?"), Intent::EcologicalAdvice);
    }

    #[test]
    fn routed_request_names_its_capability() {
        let router = IntentRouter::default();
        let context = RouteContext::default();
        let finder = router.route("znajdź drzewa", &context);
        let advice = router.route("co to jest fotosynteza?", &context);

        assert_eq!(finder.intent(), Intent::FindTrees);
        assert_eq!(finder.intent().capability(), Capability::NearbyTreeFinder);
        assert_eq!(advice.intent().capability(), Capability::EcologicalAdvice);
    }

    #[test]
    fn trigger_is_case_insensitive() {
        let router = IntentRouter::default();
        assert_eq!(router.classify("ZNAJDŹ DRZEWA koło mnie"), Intent::FindTrees);
        assert_eq!(router.classify("Proszę, Znajdź Drzewa"), Intent::FindTrees);
    }

    #[test]
    fn finder_uses_default_location_when_none_given() {
        let router = IntentRouter::default();
        let request = router.route("znajdź drzewa", &RouteContext::default());
        assert_eq!(
            request,
            RoutedRequest::FindTrees(FindTreesInput {
                user_location: DEFAULT_LOCATION.to_string(),
                tree_species_preference: None,
            })
        );

        let blank = RouteContext {
            current_path: None,
            location: Some("  ".to_string()),
        };
        match router.route("znajdź drzewa", &blank) {
            RoutedRequest::FindTrees(input) => assert_eq!(input.user_location, DEFAULT_LOCATION),
            other => panic!("unexpected route {:?}", other),
        }
    }

    #[test]
    fn finder_prefers_caller_location() {
        let router = IntentRouter::default();
        let context = RouteContext {
            current_path: Some("/map".to_string()),
            location: Some("50.0412, 21.9991".to_string()),
        };
        match router.route("znajdź drzewa", &context) {
            RoutedRequest::FindTrees(input) => assert_eq!(input.user_location, "50.0412, 21.9991"),
            other => panic!("unexpected route {:?}", other),
        }
    }

    #[test]
    fn advice_carries_raw_query_and_path() {
        let router = IntentRouter::default();
        let request = router.route("Jak dodać drzewo?", &RouteContext::at_path("/submit"));
        assert_eq!(
            request,
            RoutedRequest::EcologicalAdvice(EcologicalAdviceInput {
                query: "Jak dodać drzewo?".to_string(),
                current_path: Some("/submit".to_string()),
            })
        );
    }

    #[test]
    fn rules_are_checked_in_order() {
        let router = IntentRouter::default()
            .with_rule(Trigger::pattern(r"\bdrzew").unwrap(), Intent::EcologicalAdvice);
        assert_eq!(router.rules().len(), 2);
        assert_eq!(router.classify("znajdź drzewa"), Intent::FindTrees);
        assert_eq!(router.classify("gdzie są drzewa"), Intent::EcologicalAdvice);
    }

    #[test]
    fn extra_rule_can_add_a_trigger() {
        let router = IntentRouter::default()
            .with_rule(Trigger::pattern(r"gdzie (są|rosną) drzewa").unwrap(), Intent::FindTrees);
        assert_eq!(router.classify("Gdzie rosną drzewa?"), Intent::FindTrees);
    }

    #[test]
    fn notes_section_only_when_present() {
        let with_notes = FindTreesOutput {
            tree_locations: "Park X, Park Y".to_string(),
            additional_notes: Some("Uważaj na korzenie".to_string()),
        };
        assert_eq!(
            format_tree_locations(&with_notes),
            "Znalazłem dla Ciebie kilka drzew:\nPark X, Park Y\n\nDodatkowe uwagi: Uważaj na korzenie"
        );

        for notes in [None, Some(String::new())] {
            let output = FindTreesOutput {
                tree_locations: "Park X".to_string(),
                additional_notes: notes,
            };
            assert_eq!(
                format_tree_locations(&output),
                "Znalazłem dla Ciebie kilka drzew:\nPark X"
            );
        }
    }
}
