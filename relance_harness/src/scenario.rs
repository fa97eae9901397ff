use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Positive,
    EdgeCase,
    Boundary,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "Positive",
            Self::EdgeCase => "Edge Case",
            Self::Boundary => "Boundary",
        })
    }
}

/// A fixed script of user utterances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub category: Category,
    pub utterances: Vec<String>,
}

impl Scenario {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        category: Category,
        utterances: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            utterances: utterances.into_iter().map(Into::into).collect(),
        }
    }
}

/// The default evaluation suite.
#[must_use]
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "Client Agrees to Pay",
            Category::Positive,
            [
                "Hello.",
                "Yes, I am the account holder.",
                "Okay, I understand.",
                "I can pay right away.",
                "Goodbye.",
            ],
        ),
        Scenario::new(
            "Client Asks for Time to Pay",
            Category::Positive,
            [
                "Hello.",
                "It's me.",
                "I understand, but I need more time.",
                "I can pay in two weeks.",
                "Thank you, see you soon.",
            ],
        ),
        Scenario::new(
            "Client Requests Payment Plan",
            Category::Positive,
            [
                "Yes, this is about my account.",
                "That's a lot of money.",
                "A payment plan would work better for me.",
                "Can you suggest something?",
                "Goodbye.",
            ],
        ),
        Scenario::new(
            "Robot Question Detection",
            Category::EdgeCase,
            [
                "Hello.",
                "Are you a robot?",
                "I understand.",
                "I can pay tomorrow.",
                "See you soon.",
            ],
        ),
        Scenario::new(
            "Upset/Angry Client",
            Category::EdgeCase,
            [
                "Who is this?",
                "I am very angry with you!",
                "This is unfair!",
                "I want to speak to a manager.",
                "Goodbye.",
            ],
        ),
        Scenario::new(
            "Multiple Language Switches",
            Category::Boundary,
            [
                "Hello.",
                "Parlez-vous français ?",
                "I prefer to speak English.",
                "Mais on peut changer ?",
                "No, only in English.",
                "Okay.",
                "I can pay tomorrow.",
                "Goodbye.",
            ],
        ),
    ]
}

/// Read a JSON array of scenarios.
///
/// Rejects an empty list, blank names, and scenarios without utterances.
pub async fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, HarnessError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let scenarios: Vec<Scenario> =
        serde_json::from_str(&content).map_err(|source| HarnessError::ScenarioParse {
            path: path.to_path_buf(),
            source,
        })?;

    if scenarios.is_empty() {
        return Err(HarnessError::InvalidScenario(format!(
            "{} contains no scenarios",
            path.display()
        )));
    }
    for scenario in &scenarios {
        if scenario.name.trim().is_empty() {
            return Err(HarnessError::InvalidScenario(
                "scenario with a blank name".to_string(),
            ));
        }
        if scenario.utterances.is_empty() {
            return Err(HarnessError::InvalidScenario(format!(
                "'{}' has no utterances",
                scenario.name
            )));
        }
    }

    info!("Loaded {} scenarios from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relance_core::{IntentClassifier, KeywordClassifier};

    #[test]
    fn builtin_suite_has_six_named_scenarios() {
        let scenarios = builtin_scenarios();
        assert_eq!(scenarios.len(), 6);

        let robot = scenarios
            .iter()
            .find(|s| s.name == "Robot Question Detection")
            .unwrap();
        assert_eq!(
            robot.utterances,
            vec![
                "Hello.",
                "Are you a robot?",
                "I understand.",
                "I can pay tomorrow.",
                "See you soon."
            ]
        );
        assert_eq!(robot.category, Category::EdgeCase);
    }

    #[test]
    fn only_the_robot_scenario_challenges_identity() {
        let classifier = KeywordClassifier::new(&["goodbye"]);
        for scenario in builtin_scenarios() {
            let challenges = scenario
                .utterances
                .iter()
                .filter(|u| classifier.is_identity_challenge(u))
                .count();
            let expected = usize::from(scenario.name == "Robot Question Detection");
            assert_eq!(challenges, expected, "{}", scenario.name);
        }
    }

    #[test]
    fn category_display_and_serde() {
        assert_eq!(Category::EdgeCase.to_string(), "Edge Case");
        let parsed: Category = serde_json::from_str("\"edge_case\"").unwrap();
        assert_eq!(parsed, Category::EdgeCase);
    }

    #[tokio::test]
    async fn load_custom_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.json");
        std::fs::write(
            &path,
            r#"[{"name": "Short", "category": "positive", "utterances": ["Hi.", "Bye."]}]"#,
        )
        .unwrap();

        let scenarios = load_scenarios(&path).await.unwrap();
        assert_eq!(scenarios, vec![Scenario::new("Short", Category::Positive, ["Hi.", "Bye."])]);
    }

    #[tokio::test]
    async fn load_rejects_bad_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_scenarios(&dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(HarnessError::Io { .. })));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{not json").unwrap();
        assert!(matches!(
            load_scenarios(&garbage).await,
            Err(HarnessError::ScenarioParse { .. })
        ));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(matches!(
            load_scenarios(&empty).await,
            Err(HarnessError::InvalidScenario(_))
        ));

        let silent = dir.path().join("silent.json");
        std::fs::write(
            &silent,
            r#"[{"name": "Mute", "category": "boundary", "utterances": []}]"#,
        )
        .unwrap();
        assert!(matches!(
            load_scenarios(&silent).await,
            Err(HarnessError::InvalidScenario(_))
        ));
    }
}
