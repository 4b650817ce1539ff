//! Shapes a conversation's chat history into a six-section strategy.
//!
//! Each message is routed by its speaker name. The rules are checked in a
//! fixed order and the first match wins, so a name matching two sections only
//! lands in the earlier one.

use serde::{Deserialize, Serialize};

use crate::agent::HistoryEntry;

/// Structured strategy returned to the client.
///
/// Field names on the wire are the ones the web client reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(rename = "resumen")]
    pub summary: String,
    #[serde(rename = "pasos")]
    pub steps: Vec<String>,
    #[serde(rename = "recomendaciones")]
    pub recommendations: Vec<String>,
    #[serde(rename = "investigacion")]
    pub research: Vec<String>,
    #[serde(rename = "plan_medios")]
    pub media_plan: Vec<String>,
    #[serde(rename = "contenido")]
    pub content: Vec<String>,
}

impl Strategy {
    /// True when at least one section received something.
    pub fn has_content(&self) -> bool {
        !self.summary.is_empty()
            || !self.steps.is_empty()
            || !self.recommendations.is_empty()
            || !self.research.is_empty()
            || !self.media_plan.is_empty()
            || !self.content.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    Steps,
    Recommendations,
    Research,
    MediaPlan,
    Content,
}

/// A classified strategy plus what was left out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub strategy: Strategy,
    /// Messages with content whose speaker matched no section.
    pub dropped: usize,
    /// Messages without content.
    pub skipped: usize,
}

/// Section a message belongs to, if any.
pub fn classify_message(speaker: &str, content: &str) -> Option<Section> {
    let name = speaker.to_lowercase();
    let lowered = content.to_lowercase();

    if name.contains("manager") && (lowered.contains("resumen") || lowered.contains("ejecutivo")) {
        Some(Section::Summary)
    } else if name.contains("strategist") {
        Some(Section::Steps)
    } else if name.contains("marketer") {
        Some(Section::Recommendations)
    } else if name.contains("researcher") && !content.starts_with("None") {
        Some(Section::Research)
    } else if name.contains("media") {
        Some(Section::MediaPlan)
    } else if name.contains("copywriter") {
        Some(Section::Content)
    } else {
        None
    }
}

/// Build the strategy from a chat history, preserving message order per section.
pub fn format_strategy(history: &[HistoryEntry]) -> Classification {
    let mut classification = Classification::default();
    let strategy = &mut classification.strategy;

    for entry in history {
        if entry.content.is_empty() {
            classification.skipped += 1;
            continue;
        }

        let content = entry.content.clone();
        match classify_message(&entry.name, &entry.content) {
            Some(Section::Summary) => strategy.summary = content,
            Some(Section::Steps) => strategy.steps.push(content),
            Some(Section::Recommendations) => strategy.recommendations.push(content),
            Some(Section::Research) => strategy.research.push(content),
            Some(Section::MediaPlan) => strategy.media_plan.push(content),
            Some(Section::Content) => strategy.content.push(content),
            None => {
                tracing::debug!(speaker = %entry.name, "Message matched no strategy section");
                classification.dropped += 1;
            }
        }
    }

    if classification.dropped > 0 {
        tracing::info!(
            dropped = classification.dropped,
            "Messages left out of the strategy"
        );
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, content: &str) -> HistoryEntry {
        HistoryEntry::new(name, content)
    }

    #[test]
    fn researcher_none_prefix_is_excluded() {
        let result = format_strategy(&[
            entry("Agency_Researcher", "None found"),
            entry("Agency_Researcher", "Found 3 sources"),
        ]);
        assert_eq!(result.strategy.research, vec!["Found 3 sources"]);
        // Falls through every later branch too.
        assert_eq!(result.dropped, 1);
    }

    #[test]
    fn manager_summary_is_last_writer_wins() {
        let result = format_strategy(&[
            entry("Agency_Manager", "Resumen ejecutivo: primera versión"),
            entry("Agency_Manager", "Nuevo resumen con cambios"),
        ]);
        assert_eq!(result.strategy.summary, "Nuevo resumen con cambios");
    }

    #[test]
    fn manager_without_keywords_is_dropped() {
        let result = format_strategy(&[entry("Agency_Manager", "Coordinemos el equipo")]);
        assert!(result.strategy.summary.is_empty());
        assert_eq!(result.dropped, 1);
        assert!(!result.strategy.has_content());
    }

    #[test]
    fn summary_keywords_are_case_insensitive() {
        let result = format_strategy(&[entry("agency_manager", "EJECUTIVO: todo listo")]);
        assert_eq!(result.strategy.summary, "EJECUTIVO: todo listo");
    }

    #[test]
    fn sections_keep_transcript_order() {
        let history = vec![
            entry("Agency_Strategist", "Paso 1"),
            entry("Agency_Marketer", "Recomendación A"),
            entry("Agency_Media_Planner", "Instagram"),
            entry("Agency_Strategist", "Paso 2"),
            entry("Agency_Copywriter", "Eslogan"),
            entry("Agency_Media_Planner", "Radio"),
        ];
        let result = format_strategy(&history);

        assert_eq!(result.strategy.steps, vec!["Paso 1", "Paso 2"]);
        assert_eq!(result.strategy.recommendations, vec!["Recomendación A"]);
        assert_eq!(result.strategy.media_plan, vec!["Instagram", "Radio"]);
        assert_eq!(result.strategy.content, vec!["Eslogan"]);
        assert_eq!(result.dropped, 0);
    }

    #[test]
    fn first_matching_branch_wins() {
        assert_eq!(
            classify_message("media_strategist", "plan"),
            Some(Section::Steps)
        );
        assert_eq!(
            classify_message("Manager_Copywriter", "borrador"),
            Some(Section::Content)
        );
        assert_eq!(
            classify_message("Manager_Copywriter", "resumen"),
            Some(Section::Summary)
        );
    }

    #[test]
    fn unmatched_speakers_yield_empty_strategy() {
        let result = format_strategy(&[
            entry("Unknown_Bot", "Hola"),
            entry("Unknown_Bot", "Resumen ejecutivo"),
        ]);
        assert_eq!(result.strategy, Strategy::default());
        assert!(!result.strategy.has_content());
        assert_eq!(result.dropped, 2);
    }

    #[test]
    fn empty_content_is_skipped() {
        let result = format_strategy(&[entry("Agency_Strategist", "")]);
        assert!(result.strategy.steps.is_empty());
        assert_eq!(result.skipped, 1);
        assert_eq!(result.dropped, 0);
    }

    #[test]
    fn classification_is_deterministic() {
        let history = vec![
            entry("Agency_Manager", "Resumen ejecutivo"),
            entry("Agency_Researcher", "Datos"),
            entry("writing_assistant", "Borrador"),
        ];
        assert_eq!(format_strategy(&history), format_strategy(&history));
    }

    #[test]
    fn serializes_with_client_field_names() {
        let strategy = Strategy {
            summary: "Resumen".to_string(),
            steps: vec!["Paso".to_string()],
            ..Strategy::default()
        };
        assert_eq!(
            serde_json::to_value(&strategy).unwrap(),
            json!({
                "resumen": "Resumen",
                "pasos": ["Paso"],
                "recomendaciones": [],
                "investigacion": [],
                "plan_medios": [],
                "contenido": []
            })
        );
    }
}
