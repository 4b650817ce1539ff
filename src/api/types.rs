//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// Request to analyze a brand and a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// The brand the strategy is for
    #[serde(rename = "brandTask", default)]
    pub brand_task: Option<String>,

    /// The goal the strategy should pursue
    #[serde(rename = "userTask", default)]
    pub user_task: Option<String>,
}

impl AnalyzeRequest {
    /// Both descriptors, when both are present and non-empty.
    pub fn tasks(&self) -> Option<(&str, &str)> {
        let brand = self.brand_task.as_deref().filter(|s| !s.is_empty())?;
        let goal = self.user_task.as_deref().filter(|s| !s.is_empty())?;
        Some((brand, goal))
    }
}

/// Successful analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub strategy: Strategy,
}

/// Failed analysis.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Time of the check (ISO 8601)
    pub timestamp: String,
}

/// Body for unknown routes.
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_require_both_fields_non_empty() {
        let parse = |body: &str| serde_json::from_str::<AnalyzeRequest>(body).unwrap();

        assert_eq!(
            parse(r#"{"brandTask": "Acme", "userTask": "Awareness"}"#).tasks(),
            Some(("Acme", "Awareness"))
        );
        assert_eq!(parse("{}").tasks(), None);
        assert_eq!(parse(r#"{"brandTask": "Acme"}"#).tasks(), None);
        assert_eq!(parse(r#"{"brandTask": "", "userTask": "Awareness"}"#).tasks(), None);
        assert_eq!(parse(r#"{"brandTask": "Acme", "userTask": null}"#).tasks(), None);
    }

    #[test]
    fn whitespace_descriptors_are_accepted_as_is() {
        let request = AnalyzeRequest {
            brand_task: Some(" ".to_string()),
            user_task: Some("Awareness".to_string()),
        };
        assert_eq!(request.tasks(), Some((" ", "Awareness")));
    }
}
