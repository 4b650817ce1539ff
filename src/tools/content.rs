//! Content formatting tool.

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{required_str, Tool, WRITE_CONTENT};

/// Research material wrapped with its topic and the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedContent {
    pub content: String,
    pub topic: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

pub fn write_content(research_material: &str, topic: &str) -> FormattedContent {
    FormattedContent {
        content: research_material.to_string(),
        topic: topic.to_string(),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

pub struct WriteContent;

#[async_trait]
impl Tool for WriteContent {
    fn name(&self) -> &str {
        WRITE_CONTENT
    }

    fn description(&self) -> &str {
        "Escribe contenido basado en el material de investigación y tema proporcionados"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "research_material": {
                    "type": "string",
                    "description": "Material de investigación sobre un tema dado"
                },
                "topic": {
                    "type": "string",
                    "description": "El tema del contenido"
                }
            },
            "required": ["research_material", "topic"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<Value> {
        let research_material = required_str(&args, "research_material")?;
        let topic = required_str(&args, "topic")?;
        Ok(serde_json::to_value(write_content(research_material, topic))?)
    }
}
