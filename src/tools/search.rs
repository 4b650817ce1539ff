//! Bilingual web research backed by the Serper search API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::{required_str, Tool, RESEARCH};
use crate::config::SearchConfig;

/// Organic results kept per language.
pub const MAX_RESULTS_PER_LANGUAGE: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SERPER_API_KEY is not configured")]
    MissingApiKey,

    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Search language, which also selects the result region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Spanish,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
        }
    }

    pub fn region(self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "us",
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search and return the provider's raw JSON body.
    async fn search(&self, query: &str, language: Language) -> Result<Value, SearchError>;
}

pub struct SerperClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl SerperClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str, language: Language) -> Result<Value, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let body = build_request(query, language);

        let response = self
            .http
            .post(&self.url)
            .header("X-API-KEY", api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// Serper request body for one language.
fn build_request(query: &str, language: Language) -> Value {
    json!({
        "q": query,
        "gl": language.region(),
        "hl": language.code(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub spanish_results: Vec<SearchResult>,
    pub english_results: Vec<SearchResult>,
    /// Why the Spanish search produced nothing, when it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spanish_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResearchOutcome {
    Results(SearchResultSet),
    Error { error: String },
}

/// Search `query` in Spanish and `"english " + query` in English.
///
/// A failing language contributes no results and reports its error alongside
/// the other language's list. Only when both searches fail is the outcome an
/// error, carrying both provider messages.
pub async fn research(provider: &dyn SearchProvider, query: &str) -> ResearchOutcome {
    let spanish = provider.search(query, Language::Spanish).await;
    let english_query = format!("english {}", query);
    let english = provider.search(&english_query, Language::English).await;

    match (spanish, english) {
        (Err(es), Err(en)) => {
            tracing::error!(query, spanish = %es, english = %en, "Research failed in both languages");
            ResearchOutcome::Error {
                error: format!("es: {}; en: {}", es, en),
            }
        }
        (spanish, english) => {
            let (spanish, spanish_error) = split_failure(spanish, Language::Spanish);
            let (english, english_error) = split_failure(english, Language::English);

            let mut set = format_results(spanish.as_ref(), english.as_ref());
            set.spanish_error = spanish_error;
            set.english_error = english_error;
            ResearchOutcome::Results(set)
        }
    }
}

fn split_failure(
    result: Result<Value, SearchError>,
    language: Language,
) -> (Option<Value>, Option<String>) {
    match result {
        Ok(body) => (Some(body), None),
        Err(e) => {
            tracing::warn!(language = language.code(), error = %e, "Search failed");
            (None, Some(e.to_string()))
        }
    }
}

/// Reduce raw provider bodies to at most five title/link/snippet triples each.
pub fn format_results(spanish: Option<&Value>, english: Option<&Value>) -> SearchResultSet {
    SearchResultSet {
        spanish_results: spanish.map(organic_results).unwrap_or_default(),
        english_results: english.map(organic_results).unwrap_or_default(),
        ..SearchResultSet::default()
    }
}

fn organic_results(body: &Value) -> Vec<SearchResult> {
    let Some(organic) = body.get("organic").and_then(Value::as_array) else {
        return Vec::new();
    };

    organic
        .iter()
        .take(MAX_RESULTS_PER_LANGUAGE)
        .map(|entry| SearchResult {
            title: text_field(entry, "title"),
            link: text_field(entry, "link"),
            snippet: text_field(entry, "snippet"),
        })
        .collect()
}

fn text_field(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Research tool exposed to the researcher and the writing assistant.
pub struct Research {
    provider: Arc<dyn SearchProvider>,
}

impl Research {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for Research {
    fn name(&self) -> &str {
        RESEARCH
    }

    fn description(&self) -> &str {
        "Investiga sobre un tema dado y retorna el material de investigación incluyendo enlaces de referencia"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "El tema sobre el cual investigar"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<Value> {
        let query = required_str(&args, "query")?;
        let outcome = research(self.provider.as_ref(), query).await;
        Ok(serde_json::to_value(outcome)?)
    }
}
