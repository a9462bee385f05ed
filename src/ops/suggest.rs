//! Checklist suggestions from a hosted text-generation model.
//!
//! The service is optional. Without an API key the client answers with a
//! fixed two-item list. Any failure talking to the service degrades to an
//! empty list, so callers only ever see a `Vec`.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::model::config::SuggestionConfig;
use crate::model::task::TaskType;

/// A suggested checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSuggestion {
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

impl TaskSuggestion {
    pub fn new(title: impl Into<String>, task_type: TaskType) -> Self {
        TaskSuggestion {
            title: title.into(),
            task_type,
        }
    }
}

/// Anything that can propose a checklist for a unit description
pub trait TaskSuggester {
    fn generate_tasks_for_unit(
        &self,
        description: &str,
    ) -> impl Future<Output = Vec<TaskSuggestion>> + Send;
}

/// Returned when no credential is configured
pub fn fallback_suggestions() -> Vec<TaskSuggestion> {
    vec![
        TaskSuggestion::new("Clean Main Area (Mock AI)", TaskType::Cleaning),
        TaskSuggestion::new("Check Supplies (Mock AI)", TaskType::Inventory),
    ]
}

/// Error type for the generation request
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error: HTTP {status} - {body}")]
    Server { status: u16, body: String },
    #[error("could not parse suggestion list: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    title: String,
    /// Not trusted to be a string; anything odd maps to cleaning
    #[serde(rename = "type", default)]
    kind: Option<serde_json::Value>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if any
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

pub fn build_prompt(description: &str) -> String {
    format!(
        "Create a cleaning and inventory checklist for a rental unit described as: \"{}\".\n\
         Return a list of 5-8 specific, actionable tasks.\n\
         Classify each as either 'CLEANING' or 'INVENTORY'.",
        description
    )
}

fn request_body(description: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": build_prompt(description) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "Short actionable task title" },
                        "type": { "type": "STRING", "enum": ["CLEANING", "INVENTORY"] }
                    },
                    "required": ["title", "type"]
                }
            }
        }
    })
}

/// Parse the model's JSON text into suggestions, normalizing unknown types
/// to cleaning. Empty text counts as an empty list.
pub fn parse_suggestions(text: &str) -> Result<Vec<TaskSuggestion>, serde_json::Error> {
    let text = if text.trim().is_empty() { "[]" } else { text };
    let raw: Vec<RawSuggestion> = serde_json::from_str(text)?;
    Ok(raw
        .into_iter()
        .map(|r| {
            let kind = r.kind.as_ref().and_then(|v| v.as_str()).unwrap_or("");
            TaskSuggestion::new(r.title, TaskType::from_loose(kind))
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for a `generateContent`-style endpoint
#[derive(Debug, Clone)]
pub struct SuggestionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl SuggestionClient {
    pub fn new(config: &SuggestionConfig, api_key: Option<String>) -> Result<Self, SuggestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(SuggestionClient {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Build a client with the key taken from the configured environment variable
    pub fn from_config(config: &SuggestionConfig) -> Result<Self, SuggestError> {
        Self::new(config, config.api_key())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Issue one generation request. Errors are returned, not swallowed.
    pub async fn request(&self, api_key: &str, description: &str) -> Result<Vec<TaskSuggestion>, SuggestError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        debug!(%url, "requesting task suggestions");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body(description))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parse_suggestions(parsed.text().unwrap_or("[]"))?)
    }
}

impl TaskSuggester for SuggestionClient {
    async fn generate_tasks_for_unit(&self, description: &str) -> Vec<TaskSuggestion> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("no API key configured; returning built-in suggestions");
            return fallback_suggestions();
        };
        match self.request(api_key, description).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                error!(error = %e, "task suggestion request failed");
                Vec::new()
            }
        }
    }
}
