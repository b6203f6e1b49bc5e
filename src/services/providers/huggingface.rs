/// Hugging Face inference provider
///
/// Sends the library's titles to a hosted text-generation model and parses the
/// model's free-text answer into a title and author.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{BookWithAuthor, Recommendation},
    services::providers::RecommendationProvider,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const ANSWER_PREFIX: &str = "Suggest one more book I might like:";
const AI_REASON: &str = "AI suggestion from Hugging Face";

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

/// Builds the prompt listing every book in the library
pub fn build_prompt(books: &[BookWithAuthor]) -> String {
    let mut prompt = String::from("Here are the books currently in my library:\n");
    for book in books {
        prompt.push_str(&format!("- \"{}\" by {}\n", book.title, book.author_name));
    }
    prompt.push_str("\nSuggest one more book I might like (just give title and author).");
    prompt
}

/// Splits a model answer such as `"Dune" by Frank Herbert` into title and author
///
/// Text-generation endpoints echo the prompt back by default, so an echoed
/// prompt is dropped and only the first non-empty line of the answer is read.
/// Returns `None` when no title can be recovered.
pub fn parse_suggestion(generated: &str, prompt: &str) -> Option<(String, String)> {
    let answer = generated.strip_prefix(prompt).unwrap_or(generated);
    let line = answer.lines().map(str::trim).find(|l| !l.is_empty())?;

    let mut parts = line.split(" by ");
    let title = parts
        .next()
        .unwrap_or_default()
        .replace(ANSWER_PREFIX, "")
        .trim()
        .trim_matches('"')
        .to_string();
    let author = parts
        .next()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    if title.is_empty() {
        return None;
    }

    Some((title, author))
}

#[derive(Clone)]
pub struct HuggingFaceProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    default_cover_url: String,
}

impl HuggingFaceProvider {
    pub fn new(
        http_client: HttpClient,
        api_url: String,
        api_key: Option<String>,
        default_cover_url: String,
    ) -> Self {
        Self {
            http_client,
            api_url,
            api_key,
            default_cover_url,
        }
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for HuggingFaceProvider {
    async fn recommend(&self, books: &[BookWithAuthor]) -> AppResult<Option<Recommendation>> {
        let prompt = build_prompt(books);

        let mut request = self
            .http_client
            .post(&self.api_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "inputs": prompt }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Hugging Face returned status {}: {}",
                status, body
            )));
        }

        let generations: Vec<Generation> = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse Hugging Face response: {}", e))
        })?;

        let Some(first) = generations.first() else {
            return Ok(None);
        };

        let suggestion = parse_suggestion(first.generated_text.trim(), prompt.trim());

        tracing::info!(
            provider = self.name(),
            found = suggestion.is_some(),
            "AI recommendation completed"
        );

        Ok(suggestion.map(|(title, author)| Recommendation {
            title,
            author,
            cover_url: self.default_cover_url.clone(),
            reason: Some(AI_REASON.to_string()),
        }))
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}
