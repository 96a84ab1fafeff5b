//! # Judgment Service Client
//!
//! LLM adjudication over a chat-completions endpoint, in two modes:
//!
//! - **validate**: is this input a checkable product feature at all?
//!   Fail-closed — only an exact, case-normalized `"yes"` counts.
//! - **evaluate**: given the feature and retrieved legal evidence, which
//!   regions does it comply with? The response is decoded with the
//!   two-phase strategy in [`crate::decode`], since chat models wrap JSON
//!   in prose at will.
//!
//! The evaluation response may legitimately omit regions the model found
//! no evidence for — reconciliation into a total map is the pipeline's
//! job, not this client's.

use std::time::Duration;

use serde::Deserialize;

use geolex_core::{FeatureSubmission, PartialComplianceMap, RetrievedDocument};

use crate::decode::decode_verdict;
use crate::error::JudgmentError;
use crate::retry::retry_send;

/// What the judgment model asserted for one evaluation call.
///
/// `compliance` is `None` when the model's payload decoded but carried no
/// verdict map — the pipeline surfaces that as a judgment failure.
#[derive(Debug, Clone, Default)]
pub struct ModelVerdict {
    /// Per-region verdicts, possibly partial.
    pub compliance: Option<PartialComplianceMap>,
    /// The model's explanation.
    pub reason: Option<String>,
}

/// LLM adjudication seam.
#[async_trait::async_trait]
pub trait JudgmentService: Send + Sync {
    /// Ask whether the submission plausibly describes a checkable product
    /// feature (not whether it is compliant). Only an exact trimmed,
    /// lowercased `"yes"` returns `true`.
    async fn validate_feature(
        &self,
        submission: &FeatureSubmission,
    ) -> Result<bool, JudgmentError>;

    /// Ask for per-region compliance verdicts grounded in `evidence`.
    async fn evaluate_compliance(
        &self,
        submission: &FeatureSubmission,
        evidence: &[RetrievedDocument],
    ) -> Result<ModelVerdict, JudgmentError>;
}

/// Configuration for the HTTP judgment adapter.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL of the chat API (e.g., `http://localhost:11434`).
    pub base_url: String,
    /// Model name to request (e.g., `llama3.2`).
    pub model: String,
    /// Request timeout in seconds (default: 60 — judgment calls are slow).
    pub timeout_secs: u64,
}

impl JudgeConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout_secs: 60,
        }
    }
}

/// HTTP client for a chat-completions judgment endpoint.
#[derive(Debug)]
pub struct HttpChatJudge {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

// The endpoint serves either an Ollama-native or an OpenAI-compatible
// envelope depending on version; both shapes are accepted.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        if let Some(m) = self.message {
            return Some(m.content);
        }
        self.choices.into_iter().next().map(|c| c.message.content)
    }
}

impl HttpChatJudge {
    /// Create a new judgment adapter from configuration.
    pub fn new(config: JudgeConfig) -> Result<Self, JudgmentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JudgmentError::Http {
                endpoint: config.base_url.clone(),
                source: e,
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }

    /// Send one user prompt and return the raw response content.
    async fn chat(&self, prompt: String) -> Result<String, JudgmentError> {
        let url = format!("{}/v1/chat", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
        });

        let resp = retry_send("chat", || self.client.post(&url).json(&body).send())
            .await
            .map_err(|e| JudgmentError::Http {
                endpoint: url.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(JudgmentError::Api {
                endpoint: url,
                status,
                body,
            });
        }

        let decoded: ChatResponse =
            resp.json().await.map_err(|e| JudgmentError::Deserialization {
                endpoint: url.clone(),
                source: e,
            })?;

        decoded
            .into_content()
            .ok_or(JudgmentError::EmptyResponse { endpoint: url })
    }
}

#[async_trait::async_trait]
impl JudgmentService for HttpChatJudge {
    async fn validate_feature(
        &self,
        submission: &FeatureSubmission,
    ) -> Result<bool, JudgmentError> {
        let content = self.chat(validation_prompt(submission)).await?;
        Ok(content.trim().to_lowercase() == "yes")
    }

    async fn evaluate_compliance(
        &self,
        submission: &FeatureSubmission,
        evidence: &[RetrievedDocument],
    ) -> Result<ModelVerdict, JudgmentError> {
        let content = self.chat(evaluation_prompt(submission, evidence)).await?;
        let payload = decode_verdict(&content)?;
        Ok(ModelVerdict {
            compliance: payload.is_compliant,
            reason: payload.reason,
        })
    }
}

/// Prompt for the validation mode: a one-word intake filter.
fn validation_prompt(submission: &FeatureSubmission) -> String {
    format!(
        "You are an intake filter for a compliance checker. Decide whether the \
         following input plausibly describes a product feature that could be \
         checked against regional law. Do not judge compliance itself.\n\n\
         Feature Title: \"{}\"\n\
         Feature Description: \"{}\"\n\n\
         Answer with exactly one word: yes or no.",
        submission.title(),
        submission.description()
    )
}

/// Prompt for the evaluation mode, grounding the model in the retrieved
/// legal excerpts.
fn evaluation_prompt(submission: &FeatureSubmission, evidence: &[RetrievedDocument]) -> String {
    let mut prompt = format!(
        "You are a compliance expert. Given a product feature and excerpts from \
         regional law, evaluate whether the feature is legally compliant in each \
         region the excerpts cover. Respond STRICTLY in valid JSON.\n\n\
         Feature Title: \"{}\"\n\
         Feature Description: \"{}\"\n\n\
         Relevant legal excerpts:\n",
        submission.title(),
        submission.description()
    );
    for (i, doc) in evidence.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] ({}) {}\n",
            i + 1,
            doc.metadata.kb.as_str(),
            doc.text
        ));
    }
    prompt.push_str(
        "\nReturn JSON with this exact structure:\n\n\
         {\n\
           \"isCompliant\": {\n\
           \"us\": true/false,\n\
           \"utah\": true/false,\n\
           \"florida\": true/false,\n\
           \"california\": true/false,\n\
           \"eu\": true/false\n\
           },\n\
           \"reason\": \"short explanation why you marked them as true/false\"\n\
         }\n\n\
         Omit any region the excerpts give you no basis to judge.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolex_core::{DocumentMetadata, KnowledgeBase};

    fn submission() -> FeatureSubmission {
        FeatureSubmission::new("Curfew login blocker", "Restricts under-18 logins").unwrap()
    }

    #[test]
    fn chat_response_prefers_native_message() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"message": {"content": "yes"}, "choices": [{"message": {"content": "no"}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.into_content().as_deref(), Some("yes"));
    }

    #[test]
    fn chat_response_falls_back_to_choices() {
        let resp: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "yes"}}]}"#).unwrap();
        assert_eq!(resp.into_content().as_deref(), Some("yes"));
    }

    #[test]
    fn chat_response_without_content_is_none() {
        let resp: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(resp.into_content().is_none());
    }

    #[test]
    fn validation_prompt_carries_both_fields() {
        let p = validation_prompt(&submission());
        assert!(p.contains("Curfew login blocker"));
        assert!(p.contains("Restricts under-18 logins"));
        assert!(p.contains("yes or no"));
    }

    #[test]
    fn evaluation_prompt_tags_evidence_with_kb() {
        let evidence = vec![RetrievedDocument {
            text: "Section 13-63-102 curfew hours.".to_string(),
            similarity: Some(0.9),
            metadata: DocumentMetadata::for_kb(KnowledgeBase::UtahSocialMediaAct),
        }];
        let p = evaluation_prompt(&submission(), &evidence);
        assert!(p.contains("Utah_Social_Media_Regulation_Act"));
        assert!(p.contains("Section 13-63-102"));
        assert!(p.contains("isCompliant"));
    }
}
